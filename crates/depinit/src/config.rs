//! Manager configuration
//
// Policies can be set in code or loaded from TOML:
//
//   cycle_policy = "skip"
//   missing_dependency = "strict"

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// What a pass does with modules that never become ready because of a cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclePolicy {
    /// Fail the pass with `InitError::CyclicDependency` before running anything.
    #[default]
    Reject,
    /// Run everything that can be ordered; leave cyclic modules, and anything
    /// depending on them, uninitialized.
    Skip,
    /// Force the cycle member with the fewest unsatisfied dependencies to be
    /// ready, ignoring those edges, until every module has run. Modules that
    /// only depend on a cycle keep waiting for it.
    BreakEdges,
}

/// What a pass does with dependency names that were never registered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingDependencyPolicy {
    /// Treat the name as an already satisfied module with no action.
    #[default]
    Lenient,
    /// Fail the pass with `InitError::MissingDependency` before running anything.
    Strict,
}

/// Configuration for a [`DepManager`](crate::DepManager)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ManagerConfig {
    pub cycle_policy: CyclePolicy,
    pub missing_dependency: MissingDependencyPolicy,
}

impl ManagerConfig {
    /// Config equivalent to the boolean "allow cyclic dependencies" switch.
    pub fn allow_cycles(allow: bool) -> Self {
        Self {
            cycle_policy: if allow { CyclePolicy::Skip } else { CyclePolicy::Reject },
            ..Self::default()
        }
    }

    pub fn with_cycle_policy(mut self, policy: CyclePolicy) -> Self {
        self.cycle_policy = policy;
        self
    }

    pub fn with_missing_dependency(mut self, policy: MissingDependencyPolicy) -> Self {
        self.missing_dependency = policy;
        self
    }

    pub fn tolerates_cycles(&self) -> bool {
        self.cycle_policy != CyclePolicy::Reject
    }

    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ManagerConfig::default();
        assert_eq!(config.cycle_policy, CyclePolicy::Reject);
        assert_eq!(config.missing_dependency, MissingDependencyPolicy::Lenient);
        assert!(!config.tolerates_cycles());
    }

    #[test]
    fn test_allow_cycles_flag() {
        assert_eq!(ManagerConfig::allow_cycles(true).cycle_policy, CyclePolicy::Skip);
        assert_eq!(ManagerConfig::allow_cycles(false).cycle_policy, CyclePolicy::Reject);
    }

    #[test]
    fn test_parse_toml() {
        let config = ManagerConfig::from_toml_str(
            "cycle_policy = \"break_edges\"\nmissing_dependency = \"strict\"\n",
        )
        .unwrap();
        assert_eq!(config.cycle_policy, CyclePolicy::BreakEdges);
        assert_eq!(config.missing_dependency, MissingDependencyPolicy::Strict);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = ManagerConfig::from_toml_str("cycle_policy = \"skip\"").unwrap();
        assert_eq!(config.cycle_policy, CyclePolicy::Skip);
        assert_eq!(config.missing_dependency, MissingDependencyPolicy::Lenient);

        assert_eq!(ManagerConfig::from_toml_str("").unwrap(), ManagerConfig::default());
    }

    #[test]
    fn test_toml_round_trip() {
        for cycle_policy in [CyclePolicy::Reject, CyclePolicy::Skip, CyclePolicy::BreakEdges] {
            for missing in [MissingDependencyPolicy::Lenient, MissingDependencyPolicy::Strict] {
                let config = ManagerConfig::default()
                    .with_cycle_policy(cycle_policy)
                    .with_missing_dependency(missing);

                let text = toml::to_string(&config).unwrap();
                assert_eq!(ManagerConfig::from_toml_str(&text).unwrap(), config);
            }
        }

        let text = toml::to_string(&ManagerConfig::allow_cycles(true)).unwrap();
        assert!(text.contains("cycle_policy = \"skip\""));
    }

    #[test]
    fn test_rejects_unknown_values() {
        assert!(matches!(
            ManagerConfig::from_toml_str("cycle_policy = \"ignore\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            ManagerConfig::from_toml_str("parallel = true"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "missing_dependency = \"strict\"").unwrap();

        let config = ManagerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.missing_dependency, MissingDependencyPolicy::Strict);
    }

    #[test]
    fn test_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = ManagerConfig::from_file(dir.path().join("nope.toml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
