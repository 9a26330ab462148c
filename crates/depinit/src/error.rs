//! Error types for initialization passes and configuration loading.

use std::path::PathBuf;
use thiserror::Error;

/// Error returned by a module's initialization action.
///
/// Anything that converts into a boxed error works: `"message".into()`,
/// `std::io::Error`, `anyhow::Error`, ...
pub type ActionError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can end an initialization pass
#[derive(Debug, Error)]
pub enum InitError {
    #[error("module initialization failed: {module}")]
    ModuleFailed {
        module: String,
        #[source]
        source: ActionError,
    },

    /// `module_a` depends on `module_b`; both sit on `cycle`, which lists each
    /// module followed by one of its dependencies.
    #[error("cyclic dependency detected between ({module_a} and {module_b})")]
    CyclicDependency {
        module_a: String,
        module_b: String,
        cycle: Vec<String>,
    },

    #[error("missing dependency: {dependency} required by {module}")]
    MissingDependency { module: String, dependency: String },
}

impl InitError {
    /// Name of the module the error is attributed to.
    pub fn module(&self) -> &str {
        match self {
            InitError::ModuleFailed { module, .. } => module,
            InitError::CyclicDependency { module_a, .. } => module_a,
            InitError::MissingDependency { module, .. } => module,
        }
    }
}

/// Errors raised while loading a [`ManagerConfig`](crate::ManagerConfig)
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid manager config")]
    Parse(#[from] toml::de::Error),
}
