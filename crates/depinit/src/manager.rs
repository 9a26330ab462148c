//! Dependency manager
//!
//! Owns a [`ModuleRegistry`] and runs initialization passes over it. Each pass
//! plans the complete order first, so a pass rejected for a cycle or a missing
//! dependency runs no action at all, then invokes every action in order and
//! stops at the first failure.

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::config::ManagerConfig;
use crate::error::{ActionError, InitError};
use crate::graph::{DependencyGraph, InitPlan};
use crate::registry::ModuleRegistry;

/// Timing for one initialized module
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleTiming {
    pub name: String,
    pub elapsed: Duration,
}

/// Outcome of a successful initialization pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InitReport {
    /// Modules whose action ran, in invocation order
    pub initialized: Vec<ModuleTiming>,
    /// Modules left uninitialized by the cycle policy
    pub skipped: Vec<String>,
    /// Modules run before all their dependencies had completed
    pub forced: Vec<String>,
    /// Unregistered dependency names that were treated as satisfied
    pub placeholders: Vec<String>,
    pub elapsed: Duration,
}

impl InitReport {
    /// Names of the initialized modules, in invocation order
    pub fn order(&self) -> Vec<&str> {
        self.initialized.iter().map(|t| t.name.as_str()).collect()
    }
}

/// Orders and runs module initialization.
///
/// ```
/// use depinit::DepManager;
///
/// let mut manager = DepManager::new();
/// manager.add_module("config", || Ok(()), Vec::<String>::new());
/// manager.add_module("database", || Ok(()), ["config"]);
///
/// let report = manager.run().unwrap();
/// assert_eq!(report.order(), ["config", "database"]);
/// ```
#[derive(Debug, Default)]
pub struct DepManager {
    config: ManagerConfig,
    registry: ModuleRegistry,
}

impl DepManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ManagerConfig) -> Self {
        Self {
            config,
            registry: ModuleRegistry::new(),
        }
    }

    /// Manager that tolerates cycles by skipping cyclic modules when `allow` is set.
    pub fn allow_cycles(allow: bool) -> Self {
        Self::with_config(ManagerConfig::allow_cycles(allow))
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// Add a module to be initialized later.
    ///
    /// `name` must be unique; registering a name twice keeps the first
    /// registration and returns `false`. `dependencies` are the names of the
    /// modules that must be initialized before this one.
    pub fn add_module<F, I, S>(&mut self, name: impl Into<String>, action: F, dependencies: I) -> bool
    where
        F: Fn() -> Result<(), ActionError> + Send + Sync + 'static,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.registry.register(name, action, dependencies)
    }

    /// The order the next pass would follow, without running anything
    pub fn plan(&self) -> Result<InitPlan, InitError> {
        crate::graph::plan(&self.registry, &self.config)
    }

    /// DOT rendering of the current dependency graph
    pub fn to_dot(&self) -> String {
        DependencyGraph::with_placeholders(&self.registry).to_dot()
    }

    /// Initialize all registered modules in dependency order.
    ///
    /// Every dependency of a module is initialized before it. The first failing
    /// action ends the pass; modules not reached yet are not run and side
    /// effects of completed modules are kept.
    pub fn run(&self) -> Result<InitReport, InitError> {
        let pass_start = Instant::now();

        let graph = DependencyGraph::build(&self.registry, self.config.missing_dependency)?;
        let schedule = graph.schedule(self.config.cycle_policy)?;

        for name in &schedule.plan.placeholders {
            tracing::warn!("Dependency {} is not registered, treating it as satisfied", name);
        }

        tracing::info!("Module initialization order: {:?}", schedule.plan.order);

        let mut initialized = Vec::with_capacity(schedule.steps.len());
        for step in &schedule.steps {
            let Some(index) = step.module else {
                continue;
            };
            let module = self.registry.module_at(index);

            tracing::debug!("▶ Initializing module: {}", module.name());

            let start = Instant::now();
            module.init().map_err(|source| {
                tracing::error!("Module {} failed to initialize: {}", module.name(), source);
                InitError::ModuleFailed {
                    module: module.name().to_string(),
                    source,
                }
            })?;
            let elapsed = start.elapsed();

            tracing::debug!("✓ Initialized module: {} ({:?})", module.name(), elapsed);
            initialized.push(ModuleTiming {
                name: module.name().to_string(),
                elapsed,
            });
        }

        let InitPlan {
            skipped,
            forced,
            placeholders,
            ..
        } = schedule.plan;

        let report = InitReport {
            initialized,
            skipped,
            forced,
            placeholders,
            elapsed: pass_start.elapsed(),
        };

        tracing::info!(
            "Initialized {} module(s) in {:?}",
            report.initialized.len(),
            report.elapsed
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CyclePolicy, MissingDependencyPolicy};
    use parking_lot::Mutex;
    use std::sync::Arc;

    const NO_DEPS: [&str; 0] = [];

    type Log = Arc<Mutex<Vec<String>>>;

    fn recorder(log: &Log, name: &'static str) -> impl Fn() -> Result<(), ActionError> {
        let log = log.clone();
        move || {
            log.lock().push(name.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_empty_manager_runs() {
        let manager = DepManager::new();
        let report = manager.run().unwrap();
        assert!(report.initialized.is_empty());
    }

    #[test]
    fn test_chain_order() {
        let log = Log::default();
        let mut manager = DepManager::new();
        manager.add_module("d", recorder(&log, "d"), ["a", "b", "c"]);
        manager.add_module("c", recorder(&log, "c"), ["a", "b"]);
        manager.add_module("b", recorder(&log, "b"), ["a"]);
        manager.add_module("a", recorder(&log, "a"), NO_DEPS);

        let report = manager.run().unwrap();
        assert_eq!(*log.lock(), ["a", "b", "c", "d"]);
        assert_eq!(report.order(), ["a", "b", "c", "d"]);
    }

    #[test]
    fn test_failure_stops_pass() {
        let log = Log::default();
        let mut manager = DepManager::new();
        manager.add_module("a", recorder(&log, "a"), NO_DEPS);
        manager.add_module("b", || Err("disk full".into()), ["a"]);
        manager.add_module("c", recorder(&log, "c"), ["b"]);

        match manager.run() {
            Err(InitError::ModuleFailed { module, source }) => {
                assert_eq!(module, "b");
                assert_eq!(source.to_string(), "disk full");
            }
            other => panic!("expected module failure, got {:?}", other),
        }
        assert_eq!(*log.lock(), ["a"]);
    }

    #[test]
    fn test_cycle_runs_nothing() {
        let log = Log::default();
        let mut manager = DepManager::allow_cycles(false);
        manager.add_module("root", recorder(&log, "root"), NO_DEPS);
        manager.add_module("x", recorder(&log, "x"), ["y"]);
        manager.add_module("y", recorder(&log, "y"), ["x"]);

        assert!(matches!(manager.run(), Err(InitError::CyclicDependency { .. })));
        assert!(log.lock().is_empty());
    }

    #[test]
    fn test_allow_cycles_skips_cyclic_modules() {
        let log = Log::default();
        let mut manager = DepManager::allow_cycles(true);
        manager.add_module("root", recorder(&log, "root"), NO_DEPS);
        manager.add_module("x", recorder(&log, "x"), ["y"]);
        manager.add_module("y", recorder(&log, "y"), ["x"]);

        let report = manager.run().unwrap();
        assert_eq!(*log.lock(), ["root"]);
        assert_eq!(report.skipped, ["x", "y"]);
    }

    #[test]
    fn test_break_edges_reports_forced() {
        let log = Log::default();
        let config = ManagerConfig::default().with_cycle_policy(CyclePolicy::BreakEdges);
        let mut manager = DepManager::with_config(config);
        manager.add_module("x", recorder(&log, "x"), ["y"]);
        manager.add_module("y", recorder(&log, "y"), ["x"]);

        let report = manager.run().unwrap();
        assert_eq!(*log.lock(), ["x", "y"]);
        assert_eq!(report.forced, ["x"]);
    }

    #[test]
    fn test_placeholders_do_not_run() {
        let log = Log::default();
        let mut manager = DepManager::new();
        manager.add_module("b", recorder(&log, "b"), ["ghost"]);

        let report = manager.run().unwrap();
        assert_eq!(*log.lock(), ["b"]);
        assert_eq!(report.placeholders, ["ghost"]);
        assert_eq!(report.order(), ["b"]);
    }

    #[test]
    fn test_strict_missing_dependency_runs_nothing() {
        let log = Log::default();
        let config = ManagerConfig::default().with_missing_dependency(MissingDependencyPolicy::Strict);
        let mut manager = DepManager::with_config(config);
        manager.add_module("a", recorder(&log, "a"), NO_DEPS);
        manager.add_module("b", recorder(&log, "b"), ["ghost"]);

        assert!(matches!(manager.run(), Err(InitError::MissingDependency { .. })));
        assert!(log.lock().is_empty());
    }

    #[test]
    fn test_repeated_passes_rerun_actions() {
        let log = Log::default();
        let mut manager = DepManager::new();
        manager.add_module("a", recorder(&log, "a"), NO_DEPS);

        manager.run().unwrap();
        manager.run().unwrap();
        assert_eq!(*log.lock(), ["a", "a"]);
    }

    #[test]
    fn test_plan_does_not_run() {
        let log = Log::default();
        let mut manager = DepManager::new();
        manager.add_module("a", recorder(&log, "a"), NO_DEPS);
        manager.add_module("b", recorder(&log, "b"), ["a"]);

        let plan = manager.plan().unwrap();
        assert_eq!(plan.order, ["a", "b"]);
        assert!(log.lock().is_empty());
        assert!(manager.to_dot().contains("\"a\" -> \"b\""));
    }
}
