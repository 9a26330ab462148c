//! # depinit
//!
//! Dependency-ordered initialization for in-process modules.
//!
//! Modules are registered by name together with an initialization action and
//! the names of the modules they depend on. A pass then runs every action
//! exactly once, dependencies always before dependents, and stops at the
//! first failure.
//!
//! ## Usage
//!
//! ```rust
//! use depinit::{DepManager, InitError};
//!
//! let mut manager = DepManager::new();
//! manager.add_module("logging", || Ok(()), Vec::<&str>::new());
//! manager.add_module("storage", || Ok(()), ["logging"]);
//! manager.add_module("network", || Ok(()), ["logging", "storage"]);
//!
//! let report = manager.run()?;
//! assert_eq!(report.order(), ["logging", "storage", "network"]);
//! # Ok::<(), InitError>(())
//! ```
//!
//! Cycles are rejected by default. [`ManagerConfig`] selects a different
//! [`CyclePolicy`] and decides whether unregistered dependency names are an
//! error ([`MissingDependencyPolicy`]).

pub mod config;
pub mod error;
pub mod graph;
pub mod manager;
pub mod registry;

pub use config::{CyclePolicy, ManagerConfig, MissingDependencyPolicy};
pub use error::{ActionError, ConfigError, InitError};
pub use graph::{DependencyGraph, InitPlan};
pub use manager::{DepManager, InitReport, ModuleTiming};
pub use registry::{Module, ModuleAction, ModuleRegistry};
