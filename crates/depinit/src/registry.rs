//! Module registry
//!
//! Bookkeeping for registered modules: name, initialization action and
//! declared dependencies. Holds no ordering logic.

use std::collections::HashMap;
use std::fmt;

use crate::error::ActionError;

/// Type alias for module initialization actions
pub type ModuleAction = Box<dyn Fn() -> Result<(), ActionError> + Send + Sync>;

/// A registered module
pub struct Module {
    name: String,
    action: ModuleAction,
    dependencies: Vec<String>,
}

impl Module {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Modules that must complete before this one
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    /// Run the module's initialization action
    pub fn init(&self) -> Result<(), ActionError> {
        (self.action)()
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}

/// Registered modules, kept in registration order
#[derive(Default)]
pub struct ModuleRegistry {
    modules: Vec<Module>,
    index: HashMap<String, usize>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module.
    ///
    /// The first registration of a name wins: registering a name that is
    /// already taken leaves the existing module untouched and returns `false`.
    /// Dependency names are not checked here; they may refer to modules that
    /// are registered later.
    pub fn register<F, I, S>(&mut self, name: impl Into<String>, action: F, dependencies: I) -> bool
    where
        F: Fn() -> Result<(), ActionError> + Send + Sync + 'static,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();

        if self.index.contains_key(&name) {
            tracing::debug!("Module already registered, ignoring: {}", name);
            return false;
        }

        self.index.insert(name.clone(), self.modules.len());
        self.modules.push(Module {
            name,
            action: Box::new(action),
            dependencies: dependencies.into_iter().map(Into::into).collect(),
        });
        true
    }

    pub fn get(&self, name: &str) -> Option<&Module> {
        self.index.get(name).map(|&i| &self.modules[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Position of `name` in registration order
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn dependencies(&self, name: &str) -> Option<&[String]> {
        self.get(name).map(Module::dependencies)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(Module::name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Module> {
        self.modules.iter()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub(crate) fn module_at(&self, index: usize) -> &Module {
        &self.modules[index]
    }
}

impl fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.modules.iter()).finish()
    }
}

impl<'a> IntoIterator for &'a ModuleRegistry {
    type Item = &'a Module;
    type IntoIter = std::slice::Iter<'a, Module>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
