//! # Initialization Dependency Graph
//!
//! Builds the per-pass dependency graph from a [`ModuleRegistry`] and orders
//! it with **Kahn's algorithm**:
//!
//! 1. Every module starts with a pending count equal to the length of its
//!    dependency list.
//! 2. The inverse edges (dependency → dependents) are indexed so finishing a
//!    module can release everything waiting on it.
//! 3. Modules with nothing pending seed a FIFO ready queue.
//! 4. Popping a module releases its dependents; any that reach zero are queued.
//!
//! Modules still pending when the queue drains sit on, or behind, a cycle.
//! What happens to them is decided by the [`CyclePolicy`].
//!
//! The graph is rebuilt for every pass and never touches the registry.

use std::collections::{HashMap, VecDeque};

use serde::Serialize;

use crate::config::{CyclePolicy, ManagerConfig, MissingDependencyPolicy};
use crate::error::InitError;
use crate::registry::ModuleRegistry;

/// Ordered outcome of scheduling a registry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InitPlan {
    /// Modules in the order their actions will run. Placeholders are listed
    /// where they are reached but have no action.
    pub order: Vec<String>,
    /// Readiness waves: every module in a wave only depends on earlier waves
    /// (or on edges a cycle policy chose to ignore)
    pub layers: Vec<Vec<String>>,
    /// Modules left out by [`CyclePolicy::Skip`]
    pub skipped: Vec<String>,
    /// Modules made ready by [`CyclePolicy::BreakEdges`] with unmet dependencies
    pub forced: Vec<String>,
    /// Dependency names that are not registered and were treated as satisfied
    pub placeholders: Vec<String>,
}

impl InitPlan {
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.order.iter().position(|n| n == name)
    }
}

/// A scheduled step. `module` is `None` for placeholder nodes.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Step {
    pub module: Option<usize>,
    pub node: usize,
}

/// Graph plus the order computed from it
pub(crate) struct Schedule {
    pub steps: Vec<Step>,
    pub plan: InitPlan,
}

/// Per-pass dependency graph over node indices.
///
/// Nodes `0..registered` mirror the registry; any further nodes are
/// placeholders for unregistered dependency names.
pub struct DependencyGraph<'r> {
    registry: &'r ModuleRegistry,
    names: Vec<&'r str>,
    registered: usize,
    /// Inverse edges: node -> nodes that depend on it (one entry per edge)
    dependents: Vec<Vec<usize>>,
    /// Forward edges: node -> nodes it depends on
    dependencies: Vec<Vec<usize>>,
}

impl<'r> DependencyGraph<'r> {
    /// Build the graph for one pass.
    ///
    /// Under [`MissingDependencyPolicy::Strict`] an unregistered dependency name
    /// is an error; otherwise it becomes a placeholder node with no action.
    pub fn build(registry: &'r ModuleRegistry, missing: MissingDependencyPolicy) -> Result<Self, InitError> {
        if missing == MissingDependencyPolicy::Strict {
            for module in registry {
                if let Some(dep) = module.dependencies().iter().find(|dep| !registry.contains(dep)) {
                    return Err(InitError::MissingDependency {
                        module: module.name().to_string(),
                        dependency: dep.clone(),
                    });
                }
            }
        }

        Ok(Self::with_placeholders(registry))
    }

    /// Build the graph, turning every unregistered dependency name into a
    /// placeholder node.
    pub fn with_placeholders(registry: &'r ModuleRegistry) -> Self {
        let registered = registry.len();
        let mut names: Vec<&'r str> = registry.names().collect();
        let mut placeholder_index: HashMap<&'r str, usize> = HashMap::new();
        let mut dependents = vec![Vec::new(); registered];
        let mut dependencies = vec![Vec::new(); registered];

        for (node, module) in registry.iter().enumerate() {
            for dep in module.dependencies() {
                let dep_node = match registry.position(dep) {
                    Some(i) => i,
                    None => *placeholder_index.entry(dep.as_str()).or_insert_with(|| {
                        names.push(dep.as_str());
                        dependents.push(Vec::new());
                        dependencies.push(Vec::new());
                        names.len() - 1
                    }),
                };

                dependents[dep_node].push(node);
                dependencies[node].push(dep_node);
            }
        }

        Self {
            registry,
            names,
            registered,
            dependents,
            dependencies,
        }
    }

    pub fn node_count(&self) -> usize {
        self.names.len()
    }

    pub fn name(&self, node: usize) -> &'r str {
        self.names[node]
    }

    pub fn is_placeholder(&self, node: usize) -> bool {
        node >= self.registered
    }

    /// Unregistered dependency names referenced by some module
    pub fn placeholders(&self) -> impl Iterator<Item = &'r str> + '_ {
        self.names[self.registered..].iter().copied()
    }

    /// Nodes waiting on `node`
    pub fn dependents(&self, node: usize) -> &[usize] {
        &self.dependents[node]
    }

    /// Compute the initialization order without running anything.
    pub(crate) fn schedule(&self, policy: CyclePolicy) -> Result<Schedule, InitError> {
        let count = self.node_count();
        let mut pending: Vec<usize> = self.dependencies.iter().map(Vec::len).collect();
        let mut queued = vec![false; count];
        let mut done = vec![false; count];
        let mut level = vec![0usize; count];

        // Roots: registered modules first, then placeholders
        let mut queue: VecDeque<usize> = (0..count).filter(|&node| pending[node] == 0).collect();
        for &node in &queue {
            queued[node] = true;
        }

        let mut steps = Vec::with_capacity(count);
        let mut forced = Vec::new();

        loop {
            while let Some(node) = queue.pop_front() {
                done[node] = true;
                steps.push(Step {
                    module: (!self.is_placeholder(node)).then_some(node),
                    node,
                });

                for &dependent in &self.dependents[node] {
                    if queued[dependent] {
                        continue;
                    }
                    level[dependent] = level[dependent].max(level[node] + 1);
                    pending[dependent] -= 1;
                    if pending[dependent] == 0 {
                        queued[dependent] = true;
                        queue.push_back(dependent);
                    }
                }
            }

            if steps.len() == count {
                break;
            }

            match policy {
                CyclePolicy::Reject => return Err(self.cycle_error(&done)),
                CyclePolicy::Skip => break,
                CyclePolicy::BreakEdges => {
                    // Only cycle members are forced; modules behind the cycle
                    // are released once it breaks. Fewest unmet dependencies
                    // first, registration order on ties.
                    let Some(node) = self
                        .find_cycle(&done)
                        .into_iter()
                        .min_by_key(|&node| (pending[node], node))
                    else {
                        break;
                    };

                    let ignored: Vec<&str> = self.dependencies[node]
                        .iter()
                        .filter(|&&dep| !done[dep])
                        .map(|&dep| self.name(dep))
                        .collect();
                    tracing::warn!(
                        "Breaking dependency cycle: initializing {} before {:?}",
                        self.name(node),
                        ignored
                    );

                    level[node] = self.dependencies[node]
                        .iter()
                        .filter(|&&dep| done[dep])
                        .map(|&dep| level[dep] + 1)
                        .max()
                        .unwrap_or(0);
                    pending[node] = 0;
                    queued[node] = true;
                    queue.push_back(node);
                    forced.push(self.name(node).to_string());
                }
            }
        }

        let skipped: Vec<String> = (0..count)
            .filter(|&node| !done[node])
            .map(|node| self.name(node).to_string())
            .collect();
        if !skipped.is_empty() {
            tracing::warn!("Skipping modules blocked by a dependency cycle: {:?}", skipped);
        }

        let mut layers: Vec<Vec<String>> = Vec::new();
        for step in &steps {
            let depth = level[step.node];
            if layers.len() <= depth {
                layers.resize_with(depth + 1, Vec::new);
            }
            layers[depth].push(self.name(step.node).to_string());
        }

        let plan = InitPlan {
            order: steps.iter().map(|step| self.name(step.node).to_string()).collect(),
            layers,
            skipped,
            forced,
            placeholders: self.placeholders().map(str::to_string).collect(),
        };

        Ok(Schedule { steps, plan })
    }

    /// Nodes of one cycle among the modules left pending after the queue
    /// drained, each followed by one of its dependencies.
    ///
    /// Every such module has a dependency that never finished, so following
    /// unfinished dependencies from any of them must eventually revisit a node.
    fn find_cycle(&self, done: &[bool]) -> Vec<usize> {
        let mut path: Vec<usize> = Vec::new();
        let mut seen: HashMap<usize, usize> = HashMap::new();
        let mut current = (0..self.node_count()).find(|&node| !done[node]);

        while let Some(node) = current {
            if let Some(&start) = seen.get(&node) {
                return path.split_off(start);
            }

            seen.insert(node, path.len());
            path.push(node);
            current = self.dependencies[node].iter().copied().find(|&dep| !done[dep]);
        }

        // Unreachable for a consistent graph; fall back to the first stuck module
        path.truncate(1);
        path
    }

    /// Build the error for modules left pending after the queue drained.
    fn cycle_error(&self, done: &[bool]) -> InitError {
        let cycle: Vec<String> = self
            .find_cycle(done)
            .into_iter()
            .map(|n| self.name(n).to_string())
            .collect();
        tracing::error!("Dependency cycle detected: {:?}", cycle);

        let module_a = cycle.first().cloned().unwrap_or_default();
        let module_b = cycle.get(1).cloned().unwrap_or_else(|| module_a.clone());
        InitError::CyclicDependency {
            module_a,
            module_b,
            cycle,
        }
    }

    /// Visualize the graph as DOT, edges pointing from dependency to dependent.
    /// Placeholder nodes are drawn dashed.
    pub fn to_dot(&self) -> String {
        let mut dot = String::from("digraph InitGraph {\n");
        dot.push_str("  rankdir=LR;\n");
        dot.push_str("  node [shape=box];\n\n");

        for node in 0..self.node_count() {
            let name = escape_dot(self.name(node));
            if self.is_placeholder(node) {
                dot.push_str(&format!("  \"{}\" [style=dashed];\n", name));
            } else {
                dot.push_str(&format!("  \"{}\";\n", name));
            }
        }

        for module in self.registry.iter() {
            for dep in module.dependencies() {
                dot.push_str(&format!(
                    "  \"{}\" -> \"{}\";\n",
                    escape_dot(dep),
                    escape_dot(module.name())
                ));
            }
        }

        dot.push_str("}\n");
        dot
    }
}

/// Quote-safe DOT identifier text
fn escape_dot(name: &str) -> String {
    name.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Plan a registry under `config` without running any action.
pub fn plan(registry: &ModuleRegistry, config: &ManagerConfig) -> Result<InitPlan, InitError> {
    let graph = DependencyGraph::build(registry, config.missing_dependency)?;
    Ok(graph.schedule(config.cycle_policy)?.plan)
}
