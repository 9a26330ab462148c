//! Sample program: registers four dependent modules and initializes them.
//
//   a
//   b -> a
//   c -> a, b
//   d -> a, b, c

mod args;
mod logging;

use anyhow::Context;
use clap::Parser;
use depinit::{DepManager, ManagerConfig};

use crate::args::{Args, Command};

fn add_module(manager: &mut DepManager, name: &str, dependencies: &[&str]) {
    let module = name.to_string();
    manager.add_module(
        name,
        move || {
            println!("init {}", module);
            Ok(())
        },
        dependencies.iter().copied(),
    );
}

fn build_manager(config: ManagerConfig) -> DepManager {
    let mut manager = DepManager::with_config(config);

    add_module(&mut manager, "a", &[]);
    add_module(&mut manager, "b", &["a"]);
    add_module(&mut manager, "c", &["a", "b"]);
    add_module(&mut manager, "d", &["a", "b", "c"]);

    manager
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let config = match &args.config {
        Some(path) => ManagerConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ManagerConfig::default(),
    };
    tracing::debug!("Manager config: {:?}", config);

    let manager = build_manager(config);

    match args.mode() {
        Command::Run => {
            manager.run()?;
        }
        Command::Plan => {
            let plan = manager.plan()?;
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        Command::Dot => print!("{}", manager.to_dot()),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_plan() {
        let manager = build_manager(ManagerConfig::default());
        let plan = manager.plan().unwrap();
        assert_eq!(plan.order, ["a", "b", "c", "d"]);
        assert_eq!(plan.layers.len(), 4);
    }

    #[test]
    fn test_sample_runs() {
        let manager = build_manager(ManagerConfig::default());
        let report = manager.run().unwrap();
        assert_eq!(report.order(), ["a", "b", "c", "d"]);
    }
}
