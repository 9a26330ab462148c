//! Command-line arguments for the demo

use std::path::PathBuf;

use clap::Parser;

/// What the program should do once modules are registered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Run one initialization pass
    Run,
    /// Print the planned order as JSON
    Plan,
    /// Print the dependency graph in DOT format
    Dot,
}

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "depinit_demo")]
#[command(about = "Initialize four sample modules in dependency order", long_about = None)]
pub struct Args {
    /// Log every module as it starts and finishes
    #[arg(short, long)]
    pub verbose: bool,

    /// TOML file with the manager's cycle and missing-dependency policies
    #[arg(long, value_name = "PATH", env = "DEPINIT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print the planned order as JSON instead of running
    #[arg(long, conflicts_with = "dot")]
    pub plan: bool,

    /// Print the dependency graph in DOT format instead of running
    #[arg(long)]
    pub dot: bool,
}

impl Args {
    pub fn mode(&self) -> Command {
        if self.plan {
            Command::Plan
        } else if self.dot {
            Command::Dot
        } else {
            Command::Run
        }
    }
}
