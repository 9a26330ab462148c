//! Logging setup for the demo
//
// Console logging to stderr so stdout only carries program output.
// RUST_LOG overrides the default filter.

use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Default filter when RUST_LOG is unset
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}

/// Install the global tracing subscriber.
///
/// - `verbose`: log every module as it starts and finishes.
pub fn init(verbose: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(verbose);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .init();
}
