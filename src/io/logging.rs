//! Diagnostic logging setup for the command-line driver

use crate::io::error::{Result, computation_error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter directive for a `-v` count
///
/// `RUST_LOG`, when set, replaces this entirely.
pub const fn verbosity_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "tilestitch=warn",
        1 => "tilestitch=info",
        _ => "tilestitch=debug",
    }
}

/// Install the global subscriber, writing to stderr
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed
pub fn init_logging(verbose: u8) -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| verbosity_directive(verbose).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|error| computation_error("logging setup", &error))
}
