//! Logging setup
//!
//! stdout carries the protoc plugin protocol, so every log line goes to
//! stderr. `RUST_LOG` wins over the configured level.

use gleam_pb_core::{GenResult, GeneratorConfig, LogLevel};
use tracing_subscriber::EnvFilter;

/// Effective level: the configured one, lowered to at least `debug` by
/// `--verbose`
pub fn level(config: &GeneratorConfig, verbose: bool) -> GenResult<LogLevel> {
    let configured = config.level()?;
    Ok(if verbose {
        configured.min(LogLevel::Debug)
    } else {
        configured
    })
}

/// Install the global subscriber; a second call is a no-op
pub fn init(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_directive()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
