//! gleam-pb-core - Schema model, configuration, and errors
//!
//! This crate holds what every stage of the generator shares:
//! - [`Schema`] and friends, the model built from protobuf descriptors
//! - [`GeneratorConfig`] for the plugin parameters
//! - [`GenError`] for error handling

mod config;
mod error;
pub mod schema;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

pub use config::GeneratorConfig;
pub use error::{GenError, GenResult};
pub use schema::{
    Cardinality, Enum, EnumValue, Field, FieldKind, Message, OneOf, Package, ProtoType, Schema,
    SchemaFile,
};

/// Log levels accepted by the `log_level` parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = GenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "off" => Ok(LogLevel::Off),
            other => Err(GenError::InvalidConfiguration(format!(
                "unknown log level `{other}`"
            ))),
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "TRACE"),
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
            LogLevel::Off => write!(f, "OFF"),
        }
    }
}
