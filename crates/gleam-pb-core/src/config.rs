//! Generator configuration
//!
//! Configuration arrives either as the protoc plugin parameter string
//! (`--gleam_out=output_path=src,gpb_header_include=gpb.hrl:.`) or from a toml
//! file named by the `config` parameter. Explicit parameters win over the file.

use crate::LogLevel;
use crate::error::{GenError, GenResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for one compilation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Directory that receives the generated Gleam and Erlang sources
    #[serde(default)]
    pub output_path: Option<PathBuf>,

    /// Path to gpb's `protoc-erl` executable
    #[serde(default = "default_protoc_erl_path")]
    pub protoc_erl_path: PathBuf,

    /// Replacement for the `gpb.hrl` include line of the generated codec module
    #[serde(default)]
    pub gpb_header_include: Option<String>,

    /// Extra import directories handed to `protoc-erl`
    #[serde(default)]
    pub include_paths: Vec<PathBuf>,

    /// Initial log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_protoc_erl_path() -> PathBuf {
    PathBuf::from("./deps/gpb/bin/protoc-erl")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            output_path: None,
            protoc_erl_path: default_protoc_erl_path(),
            gpb_header_include: None,
            include_paths: Vec::new(),
            log_level: default_log_level(),
        }
    }
}

impl GeneratorConfig {
    /// Create a configuration with all defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration from toml text
    pub fn from_toml(content: &str) -> GenResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a toml file
    pub fn from_file(path: impl AsRef<Path>) -> GenResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            GenError::InvalidConfiguration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parse the protoc plugin parameter string
    ///
    /// The string is a comma-separated list of `key=value` pairs. The `config`
    /// key loads a toml file first; every other pair is applied on top of it
    /// in order of appearance.
    pub fn from_parameter(parameter: &str) -> GenResult<Self> {
        let pairs = parse_pairs(parameter)?;

        let mut config = match pairs.iter().find(|(key, _)| *key == "config") {
            Some((_, path)) => Self::from_file(path)?,
            None => Self::default(),
        };

        for (key, value) in pairs {
            config.apply(key, value)?;
        }

        Ok(config)
    }

    /// Apply a single `key=value` setting
    pub fn apply(&mut self, key: &str, value: &str) -> GenResult<()> {
        match key {
            "config" => {}
            "output_path" => self.output_path = non_empty(value).map(PathBuf::from),
            "protoc_erl_path" => self.protoc_erl_path = PathBuf::from(value),
            "gpb_header_include" => self.gpb_header_include = non_empty(value).map(String::from),
            "include_paths" => {
                self.include_paths = value
                    .split(':')
                    .filter(|p| !p.is_empty())
                    .map(PathBuf::from)
                    .collect();
            }
            "log_level" => self.log_level = value.to_string(),
            other => {
                return Err(GenError::InvalidConfiguration(format!(
                    "unknown parameter `{other}`"
                )));
            }
        }
        Ok(())
    }

    /// The output directory, or a missing-configuration error
    pub fn output_path(&self) -> GenResult<&Path> {
        self.output_path
            .as_deref()
            .ok_or_else(|| GenError::MissingConfiguration("output_path".into()))
    }

    /// Check everything that must hold before any processing starts
    pub fn validate(&self) -> GenResult<()> {
        self.output_path()?;

        if self.protoc_erl_path.as_os_str().is_empty() {
            return Err(GenError::InvalidConfiguration(
                "protoc_erl_path cannot be empty".into(),
            ));
        }

        self.level()?;

        Ok(())
    }

    /// The parsed `log_level`
    pub fn level(&self) -> GenResult<LogLevel> {
        self.log_level.parse()
    }
}

fn parse_pairs(parameter: &str) -> GenResult<Vec<(&str, &str)>> {
    parameter
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.split_once('=')
                .map(|(k, v)| (k.trim(), v.trim()))
                .ok_or_else(|| {
                    GenError::InvalidConfiguration(format!("expected key=value, got `{part}`"))
                })
        })
        .collect()
}

fn non_empty(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}
