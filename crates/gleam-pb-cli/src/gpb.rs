//! gpb codec generation through `protoc-erl`
//!
//! Produces `gleam_gpb.erl` and `gleam_gpb.hrl` in the output directory. The
//! generated Gleam modules call into `gleam_gpb` for the wire format.

use gleam_pb_codegen::pipeline::CodecGenerator;
use gleam_pb_codegen::support::CODEC_MODULE_NAME;
use gleam_pb_core::{GenError, GenResult, GeneratorConfig};
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tracing::{debug, info, warn};

/// Include line gpb writes into the generated codec module
const GPB_HEADER_INCLUDE: &str = "-include(\"gpb.hrl\").";

/// Runs `protoc-erl` once per compilation
#[derive(Debug, Clone)]
pub struct ProtocErl {
    executable: PathBuf,
    output: PathBuf,
    include_paths: Vec<PathBuf>,
    header_include: Option<String>,
}

impl ProtocErl {
    pub fn from_config(config: &GeneratorConfig) -> GenResult<Self> {
        Ok(Self {
            executable: config.protoc_erl_path.clone(),
            output: config.output_path()?.to_path_buf(),
            include_paths: config.include_paths.clone(),
            header_include: config.gpb_header_include.clone(),
        })
    }

    /// Path of the generated Erlang module
    pub fn erl_path(&self) -> PathBuf {
        self.output.join(format!("{CODEC_MODULE_NAME}.erl"))
    }

    /// The `protoc-erl` invocation for `files`
    pub fn command(&self, files: &[String]) -> Command {
        let mut cmd = Command::new(&self.executable);
        cmd.args(["-pkgs", "-strbin", "-modname", CODEC_MODULE_NAME])
            .arg("-o-erl")
            .arg(&self.output)
            .arg("-o-hrl")
            .arg(&self.output);
        for include in &self.include_paths {
            cmd.arg("-I").arg(include);
        }
        cmd.args(files);
        cmd
    }

    /// Point the codec module's `gpb.hrl` include at `include`
    pub fn update_include(&self, include: &str) -> GenResult<()> {
        let path = self.erl_path();
        let source = fs::read_to_string(&path).map_err(|e| {
            GenError::CodecGenerator(format!("cannot read {}: {e}", path.display()))
        })?;

        let replacement = format!("-include(\"{include}\").");
        match rewrite_include(&source, &replacement) {
            Some(rewritten) => {
                fs::write(&path, rewritten)?;
                debug!(path = %path.display(), include, "rewrote gpb header include");
            }
            None => warn!(
                path = %path.display(),
                include,
                "no `{GPB_HEADER_INCLUDE}` line in codec module, header include left unchanged"
            ),
        }
        Ok(())
    }
}

/// `None` when `source` has no gpb header include
fn rewrite_include(source: &str, replacement: &str) -> Option<String> {
    source
        .contains(GPB_HEADER_INCLUDE)
        .then(|| source.replace(GPB_HEADER_INCLUDE, replacement))
}

impl CodecGenerator for ProtocErl {
    fn generate(&mut self, files: &[String]) -> GenResult<()> {
        if files.is_empty() {
            debug!("no proto files for protoc-erl");
            return Ok(());
        }

        fs::create_dir_all(&self.output)?;

        info!(executable = %self.executable.display(), files = files.len(), "running protoc-erl");
        let output = self.command(files).output().map_err(|e| {
            GenError::CodecGenerator(format!(
                "cannot run {}: {e}",
                self.executable.display()
            ))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = match stderr.trim_end() {
                "" => format!("{} exited with {}", self.executable.display(), output.status),
                text => text.to_string(),
            };
            return Err(GenError::CodecGenerator(message));
        }

        if let Some(include) = &self.header_include {
            self.update_include(include)?;
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "gpb/gpb_tests.rs"]
mod gpb_tests;
