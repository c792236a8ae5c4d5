//! protoc plugin mode
//!
//! protoc writes a `CodeGeneratorRequest` to stdin and expects a
//! `CodeGeneratorResponse` on stdout. Failures are reported both in the
//! response's `error` field and through the exit status.
//!
//! Package modules are returned to protoc and land relative to its output
//! directory. `gleam_pb.gleam` is written straight to `output_path`, beside
//! the codec module `protoc-erl` writes there.

use crate::gpb::ProtocErl;
use crate::logging;
use anyhow::{Context, Result};
use gleam_pb_codegen::pipeline::{self, CodecGenerator, Emitted, GeneratedFile};
use gleam_pb_core::{GenError, GenResult, GeneratorConfig, Schema};
use prost::Message;
use prost_types::compiler::code_generator_response::{Feature, File};
use prost_types::compiler::{CodeGeneratorRequest, CodeGeneratorResponse};
use std::fs;
use std::io::{self, Read, Write};
use tracing::{debug, info};

/// Run one plugin invocation over stdin/stdout
pub fn run() -> Result<()> {
    let mut input = Vec::new();
    io::stdin()
        .read_to_end(&mut input)
        .context("Failed to read CodeGeneratorRequest from stdin")?;

    let result = CodeGeneratorRequest::decode(input.as_slice())
        .map_err(GenError::from)
        .and_then(|request| process(&request));

    let encoded = response(&result).encode_to_vec();
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(&encoded)
        .and_then(|()| stdout.flush())
        .context("Failed to write CodeGeneratorResponse to stdout")?;

    result?;
    Ok(())
}

fn process(request: &CodeGeneratorRequest) -> GenResult<Vec<GeneratedFile>> {
    let config = GeneratorConfig::from_parameter(request.parameter())?;
    logging::init(logging::level(&config, false)?);
    config.validate()?;

    info!(
        files = request.file_to_generate.len(),
        output = %config.output_path()?.display(),
        "plugin request received"
    );

    let mut codec = ProtocErl::from_config(&config)?;
    let emitted = generate(request, &config, &mut codec)?;
    write_support(&emitted.support)?;
    Ok(emitted.modules)
}

/// Compile the request's target files
pub fn generate(
    request: &CodeGeneratorRequest,
    config: &GeneratorConfig,
    codec: &mut dyn CodecGenerator,
) -> GenResult<Emitted> {
    let schema = Schema::new(&request.proto_file, &request.file_to_generate)?;
    pipeline::compile(&schema, config.output_path()?, codec)
}

/// Write the support module relative to the working directory
pub fn write_support(file: &GeneratedFile) -> GenResult<()> {
    if let Some(parent) = file.path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file.path, &file.content)?;
    debug!(path = %file.path.display(), "wrote support module");
    Ok(())
}

/// The response protoc receives for `result`
///
/// On failure no files are returned, only the error text.
pub fn response(result: &GenResult<Vec<GeneratedFile>>) -> CodeGeneratorResponse {
    let supported_features = Some(Feature::Proto3Optional as u64);

    match result {
        Ok(files) => CodeGeneratorResponse {
            file: files
                .iter()
                .map(|f| File {
                    name: Some(f.path.to_string_lossy().into_owned()),
                    content: Some(f.content.clone()),
                    ..Default::default()
                })
                .collect(),
            supported_features,
            ..Default::default()
        },
        Err(err) => CodeGeneratorResponse {
            error: Some(err.to_string()),
            supported_features,
            ..Default::default()
        },
    }
}
