//! Descriptor-set mode
//!
//! Runs the same pipeline as plugin mode from a serialized
//! `FileDescriptorSet` (`protoc --include_imports --descriptor_set_out=...`)
//! and writes the generated files itself.

use crate::gpb::ProtocErl;
use crate::logging;
use anyhow::{Context, Result};
use clap::Args;
use gleam_pb_codegen::LoweredPackage;
use gleam_pb_codegen::pipeline::{self, GeneratedFile};
use gleam_pb_codegen::record::PackageRecord;
use gleam_pb_core::{GenError, GenResult, GeneratorConfig, Schema};
use prost::Message;
use prost_types::FileDescriptorSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, Default, Args)]
pub struct GenerateArgs {
    /// Serialized FileDescriptorSet containing the targets and their imports
    #[arg(short, long)]
    pub descriptor_set: PathBuf,

    /// Proto files to generate (default: every file in the set)
    pub files: Vec<String>,

    /// Output directory for generated Gleam and Erlang sources
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Path to gpb's protoc-erl
    #[arg(long)]
    pub protoc_erl: Option<PathBuf>,

    /// Replacement include for gpb.hrl in the generated codec module
    #[arg(long)]
    pub gpb_header_include: Option<String>,

    /// Import directory handed to protoc-erl (repeatable)
    #[arg(short = 'I', long = "include")]
    pub include_paths: Vec<PathBuf>,

    /// toml configuration file; flags override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print the lowered render records as JSON and stop
    #[arg(long)]
    pub dump_records: bool,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

/// Run the generate command
pub fn run(args: &GenerateArgs) -> Result<()> {
    let config = config(args)?;
    logging::init(logging::level(&config, args.verbose)?);

    let set = read_descriptor_set(&args.descriptor_set)?;
    let schema = Schema::new(&set.file, &targets(&set, &args.files))?;

    if args.dump_records {
        println!("{}", serde_json::to_string_pretty(&records(&schema)?)?);
        return Ok(());
    }

    config.validate()?;
    let mut codec = ProtocErl::from_config(&config)?;
    let output = config.output_path()?;
    let files = pipeline::compile(&schema, output, &mut codec)?.rooted_at(output);
    write_files(&files)?;

    info!(files = files.len(), "generated");
    Ok(())
}

/// The config file, if any, with the command-line flags applied on top
pub fn config(args: &GenerateArgs) -> GenResult<GeneratorConfig> {
    let mut config = match &args.config {
        Some(path) => GeneratorConfig::from_file(path)?,
        None => GeneratorConfig::default(),
    };

    if let Some(output) = &args.output {
        config.output_path = Some(output.clone());
    }
    if let Some(protoc_erl) = &args.protoc_erl {
        config.protoc_erl_path = protoc_erl.clone();
    }
    if let Some(include) = &args.gpb_header_include {
        config.gpb_header_include = Some(include.clone());
    }
    if !args.include_paths.is_empty() {
        config.include_paths = args.include_paths.clone();
    }

    Ok(config)
}

pub fn read_descriptor_set(path: &Path) -> Result<FileDescriptorSet> {
    let bytes = fs::read(path)
        .map_err(GenError::from)
        .with_context(|| format!("Failed to read descriptor set {}", path.display()))?;

    FileDescriptorSet::decode(bytes.as_slice())
        .map_err(GenError::from)
        .with_context(|| format!("Failed to decode descriptor set {}", path.display()))
}

/// Explicit file names, or every file of the set
pub fn targets(set: &FileDescriptorSet, files: &[String]) -> Vec<String> {
    if files.is_empty() {
        set.file.iter().map(|f| f.name().to_string()).collect()
    } else {
        files.to_vec()
    }
}

/// Lowered records of every target package, without running the codec
pub fn records(schema: &Schema) -> GenResult<Vec<PackageRecord>> {
    Ok(pipeline::lower(schema)?
        .iter()
        .map(LoweredPackage::to_record)
        .collect())
}

/// Write each file, creating parent directories as needed
pub fn write_files(files: &[GeneratedFile]) -> Result<()> {
    for file in files {
        if let Some(parent) = file.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        fs::write(&file.path, &file.content)
            .with_context(|| format!("Failed to write {}", file.path.display()))?;
        debug!(path = %file.path.display(), bytes = file.content.len(), "wrote file");
    }
    Ok(())
}
