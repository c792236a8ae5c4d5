//! Compile pipeline.
//!
//! A compilation runs in three phases:
//!
//! 1. **Lowering**: every target package is lowered to a [`LoweredPackage`].
//!    Any error stops the run before the codec generator is touched.
//! 2. **Codec generation**: the [`CodecGenerator`] is invoked exactly once
//!    with every target file outside `google.protobuf`.
//! 3. **Emission**: the support module and one module per package are
//!    rendered. This phase cannot fail.
//!
//! Nothing is written to disk here; callers persist the returned
//! [`Emitted`] files once [`compile`] has succeeded. The support module is
//! placed under `output_path`, where `protoc-erl` also writes. Package
//! modules are relative so that plugin mode can hand them to protoc.

use crate::package::{LoweredPackage, lower_package};
use crate::record::PackageRecord;
use crate::render::render_package;
use crate::support::{SUPPORT_MODULE, SUPPORT_MODULE_NAME};
use gleam_pb_core::{GenError, GenResult, Schema};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Proto package whose files are never handed to the codec generator
pub const WELL_KNOWN_PACKAGE: &str = "google.protobuf";

/// The external codec generator (`protoc-erl` in production)
pub trait CodecGenerator {
    /// Generate the codec module for `files`, paths as protoc names them
    fn generate(&mut self, files: &[String]) -> GenResult<()>;
}

/// One output file, path relative to wherever the caller writes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub content: String,
}

/// Lower every target package.
///
/// Fails on the first entity that cannot be lowered, or when two packages
/// would be emitted to the same module path.
pub fn lower(schema: &Schema) -> GenResult<Vec<LoweredPackage>> {
    let mut lowered = Vec::new();
    let mut paths: HashMap<String, String> = HashMap::new();

    for package in schema.packages() {
        info!(package = %package.name(), files = package.files().len(), "lowering package");
        let result = lower_package(schema, &package)?;

        if let Some(first) = paths.insert(result.module_path.clone(), result.package.clone()) {
            return Err(GenError::collision(
                "output directory",
                format!("{}.gleam", result.module_path),
                format!("package `{first}`"),
                format!("package `{}`", result.package),
            ));
        }

        debug!(
            package = %result.package,
            types = result.types.len(),
            imports = result.imports.len(),
            "package lowered"
        );
        lowered.push(result);
    }

    Ok(lowered)
}

/// Target files the codec generator must compile
pub fn codec_inputs(schema: &Schema) -> Vec<String> {
    schema
        .target_files()
        .filter(|f| f.package != WELL_KNOWN_PACKAGE)
        .map(|f| f.name.clone())
        .collect()
}

/// Files produced by one compilation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Emitted {
    /// `gleam_pb.gleam`, already under `output_path` next to the codec module
    pub support: GeneratedFile,

    /// One module per package, path relative to the caller's output root
    pub modules: Vec<GeneratedFile>,
}

impl Emitted {
    /// Every file, with the package modules placed under `root`
    pub fn rooted_at(self, root: &Path) -> Vec<GeneratedFile> {
        let mut files = Vec::with_capacity(self.modules.len() + 1);
        files.push(self.support);
        files.extend(self.modules.into_iter().map(|m| GeneratedFile {
            path: root.join(m.path),
            content: m.content,
        }));
        files
    }
}

/// Render the support module under `output` and every package module
pub fn emit(records: &[PackageRecord], output: &Path) -> Emitted {
    let support = GeneratedFile {
        path: output.join(format!("{SUPPORT_MODULE_NAME}.gleam")),
        content: SUPPORT_MODULE.to_string(),
    };

    let modules = records
        .iter()
        .map(|record| GeneratedFile {
            path: PathBuf::from(format!("{}.gleam", record.module_path)),
            content: render_package(record),
        })
        .collect();

    Emitted { support, modules }
}

/// Run all three phases
pub fn compile(
    schema: &Schema,
    output: &Path,
    codec: &mut dyn CodecGenerator,
) -> GenResult<Emitted> {
    let lowered = lower(schema)?;

    let inputs = codec_inputs(schema);
    info!(files = inputs.len(), "running codec generator");
    codec.generate(&inputs)?;

    let records: Vec<PackageRecord> = lowered.iter().map(LoweredPackage::to_record).collect();
    let emitted = emit(&records, output);
    info!(modules = emitted.modules.len(), "compilation finished");

    Ok(emitted)
}
