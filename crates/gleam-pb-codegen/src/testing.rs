//! Shared helpers for unit tests

use crate::package::{LoweredPackage, lower_package};
use gleam_pb_core::Schema;
use gleam_pb_core::fixtures::FileBuilder;

/// Schema generating every file in `targets`, with `deps` only imported
pub fn schema_with_deps(targets: Vec<FileBuilder>, deps: Vec<FileBuilder>) -> Schema {
    let targets: Vec<_> = targets.into_iter().map(FileBuilder::build).collect();
    let names: Vec<String> = targets.iter().map(|f| f.name().to_string()).collect();

    let mut files: Vec<_> = deps.into_iter().map(FileBuilder::build).collect();
    files.extend(targets);

    Schema::new(&files, &names).unwrap()
}

pub fn schema(targets: Vec<FileBuilder>) -> Schema {
    schema_with_deps(targets, Vec::new())
}

/// Lower the first target package of `schema`
pub fn lower_first(schema: &Schema) -> LoweredPackage {
    let packages = schema.packages();
    lower_package(schema, &packages[0]).unwrap()
}
