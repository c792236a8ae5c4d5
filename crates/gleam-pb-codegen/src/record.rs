//! Render records.
//!
//! The flattened, string-only form of a lowered package. The renderer reads
//! nothing else, and `--dump-records` serializes exactly these structs.

use serde::Serialize;

/// Everything needed to render one package's Gleam module
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageRecord {
    /// Proto package name
    pub package: String,

    /// Lower snake package name shown by printers
    pub label: String,

    /// Module path relative to the output directory, without extension
    pub module_path: String,
    pub imports: Vec<String>,
    pub types: Vec<TypeRecord>,
    pub printers: Vec<PrinterRecord>,
    pub enum_printers: Vec<EnumPrinterRecord>,
    pub generators: Vec<GeneratorRecord>,
    pub bridges: Vec<BridgeRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeRecord {
    pub name: String,

    /// Rendered constructors, e.g. `Item(name: String, tags: List(String))`
    pub constructors: Vec<String>,
}

/// `show_<stem>` of a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrinterRecord {
    pub stem: String,
    pub type_name: String,

    /// First fragment: `<package>.<TypeName>`
    pub label: String,

    /// One show call per field, in slot order
    pub fields: Vec<String>,
}

/// `show_<stem>` of an enum
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumPrinterRecord {
    pub stem: String,
    pub type_name: String,

    /// Constructor → literal shown for it
    pub arms: Vec<(String, String)>,
}

/// `default_<stem>()` of a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratorRecord {
    pub stem: String,
    pub type_name: String,
    pub args: Vec<String>,
}

/// Codec wrappers of a top-level message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodecRecord {
    pub symbol: String,
    pub decode_external: String,
}

/// Bridge functions of one entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BridgeRecord {
    Enum {
        entity: String,
        stem: String,
        type_name: String,
        extract_arms: Vec<String>,
        symbol_bindings: Vec<String>,
        reconstruct_arms: Vec<String>,
    },
    OneOf {
        entity: String,
        stem: String,
        type_name: String,
        dispatch: String,
        extract_arms: Vec<String>,
        tag_bindings: Vec<String>,
        dispatch_arms: Vec<String>,

        /// The unverified-shape arm, always last
        fallback_arm: String,
    },
    Message {
        entity: String,
        stem: String,
        type_name: String,
        extract_fields: Vec<String>,
        external_tuple: String,
        bindings: Vec<String>,
        reconstruct_args: Vec<String>,
        codec: Option<CodecRecord>,
    },
}
