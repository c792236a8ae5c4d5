//! Primitive classifier: scalar proto types to Gleam kinds.

use gleam_pb_core::{GenError, GenResult, ProtoType};
use serde::Serialize;

/// Semantic kind of a generated value.
///
/// Closed set. [`PrimitiveKind::Unknown`] is a sentinel for proto types with
/// no primitive mapping and never reaches generated code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PrimitiveKind {
    Int,
    Float,
    String,
    Bool,
    BitString,
    List,
    Map,
    Option,
    Unknown,
}

impl PrimitiveKind {
    /// Literal for the zero value of this kind
    pub fn default_literal(&self) -> Option<&'static str> {
        match self {
            PrimitiveKind::Int => Some("0"),
            PrimitiveKind::Float => Some("0.0"),
            PrimitiveKind::String => Some("\"\""),
            PrimitiveKind::Bool => Some("False"),
            PrimitiveKind::BitString => Some("<<>>"),
            PrimitiveKind::List | PrimitiveKind::Map => Some("[]"),
            PrimitiveKind::Option => Some("option.None"),
            PrimitiveKind::Unknown => None,
        }
    }

    /// Helper used by generated printers for a value of this kind
    pub fn show_function(&self) -> &'static str {
        match self {
            PrimitiveKind::Int => "primitive_show_int",
            PrimitiveKind::Float => "primitive_show_float",
            PrimitiveKind::String => "primitive_show_string",
            PrimitiveKind::Bool => "primitive_show_bool",
            PrimitiveKind::BitString => "primitive_show_bit_string",
            _ => "primitive_show_inspect",
        }
    }

    /// Gleam spelling of a scalar kind
    pub fn gleam_type(&self) -> Option<&'static str> {
        match self {
            PrimitiveKind::Int => Some("Int"),
            PrimitiveKind::Float => Some("Float"),
            PrimitiveKind::String => Some("String"),
            PrimitiveKind::Bool => Some("Bool"),
            PrimitiveKind::BitString => Some("BitString"),
            _ => None,
        }
    }
}

/// Result of classifying one scalar proto type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub kind: PrimitiveKind,
    pub default_literal: Option<&'static str>,
}

/// Classify a proto type. Total: unsupported types map to `Unknown`.
pub fn classify(ty: ProtoType) -> Classification {
    let kind = match ty {
        ProtoType::Double | ProtoType::Float => PrimitiveKind::Float,
        ProtoType::Int32
        | ProtoType::Int64
        | ProtoType::Uint32
        | ProtoType::Uint64
        | ProtoType::Sint32
        | ProtoType::Sint64
        | ProtoType::Fixed32
        | ProtoType::Fixed64
        | ProtoType::Sfixed32
        | ProtoType::Sfixed64 => PrimitiveKind::Int,
        ProtoType::String => PrimitiveKind::String,
        ProtoType::Bool => PrimitiveKind::Bool,
        ProtoType::Bytes => PrimitiveKind::BitString,
        ProtoType::Group | ProtoType::Message | ProtoType::Enum => PrimitiveKind::Unknown,
    };

    Classification {
        kind,
        default_literal: kind.default_literal(),
    }
}

/// Where a classified field lives, for error reporting
#[derive(Debug, Clone, Copy)]
pub struct FieldSite<'a> {
    pub entity: &'a str,
    pub field: &'a str,
    pub file: &'a str,
}

/// Classify a field's scalar type, rejecting anything outside the closed set
pub fn classify_field(ty: ProtoType, site: FieldSite<'_>) -> GenResult<PrimitiveKind> {
    match classify(ty).kind {
        PrimitiveKind::Unknown => Err(GenError::UnsupportedPrimitive {
            entity: site.entity.to_string(),
            field: site.field.to_string(),
            proto_type: ty.as_str_name().to_string(),
            file: site.file.to_string(),
        }),
        kind => Ok(kind),
    }
}
