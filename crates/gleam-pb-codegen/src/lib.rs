//! gleam-pb-codegen - Gleam code generation from protobuf schemas
//!
//! Lowers a [`gleam_pb_core::Schema`] into one Gleam module per proto package.
//! Each module holds the algebraic types of the package's messages, enums and
//! oneofs, plus the functions that move values between those types and the
//! tuple/atom terms of the gpb Erlang codec.
//!
//! # Architecture
//!
//! ```text
//! Schema
//!    ↓
//!  [PackageBuilder] per package
//!    ├─→ [typedef]  TypeDef        (types, slot order)
//!    ├─→ [bridge]   BridgeSpec     (extract / reconstruct / encode / decode)
//!    ├─→ [printer]  PrinterRecord  (show_*)
//!    └─→ [defaults] GeneratorRecord (default_*)
//!    ↓
//!  PackageRecord
//!    ↓
//!  [render] → <package/path>.gleam
//! ```
//!
//! [`pipeline::compile`] runs the whole thing: lowering, one call to the
//! external codec generator, then emission.

pub mod bridge;
pub mod defaults;
pub mod naming;
pub mod package;
pub mod pipeline;
pub mod primitive;
pub mod printer;
pub mod record;
pub mod render;
pub mod support;
pub mod typedef;

pub use bridge::{BridgeSpec, Conversion, UnverifiedShape};
pub use package::{ImportSet, LoweredPackage, PackageBuilder, lower_package};
pub use pipeline::{CodecGenerator, Emitted, GeneratedFile, compile};
pub use primitive::{Classification, PrimitiveKind, classify};
pub use record::PackageRecord;
pub use render::render_package;
pub use typedef::{GleamType, TypeDef};

#[cfg(test)]
mod testing;
