//! Runtime bridge generator.
//!
//! gpb exchanges messages as tuples `{'pkg.Msg', Field1, Field2, ...}`, enums
//! as atoms, oneofs as `undefined | {member, Value}` and absent optional values
//! as `undefined`. A [`BridgeSpec`] describes, per generated type, how to move
//! between that shape and the typed Gleam value. It is built from the
//! [`TypeDef`] slot list only, so the tuple layout is the constructor layout.
//!
//! # Unverified shapes
//!
//! gpb hands back a oneof payload as a bare `{member, Value}` tuple. The
//! generated dispatch compares the tag against every member and, when none
//! matches, reinterprets the payload unchecked as the last member. That arm is
//! modelled as [`UnverifiedShape`]; nothing at compile time proves the payload
//! has that member's type.

use crate::naming;
use crate::record::{BridgeRecord, CodecRecord};
use crate::typedef::{EntityKind, GleamType, RefKind, TypeDef, TypeRef};
use gleam_pb_core::{GenError, GenResult};
use serde::Serialize;

/// How one value crosses between Gleam and codec representation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Conversion {
    /// Same representation on both sides
    Direct(GleamType),

    /// Constructor ↔ atom
    Enum(TypeRef),

    /// Record ↔ tuple
    Message(TypeRef),

    /// `option.Option(a)` ↔ `undefined | a`
    Optional(Box<Conversion>),

    /// `option.Option(OneofType)` ↔ `undefined | {member, payload}`
    OneOf(TypeRef),
    List(Box<Conversion>),
    Map(Box<Conversion>, Box<Conversion>),
}

impl Conversion {
    /// Conversion for a slot of type `ty`
    pub fn for_type(ty: &GleamType) -> Self {
        match ty {
            GleamType::Ref(r) => match r.kind {
                RefKind::Message => Conversion::Message(r.clone()),
                RefKind::Enum { .. } => Conversion::Enum(r.clone()),
                RefKind::OneOf => Conversion::OneOf(r.clone()),
            },
            GleamType::Option(inner) => match inner.as_ref() {
                GleamType::Ref(r) if r.kind == RefKind::OneOf => Conversion::OneOf(r.clone()),
                other => Conversion::Optional(Box::new(Self::for_type(other))),
            },
            GleamType::List(inner) => Conversion::List(Box::new(Self::for_type(inner))),
            GleamType::Map(key, value) => Conversion::Map(
                Box::new(Self::for_type(key)),
                Box::new(Self::for_type(value)),
            ),
            scalar => Conversion::Direct(scalar.clone()),
        }
    }

    /// Whether the value passes through untouched
    pub fn is_direct(&self) -> bool {
        match self {
            Conversion::Direct(_) => true,
            Conversion::List(inner) => inner.is_direct(),
            Conversion::Map(key, value) => key.is_direct() && value.is_direct(),
            _ => false,
        }
    }

    /// Gleam type of the codec-side value
    pub fn external_type(&self) -> String {
        match self {
            Conversion::Direct(ty) => ty.render(),
            Conversion::Enum(_) => "atom.Atom".to_string(),
            Conversion::Message(_) | Conversion::Optional(_) => "dynamic.Dynamic".to_string(),
            Conversion::OneOf(_) => "gleam_pb.Undefined(#(atom.Atom, dynamic.Dynamic))".to_string(),
            Conversion::List(inner) => format!("List({})", inner.external_type()),
            Conversion::Map(key, value) => format!(
                "List(#({}, {}))",
                key.external_type(),
                value.external_type()
            ),
        }
    }

    /// Expression turning the Gleam value `input` into its codec form
    pub fn extract_expr(&self, input: &str) -> String {
        self.extract_at(input, 0)
    }

    /// Expression turning the codec value `input` back into a Gleam value
    pub fn reconstruct_expr(&self, input: &str) -> String {
        self.reconstruct_at(input, 0)
    }

    /// Like [`Self::reconstruct_expr`] for an input typed `dynamic.Dynamic`
    pub fn reconstruct_dynamic(&self, input: &str) -> String {
        match self {
            // reconstructing a message already coerces its input
            Conversion::Message(_) => self.reconstruct_expr(input),
            _ => self.reconstruct_expr(&format!("gleam_pb.force_a_to_b({input})")),
        }
    }

    fn extract_at(&self, input: &str, depth: usize) -> String {
        if self.is_direct() {
            return input.to_string();
        }

        match self {
            Conversion::Direct(_) => input.to_string(),
            Conversion::Enum(r) => format!("{}({input})", r.function("extract")),
            Conversion::Message(r) => format!(
                "{}(atom.create_from_string(\"{}\"), {input})",
                r.function("extract"),
                r.symbol
            ),
            Conversion::OneOf(r) => format!(
                "gleam_pb.option_to_gpb(option.map({input}, {}))",
                r.function("extract")
            ),
            Conversion::Optional(inner) if inner.is_direct() => {
                format!("gleam_pb.option_to_gpb({input})")
            }
            Conversion::Optional(inner) => {
                let v = scratch("v", depth);
                format!(
                    "gleam_pb.option_to_gpb(option.map({input}, fn({v}) {{ {} }}))",
                    inner.extract_at(&v, depth + 1)
                )
            }
            Conversion::List(inner) => {
                let e = scratch("e", depth);
                format!(
                    "list.map({input}, fn({e}) {{ {} }})",
                    inner.extract_at(&e, depth + 1)
                )
            }
            Conversion::Map(key, value) => {
                let p = scratch("p", depth);
                format!(
                    "list.map({input}, fn({p}) {{ #({}, {}) }})",
                    key.extract_at(&format!("pair.first({p})"), depth + 1),
                    value.extract_at(&format!("pair.second({p})"), depth + 1)
                )
            }
        }
    }

    fn reconstruct_at(&self, input: &str, depth: usize) -> String {
        if self.is_direct() {
            return input.to_string();
        }

        match self {
            Conversion::Direct(_) => input.to_string(),
            Conversion::Enum(r) | Conversion::OneOf(r) => {
                format!("{}({input})", r.function("reconstruct"))
            }
            Conversion::Message(r) => format!(
                "{}(gleam_pb.force_a_to_b({input}))",
                r.function("reconstruct")
            ),
            Conversion::Optional(inner) if inner.is_direct() => {
                format!("gleam_pb.undefined_to_option({input})")
            }
            Conversion::Optional(inner) => {
                let v = scratch("v", depth);
                format!(
                    "option.map(gleam_pb.undefined_to_option({input}), fn({v}) {{ {} }})",
                    inner.reconstruct_at(&v, depth + 1)
                )
            }
            Conversion::List(inner) => {
                let e = scratch("e", depth);
                format!(
                    "list.map({input}, fn({e}) {{ {} }})",
                    inner.reconstruct_at(&e, depth + 1)
                )
            }
            Conversion::Map(key, value) => {
                let p = scratch("p", depth);
                format!(
                    "list.map({input}, fn({p}) {{ #({}, {}) }})",
                    key.reconstruct_at(&format!("pair.first({p})"), depth + 1),
                    value.reconstruct_at(&format!("pair.second({p})"), depth + 1)
                )
            }
        }
    }
}

fn scratch(name: &str, depth: usize) -> String {
    naming::reserved(&format!("{name}{depth}"))
}

fn atom(symbol: &str) -> String {
    format!("atom.create_from_string(\"{symbol}\")")
}

/// Constructor ↔ atom pair of an enum
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumVariant {
    pub constructor: String,
    pub symbol: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumBridge {
    pub type_name: String,
    pub stem: String,
    pub source: String,
    pub variants: Vec<EnumVariant>,
}

/// One oneof member: codec tag, Gleam constructor and payload conversion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OneOfMember {
    pub tag: String,
    pub constructor: String,
    pub conversion: Conversion,
}

/// The catch-all dispatch arm of a oneof.
///
/// A payload whose tag matches no member is reinterpreted as `members[member]`
/// without any check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UnverifiedShape {
    pub member: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OneOfBridge {
    pub type_name: String,
    pub stem: String,
    pub source: String,
    pub members: Vec<OneOfMember>,
    pub fallback: UnverifiedShape,
}

impl OneOfBridge {
    pub fn fallback_member(&self) -> &OneOfMember {
        &self.members[self.fallback.member]
    }
}

/// One record slot as seen by the bridge
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BridgeSlot {
    pub label: String,
    pub conversion: Conversion,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageBridge {
    pub type_name: String,
    pub stem: String,
    pub source: String,

    /// Codec name of the message, first element of its tuple
    pub symbol: String,
    pub slots: Vec<BridgeSlot>,

    /// Top-level messages also get `encode_*`/`decode_*`
    pub codec_wrappers: bool,
}

impl MessageBridge {
    /// Gleam type of the codec tuple: `#(atom.Atom, T1, T2, ...)`
    pub fn external_tuple(&self) -> String {
        let mut parts = vec!["atom.Atom".to_string()];
        parts.extend(self.slots.iter().map(|s| s.conversion.external_type()));
        format!("#({})", parts.join(", "))
    }
}

/// Extract/reconstruct description of one generated type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum BridgeSpec {
    Enum(EnumBridge),
    OneOf(OneOfBridge),
    Message(MessageBridge),
}

impl BridgeSpec {
    pub fn stem(&self) -> &str {
        match self {
            BridgeSpec::Enum(b) => &b.stem,
            BridgeSpec::OneOf(b) => &b.stem,
            BridgeSpec::Message(b) => &b.stem,
        }
    }

    /// Flatten into the strings the renderer lays out
    pub fn to_record(&self) -> BridgeRecord {
        match self {
            BridgeSpec::Enum(b) => enum_record(b),
            BridgeSpec::OneOf(b) => oneof_record(b),
            BridgeSpec::Message(b) => message_record(b),
        }
    }
}

/// Bridge for an enum type
pub fn enum_bridge(def: &TypeDef) -> GenResult<BridgeSpec> {
    expect_kind(def, EntityKind::Enum)?;

    Ok(BridgeSpec::Enum(EnumBridge {
        type_name: def.name.clone(),
        stem: def.stem.clone(),
        source: def.source.clone(),
        variants: def
            .constructors
            .iter()
            .map(|c| EnumVariant {
                constructor: c.name.clone(),
                symbol: c.symbol.clone().unwrap_or_default(),
            })
            .collect(),
    }))
}

/// Bridge for a oneof sum type
pub fn oneof_bridge(def: &TypeDef) -> GenResult<BridgeSpec> {
    expect_kind(def, EntityKind::OneOf)?;

    let mut members = Vec::with_capacity(def.constructors.len());
    for ctor in &def.constructors {
        let slot = ctor.slots.first().ok_or_else(|| {
            GenError::InvalidSchema(format!("oneof member `{}` carries no value", ctor.name))
        })?;
        members.push(OneOfMember {
            tag: ctor.symbol.clone().unwrap_or_default(),
            constructor: ctor.name.clone(),
            conversion: Conversion::for_type(&slot.ty),
        });
    }

    let last = members.len().checked_sub(1).ok_or_else(|| {
        GenError::InvalidSchema(format!("oneof `{}` has no members", def.source))
    })?;

    Ok(BridgeSpec::OneOf(OneOfBridge {
        type_name: def.name.clone(),
        stem: def.stem.clone(),
        source: def.source.clone(),
        members,
        fallback: UnverifiedShape { member: last },
    }))
}

/// Bridge for a message record; `top_level` adds the codec wrappers
pub fn message_bridge(def: &TypeDef, top_level: bool) -> GenResult<BridgeSpec> {
    expect_kind(def, EntityKind::Message)?;

    Ok(BridgeSpec::Message(MessageBridge {
        type_name: def.name.clone(),
        stem: def.stem.clone(),
        source: def.source.clone(),
        symbol: def.symbol.clone(),
        slots: def
            .slots()
            .iter()
            .map(|s| BridgeSlot {
                label: s.label.clone(),
                conversion: Conversion::for_type(&s.ty),
            })
            .collect(),
        codec_wrappers: top_level,
    }))
}

fn expect_kind(def: &TypeDef, kind: EntityKind) -> GenResult<()> {
    if def.kind == kind {
        Ok(())
    } else {
        Err(GenError::InvalidSchema(format!(
            "`{}` is a {:?}, not a {kind:?}",
            def.source, def.kind
        )))
    }
}

fn enum_record(b: &EnumBridge) -> BridgeRecord {
    let value = naming::reserved("s");

    BridgeRecord::Enum {
        entity: naming::codec_symbol(&b.source).to_string(),
        stem: b.stem.clone(),
        type_name: b.type_name.clone(),
        extract_arms: b
            .variants
            .iter()
            .map(|v| format!("{} -> {}", v.constructor, atom(&v.symbol)))
            .collect(),
        symbol_bindings: b
            .variants
            .iter()
            .enumerate()
            .map(|(i, v)| format!("let {} = {}", symbol_var(i), atom(&v.symbol)))
            .collect(),
        reconstruct_arms: b
            .variants
            .iter()
            .enumerate()
            .map(|(i, v)| format!("{value} if {value} == {} -> {}", symbol_var(i), v.constructor))
            .chain(std::iter::once("_ -> panic".to_string()))
            .collect(),
    }
}

fn symbol_var(i: usize) -> String {
    naming::reserved(&format!("symbol_{i}"))
}

fn tag_var(i: usize) -> String {
    naming::reserved(&format!("tag_{i}"))
}

fn oneof_record(b: &OneOfBridge) -> BridgeRecord {
    let tag = naming::reserved("t");
    let payload = naming::reserved("v");
    let forced = |m: &OneOfMember| m.conversion.reconstruct_dynamic(&payload);

    let fallback = b.fallback_member();

    BridgeRecord::OneOf {
        entity: naming::codec_symbol(&b.source).to_string(),
        stem: b.stem.clone(),
        type_name: b.type_name.clone(),
        dispatch: dispatch_function(&b.stem),
        extract_arms: b
            .members
            .iter()
            .map(|m| {
                format!(
                    "{}({payload}) -> #({}, {}) |> dynamic.from",
                    m.constructor,
                    atom(&m.tag),
                    m.conversion.extract_expr(&payload)
                )
            })
            .collect(),
        tag_bindings: b
            .members
            .iter()
            .enumerate()
            .map(|(i, m)| format!("let {} = {}", tag_var(i), atom(&m.tag)))
            .collect(),
        dispatch_arms: b
            .members
            .iter()
            .enumerate()
            .map(|(i, m)| {
                format!(
                    "#({tag}, {payload}) if {tag} == {} -> {}({})",
                    tag_var(i),
                    m.constructor,
                    forced(m)
                )
            })
            .collect(),
        fallback_arm: format!(
            "#(_, {payload}) -> {}({})",
            fallback.constructor,
            forced(fallback)
        ),
    }
}

/// Private dispatch helper of a oneof, in the reserved namespace
pub fn dispatch_function(stem: &str) -> String {
    naming::reserved(&format!("dispatch_{stem}"))
}

/// External `decode_msg` binding of a message, in the reserved namespace
pub fn decode_external(stem: &str) -> String {
    naming::reserved(&format!("decode_{stem}"))
}

fn field_var(i: usize) -> String {
    naming::reserved(&format!("f{i}"))
}

fn message_record(b: &MessageBridge) -> BridgeRecord {
    BridgeRecord::Message {
        entity: b.symbol.clone(),
        stem: b.stem.clone(),
        type_name: b.type_name.clone(),
        extract_fields: b
            .slots
            .iter()
            .map(|s| {
                s.conversion
                    .extract_expr(&format!("{}.{}", naming::MESSAGE_PARAM, s.label))
            })
            .collect(),
        external_tuple: b.external_tuple(),
        bindings: (0..b.slots.len()).map(field_var).collect(),
        reconstruct_args: b
            .slots
            .iter()
            .enumerate()
            .map(|(i, s)| s.conversion.reconstruct_expr(&field_var(i)))
            .collect(),
        codec: b.codec_wrappers.then(|| CodecRecord {
            symbol: b.symbol.clone(),
            decode_external: decode_external(&b.stem),
        }),
    }
}

#[cfg(test)]
#[path = "bridge/bridge_tests.rs"]
mod bridge_tests;
