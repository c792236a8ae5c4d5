//! Algebraic type builder.
//!
//! Turns one schema entity into a [`TypeDef`]: a Gleam type name plus its
//! ordered constructors. The slot order of a message's single constructor is
//! the order of the tuple the codec exchanges, and [`crate::bridge`] builds
//! its functions from this list without looking at the schema again.
//!
//! # Field lowering
//!
//! | Field | Gleam type |
//! |-------|------------|
//! | scalar | `Int`, `Float`, `String`, `Bool`, `BitString` |
//! | `optional` scalar or enum | `option.Option(T)` |
//! | `repeated T` | `List(T)` |
//! | `map<K, V>` | `List(#(K, V))` |
//! | message | `option.Option(Msg)` |
//! | enum | `Enum` |
//! | oneof members | one `option.Option(MsgOneof)` slot at the first member |

use crate::naming;
use crate::package::PackageBuilder;
use crate::primitive::{FieldSite, PrimitiveKind, classify_field};
use gleam_pb_core::{Cardinality, Enum, Field, FieldKind, GenError, GenResult, Message, OneOf};
use serde::Serialize;
use std::collections::HashMap;

/// Erlang tag of `gleam_pb.Wrapper(a)`; a oneof member with this name would
/// be read back as the presence wrapper
const PRESENCE_WRAPPER_TAG: &str = "wrapper";

/// What kind of schema entity a type reference points at
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RefKind {
    Message,
    Enum {
        /// First declared constructor, used by default-value generators
        default_constructor: String,
    },
    OneOf,
}

/// Reference to a generated type, possibly in another module
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeRef {
    pub name: String,
    pub stem: String,

    /// Import alias of the defining module, when it is not the current one
    pub module: Option<String>,

    /// Codec symbol of the referenced message; empty for enums and oneofs
    pub symbol: String,
    pub kind: RefKind,
}

impl TypeRef {
    /// Qualify an item of the defining module (`money.Money`, `Item`)
    pub fn qualify(&self, item: &str) -> String {
        match &self.module {
            Some(alias) => format!("{alias}.{item}"),
            None => item.to_string(),
        }
    }

    pub fn type_expr(&self) -> String {
        self.qualify(&self.name)
    }

    /// Generated function `<prefix>_<stem>` of the referenced type
    pub fn function(&self, prefix: &str) -> String {
        self.qualify(&format!("{prefix}_{}", self.stem))
    }
}

/// Gleam type of a constructor slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum GleamType {
    Int,
    Float,
    String,
    Bool,
    BitString,
    List(Box<GleamType>),

    /// Rendered as a list of pairs
    Map(Box<GleamType>, Box<GleamType>),
    Option(Box<GleamType>),
    Ref(TypeRef),
}

impl GleamType {
    /// The Gleam type of a scalar kind
    pub fn scalar(kind: PrimitiveKind) -> Option<Self> {
        match kind {
            PrimitiveKind::Int => Some(GleamType::Int),
            PrimitiveKind::Float => Some(GleamType::Float),
            PrimitiveKind::String => Some(GleamType::String),
            PrimitiveKind::Bool => Some(GleamType::Bool),
            PrimitiveKind::BitString => Some(GleamType::BitString),
            _ => None,
        }
    }

    /// Primitive kind of this type; `None` for type references
    pub fn kind(&self) -> Option<PrimitiveKind> {
        match self {
            GleamType::Int => Some(PrimitiveKind::Int),
            GleamType::Float => Some(PrimitiveKind::Float),
            GleamType::String => Some(PrimitiveKind::String),
            GleamType::Bool => Some(PrimitiveKind::Bool),
            GleamType::BitString => Some(PrimitiveKind::BitString),
            GleamType::List(_) => Some(PrimitiveKind::List),
            GleamType::Map(_, _) => Some(PrimitiveKind::Map),
            GleamType::Option(_) => Some(PrimitiveKind::Option),
            GleamType::Ref(_) => None,
        }
    }

    /// Gleam source spelling
    pub fn render(&self) -> String {
        match self {
            GleamType::List(inner) => format!("List({})", inner.render()),
            GleamType::Map(key, value) => {
                format!("List(#({}, {}))", key.render(), value.render())
            }
            GleamType::Option(inner) => format!("option.Option({})", inner.render()),
            GleamType::Ref(r) => r.type_expr(),
            scalar => scalar
                .kind()
                .and_then(|k| k.gleam_type())
                .unwrap_or_default()
                .to_string(),
        }
    }

    /// Zero value literal, when the type has one
    pub fn default_literal(&self) -> Option<String> {
        match self {
            GleamType::Ref(r) => match &r.kind {
                RefKind::Enum {
                    default_constructor,
                } => Some(r.qualify(default_constructor)),
                _ => None,
            },
            other => other
                .kind()
                .and_then(|k| k.default_literal())
                .map(String::from),
        }
    }
}

/// Where a slot came from in the schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SlotSource {
    Field(String),
    OneOf(String),
}

/// One labelled constructor argument
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Slot {
    pub label: String,
    pub ty: GleamType,
    pub source: SlotSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Constructor {
    pub name: String,

    /// Codec-side name: enumerant for enums, member field name for oneofs
    pub symbol: Option<String>,
    pub slots: Vec<Slot>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntityKind {
    Enum,
    OneOf,
    Message,
}

/// A generated Gleam type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeDef {
    pub name: String,
    pub stem: String,
    pub kind: EntityKind,

    /// Fully qualified proto name of the source entity
    pub source: String,

    /// Codec symbol; only meaningful for messages
    pub symbol: String,
    pub constructors: Vec<Constructor>,
}

impl TypeDef {
    /// Slots of the record constructor; empty for sum types
    pub fn slots(&self) -> &[Slot] {
        match self.kind {
            EntityKind::Message => self
                .constructors
                .first()
                .map(|c| c.slots.as_slice())
                .unwrap_or_default(),
            _ => &[],
        }
    }
}

/// Gleam type name of a oneof's sum type
pub fn oneof_type_name(message: &Message, oneof: &OneOf) -> String {
    format!(
        "{}{}",
        naming::type_name(message.relative_name()),
        naming::to_pascal_case(&oneof.name)
    )
}

/// Local reference to a oneof's sum type
pub fn oneof_ref(message: &Message, oneof: &OneOf) -> TypeRef {
    let name = oneof_type_name(message, oneof);
    TypeRef {
        stem: naming::function_stem(&name),
        name,
        module: None,
        symbol: String::new(),
        kind: RefKind::OneOf,
    }
}

/// Sum type with one nullary constructor per enumerant
pub fn enum_type(e: &Enum) -> GenResult<TypeDef> {
    let name = naming::type_name(e.relative_name());

    if e.values.is_empty() {
        return Err(GenError::InvalidSchema(format!(
            "enum `{}` declares no values",
            e.full_name
        )));
    }

    let constructors: Vec<Constructor> = e
        .values
        .iter()
        .map(|v| Constructor {
            name: naming::enum_constructor(&name, &v.name),
            symbol: Some(v.name.clone()),
            slots: Vec::new(),
        })
        .collect();

    let mut seen: HashMap<&str, &str> = HashMap::new();
    for (ctor, value) in constructors.iter().zip(&e.values) {
        if let Some(first) = seen.insert(&ctor.name, &value.name) {
            return Err(GenError::collision(&name, &ctor.name, first, &value.name));
        }
    }

    Ok(TypeDef {
        stem: naming::function_stem(&name),
        name,
        kind: EntityKind::Enum,
        source: e.full_name.clone(),
        symbol: String::new(),
        constructors,
    })
}

/// Auxiliary sum type of one oneof group
pub fn oneof_type(
    scope: &mut PackageBuilder<'_>,
    message: &Message,
    oneof: &OneOf,
) -> GenResult<TypeDef> {
    let name = oneof_type_name(message, oneof);

    let mut constructors = Vec::with_capacity(oneof.fields.len());
    for field in message.oneof_fields(oneof) {
        // codec tags are the proto names and cannot be renamed
        if field.name == PRESENCE_WRAPPER_TAG {
            return Err(GenError::collision(
                &name,
                PRESENCE_WRAPPER_TAG,
                "the `gleam_pb.Wrapper` presence constructor",
                format!("oneof member `{}`", field.name),
            ));
        }
        let ty = lower_kind(scope, message, field, &field.kind)?;
        constructors.push(Constructor {
            name: format!("{name}{}", naming::to_pascal_case(&field.name)),
            symbol: Some(field.name.clone()),
            slots: vec![Slot {
                label: naming::field_label(&field.name),
                ty,
                source: SlotSource::Field(field.name.clone()),
            }],
        });
    }

    let mut seen: HashMap<&str, &str> = HashMap::new();
    for (ctor, field) in constructors.iter().zip(message.oneof_fields(oneof)) {
        if let Some(first) = seen.insert(&ctor.name, &field.name) {
            return Err(GenError::collision(&name, &ctor.name, first, &field.name));
        }
    }

    Ok(TypeDef {
        stem: naming::function_stem(&name),
        name,
        kind: EntityKind::OneOf,
        source: format!("{}.{}", message.full_name, oneof.name),
        symbol: String::new(),
        constructors,
    })
}

/// Single-constructor record type, one slot per field in declared order
pub fn message_type(scope: &mut PackageBuilder<'_>, message: &Message) -> GenResult<TypeDef> {
    let name = naming::type_name(message.relative_name());

    let mut slots = Vec::with_capacity(message.fields.len());
    for (pos, field) in message.fields.iter().enumerate() {
        match field.oneof {
            Some(index) => {
                let oneof = &message.oneofs[index];
                // the group takes the place of its first member
                if oneof.fields.first() == Some(&pos) {
                    slots.push(Slot {
                        label: naming::field_label(&oneof.name),
                        ty: GleamType::Option(Box::new(GleamType::Ref(oneof_ref(message, oneof)))),
                        source: SlotSource::OneOf(oneof.name.clone()),
                    });
                }
            }
            None => slots.push(Slot {
                label: naming::field_label(&field.name),
                ty: lower_field(scope, message, field)?,
                source: SlotSource::Field(field.name.clone()),
            }),
        }
    }

    check_labels(&name, &slots)?;

    Ok(TypeDef {
        stem: naming::function_stem(&name),
        constructors: vec![Constructor {
            name: name.clone(),
            symbol: None,
            slots,
        }],
        name,
        kind: EntityKind::Message,
        source: message.full_name.clone(),
        symbol: naming::codec_symbol(&message.full_name).to_string(),
    })
}

fn check_labels(scope: &str, slots: &[Slot]) -> GenResult<()> {
    let mut seen: HashMap<&str, &SlotSource> = HashMap::new();
    for slot in slots {
        if let Some(first) = seen.insert(&slot.label, &slot.source) {
            return Err(GenError::collision(
                scope,
                &slot.label,
                describe(first),
                describe(&slot.source),
            ));
        }
    }
    Ok(())
}

fn describe(source: &SlotSource) -> String {
    match source {
        SlotSource::Field(name) => format!("field `{name}`"),
        SlotSource::OneOf(name) => format!("oneof `{name}`"),
    }
}

fn lower_field(
    scope: &mut PackageBuilder<'_>,
    message: &Message,
    field: &Field,
) -> GenResult<GleamType> {
    let element = lower_kind(scope, message, field, &field.kind)?;

    Ok(match (&field.kind, field.cardinality) {
        (FieldKind::Map { .. }, _) => element,
        (_, Cardinality::Repeated) => GleamType::List(Box::new(element)),
        (FieldKind::Message(_), _) | (_, Cardinality::Optional) => {
            GleamType::Option(Box::new(element))
        }
        (_, Cardinality::Singular) => element,
    })
}

fn lower_kind(
    scope: &mut PackageBuilder<'_>,
    message: &Message,
    field: &Field,
    kind: &FieldKind,
) -> GenResult<GleamType> {
    match kind {
        FieldKind::Scalar(ty) => {
            let site = FieldSite {
                entity: &message.full_name,
                field: &field.name,
                file: &message.file,
            };
            let kind = classify_field(*ty, site)?;
            GleamType::scalar(kind).ok_or_else(|| GenError::UnsupportedPrimitive {
                entity: message.full_name.clone(),
                field: field.name.clone(),
                proto_type: ty.as_str_name().to_string(),
                file: message.file.clone(),
            })
        }
        FieldKind::Message(name) | FieldKind::Enum(name) => {
            Ok(GleamType::Ref(scope.resolve(&message.full_name, name)?))
        }
        FieldKind::Map { key, value } => Ok(GleamType::Map(
            Box::new(lower_kind(scope, message, field, key)?),
            Box::new(lower_kind(scope, message, field, value)?),
        )),
    }
}
