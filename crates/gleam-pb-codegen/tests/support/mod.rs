//! Model interpreter for generated bridges
//!
//! Evaluates [`BridgeSpec`]s the way the generated Gleam functions behave at
//! runtime, over plain Rust models of Gleam values and gpb terms. Only
//! single-package schemas are supported: type references resolve by stem.

#![allow(dead_code)]

use gleam_pb_codegen::bridge::{BridgeSpec, Conversion, OneOfBridge};
use gleam_pb_codegen::typedef::GleamType;
use gleam_pb_codegen::{LoweredPackage, lower_package};
use gleam_pb_core::Schema;
use gleam_pb_core::fixtures::FileBuilder;
use proptest::prelude::*;
use std::collections::HashMap;

/// A Gleam value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Bits(Vec<u8>),
    List(Vec<Value>),
    Pair(Box<Value>, Box<Value>),
    None,
    Some(Box<Value>),

    /// Enum constructor
    Nullary(String),

    /// Oneof constructor with its payload
    Variant(String, Box<Value>),

    /// Message record
    Record(String, Vec<Value>),
}

/// A term as gpb produces and consumes it
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    /// Passed through without conversion
    Native(Value),
    Atom(String),
    Tuple(Vec<Term>),
    List(Vec<Term>),
    Undefined,
}

pub fn schema(targets: Vec<FileBuilder>) -> Schema {
    let files: Vec<_> = targets.into_iter().map(FileBuilder::build).collect();
    let names: Vec<String> = files.iter().map(|f| f.name().to_string()).collect();
    Schema::new(&files, &names).unwrap()
}

pub fn lower_single(schema: &Schema) -> LoweredPackage {
    let packages = schema.packages();
    lower_package(schema, &packages[0]).unwrap()
}

/// Bridges of one package, by stem
pub struct Bridges {
    specs: HashMap<String, BridgeSpec>,
}

impl Bridges {
    pub fn new(package: &LoweredPackage) -> Self {
        Self {
            specs: package
                .bridges
                .iter()
                .map(|b| (b.stem().to_string(), b.clone()))
                .collect(),
        }
    }

    pub fn spec(&self, stem: &str) -> &BridgeSpec {
        self.specs
            .get(stem)
            .unwrap_or_else(|| panic!("no bridge for `{stem}`"))
    }

    fn oneof(&self, stem: &str) -> &OneOfBridge {
        match self.spec(stem) {
            BridgeSpec::OneOf(b) => b,
            other => panic!("`{stem}` is not a oneof: {other:?}"),
        }
    }

    // ------------------------------------------------------------------
    // extract
    // ------------------------------------------------------------------

    /// `extract_<stem>` of a message record
    pub fn extract_message(&self, stem: &str, value: &Value) -> Term {
        let BridgeSpec::Message(b) = self.spec(stem) else {
            panic!("`{stem}` is not a message");
        };
        let Value::Record(_, fields) = value else {
            panic!("expected a record, got {value:?}");
        };

        let mut items = vec![Term::Atom(b.symbol.clone())];
        items.extend(
            b.slots
                .iter()
                .zip(fields)
                .map(|(slot, v)| self.extract(&slot.conversion, v)),
        );
        Term::Tuple(items)
    }

    pub fn extract(&self, conversion: &Conversion, value: &Value) -> Term {
        if conversion.is_direct() {
            return Term::Native(value.clone());
        }

        match (conversion, value) {
            (Conversion::Enum(r), Value::Nullary(ctor)) => {
                let BridgeSpec::Enum(b) = self.spec(&r.stem) else {
                    panic!("`{}` is not an enum", r.stem);
                };
                let variant = b
                    .variants
                    .iter()
                    .find(|v| &v.constructor == ctor)
                    .unwrap_or_else(|| panic!("unknown constructor `{ctor}`"));
                Term::Atom(variant.symbol.clone())
            }
            (Conversion::Message(r), record) => self.extract_message(&r.stem, record),
            (Conversion::Optional(_) | Conversion::OneOf(_), Value::None) => Term::Undefined,
            (Conversion::Optional(inner), Value::Some(v)) => self.extract(inner, v),
            (Conversion::OneOf(r), Value::Some(v)) => {
                let Value::Variant(ctor, payload) = v.as_ref() else {
                    panic!("expected a oneof variant, got {v:?}");
                };
                let member = self
                    .oneof(&r.stem)
                    .members
                    .iter()
                    .find(|m| &m.constructor == ctor)
                    .unwrap_or_else(|| panic!("unknown member `{ctor}`"));
                Term::Tuple(vec![
                    Term::Atom(member.tag.clone()),
                    self.extract(&member.conversion, payload),
                ])
            }
            (Conversion::List(inner), Value::List(items)) => {
                Term::List(items.iter().map(|v| self.extract(inner, v)).collect())
            }
            (Conversion::Map(key, value), Value::List(pairs)) => Term::List(
                pairs
                    .iter()
                    .map(|p| {
                        let Value::Pair(k, v) = p else {
                            panic!("expected a pair, got {p:?}");
                        };
                        Term::Tuple(vec![self.extract(key, k), self.extract(value, v)])
                    })
                    .collect(),
            ),
            (conversion, value) => panic!("cannot extract {value:?} with {conversion:?}"),
        }
    }

    // ------------------------------------------------------------------
    // reconstruct
    // ------------------------------------------------------------------

    /// `reconstruct_<stem>` of a message tuple
    pub fn reconstruct_message(&self, stem: &str, term: &Term) -> Result<Value, String> {
        let BridgeSpec::Message(b) = self.spec(stem) else {
            return Err(format!("`{stem}` is not a message"));
        };
        let Term::Tuple(items) = term else {
            return Err(format!("expected a tuple, got {term:?}"));
        };
        if items.len() != b.slots.len() + 1 {
            return Err(format!(
                "tuple of {} elements for {} slots",
                items.len(),
                b.slots.len()
            ));
        }

        let fields = b
            .slots
            .iter()
            .zip(&items[1..])
            .map(|(slot, t)| self.reconstruct(&slot.conversion, t))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Value::Record(b.type_name.clone(), fields))
    }

    pub fn reconstruct(&self, conversion: &Conversion, term: &Term) -> Result<Value, String> {
        if conversion.is_direct() {
            return match term {
                Term::Native(v) => Ok(v.clone()),
                other => Err(format!("expected a native value, got {other:?}")),
            };
        }

        match (conversion, term) {
            (Conversion::Enum(r), Term::Atom(symbol)) => {
                let BridgeSpec::Enum(b) = self.spec(&r.stem) else {
                    return Err(format!("`{}` is not an enum", r.stem));
                };
                b.variants
                    .iter()
                    .find(|v| &v.symbol == symbol)
                    .map(|v| Value::Nullary(v.constructor.clone()))
                    // the generated function panics here
                    .ok_or_else(|| format!("panic: unknown enum symbol `{symbol}`"))
            }
            (Conversion::Message(r), t) => self.reconstruct_message(&r.stem, t),
            (Conversion::Optional(_) | Conversion::OneOf(_), Term::Undefined) => Ok(Value::None),
            (Conversion::Optional(inner), t) => {
                Ok(Value::Some(Box::new(self.reconstruct(inner, t)?)))
            }
            (Conversion::OneOf(r), t) => {
                Ok(Value::Some(Box::new(self.dispatch(self.oneof(&r.stem), t)?)))
            }
            (Conversion::List(inner), Term::List(items)) => Ok(Value::List(
                items
                    .iter()
                    .map(|t| self.reconstruct(inner, t))
                    .collect::<Result<_, _>>()?,
            )),
            (Conversion::Map(key, value), Term::List(pairs)) => Ok(Value::List(
                pairs
                    .iter()
                    .map(|p| match p {
                        Term::Tuple(kv) if kv.len() == 2 => Ok(Value::Pair(
                            Box::new(self.reconstruct(key, &kv[0])?),
                            Box::new(self.reconstruct(value, &kv[1])?),
                        )),
                        other => Err(format!("expected a pair, got {other:?}")),
                    })
                    .collect::<Result<_, _>>()?,
            )),
            (conversion, term) => Err(format!("cannot reconstruct {term:?} with {conversion:?}")),
        }
    }

    /// The private dispatch of a oneof: match the tag, else the unverified arm
    pub fn dispatch(&self, bridge: &OneOfBridge, term: &Term) -> Result<Value, String> {
        let Term::Tuple(items) = term else {
            return Err(format!("expected a tagged tuple, got {term:?}"));
        };
        let [Term::Atom(tag), payload] = items.as_slice() else {
            return Err(format!("expected {{tag, payload}}, got {term:?}"));
        };

        let member = bridge
            .members
            .iter()
            .find(|m| &m.tag == tag)
            .unwrap_or_else(|| bridge.fallback_member());
        Ok(Value::Variant(
            member.constructor.clone(),
            Box::new(self.reconstruct(&member.conversion, payload)?),
        ))
    }

    // ------------------------------------------------------------------
    // strategies
    // ------------------------------------------------------------------

    /// Values of a message record, nesting at most `depth` messages deep
    pub fn message_values(&self, stem: &str, depth: u32) -> BoxedStrategy<Value> {
        let BridgeSpec::Message(b) = self.spec(stem) else {
            panic!("`{stem}` is not a message");
        };
        let name = b.type_name.clone();
        let fields: Vec<BoxedStrategy<Value>> = b
            .slots
            .iter()
            .map(|s| self.values(&s.conversion, depth))
            .collect();
        fields
            .prop_map(move |fields| Value::Record(name.clone(), fields))
            .boxed()
    }

    pub fn values(&self, conversion: &Conversion, depth: u32) -> BoxedStrategy<Value> {
        match conversion {
            Conversion::Direct(ty) => gleam_values(ty),
            Conversion::Enum(r) => {
                let BridgeSpec::Enum(b) = self.spec(&r.stem) else {
                    panic!("`{}` is not an enum", r.stem);
                };
                let ctors: Vec<Value> = b
                    .variants
                    .iter()
                    .map(|v| Value::Nullary(v.constructor.clone()))
                    .collect();
                proptest::sample::select(ctors).boxed()
            }
            Conversion::Message(r) => self.message_values(&r.stem, depth.saturating_sub(1)),
            Conversion::Optional(inner) if depth == 0 && !inner.is_direct() => {
                Just(Value::None).boxed()
            }
            Conversion::Optional(inner) => prop_oneof![
                Just(Value::None),
                self.values(inner, depth)
                    .prop_map(|v| Value::Some(Box::new(v))),
            ]
            .boxed(),
            Conversion::OneOf(r) => {
                let members: Vec<BoxedStrategy<Value>> = self
                    .oneof(&r.stem)
                    .members
                    .iter()
                    .map(|m| {
                        let ctor = m.constructor.clone();
                        self.values(&m.conversion, depth)
                            .prop_map(move |v| {
                                Value::Some(Box::new(Value::Variant(ctor.clone(), Box::new(v))))
                            })
                            .boxed()
                    })
                    .collect();
                prop_oneof![
                    Just(Value::None),
                    proptest::strategy::Union::new(members),
                ]
                .boxed()
            }
            Conversion::List(inner) => prop::collection::vec(self.values(inner, depth), 0..4)
                .prop_map(Value::List)
                .boxed(),
            Conversion::Map(key, value) => prop::collection::vec(
                (self.values(key, depth), self.values(value, depth)),
                0..4,
            )
            .prop_map(|pairs| {
                Value::List(
                    pairs
                        .into_iter()
                        .map(|(k, v)| Value::Pair(Box::new(k), Box::new(v)))
                        .collect(),
                )
            })
            .boxed(),
        }
    }
}

/// Values of a type that crosses the bridge unchanged
pub fn gleam_values(ty: &GleamType) -> BoxedStrategy<Value> {
    match ty {
        GleamType::Int => any::<i64>().prop_map(Value::Int).boxed(),
        GleamType::Float => (-1.0e9..1.0e9f64).prop_map(Value::Float).boxed(),
        GleamType::String => "[a-z ]{0,12}".prop_map(Value::Str).boxed(),
        GleamType::Bool => any::<bool>().prop_map(Value::Bool).boxed(),
        GleamType::BitString => prop::collection::vec(any::<u8>(), 0..8)
            .prop_map(Value::Bits)
            .boxed(),
        GleamType::List(inner) => prop::collection::vec(gleam_values(inner), 0..4)
            .prop_map(Value::List)
            .boxed(),
        GleamType::Map(key, value) => {
            prop::collection::vec((gleam_values(key), gleam_values(value)), 0..4)
                .prop_map(|pairs| {
                    Value::List(
                        pairs
                            .into_iter()
                            .map(|(k, v)| Value::Pair(Box::new(k), Box::new(v)))
                            .collect(),
                    )
                })
                .boxed()
        }
        other => panic!("{other:?} does not cross the bridge unchanged"),
    }
}
