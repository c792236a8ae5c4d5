//! Descriptor builders for tests.
//!
//! These produce the same `FileDescriptorProto` shapes protoc emits, including
//! synthetic map-entry messages and proto3 optional oneofs, so tests exercise
//! the real [`Schema::new`](crate::Schema::new) path.
//!
//! ```ignore
//! use gleam_pb_core::fixtures::*;
//! use gleam_pb_core::schema::ProtoType;
//!
//! let file = file("demo/shop.proto", "demo.shop")
//!     .message(
//!         message("Item")
//!             .field(scalar("name", 1, ProtoType::String))
//!             .map_field("attrs", 2, ProtoType::String, scalar_value(ProtoType::Int32)),
//!     )
//!     .build();
//! assert_eq!(file.message_type[0].nested_type[0].name(), "AttrsEntry");
//! ```

use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{
    DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto, FieldDescriptorProto,
    FileDescriptorProto, MessageOptions, OneofDescriptorProto,
};

/// Builder for one `.proto` file
#[derive(Debug, Clone)]
pub struct FileBuilder {
    proto: FileDescriptorProto,
    messages: Vec<MessageBuilder>,
}

/// Start a proto3 file
pub fn file(name: &str, package: &str) -> FileBuilder {
    FileBuilder {
        proto: FileDescriptorProto {
            name: Some(name.to_string()),
            package: (!package.is_empty()).then(|| package.to_string()),
            syntax: Some("proto3".to_string()),
            ..Default::default()
        },
        messages: Vec::new(),
    }
}

impl FileBuilder {
    pub fn proto2(mut self) -> Self {
        self.proto.syntax = Some("proto2".to_string());
        self
    }

    pub fn import(mut self, dependency: &str) -> Self {
        self.proto.dependency.push(dependency.to_string());
        self
    }

    pub fn message(mut self, message: MessageBuilder) -> Self {
        self.messages.push(message);
        self
    }

    pub fn enumeration(mut self, enumeration: EnumDescriptorProto) -> Self {
        self.proto.enum_type.push(enumeration);
        self
    }

    pub fn build(mut self) -> FileDescriptorProto {
        let scope = match self.proto.package() {
            "" => String::new(),
            pkg => format!(".{pkg}"),
        };
        self.proto.message_type = self
            .messages
            .into_iter()
            .map(|m| m.finish(&scope))
            .collect();
        self.proto
    }
}

#[derive(Debug, Clone)]
enum Member {
    Field(FieldDescriptorProto),
    OneOf(String, Vec<FieldDescriptorProto>),
    Map {
        name: String,
        number: i32,
        key: Type,
        value: FieldDescriptorProto,
    },
}

/// Builder for one message, nested types included
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    name: String,
    members: Vec<Member>,
    nested: Vec<MessageBuilder>,
    enums: Vec<EnumDescriptorProto>,
}

pub fn message(name: &str) -> MessageBuilder {
    MessageBuilder {
        name: name.to_string(),
        members: Vec::new(),
        nested: Vec::new(),
        enums: Vec::new(),
    }
}

impl MessageBuilder {
    pub fn field(mut self, field: FieldDescriptorProto) -> Self {
        self.members.push(Member::Field(field));
        self
    }

    /// Add a oneof; its members are declared at this position
    pub fn oneof(mut self, name: &str, fields: Vec<FieldDescriptorProto>) -> Self {
        self.members.push(Member::OneOf(name.to_string(), fields));
        self
    }

    /// Add `map<key, value>`; `value` supplies the value type
    pub fn map_field(mut self, name: &str, number: i32, key: Type, value: FieldDescriptorProto) -> Self {
        self.members.push(Member::Map {
            name: name.to_string(),
            number,
            key,
            value,
        });
        self
    }

    pub fn nested(mut self, message: MessageBuilder) -> Self {
        self.nested.push(message);
        self
    }

    pub fn nested_enum(mut self, enumeration: EnumDescriptorProto) -> Self {
        self.enums.push(enumeration);
        self
    }

    fn finish(self, scope: &str) -> DescriptorProto {
        let full_name = format!("{scope}.{}", self.name);
        let mut proto = DescriptorProto {
            name: Some(self.name.clone()),
            enum_type: self.enums,
            ..Default::default()
        };
        let mut synthetic = Vec::new();

        for member in self.members {
            match member {
                Member::Field(f) => {
                    if f.proto3_optional() {
                        synthetic.push(proto.field.len());
                    }
                    proto.field.push(f);
                }
                Member::OneOf(name, fields) => {
                    let index = proto.oneof_decl.len() as i32;
                    proto.oneof_decl.push(OneofDescriptorProto {
                        name: Some(name),
                        ..Default::default()
                    });
                    for mut f in fields {
                        f.oneof_index = Some(index);
                        f.label = Some(Label::Optional as i32);
                        proto.field.push(f);
                    }
                }
                Member::Map {
                    name,
                    number,
                    key,
                    value,
                } => {
                    let entry_name = format!("{}Entry", pascal(&name));
                    let mut value = value;
                    value.name = Some("value".to_string());
                    value.number = Some(2);
                    value.label = Some(Label::Optional as i32);
                    proto.nested_type.push(DescriptorProto {
                        name: Some(entry_name.clone()),
                        field: vec![scalar("key", 1, key), value],
                        options: Some(MessageOptions {
                            map_entry: Some(true),
                            ..Default::default()
                        }),
                        ..Default::default()
                    });
                    proto.field.push(
                        message_field(&name, number, &format!("{full_name}.{entry_name}")).repeated(),
                    );
                }
            }
        }

        // protoc declares synthetic oneofs after every real one
        for pos in synthetic {
            let index = proto.oneof_decl.len() as i32;
            let field = &mut proto.field[pos];
            proto.oneof_decl.push(OneofDescriptorProto {
                name: Some(format!("_{}", field.name())),
                ..Default::default()
            });
            field.oneof_index = Some(index);
        }

        proto
            .nested_type
            .extend(self.nested.into_iter().map(|n| n.finish(&full_name)));
        proto
    }
}

/// Extra field settings on top of the prost type
pub trait FieldExt {
    fn repeated(self) -> Self;

    /// Mark as proto3 `optional`
    fn optional(self) -> Self;
}

impl FieldExt for FieldDescriptorProto {
    fn repeated(mut self) -> Self {
        self.label = Some(Label::Repeated as i32);
        self
    }

    fn optional(mut self) -> Self {
        self.proto3_optional = Some(true);
        self
    }
}

pub fn scalar(name: &str, number: i32, ty: Type) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.to_string()),
        number: Some(number),
        label: Some(Label::Optional as i32),
        r#type: Some(ty as i32),
        ..Default::default()
    }
}

pub fn message_field(name: &str, number: i32, type_name: &str) -> FieldDescriptorProto {
    FieldDescriptorProto {
        type_name: Some(type_name.to_string()),
        ..scalar(name, number, Type::Message)
    }
}

pub fn enum_field(name: &str, number: i32, type_name: &str) -> FieldDescriptorProto {
    FieldDescriptorProto {
        type_name: Some(type_name.to_string()),
        ..scalar(name, number, Type::Enum)
    }
}

/// Value side of a map with a scalar value type
pub fn scalar_value(ty: Type) -> FieldDescriptorProto {
    scalar("value", 2, ty)
}

/// Value side of a map with a message value type
pub fn message_value(type_name: &str) -> FieldDescriptorProto {
    message_field("value", 2, type_name)
}

pub fn enumeration(name: &str, values: &[&str]) -> EnumDescriptorProto {
    EnumDescriptorProto {
        name: Some(name.to_string()),
        value: values
            .iter()
            .enumerate()
            .map(|(i, v)| EnumValueDescriptorProto {
                name: Some((*v).to_string()),
                number: Some(i as i32),
                ..Default::default()
            })
            .collect(),
        ..Default::default()
    }
}

fn pascal(name: &str) -> String {
    name.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().chain(chars).collect(),
            }
        })
        .collect()
}
