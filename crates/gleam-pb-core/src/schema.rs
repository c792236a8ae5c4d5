//! Schema model built from protobuf descriptors.
//!
//! This module turns the `FileDescriptorProto`s that protoc hands to a plugin
//! into an immutable, lookup-friendly model. It is the only place that reads
//! raw descriptors; everything downstream works with [`Message`], [`Enum`],
//! [`Field`] and [`OneOf`].
//!
//! # Normalizations
//!
//! - Map fields become [`FieldKind::Map`]; their synthetic `*Entry` messages
//!   are not listed as messages.
//! - proto3 `optional` fields become [`Cardinality::Optional`]; their
//!   synthetic oneofs are not listed as oneofs.
//! - Messages and enums are listed depth-first, parents before children, in
//!   declaration order.
//!
//! Field order inside a message is always the declared order.

use crate::error::{GenError, GenResult};
use prost_types::field_descriptor_proto::Label;
use prost_types::{
    DescriptorProto, EnumDescriptorProto, FieldDescriptorProto, FileDescriptorProto,
};
use std::collections::{BTreeMap, HashMap};

pub use prost_types::field_descriptor_proto::Type as ProtoType;

/// How many values a field holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// Exactly one value, defaulted when absent on the wire
    Singular,
    /// Explicit presence (proto3 `optional`, proto2 `optional`)
    Optional,
    /// Zero or more values
    Repeated,
}

/// What a field holds
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// A non-reference proto type. Groups land here too and are rejected
    /// later by the primitive classifier.
    Scalar(ProtoType),

    /// Fully qualified message name (`.pkg.Outer.Inner`)
    Message(String),

    /// Fully qualified enum name
    Enum(String),

    /// `map<K, V>`
    Map {
        key: Box<FieldKind>,
        value: Box<FieldKind>,
    },
}

/// A message field
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub number: i32,
    pub kind: FieldKind,
    pub cardinality: Cardinality,

    /// Index into the owning message's [`Message::oneofs`]
    pub oneof: Option<usize>,
}

/// A real (non-synthetic) oneof group
#[derive(Debug, Clone, PartialEq)]
pub struct OneOf {
    pub name: String,

    /// Positions of the member fields in [`Message::fields`], declared order
    pub fields: Vec<usize>,
}

/// A message definition
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub name: String,
    pub full_name: String,
    pub package: String,
    pub file: String,

    /// Full name of the enclosing message, if nested
    pub parent: Option<String>,
    pub fields: Vec<Field>,
    pub oneofs: Vec<OneOf>,
}

impl Message {
    /// Name relative to the package (`Outer.Inner`)
    pub fn relative_name(&self) -> &str {
        relative_name(&self.full_name, &self.package)
    }

    pub fn is_top_level(&self) -> bool {
        self.parent.is_none()
    }

    /// Members of `oneof`, in declared order
    pub fn oneof_fields(&self, oneof: &OneOf) -> impl Iterator<Item = &Field> {
        oneof.fields.iter().map(|&i| &self.fields[i])
    }
}

/// One enumerant
#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    pub name: String,
    pub number: i32,
}

/// An enum definition
#[derive(Debug, Clone, PartialEq)]
pub struct Enum {
    pub name: String,
    pub full_name: String,
    pub package: String,
    pub file: String,
    pub parent: Option<String>,
    pub values: Vec<EnumValue>,
}

impl Enum {
    pub fn relative_name(&self) -> &str {
        relative_name(&self.full_name, &self.package)
    }
}

/// One `.proto` file
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaFile {
    pub name: String,
    pub package: String,
    pub dependencies: Vec<String>,

    /// All messages declared in this file, nested ones included
    pub messages: Vec<Message>,

    /// All enums declared in this file, nested ones included
    pub enums: Vec<Enum>,
}

/// Files of one proto package that are being generated
#[derive(Debug, Clone)]
pub struct Package<'a> {
    name: &'a str,
    files: Vec<&'a SchemaFile>,
}

impl<'a> Package<'a> {
    /// Proto package name (`demo.shop`)
    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn files(&self) -> &[&'a SchemaFile] {
        &self.files
    }

    /// Every message declared by this package's own files
    pub fn messages(&self) -> impl Iterator<Item = &'a Message> + '_ {
        self.files.iter().flat_map(|f| f.messages.iter())
    }

    /// Every enum declared by this package's own files
    pub fn enums(&self) -> impl Iterator<Item = &'a Enum> + '_ {
        self.files.iter().flat_map(|f| f.enums.iter())
    }
}

#[derive(Debug, Clone, Copy)]
enum EntityRef {
    Message { file: usize, index: usize },
    Enum { file: usize, index: usize },
}

/// The full set of descriptors of one compilation
#[derive(Debug, Clone)]
pub struct Schema {
    files: Vec<SchemaFile>,
    targets: Vec<String>,
    index: BTreeMap<String, EntityRef>,
}

impl Schema {
    /// Build the model from descriptors.
    ///
    /// `files` must contain every file named in `targets` plus all of their
    /// transitive dependencies, as protoc provides them.
    pub fn new(files: &[FileDescriptorProto], targets: &[String]) -> GenResult<Self> {
        let maps = collect_map_entries(files);

        let files: Vec<SchemaFile> = files
            .iter()
            .map(|f| convert_file(f, &maps))
            .collect::<GenResult<_>>()?;

        let mut index = BTreeMap::new();
        for (file_idx, file) in files.iter().enumerate() {
            for (i, m) in file.messages.iter().enumerate() {
                index.insert(
                    m.full_name.clone(),
                    EntityRef::Message {
                        file: file_idx,
                        index: i,
                    },
                );
            }
            for (i, e) in file.enums.iter().enumerate() {
                index.insert(
                    e.full_name.clone(),
                    EntityRef::Enum {
                        file: file_idx,
                        index: i,
                    },
                );
            }
        }

        for target in targets {
            if !files.iter().any(|f| &f.name == target) {
                return Err(GenError::InvalidSchema(format!(
                    "file to generate `{target}` is missing from the descriptors"
                )));
            }
        }

        let schema = Self {
            files,
            targets: targets.to_vec(),
            index,
        };
        schema.check_references()?;
        Ok(schema)
    }

    pub fn file(&self, name: &str) -> Option<&SchemaFile> {
        self.files.iter().find(|f| f.name == name)
    }

    pub fn target_files(&self) -> impl Iterator<Item = &SchemaFile> {
        self.targets.iter().filter_map(|t| self.file(t))
    }

    /// Target files grouped by proto package, first-seen order
    pub fn packages(&self) -> Vec<Package<'_>> {
        let mut packages: Vec<Package<'_>> = Vec::new();

        for file in self.target_files() {
            match packages.iter_mut().find(|p| p.name == file.package) {
                Some(pkg) => pkg.files.push(file),
                None => packages.push(Package {
                    name: &file.package,
                    files: vec![file],
                }),
            }
        }

        packages
    }

    /// Look up a message by fully qualified name
    pub fn message(&self, full_name: &str) -> Option<&Message> {
        match self.index.get(full_name)? {
            EntityRef::Message { file, index } => Some(&self.files[*file].messages[*index]),
            EntityRef::Enum { .. } => None,
        }
    }

    /// Look up an enum by fully qualified name
    pub fn enumeration(&self, full_name: &str) -> Option<&Enum> {
        match self.index.get(full_name)? {
            EntityRef::Enum { file, index } => Some(&self.files[*file].enums[*index]),
            EntityRef::Message { .. } => None,
        }
    }

    /// Packages of the files `package` imports, excluding itself.
    ///
    /// One entry per import edge, so duplicates are possible; callers
    /// deduplicate.
    pub fn imported_packages<'a>(&'a self, package: &Package<'a>) -> GenResult<Vec<&'a str>> {
        let mut imported = Vec::new();

        for file in package.files() {
            for dep in &file.dependencies {
                let dep_file = self.file(dep).ok_or_else(|| {
                    GenError::InvalidSchema(format!(
                        "`{}` imports `{dep}`, which is missing from the descriptors",
                        file.name
                    ))
                })?;
                if dep_file.package != package.name() {
                    imported.push(dep_file.package.as_str());
                }
            }
        }

        Ok(imported)
    }

    fn check_references(&self) -> GenResult<()> {
        for file in &self.files {
            for message in &file.messages {
                for field in &message.fields {
                    self.check_kind(&message.full_name, &field.kind)?;
                }
            }
        }
        Ok(())
    }

    fn check_kind(&self, entity: &str, kind: &FieldKind) -> GenResult<()> {
        let unresolved = |type_name: &str| GenError::UnresolvedType {
            entity: entity.to_string(),
            type_name: type_name.to_string(),
        };

        match kind {
            FieldKind::Scalar(_) => Ok(()),
            FieldKind::Message(name) => self.message(name).map(|_| ()).ok_or_else(|| unresolved(name)),
            FieldKind::Enum(name) => self
                .enumeration(name)
                .map(|_| ())
                .ok_or_else(|| unresolved(name)),
            FieldKind::Map { key, value } => {
                self.check_kind(entity, key)?;
                self.check_kind(entity, value)
            }
        }
    }
}

fn relative_name<'a>(full_name: &'a str, package: &str) -> &'a str {
    let name = full_name.trim_start_matches('.');
    if package.is_empty() {
        return name;
    }
    name.strip_prefix(package)
        .and_then(|rest| rest.strip_prefix('.'))
        .unwrap_or(name)
}

fn qualify(scope: &str, name: &str) -> String {
    if scope.is_empty() {
        format!(".{name}")
    } else {
        format!("{scope}.{name}")
    }
}

fn package_scope(package: &str) -> String {
    if package.is_empty() {
        String::new()
    } else {
        format!(".{package}")
    }
}

/// Map entry full name → (key field, value field)
type MapEntries = HashMap<String, (FieldDescriptorProto, FieldDescriptorProto)>;

fn collect_map_entries(files: &[FileDescriptorProto]) -> MapEntries {
    fn walk(scope: &str, messages: &[DescriptorProto], out: &mut MapEntries) {
        for msg in messages {
            let full_name = qualify(scope, msg.name());
            let is_entry = msg.options.as_ref().is_some_and(|o| o.map_entry());
            if is_entry {
                let key = msg.field.iter().find(|f| f.number() == 1);
                let value = msg.field.iter().find(|f| f.number() == 2);
                if let (Some(key), Some(value)) = (key, value) {
                    out.insert(full_name.clone(), (key.clone(), value.clone()));
                }
            }
            walk(&full_name, &msg.nested_type, out);
        }
    }

    let mut entries = HashMap::new();
    for file in files {
        walk(&package_scope(file.package()), &file.message_type, &mut entries);
    }
    entries
}

fn is_proto3(file: &FileDescriptorProto) -> bool {
    file.syntax() == "proto3"
}

fn convert_file(file: &FileDescriptorProto, maps: &MapEntries) -> GenResult<SchemaFile> {
    let mut out = SchemaFile {
        name: file.name().to_string(),
        package: file.package().to_string(),
        dependencies: file.dependency.clone(),
        messages: Vec::new(),
        enums: Vec::new(),
    };
    let scope = package_scope(file.package());

    for e in &file.enum_type {
        let converted = convert_enum(&scope, None, e, &out);
        out.enums.push(converted);
    }

    let proto3 = is_proto3(file);
    for m in &file.message_type {
        convert_message(&scope, None, m, proto3, maps, &mut out)?;
    }

    Ok(out)
}

fn convert_enum(
    scope: &str,
    parent: Option<&str>,
    desc: &EnumDescriptorProto,
    file: &SchemaFile,
) -> Enum {
    Enum {
        name: desc.name().to_string(),
        full_name: qualify(scope, desc.name()),
        package: file.package.clone(),
        file: file.name.clone(),
        parent: parent.map(String::from),
        values: desc
            .value
            .iter()
            .map(|v| EnumValue {
                name: v.name().to_string(),
                number: v.number(),
            })
            .collect(),
    }
}

fn convert_message(
    scope: &str,
    parent: Option<&str>,
    desc: &DescriptorProto,
    proto3: bool,
    maps: &MapEntries,
    out: &mut SchemaFile,
) -> GenResult<()> {
    let full_name = qualify(scope, desc.name());

    if maps.contains_key(&full_name) {
        return Ok(());
    }

    // Oneof declarations with at least one member that is not proto3 optional
    let mut real_oneofs: Vec<(usize, OneOf)> = Vec::new();
    for (decl_idx, decl) in desc.oneof_decl.iter().enumerate() {
        let is_real = desc
            .field
            .iter()
            .any(|f| f.oneof_index == Some(decl_idx as i32) && !f.proto3_optional());
        if is_real {
            real_oneofs.push((
                decl_idx,
                OneOf {
                    name: decl.name().to_string(),
                    fields: Vec::new(),
                },
            ));
        }
    }

    let mut fields = Vec::with_capacity(desc.field.len());
    for (pos, fd) in desc.field.iter().enumerate() {
        let oneof = if fd.proto3_optional() {
            None
        } else {
            fd.oneof_index
                .and_then(|decl| real_oneofs.iter().position(|(d, _)| *d as i32 == decl))
        };
        if let Some(i) = oneof {
            real_oneofs[i].1.fields.push(pos);
        }

        fields.push(Field {
            name: fd.name().to_string(),
            number: fd.number(),
            kind: field_kind(fd, maps),
            cardinality: cardinality(fd, proto3),
            oneof,
        });
    }

    out.messages.push(Message {
        name: desc.name().to_string(),
        full_name: full_name.clone(),
        package: out.package.clone(),
        file: out.name.clone(),
        parent: parent.map(String::from),
        fields,
        oneofs: real_oneofs.into_iter().map(|(_, o)| o).collect(),
    });

    for e in &desc.enum_type {
        let converted = convert_enum(&full_name, Some(&full_name), e, out);
        out.enums.push(converted);
    }

    for nested in &desc.nested_type {
        convert_message(&full_name, Some(&full_name), nested, proto3, maps, out)?;
    }

    Ok(())
}

fn field_kind(fd: &FieldDescriptorProto, maps: &MapEntries) -> FieldKind {
    match fd.r#type() {
        ProtoType::Message => {
            let type_name = fd.type_name().to_string();
            match maps.get(&type_name) {
                Some((key, value)) if fd.label() == Label::Repeated => FieldKind::Map {
                    key: Box::new(field_kind(key, maps)),
                    value: Box::new(field_kind(value, maps)),
                },
                _ => FieldKind::Message(type_name),
            }
        }
        ProtoType::Enum => FieldKind::Enum(fd.type_name().to_string()),
        other => FieldKind::Scalar(other),
    }
}

fn cardinality(fd: &FieldDescriptorProto, proto3: bool) -> Cardinality {
    match fd.label() {
        Label::Repeated => Cardinality::Repeated,
        Label::Optional if fd.proto3_optional() => Cardinality::Optional,
        Label::Optional if !proto3 && fd.oneof_index.is_none() => Cardinality::Optional,
        _ => Cardinality::Singular,
    }
}
