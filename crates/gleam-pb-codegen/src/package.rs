//! Package orchestrator.
//!
//! A [`PackageBuilder`] collects everything generated for one proto package.
//! The per-entity generators are driven through it in a fixed order and it is
//! finished exactly once, after which the package can be rendered.

use crate::bridge::{self, BridgeSpec};
use crate::defaults;
use crate::naming;
use crate::printer;
use crate::record::{EnumPrinterRecord, GeneratorRecord, PackageRecord, PrinterRecord, TypeRecord};
use crate::typedef::{self, RefKind, TypeDef, TypeRef};
use gleam_pb_core::{Enum, GenError, GenResult, Message, Package, Schema};
use std::collections::HashMap;
use tracing::debug;

/// Modules every generated file imports, in this order
pub const BASELINE_IMPORTS: &[&str] = &[
    "gleam/option",
    "gleam/list",
    "gleam/pair",
    "gleam/dynamic",
    "gleam/erlang/atom",
    "gleam_pb",
    "gleam/string",
];

/// Deduplicated module paths in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSet {
    paths: Vec<String>,
}

impl ImportSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The baseline runtime-support imports
    pub fn baseline() -> Self {
        let mut set = Self::new();
        for path in BASELINE_IMPORTS {
            set.add(path);
        }
        set
    }

    /// Add a module path; empty and already present paths are skipped
    pub fn add(&mut self, path: &str) -> bool {
        if path.is_empty() || self.paths.iter().any(|p| p == path) {
            return false;
        }
        self.paths.push(path.to_string());
        true
    }

    /// Add the module of a foreign proto package
    pub fn add_package(&mut self, package: &str) -> bool {
        self.add(&naming::module_path(package))
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Every import must be reachable under a distinct alias
    pub fn check_aliases(&self, scope: &str) -> GenResult<()> {
        let mut seen: HashMap<&str, &str> = HashMap::new();
        for path in &self.paths {
            let alias = naming::module_alias(path);
            if let Some(first) = seen.insert(alias, path) {
                return Err(GenError::collision(scope, alias, first, path));
            }
        }
        Ok(())
    }
}

/// Typed output of lowering one package
#[derive(Debug, Clone)]
pub struct LoweredPackage {
    pub package: String,
    pub label: String,
    pub module_path: String,
    pub imports: ImportSet,
    pub types: Vec<TypeDef>,
    pub bridges: Vec<BridgeSpec>,
    pub printers: Vec<PrinterRecord>,
    pub enum_printers: Vec<EnumPrinterRecord>,
    pub generators: Vec<GeneratorRecord>,
}

impl LoweredPackage {
    /// Flatten into the record handed to the renderer
    pub fn to_record(&self) -> PackageRecord {
        PackageRecord {
            package: self.package.clone(),
            label: self.label.clone(),
            module_path: self.module_path.clone(),
            imports: self.imports.paths().to_vec(),
            types: self.types.iter().map(type_record).collect(),
            printers: self.printers.clone(),
            enum_printers: self.enum_printers.clone(),
            generators: self.generators.clone(),
            bridges: self.bridges.iter().map(BridgeSpec::to_record).collect(),
        }
    }

    pub fn type_def(&self, name: &str) -> Option<&TypeDef> {
        self.types.iter().find(|t| t.name == name)
    }

    pub fn bridge(&self, stem: &str) -> Option<&BridgeSpec> {
        self.bridges.iter().find(|b| b.stem() == stem)
    }
}

fn type_record(def: &TypeDef) -> TypeRecord {
    TypeRecord {
        name: def.name.clone(),
        constructors: def
            .constructors
            .iter()
            .map(|c| {
                if c.slots.is_empty() {
                    c.name.clone()
                } else {
                    let args: Vec<String> = c
                        .slots
                        .iter()
                        .map(|s| format!("{}: {}", s.label, s.ty.render()))
                        .collect();
                    format!("{}({})", c.name, args.join(", "))
                }
            })
            .collect(),
    }
}

/// Per-package accumulator passed through the generators
#[derive(Debug)]
pub struct PackageBuilder<'a> {
    schema: &'a Schema,
    package: &'a str,
    label: String,
    module_path: String,
    imports: ImportSet,
    types: Vec<TypeDef>,
    bridges: Vec<BridgeSpec>,
    printers: Vec<PrinterRecord>,
    enum_printers: Vec<EnumPrinterRecord>,
    generators: Vec<GeneratorRecord>,
}

impl<'a> PackageBuilder<'a> {
    pub fn new(schema: &'a Schema, package: &'a str) -> GenResult<Self> {
        let module_path = naming::module_path(package);
        if module_path.is_empty() {
            return Err(GenError::InvalidSchema(
                "files without a `package` declaration cannot be generated".into(),
            ));
        }

        Ok(Self {
            schema,
            package,
            label: naming::package_label(package),
            module_path,
            imports: ImportSet::baseline(),
            types: Vec::new(),
            bridges: Vec::new(),
            printers: Vec::new(),
            enum_printers: Vec::new(),
            generators: Vec::new(),
        })
    }

    /// Record an import edge to another proto package
    pub fn import_package(&mut self, package: &str) {
        if package != self.package {
            self.imports.add_package(package);
        }
    }

    /// Resolve a type referenced by `entity`, importing its module if foreign
    pub fn resolve(&mut self, entity: &str, full_name: &str) -> GenResult<TypeRef> {
        let schema = self.schema;
        let (relative, package, kind, symbol) = if let Some(m) = schema.message(full_name) {
            (
                m.relative_name(),
                m.package.as_str(),
                RefKind::Message,
                naming::codec_symbol(&m.full_name).to_string(),
            )
        } else if let Some(e) = schema.enumeration(full_name) {
            let name = naming::type_name(e.relative_name());
            let first = e.values.first().ok_or_else(|| {
                GenError::InvalidSchema(format!("enum `{}` declares no values", e.full_name))
            })?;
            (
                e.relative_name(),
                e.package.as_str(),
                RefKind::Enum {
                    default_constructor: naming::enum_constructor(&name, &first.name),
                },
                String::new(),
            )
        } else {
            return Err(GenError::UnresolvedType {
                entity: entity.to_string(),
                type_name: full_name.to_string(),
            });
        };

        let module = if package == self.package {
            None
        } else {
            let path = naming::module_path(package);
            if path.is_empty() {
                return Err(GenError::InvalidSchema(format!(
                    "`{entity}` references `{full_name}`, declared in a file without a package"
                )));
            }
            self.imports.add(&path);
            Some(naming::module_alias(&path).to_string())
        };

        let name = naming::type_name(relative);
        Ok(TypeRef {
            stem: naming::function_stem(&name),
            name,
            module,
            symbol,
            kind,
        })
    }

    /// Type, bridge and printer of an enum
    pub fn add_enum(&mut self, e: &Enum) -> GenResult<()> {
        debug!(entity = %e.full_name, "lowering enum");

        let def = typedef::enum_type(e)?;
        self.bridges.push(bridge::enum_bridge(&def)?);
        self.enum_printers.push(printer::enum_printer(&def, &self.label));
        self.types.push(def);
        Ok(())
    }

    /// Oneof types and bridges, then the message's type, bridge, printer and
    /// default generator
    pub fn add_message(&mut self, message: &Message) -> GenResult<()> {
        debug!(entity = %message.full_name, "lowering message");

        for oneof in &message.oneofs {
            let def = typedef::oneof_type(self, message, oneof)?;
            self.bridges.push(bridge::oneof_bridge(&def)?);
            self.types.push(def);
        }

        let def = typedef::message_type(self, message)?;
        self.bridges
            .push(bridge::message_bridge(&def, message.is_top_level())?);
        self.printers.push(printer::message_printer(&def, &self.label));
        match defaults::default_generator(&def) {
            Some(generator) => self.generators.push(generator),
            None => debug!(entity = %message.full_name, "no default generator"),
        }
        self.types.push(def);
        Ok(())
    }

    /// Check module-level uniqueness and hand over the result
    pub fn finish(self) -> GenResult<LoweredPackage> {
        let scope = format!("module `{}`", self.module_path);

        let mut type_names: HashMap<&str, &str> = HashMap::new();
        let mut stems: HashMap<&str, &str> = HashMap::new();
        let mut constructors: HashMap<&str, &str> = HashMap::new();
        for def in &self.types {
            if let Some(first) = type_names.insert(&def.name, &def.source) {
                return Err(GenError::collision(&scope, &def.name, first, &def.source));
            }
            if let Some(first) = stems.insert(&def.stem, &def.source) {
                return Err(GenError::collision(&scope, &def.stem, first, &def.source));
            }
            for ctor in &def.constructors {
                if let Some(first) = constructors.insert(&ctor.name, &def.source) {
                    return Err(GenError::collision(&scope, &ctor.name, first, &def.source));
                }
            }
        }
        self.imports.check_aliases(&scope)?;

        Ok(LoweredPackage {
            package: self.package.to_string(),
            label: self.label,
            module_path: self.module_path,
            imports: self.imports,
            types: self.types,
            bridges: self.bridges,
            printers: self.printers,
            enum_printers: self.enum_printers,
            generators: self.generators,
        })
    }
}

/// Lower every entity declared by the package's own files
pub fn lower_package(schema: &Schema, package: &Package<'_>) -> GenResult<LoweredPackage> {
    let mut builder = PackageBuilder::new(schema, package.name())?;

    for imported in schema.imported_packages(package)? {
        builder.import_package(imported);
    }

    for e in package.enums() {
        builder.add_enum(e)?;
    }
    for message in package.messages() {
        builder.add_message(message)?;
    }

    builder.finish()
}
