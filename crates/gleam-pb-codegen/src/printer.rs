//! Printer generator: `show_<stem>` per entity.

use crate::record::{EnumPrinterRecord, PrinterRecord};
use crate::typedef::{GleamType, TypeDef};

/// Show helper applied to a slot of type `ty`
pub fn show_function(ty: &GleamType) -> &'static str {
    match ty.kind() {
        Some(kind) => kind.show_function(),
        None => "primitive_show_inspect",
    }
}

/// Printer producing `["<pkg>.<Type>", "(", field, ", ", ..., ")"]`
pub fn message_printer(def: &TypeDef, package_label: &str) -> PrinterRecord {
    PrinterRecord {
        stem: def.stem.clone(),
        type_name: def.name.clone(),
        label: format!("{package_label}.{}", def.name),
        fields: def
            .slots()
            .iter()
            .map(|s| format!("{}(a.{})", show_function(&s.ty), s.label))
            .collect(),
    }
}

/// Printer mapping each constructor to `"<pkg>.<Constructor>"`
pub fn enum_printer(def: &TypeDef, package_label: &str) -> EnumPrinterRecord {
    EnumPrinterRecord {
        stem: def.stem.clone(),
        type_name: def.name.clone(),
        arms: def
            .constructors
            .iter()
            .map(|c| (c.name.clone(), format!("{package_label}.{}", c.name)))
            .collect(),
    }
}
