//! Default-value generator: `default_<stem>()` per eligible message.

use crate::record::GeneratorRecord;
use crate::typedef::{EntityKind, SlotSource, TypeDef};

/// Whether the message only exists to carry oneof groups
pub fn hosts_only_oneofs(def: &TypeDef) -> bool {
    let slots = def.slots();
    !slots.is_empty() && slots.iter().all(|s| matches!(s.source, SlotSource::OneOf(_)))
}

/// Zero-argument constructor with every slot at its zero value.
///
/// `None` for non-messages and for messages that only host oneofs.
pub fn default_generator(def: &TypeDef) -> Option<GeneratorRecord> {
    if def.kind != EntityKind::Message || hosts_only_oneofs(def) {
        return None;
    }

    let args = def
        .slots()
        .iter()
        .map(|s| s.ty.default_literal())
        .collect::<Option<Vec<_>>>()?;

    Some(GeneratorRecord {
        stem: def.stem.clone(),
        type_name: def.name.clone(),
        args,
    })
}
