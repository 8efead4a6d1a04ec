//! Descriptor emission for reachable entities.

use cinder_bytecode::{EntityKindTag, NO_TARGET};

use super::generator::Generator;
use super::invariants::ensure_u16;
use super::reachability::{EntityReachability, Reachability, entity_item_of};
use super::selector::{Selector, SelectorTable};
use crate::instantiation::EntityItem;
use crate::program::{EntityKind, Program};

pub(super) fn emit_descriptor(
    generator: &mut Generator,
    program: &Program,
    reachability: &Reachability,
    selectors: &SelectorTable,
    item: &EntityItem,
    info: &EntityReachability,
) {
    let entity = program.entity(item.definition);

    generator.str(&program.display_entity(item.definition, &item.instantiation));
    generator.u8(kind_tag(entity.kind) as u8);
    generator.u32(selectors.len());

    generator.u16(ensure_u16(info.methods.len(), "descriptor methods"));
    for (method, reach) in &info.methods {
        generator.selector(selectors.get(&Selector::of_method(program, method)));
        match reach.label {
            Some(label) => generator.label(label),
            None => generator.u32(NO_TARGET),
        }
    }

    generator.u16(ensure_u16(entity.fields.len(), "descriptor fields"));
    for field in &entity.fields {
        generator.selector(selectors.get(&Selector::field(field.name.symbol)));
    }

    generator.u16(ensure_u16(entity.supertypes.len(), "descriptor supertypes"));
    for supertype in &entity.supertypes {
        let supertype = entity_item_of(program, &item.instantiation.apply(supertype));
        generator.relocatable(reachability.entity(&supertype).descriptor);
    }

    match &info.finaliser {
        Some(finaliser) => generator.label(reachability.method_label(program, finaliser)),
        None => generator.u32(NO_TARGET),
    }
}

fn kind_tag(kind: EntityKind) -> EntityKindTag {
    match kind {
        EntityKind::Class => EntityKindTag::Class,
        EntityKind::Interface => EntityKindTag::Interface,
        EntityKind::Primitive => EntityKindTag::Primitive,
    }
}
