//! Invariant checks excluded from coverage reports.

#![cfg_attr(coverage_nightly, coverage(off))]

use cinder_bytecode::SelectorIdx;

use super::generator::{Generator, Label, Relocatable};
use super::reachability::{EntityReachability, MethodReachability, Reachability};
use super::selector::{Selector, SelectorTable};
use crate::instantiation::{EntityItem, MethodItem};
use crate::interner::Symbol;
use crate::program::{Program, Type};

impl Generator {
    pub(super) fn ensure_offset(position: usize) -> u32 {
        u32::try_from(position)
            .unwrap_or_else(|_| panic!("Generator: offset {position} exceeds u32 range"))
    }

    pub(super) fn ensure_str_len(value: &str) -> u16 {
        u16::try_from(value.len()).unwrap_or_else(|_| {
            panic!(
                "Generator: string of {} bytes exceeds u16 length prefix",
                value.len()
            )
        })
    }

    pub(super) fn ensure_label_undefined(&self, label: Label) {
        if self.labels[label.0 as usize].is_some() {
            panic!("Generator: {label:?} defined twice");
        }
    }

    pub(super) fn ensure_relocatable_undefined(&self, relocatable: Relocatable) {
        if self.relocatables[relocatable.0 as usize].is_some() {
            panic!("Generator: {relocatable:?} defined twice");
        }
    }

    pub(super) fn ensure_label_defined(&self, label: Label) -> u32 {
        self.labels[label.0 as usize]
            .unwrap_or_else(|| panic!("Generator: {label:?} referenced but never defined"))
    }

    pub(super) fn ensure_relocatable_defined(&self, relocatable: Relocatable) -> u32 {
        self.relocatables[relocatable.0 as usize].unwrap_or_else(|| {
            panic!("Generator: {relocatable:?} referenced but never defined")
        })
    }
}

impl Reachability {
    pub(super) fn ensure_entity(&self, item: &EntityItem) -> &EntityReachability {
        self.entities
            .get(item)
            .unwrap_or_else(|| panic!("Reachability: entity {item:?} was never discovered"))
    }

    pub(super) fn ensure_entity_mut(&mut self, item: &EntityItem) -> &mut EntityReachability {
        self.entities
            .get_mut(item)
            .unwrap_or_else(|| panic!("Reachability: entity {item:?} was never discovered"))
    }

    pub(super) fn ensure_method(&self, owner: &EntityItem, item: &MethodItem) -> &MethodReachability {
        self.ensure_entity(owner)
            .methods
            .get(item)
            .unwrap_or_else(|| panic!("Reachability: method {item:?} was never discovered"))
    }
}

impl MethodReachability {
    pub(super) fn ensure_label(&self, item: &MethodItem) -> Label {
        self.label
            .unwrap_or_else(|| panic!("Reachability: {item:?} has no body and cannot be called"))
    }
}

impl SelectorTable {
    pub(super) fn ensure_selector(&self, selector: &Selector) -> SelectorIdx {
        self.lookup(selector)
            .unwrap_or_else(|| panic!("SelectorTable: no index for {selector:?}"))
    }
}

pub(super) fn ensure_u16(value: usize, what: &str) -> u16 {
    u16::try_from(value).unwrap_or_else(|_| panic!("{what}: {value} exceeds u16 range"))
}

pub(super) fn ensure_u8(value: usize, what: &str) -> u8 {
    u8::try_from(value).unwrap_or_else(|_| panic!("{what}: {value} exceeds u8 range"))
}

pub(super) fn not_an_entity_type(program: &Program, ty: &Type) -> ! {
    panic!(
        "Reachability: expected an entity type, found `{}`",
        program.display_type(ty)
    )
}

pub(super) fn not_a_class(program: &Program, item: &EntityItem) -> ! {
    panic!(
        "Reachability: `new` of non-class `{}`",
        program.display_entity(item.definition, &item.instantiation)
    )
}

pub(super) fn unknown_static_callee(program: &Program, owner: &EntityItem, method: Symbol) -> ! {
    panic!(
        "Reachability: `{}` has no method `{}`",
        program.display_entity(owner.definition, &owner.instantiation),
        program.resolve(method)
    )
}

pub(super) fn static_call_without_body(program: &Program, callee: &MethodItem) -> ! {
    panic!(
        "Reachability: static call to `{}` which has no body",
        program.resolve(program.method(callee.definition).name.symbol)
    )
}
