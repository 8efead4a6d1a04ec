//! Dense numbering of dispatch selectors shared by descriptors and call sites.

use cinder_bytecode::SelectorIdx;
use indexmap::IndexSet;

use super::reachability::Reachability;
use crate::instantiation::MethodItem;
use crate::interner::Symbol;
use crate::program::{Program, Type};

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum SelectorKind {
    Method,
    Field,
}

/// What a dynamic call site or field access dispatches on.
///
/// Method type arguments are part of the key: `map[U64]` and `map[Bool]` are
/// distinct selectors.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Selector {
    pub kind: SelectorKind,
    pub name: Symbol,
    pub type_arguments: Vec<Type>,
}

impl Selector {
    pub fn method(name: Symbol, type_arguments: Vec<Type>) -> Self {
        Self {
            kind: SelectorKind::Method,
            name,
            type_arguments,
        }
    }

    pub fn field(name: Symbol) -> Self {
        Self {
            kind: SelectorKind::Field,
            name,
            type_arguments: Vec::new(),
        }
    }

    /// The selector a method item answers to.
    pub fn of_method(program: &Program, item: &MethodItem) -> Self {
        let method = program.method(item.definition);
        let type_arguments = method
            .signature
            .generics
            .iter()
            .map(|&p| item.instantiation.apply(&Type::Param(p)))
            .collect();
        Self::method(method.name.symbol, type_arguments)
    }
}

/// Selector numbering for one compilation.
#[derive(Debug, Default)]
pub struct SelectorTable {
    selectors: IndexSet<Selector>,
}

impl SelectorTable {
    /// Number selectors in first-seen order: per reachable entity its methods
    /// then its fields, then the selectors only mentioned at call sites.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn build(program: &Program, reachability: &Reachability) -> Self {
        let mut selectors = IndexSet::new();

        for (entity_item, entity) in &reachability.entities {
            for method_item in entity.methods.keys() {
                selectors.insert(Selector::of_method(program, method_item));
            }
            for field in &program.entity(entity_item.definition).fields {
                selectors.insert(Selector::field(field.name.symbol));
            }
        }
        selectors.extend(reachability.selectors.iter().cloned());

        tracing::debug!(count = selectors.len(), "selector table built");
        Self { selectors }
    }

    pub fn lookup(&self, selector: &Selector) -> Option<SelectorIdx> {
        self.selectors
            .get_index_of(selector)
            .map(|i| SelectorIdx(i as u32))
    }

    /// Index of `selector`.
    ///
    /// # Panics
    /// Panics if the selector was not part of the reachable set.
    pub fn get(&self, selector: &Selector) -> SelectorIdx {
        self.ensure_selector(selector)
    }

    pub fn len(&self) -> u32 {
        self.selectors.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SelectorIdx, &Selector)> {
        self.selectors
            .iter()
            .enumerate()
            .map(|(i, s)| (SelectorIdx(i as u32), s))
    }
}
