//! Name interning for entities, members and type parameters.

use indexmap::IndexSet;

use crate::invariants::ensure_symbol_index;

/// Handle to an interned name. Ordered by first interning, not by spelling.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Symbol(u32);

impl Symbol {
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

/// Every distinct name seen while loading a program.
///
/// The set's insertion index is the symbol, so one table serves both
/// directions.
#[derive(Debug, Clone, Default)]
pub struct Interner {
    names: IndexSet<Box<str>>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, name: &str) -> Symbol {
        if let Some(index) = self.names.get_index_of(name) {
            return Symbol(index as u32);
        }
        let (index, _) = self.names.insert_full(name.into());
        Symbol(ensure_symbol_index(index))
    }

    /// Symbol for `name` if it was interned, without inserting it.
    pub fn lookup(&self, name: &str) -> Option<Symbol> {
        self.names.get_index_of(name).map(|i| Symbol(i as u32))
    }

    /// # Panics
    /// Panics if `sym` came from another interner.
    pub fn resolve(&self, sym: Symbol) -> &str {
        Self::ensure_symbol(self.names.get_index(sym.0 as usize).map(|n| &**n), sym)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
