//! Per-compilation state shared with the front end.

use crate::diagnostics::Diagnostics;
use crate::program::Type;

/// Compilation context: owns the diagnostics sink for one run.
#[derive(Debug, Default)]
pub struct Context {
    diagnostics: Diagnostics,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    pub fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }

    /// The canonical unit type that `main` must return.
    pub fn unit_type(&self) -> Type {
        Type::Unit
    }
}
