//! Cinder compiler back end: turns a validated, analysed program into a
//! bytecode image.
//!
//! This crate provides:
//! - `program` - the declaration model (entities, methods, types)
//! - `analysis` - per-method IR and register assignment
//! - `interchange` - JSON loader producing both of the above
//! - `instantiation` - (declaration, substitution) identity keys
//! - `codegen` - reachability, selector table and image emission
//! - `diagnostics` - user-facing error reporting

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod analysis;
pub mod codegen;
pub mod context;
pub mod diagnostics;
pub mod instantiation;
pub mod interchange;
pub mod interner;
pub mod program;

mod invariants;

#[cfg(test)]
pub mod test_utils;

pub use analysis::{AnalysisResults, FnAnalysis};
pub use codegen::codegen;
pub use context::Context;
pub use diagnostics::{DiagnosticKind, Diagnostics, DiagnosticsPrinter, Severity};
pub use interchange::{InterchangeError, load_program};
pub use program::Program;
