//! Bytecode generation: entry resolution, reachability, selector numbering
//! and emission of the final image.
//!
//! Image layout: header, then one descriptor per reachable entity in
//! discovery order, then one function record per reachable method with a body.

mod descriptor;
mod entry;
mod function;
mod generator;
mod invariants;
mod reachability;
mod selector;

#[cfg(test)]
mod codegen_tests;
#[cfg(test)]
mod reachability_tests;
#[cfg(test)]
mod selector_tests;

use descriptor::emit_descriptor;
use function::FunctionEmitter;
use invariants::ensure_u16;

pub use entry::{Entry, MAIN_CLASS, MAIN_METHOD, find_entry, is_valid_main_signature};
pub use generator::{Generator, Label, Relocatable};
pub use reachability::{
    EntityReachability, FINALISER_NAME, MethodReachability, Reachability, owner_of,
};
pub use selector::{Selector, SelectorKind, SelectorTable};

use crate::analysis::AnalysisResults;
use crate::context::Context;
use crate::program::Program;

/// Generate the bytecode image for `program`.
///
/// Returns an empty buffer if the entry point is unusable; the reason is
/// reported to `ctx`'s diagnostics.
#[tracing::instrument(level = "debug", skip_all)]
pub fn codegen(ctx: &mut Context, program: &Program, analysis: &AnalysisResults) -> Vec<u8> {
    let Some(entry) = find_entry(ctx, program) else {
        return Vec::new();
    };

    let mut generator = Generator::new();
    let reachability = Reachability::compute(program, analysis, &mut generator, &entry);
    let selectors = SelectorTable::build(program, &reachability);

    emit_program_header(&mut generator, program, &reachability, &entry);
    emit_descriptors(&mut generator, program, &reachability, &selectors);
    emit_functions(&mut generator, program, analysis, &reachability, &selectors);

    let image = generator.finish();
    tracing::debug!(bytes = image.len(), "image emitted");
    image
}

fn emit_program_header(
    generator: &mut Generator,
    program: &Program,
    reachability: &Reachability,
    entry: &Entry,
) {
    generator.label(reachability.method_label(program, &entry.main));
    generator.u16(ensure_u16(reachability.entities.len(), "descriptor count"));
}

fn emit_descriptors(
    generator: &mut Generator,
    program: &Program,
    reachability: &Reachability,
    selectors: &SelectorTable,
) {
    for (index, (item, info)) in reachability.entities.iter().enumerate() {
        generator.define_relocatable(info.descriptor, index as u32);
        emit_descriptor(generator, program, reachability, selectors, item, info);
    }
}

fn emit_functions(
    generator: &mut Generator,
    program: &Program,
    analysis: &AnalysisResults,
    reachability: &Reachability,
    selectors: &SelectorTable,
) {
    let mut emitter = FunctionEmitter {
        generator,
        program,
        reachability,
        selectors,
    };

    for info in reachability.entities.values() {
        for (item, method) in &info.methods {
            let Some(label) = method.label else {
                continue;
            };
            let function = analysis.ensure_function(item.definition);
            emitter.emit(item, label, function);
        }
    }
}
