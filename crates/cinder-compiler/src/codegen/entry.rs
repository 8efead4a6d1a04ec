//! Program entry point resolution: `Main.main`.

use crate::context::Context;
use crate::diagnostics::DiagnosticKind;
use crate::instantiation::{CodegenItem, EntityItem, Instantiation, MethodItem};
use crate::program::{EntityKind, FnSignature, Name, Program};

pub const MAIN_CLASS: &str = "Main";
pub const MAIN_METHOD: &str = "main";

/// The root of the reachability walk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub class: EntityItem,
    pub main: MethodItem,
}

/// Locate `Main.main`, reporting exactly one diagnostic if it is unusable.
pub fn find_entry(ctx: &mut Context, program: &Program) -> Option<Entry> {
    let Some(class_id) = program.find_entity(MAIN_CLASS) else {
        ctx.diagnostics_mut()
            .report_global(DiagnosticKind::NoMainClass)
            .emit();
        return None;
    };
    let class = program.entity(class_id);

    if class.kind != EntityKind::Class {
        report_at_name(ctx, DiagnosticKind::MainNotAClass, &class.name)
            .message(kind_name(class.kind))
            .emit();
        return None;
    }

    if !class.generics.is_empty() {
        report_at_name(ctx, DiagnosticKind::MainClassIsGeneric, &class.name).emit();
        return None;
    }

    let Some(method_id) = program.find_method(class_id, MAIN_METHOD) else {
        report_at_name(ctx, DiagnosticKind::NoMainMethod, &class.name).emit();
        return None;
    };
    let method = program.method(method_id);

    if !is_valid_main_signature(ctx, &method.signature) {
        report_at_name(ctx, DiagnosticKind::InvalidMainSignature, &method.name)
            .message("expected `main()` returning unit")
            .emit();
        return None;
    }

    tracing::debug!("entry point resolved");
    Some(Entry {
        class: CodegenItem::new(class_id, Instantiation::empty()),
        main: CodegenItem::new(method_id, Instantiation::empty()),
    })
}

/// `main` takes nothing and returns unit.
pub fn is_valid_main_signature(ctx: &Context, signature: &FnSignature) -> bool {
    signature.generics.is_empty()
        && signature.receiver.is_none()
        && signature.arguments.is_empty()
        && signature.return_type == ctx.unit_type()
}

fn report_at_name<'a>(
    ctx: &'a mut Context,
    kind: DiagnosticKind,
    name: &Name,
) -> crate::diagnostics::DiagnosticBuilder<'a> {
    ctx.diagnostics_mut().report_at(kind, name.range)
}

fn kind_name(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Class => "class",
        EntityKind::Interface => "interface",
        EntityKind::Primitive => "primitive",
    }
}
