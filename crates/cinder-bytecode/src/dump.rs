//! Human-readable image dump for debugging and tests.

use std::fmt::Write as _;

use super::image::{FunctionRecord, Image};
use super::{Colors, DescriptorRecord};

/// Generate a human-readable dump of a decoded image.
pub fn dump(image: &Image, colors: Colors) -> String {
    let mut out = String::new();
    let dw = width_for_count(image.descriptors().len());

    dump_header(&mut out, image, &colors);
    dump_descriptors(&mut out, image, &colors, dw);
    dump_functions(&mut out, image, &colors);

    out
}

/// Number of decimal digits needed to print indices below `count`.
fn width_for_count(count: usize) -> usize {
    if count <= 1 {
        1
    } else {
        ((count - 1) as f64).log10().floor() as usize + 1
    }
}

fn dump_header(out: &mut String, image: &Image, c: &Colors) {
    let header = image.header();

    writeln!(out, "{}[header]{}", c.heading, c.reset).unwrap();
    writeln!(out, "entry       = {:#06x}", header.entry_offset).unwrap();
    writeln!(out, "descriptors = {}", header.descriptor_count).unwrap();
    out.push('\n');
}

fn dump_descriptors(out: &mut String, image: &Image, c: &Colors, dw: usize) {
    writeln!(out, "{}[descriptors]{}", c.heading, c.reset).unwrap();
    for (i, desc) in image.descriptors().iter().enumerate() {
        dump_descriptor(out, i, desc, c, dw);
    }
    out.push('\n');
}

fn dump_descriptor(out: &mut String, index: usize, desc: &DescriptorRecord, c: &Colors, dw: usize) {
    writeln!(
        out,
        "D{index:0dw$} {}{}{} ({})",
        c.name,
        desc.name,
        c.reset,
        desc.kind.as_str()
    )
    .unwrap();
    writeln!(out, "  selectors = {}", desc.selector_count).unwrap();

    for slot in &desc.methods {
        match slot.target {
            Some(target) => writeln!(out, "  method {} -> {target:#06x}", slot.selector).unwrap(),
            None => writeln!(out, "  method {} -> {}native{}", slot.selector, c.muted, c.reset)
                .unwrap(),
        }
    }
    for field in &desc.fields {
        writeln!(out, "  field {field}").unwrap();
    }
    for sup in &desc.supertypes {
        writeln!(out, "  super D{sup:0dw$}").unwrap();
    }
    if let Some(target) = desc.finaliser {
        writeln!(out, "  final {target:#06x}").unwrap();
    }
}

fn dump_functions(out: &mut String, image: &Image, c: &Colors) {
    writeln!(out, "{}[functions]{}", c.heading, c.reset).unwrap();
    for func in image.functions() {
        dump_function(out, func, image.header().entry_offset, c);
    }
}

fn dump_function(out: &mut String, func: &FunctionRecord, entry: u32, c: &Colors) {
    let marker = if func.offset == entry { "  ; entry" } else { "" };
    writeln!(
        out,
        "{}{:#06x}{}: arity={} registers={}{}{marker}{}",
        c.name, func.offset, c.reset, func.arity, func.register_count, c.muted, c.reset
    )
    .unwrap();

    for (offset, instr) in &func.instructions {
        writeln!(out, "  {}{offset:#06x}{}  {instr}", c.muted, c.reset).unwrap();
    }
}
