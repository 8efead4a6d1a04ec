//! Test helpers and shared interchange fixtures.

use cinder_bytecode::{Colors, Image, dump};
use indoc::indoc;

use crate::analysis::AnalysisResults;
use crate::codegen::codegen;
use crate::context::Context;
use crate::diagnostics::Diagnostics;
use crate::interchange::load_program;
use crate::program::Program;

/// `Main` with an empty `main`.
pub const MINIMAL: &str = indoc! {r#"
    {"entities": [
      {"name": "Main", "methods": [
        {"name": "main", "body": {"blocks": [{"terminator": {"return": null}}]}}
      ]}
    ]}
"#};

/// Dynamic dispatch through an interface, a finaliser and a generic class
/// instantiated twice.
pub const SHAPES: &str = indoc! {r#"
    {"entities": [
      {"name": "U64", "kind": "primitive"},
      {"name": "Shape", "kind": "interface", "methods": [
        {"name": "area", "receiver": {"entity": {"name": "Shape"}}, "return": {"entity": {"name": "U64"}}}
      ]},
      {"name": "Square", "supertypes": [{"entity": {"name": "Shape"}}],
       "fields": [{"name": "side", "type": {"entity": {"name": "U64"}}}],
       "methods": [
         {"name": "area", "receiver": {"entity": {"name": "Square"}}, "return": {"entity": {"name": "U64"}},
          "body": {"parameters": [0], "blocks": [
            {"statements": [{"op": "read_field", "output": 1, "base": 0, "field": "side"}],
             "terminator": {"return": 1}}
          ]}},
         {"name": "final", "receiver": {"entity": {"name": "Square"}},
          "body": {"parameters": [0], "blocks": [{"terminator": {"return": null}}]}}
       ]},
      {"name": "Box", "generics": ["T"],
       "fields": [{"name": "value", "type": {"param": "T"}}],
       "methods": [
         {"name": "get", "receiver": {"entity": {"name": "Box", "args": [{"param": "T"}]}}, "return": {"param": "T"},
          "body": {"parameters": [0], "blocks": [
            {"statements": [{"op": "read_field", "output": 1, "base": 0, "field": "value"}],
             "terminator": {"return": 1}}
          ]}}
       ]},
      {"name": "Main", "methods": [
        {"name": "main", "body": {"blocks": [
          {"statements": [
            {"op": "new", "output": 0, "class": {"entity": {"name": "Square"}}},
            {"op": "call", "output": 1, "receiver": 0, "method": "area"},
            {"op": "new", "output": 2, "class": {"entity": {"name": "Box", "args": [{"entity": {"name": "U64"}}]}}},
            {"op": "new", "output": 3, "class": {"entity": {"name": "Box", "args": [{"entity": {"name": "Square"}}]}}},
            {"op": "call", "output": 4, "receiver": 2, "method": "get"}
          ], "terminator": {"return": null}}
        ]}}
      ]}
    ]}
"#};

pub fn load(json: &str) -> (Program, AnalysisResults) {
    load_program(json).unwrap_or_else(|e| panic!("test program failed to load: {e}"))
}

/// Run codegen, returning the raw image and the reported diagnostics.
pub fn compile(json: &str) -> (Vec<u8>, Diagnostics) {
    let (program, analysis) = load(json);
    let mut ctx = Context::new();
    let bytes = codegen(&mut ctx, &program, &analysis);
    (bytes, ctx.into_diagnostics())
}

/// Run codegen on a program expected to be valid and decode the result.
pub fn compile_image(json: &str) -> Image {
    let (bytes, diagnostics) = compile(json);
    assert!(
        diagnostics.is_empty(),
        "unexpected diagnostics: {}",
        diagnostics.printer().render()
    );
    Image::load(&bytes).unwrap_or_else(|e| panic!("emitted image does not load: {e}"))
}

pub fn compile_dump(json: &str) -> String {
    dump(&compile_image(json), Colors::OFF)
}
