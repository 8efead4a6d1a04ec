use cinder_bytecode::{EntityKindTag, Image, Instruction, MethodSlot, Register, SelectorIdx};
use indoc::indoc;

use super::codegen;
use crate::analysis::{AnalysisResults, BasicBlock, FnAnalysis, MethodIr, Terminator};
use crate::context::Context;
use crate::diagnostics::DiagnosticKind;
use crate::program::{
    Body, Entity, EntityKind, Field, FnSignature, Method, MethodId, Name, Program, Type,
};
use crate::test_utils::{MINIMAL, SHAPES, compile, compile_dump, compile_image};

fn r(n: u8) -> Register {
    Register(n)
}

fn instructions(image: &Image, index: usize) -> Vec<Instruction> {
    image.functions()[index]
        .instructions
        .iter()
        .map(|(_, i)| i.clone())
        .collect()
}

#[test]
fn minimal_program() {
    insta::assert_snapshot!(compile_dump(MINIMAL), @r"
    [header]
    entry       = 0x0023
    descriptors = 1

    [descriptors]
    D0 Main (class)
      selectors = 1
      method #0 -> 0x0023

    [functions]
    0x0023: arity=0 registers=0  ; entry
      0x0029  return_unit
    ");
}

#[test]
fn missing_entry_yields_empty_image() {
    let (bytes, diagnostics) = compile(r#"{"entities": []}"#);

    assert!(bytes.is_empty());
    assert_eq!(diagnostics.kinds(), vec![DiagnosticKind::NoMainClass]);
}

#[test]
fn shapes_descriptors() {
    let image = compile_image(SHAPES);
    let names: Vec<_> = image.descriptors().iter().map(|d| d.name.as_str()).collect();

    assert_eq!(image.header().descriptor_count, 6);
    assert_eq!(
        names,
        vec!["Main", "Square", "Shape", "U64", "Box[U64]", "Box[Square]"]
    );
    assert!(image.descriptors().iter().all(|d| d.selector_count == 6));

    let functions = image.functions();
    let (_, square) = image.descriptor_named("Square").unwrap();
    assert_eq!(square.kind, EntityKindTag::Class);
    assert_eq!(square.supertypes, vec![2]);
    assert_eq!(square.fields, vec![SelectorIdx(3)]);
    assert_eq!(
        square.methods,
        vec![
            MethodSlot {
                selector: SelectorIdx(1),
                target: Some(functions[1].offset),
            },
            MethodSlot {
                selector: SelectorIdx(2),
                target: Some(functions[2].offset),
            },
        ]
    );
    assert_eq!(square.finaliser, Some(functions[1].offset));

    let (_, shape) = image.descriptor_named("Shape").unwrap();
    assert_eq!(shape.kind, EntityKindTag::Interface);
    assert!(shape.methods.is_empty());
    assert_eq!(shape.finaliser, None);

    let (_, u64) = image.descriptor_named("U64").unwrap();
    assert_eq!(u64.kind, EntityKindTag::Primitive);

    let (_, boxed) = image.descriptor_named("Box[Square]").unwrap();
    assert_eq!(boxed.fields, vec![SelectorIdx(5)]);
    assert_eq!(boxed.methods[0].target, Some(functions[4].offset));
}

#[test]
fn shapes_functions() {
    let image = compile_image(SHAPES);

    assert_eq!(image.functions().len(), 5);
    assert_eq!(image.entry().offset, image.functions()[0].offset);
    assert_eq!(image.entry().register_count, 5);
    assert_eq!(
        instructions(&image, 0),
        vec![
            Instruction::New {
                dst: r(0),
                descriptor: 1,
            },
            Instruction::Call {
                dst: r(1),
                selector: SelectorIdx(2),
                args: vec![r(0)],
            },
            Instruction::New {
                dst: r(2),
                descriptor: 4,
            },
            Instruction::New {
                dst: r(3),
                descriptor: 5,
            },
            Instruction::Call {
                dst: r(4),
                selector: SelectorIdx(4),
                args: vec![r(2)],
            },
            Instruction::ReturnUnit,
        ]
    );

    let area = &image.functions()[2];
    assert_eq!((area.arity, area.register_count), (1, 2));
    assert_eq!(
        instructions(&image, 2),
        vec![
            Instruction::Load {
                dst: r(1),
                base: r(0),
                selector: SelectorIdx(3),
            },
            Instruction::Return { src: r(1) },
        ]
    );

    // Both instantiations share code shape but not the record.
    assert_eq!(instructions(&image, 3), instructions(&image, 4));
    assert_ne!(image.functions()[3].offset, image.functions()[4].offset);
}

#[test]
fn references_stay_in_range() {
    let image = compile_image(SHAPES);
    let count = image.header().descriptor_count as u32;
    let selector_count = image.descriptors()[0].selector_count;

    for selector in image.referenced_selectors() {
        assert!(selector.0 < selector_count, "{selector} out of range");
    }
    for function in image.functions() {
        for (_, instruction) in &function.instructions {
            if let Some(descriptor) = instruction.descriptor() {
                assert!(descriptor < count);
            }
        }
    }
    for descriptor in image.descriptors() {
        assert!(descriptor.supertypes.iter().all(|&s| s < count));
    }
}

#[test]
fn output_is_deterministic() {
    let (first, _) = compile(SHAPES);
    let (second, _) = compile(SHAPES);

    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn control_flow_and_static_calls() {
    let json = indoc! {r#"
        {"entities": [
          {"name": "U64", "kind": "primitive"},
          {"name": "Main", "methods": [
            {"name": "id", "generics": ["T"], "arguments": [{"param": "T"}], "return": {"param": "T"},
             "body": {"parameters": [0], "blocks": [{"terminator": {"return": 0}}]}},
            {"name": "main", "body": {"blocks": [
              {"statements": [
                {"op": "integer", "output": 0, "value": 1},
                {"op": "static_call", "output": 1, "entity": {"entity": {"name": "Main"}}, "method": "id",
                 "type_arguments": [{"entity": {"name": "U64"}}], "arguments": [0]}
               ],
               "terminator": {"branch": {"condition": 1, "if_true": 1, "if_false": 2}}},
              {"statements": [{"op": "string", "output": 2, "value": "yes"}],
               "terminator": {"jump": 3}},
              {"statements": [{"op": "unit", "output": 3}],
               "terminator": {"jump": 3}},
              {"terminator": {"return": null}}
            ]}}
          ]}
        ]}
    "#};
    let image = compile_image(json);

    // `main` is discovered first, then `id[U64]` through the static call.
    let main = image.entry();
    let id = &image.functions()[1];
    assert_eq!(main.offset, image.functions()[0].offset);
    assert_eq!((id.arity, id.register_count), (1, 1));
    assert_eq!(main.register_count, 4);

    let at = |n: usize| main.instructions[n].0;
    assert_eq!(
        main.instructions.iter().map(|(_, i)| i.clone()).collect::<Vec<_>>(),
        vec![
            Instruction::LoadI64 {
                dst: r(0),
                value: 1,
            },
            Instruction::StaticCall {
                dst: r(1),
                target: id.offset,
                args: vec![r(0)],
            },
            Instruction::JumpIf {
                cond: r(1),
                target: at(4),
            },
            Instruction::Jump { target: at(6) },
            Instruction::LoadStr {
                dst: r(2),
                value: "yes".to_string(),
            },
            Instruction::Jump { target: at(7) },
            Instruction::Unit { dst: r(3) },
            Instruction::ReturnUnit,
        ]
    );
    assert_eq!(main.end, id.offset);
}

#[test]
fn fields_and_type_tests() {
    let json = indoc! {r#"
        {"entities": [
          {"name": "Cell", "fields": [{"name": "value", "type": "unit"}]},
          {"name": "Main", "methods": [
            {"name": "main", "body": {"blocks": [
              {"statements": [
                {"op": "new", "output": 0, "class": {"entity": {"name": "Cell"}}},
                {"op": "integer", "output": 1, "value": 5},
                {"op": "write_field", "output": 2, "base": 0, "field": "value", "input": 1},
                {"op": "type_test", "output": 3, "input": 0, "type": {"entity": {"name": "Cell"}}},
                {"op": "copy", "output": 4, "input": 3}
              ], "terminator": {"return": 4}}
            ]}}
          ]}
        ]}
    "#};
    let image = compile_image(json);

    assert_eq!(
        instructions(&image, 0),
        vec![
            Instruction::New {
                dst: r(0),
                descriptor: 1,
            },
            Instruction::LoadI64 {
                dst: r(1),
                value: 5,
            },
            Instruction::Store {
                dst: r(2),
                base: r(0),
                selector: SelectorIdx(1),
                src: r(1),
            },
            Instruction::TypeTest {
                dst: r(3),
                src: r(0),
                descriptor: 1,
            },
            Instruction::Copy {
                dst: r(4),
                src: r(3),
            },
            Instruction::Return { src: r(4) },
        ]
    );
}

#[test]
fn body_less_methods_have_no_target() {
    let json = indoc! {r#"
        {"entities": [
          {"name": "Console", "methods": [
            {"name": "print", "receiver": {"entity": {"name": "Console"}}}
          ]},
          {"name": "Main", "methods": [
            {"name": "main", "body": {"blocks": [
              {"statements": [
                {"op": "new", "output": 0, "class": {"entity": {"name": "Console"}}},
                {"op": "call", "output": 1, "receiver": 0, "method": "print"}
              ], "terminator": {"return": null}}
            ]}}
          ]}
        ]}
    "#};
    let image = compile_image(json);
    let (_, console) = image.descriptor_named("Console").unwrap();

    assert_eq!(
        console.methods,
        vec![MethodSlot {
            selector: SelectorIdx(1),
            target: None,
        }]
    );
    assert_eq!(image.functions().len(), 1);
}

fn class(program: &mut Program, name: &str) -> Entity {
    Entity {
        name: Name {
            symbol: program.intern(name),
            range: None,
        },
        kind: EntityKind::Class,
        generics: Vec::new(),
        supertypes: Vec::new(),
        fields: Vec::new(),
        methods: Vec::new(),
    }
}

#[test]
#[should_panic(expected = "descriptor count")]
fn descriptor_count_overflow_panics() {
    // `Main` plus one class per field: one more descriptor than a u16 can count.
    let mut program = Program::new(None);
    let mut fields = Vec::new();
    for i in 0..u16::MAX {
        let entity = class(&mut program, &format!("C{i}"));
        let id = program.add_entity(entity).unwrap();
        fields.push(Field {
            name: Name {
                symbol: program.intern(&format!("f{i}")),
                range: None,
            },
            ty: Type::entity(id, Vec::new()),
        });
    }

    let mut main = class(&mut program, "Main");
    main.fields = fields;
    main.methods.push(Method {
        name: Name {
            symbol: program.intern("main"),
            range: None,
        },
        signature: FnSignature {
            generics: Vec::new(),
            receiver: None,
            arguments: Vec::new(),
            return_type: Type::Unit,
        },
        body: Some(Body::default()),
    });
    let main_id = program.add_entity(main).unwrap();

    let mut analysis = AnalysisResults::new();
    analysis.insert(
        MethodId {
            entity: main_id,
            index: 0,
        },
        FnAnalysis::new(MethodIr {
            parameters: Vec::new(),
            blocks: vec![BasicBlock {
                statements: Vec::new(),
                terminator: Terminator::Return(None),
            }],
        }),
    );

    codegen(&mut Context::new(), &program, &analysis);
}
