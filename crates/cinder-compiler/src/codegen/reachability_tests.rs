use indoc::indoc;

use super::entry::find_entry;
use super::generator::Generator;
use super::reachability::Reachability;
use crate::context::Context;
use crate::instantiation::{CodegenItem, Instantiation};
use crate::program::Program;
use crate::test_utils::{SHAPES, load};

fn reach(json: &str) -> (Program, Reachability) {
    let (program, analysis) = load(json);
    let mut ctx = Context::new();
    let entry = find_entry(&mut ctx, &program).unwrap();
    let mut generator = Generator::new();
    let reachability = Reachability::compute(&program, &analysis, &mut generator, &entry);
    (program, reachability)
}

fn entity_names(program: &Program, reachability: &Reachability) -> Vec<String> {
    reachability
        .entities
        .keys()
        .map(|e| program.display_entity(e.definition, &e.instantiation))
        .collect()
}

/// `Entity.method` for every reachable method, in layout order.
fn method_names(program: &Program, reachability: &Reachability) -> Vec<String> {
    reachability
        .entities
        .iter()
        .flat_map(|(e, info)| {
            let owner = program.display_entity(e.definition, &e.instantiation);
            info.methods.keys().map(move |m| {
                let name = program.resolve(program.method(m.definition).name.symbol);
                format!("{owner}.{name}")
            })
        })
        .collect()
}

#[test]
fn discovery_order() {
    let (program, reachability) = reach(SHAPES);

    assert_eq!(
        entity_names(&program, &reachability),
        vec!["Main", "Square", "Shape", "U64", "Box[U64]", "Box[Square]"]
    );
    assert_eq!(
        method_names(&program, &reachability),
        vec![
            "Main.main",
            "Square.final",
            "Square.area",
            "Box[U64].get",
            "Box[Square].get",
        ]
    );
}

#[test]
fn instantiations_get_distinct_slots() {
    let (program, reachability) = reach(SHAPES);

    let boxes: Vec<_> = reachability
        .entities
        .iter()
        .filter(|(e, _)| program.resolve(program.entity(e.definition).name.symbol) == "Box")
        .collect();
    assert_eq!(boxes.len(), 2);
    assert_ne!(boxes[0].1.descriptor, boxes[1].1.descriptor);

    let labels: Vec<_> = boxes
        .iter()
        .flat_map(|(_, info)| info.methods.values().map(|m| m.label.unwrap()))
        .collect();
    assert_eq!(labels.len(), 2);
    assert_ne!(labels[0], labels[1]);
}

#[test]
fn finaliser_recorded_for_instantiated_class() {
    let (program, reachability) = reach(SHAPES);
    let square = program.find_entity("Square").unwrap();

    let (_, info) = reachability
        .entities
        .iter()
        .find(|(e, _)| e.definition == square)
        .unwrap();
    let finaliser = info.finaliser.as_ref().unwrap();
    assert_eq!(finaliser.definition, program.find_method(square, "final").unwrap());
    assert!(info.methods[finaliser].label.is_some());
}

#[test]
fn interfaces_get_no_methods() {
    let (program, reachability) = reach(SHAPES);
    let shape = program.find_entity("Shape").unwrap();

    let (_, info) = reachability
        .entities
        .iter()
        .find(|(e, _)| e.definition == shape)
        .unwrap();
    assert!(info.methods.is_empty());
    assert!(info.finaliser.is_none());
}

#[test]
fn selector_before_entity() {
    // `run` is called before `Job` is instantiated; Job.run must still be found.
    let json = indoc! {r#"
        {"entities": [
          {"name": "Job", "methods": [
            {"name": "run", "receiver": {"entity": {"name": "Job"}},
             "body": {"parameters": [0], "blocks": [{"terminator": {"return": null}}]}}
          ]},
          {"name": "Main", "methods": [
            {"name": "main", "body": {"blocks": [
              {"statements": [
                {"op": "unit", "output": 0},
                {"op": "call", "output": 1, "receiver": 0, "method": "run"},
                {"op": "new", "output": 2, "class": {"entity": {"name": "Job"}}}
              ], "terminator": {"return": null}}
            ]}}
          ]}
        ]}
    "#};
    let (program, reachability) = reach(json);

    assert_eq!(
        method_names(&program, &reachability),
        vec!["Main.main", "Job.run"]
    );
}

#[test]
fn body_less_method_gets_no_label() {
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
    let (program, reachability) = reach(json);

    assert_eq!(
        method_names(&program, &reachability),
        vec!["Main.main", "Console.print"]
    );
    let console = reachability.entities.get_index(1).unwrap().1;
    assert!(console.methods.values().all(|m| m.label.is_none()));
}

#[test]
fn generic_method_instantiations_are_distinct() {
    let json = indoc! {r#"
        {"entities": [
          {"name": "U64", "kind": "primitive"},
          {"name": "Bool", "kind": "primitive"},
          {"name": "Main", "methods": [
            {"name": "id", "generics": ["T"], "arguments": [{"param": "T"}], "return": {"param": "T"},
             "body": {"parameters": [0], "blocks": [
               {"statements": [{"op": "type_test", "output": 1, "input": 0, "type": {"param": "T"}}],
                "terminator": {"return": 0}}
             ]}},
            {"name": "main", "body": {"blocks": [
              {"statements": [
                {"op": "integer", "output": 0, "value": 1},
                {"op": "static_call", "output": 1, "entity": {"entity": {"name": "Main"}}, "method": "id",
                 "type_arguments": [{"entity": {"name": "U64"}}], "arguments": [0]},
                {"op": "static_call", "output": 2, "entity": {"entity": {"name": "Main"}}, "method": "id",
                 "type_arguments": [{"entity": {"name": "Bool"}}], "arguments": [0]},
                {"op": "static_call", "output": 3, "entity": {"entity": {"name": "Main"}}, "method": "id",
                 "type_arguments": [{"entity": {"name": "U64"}}], "arguments": [0]}
              ], "terminator": {"return": null}}
            ]}}
          ]}
        ]}
    "#};
    let (program, reachability) = reach(json);

    // Type tests inside each instantiation reach the substituted type.
    assert_eq!(
        entity_names(&program, &reachability),
        vec!["Main", "U64", "Bool"]
    );
    let main = reachability.entities.get_index(0).unwrap().1;
    assert_eq!(main.methods.len(), 3);
    let labels: Vec<_> = main.methods.values().map(|m| m.label.unwrap()).collect();
    assert_ne!(labels[1], labels[2]);
}

#[test]
fn compute_is_deterministic() {
    let (program, first) = reach(SHAPES);
    let (_, second) = reach(SHAPES);

    assert_eq!(
        first.entities.keys().collect::<Vec<_>>(),
        second.entities.keys().collect::<Vec<_>>()
    );
    let descriptors = |r: &Reachability| r.entities.values().map(|e| e.descriptor).collect::<Vec<_>>();
    assert_eq!(descriptors(&first), descriptors(&second));
    assert_eq!(
        method_names(&program, &first),
        method_names(&program, &second)
    );
}

#[test]
#[should_panic(expected = "has no body")]
fn static_call_to_body_less_method_panics() {
    let json = indoc! {r#"
        {"entities": [
          {"name": "Main", "methods": [
            {"name": "native"},
            {"name": "main", "body": {"blocks": [
              {"statements": [
                {"op": "static_call", "output": 0, "entity": {"entity": {"name": "Main"}}, "method": "native"}
              ], "terminator": {"return": null}}
            ]}}
          ]}
        ]}
    "#};
    reach(json);
}

#[test]
#[should_panic(expected = "has no method `missing`")]
fn static_call_to_unknown_method_panics() {
    let json = indoc! {r#"
        {"entities": [
          {"name": "Main", "methods": [
            {"name": "main", "body": {"blocks": [
              {"statements": [
                {"op": "static_call", "output": 0, "entity": {"entity": {"name": "Main"}}, "method": "missing"}
              ], "terminator": {"return": null}}
            ]}}
          ]}
        ]}
    "#};
    reach(json);
}

#[test]
#[should_panic(expected = "non-class")]
fn new_of_interface_panics() {
    let json = indoc! {r#"
        {"entities": [
          {"name": "Shape", "kind": "interface"},
          {"name": "Main", "methods": [
            {"name": "main", "body": {"blocks": [
              {"statements": [{"op": "new", "output": 0, "class": {"entity": {"name": "Shape"}}}],
               "terminator": {"return": null}}
            ]}}
          ]}
        ]}
    "#};
    reach(json);
}

#[test]
#[should_panic(expected = "expected an entity type")]
fn type_test_against_unit_panics() {
    let json = indoc! {r#"
        {"entities": [
          {"name": "Main", "methods": [
            {"name": "main", "body": {"blocks": [
              {"statements": [
                {"op": "unit", "output": 0},
                {"op": "type_test", "output": 1, "input": 0, "type": "unit"}
              ], "terminator": {"return": null}}
            ]}}
          ]}
        ]}
    "#};
    reach(json);
}

#[test]
fn entity_lookup_for_mutation() {
    let (program, mut reachability) = reach(SHAPES);
    let main = CodegenItem::new(program.find_entity("Main").unwrap(), Instantiation::empty());

    assert_eq!(reachability.ensure_entity_mut(&main).methods.len(), 1);
}

#[test]
#[should_panic(expected = "was never discovered")]
fn undiscovered_entity_panics() {
    let (program, mut reachability) = reach(SHAPES);
    // Only `Box[U64]` and `Box[Square]` were reached, never the unsubstituted `Box`.
    let generic_box = CodegenItem::new(program.find_entity("Box").unwrap(), Instantiation::empty());

    reachability.ensure_entity_mut(&generic_box);
}
