use indoc::indoc;

use super::entry::find_entry;
use super::generator::Generator;
use super::reachability::Reachability;
use super::selector::{Selector, SelectorKind, SelectorTable};
use crate::context::Context;
use crate::program::Program;
use crate::test_utils::{SHAPES, load};

fn table(json: &str) -> (Program, SelectorTable) {
    let (program, analysis) = load(json);
    let mut ctx = Context::new();
    let entry = find_entry(&mut ctx, &program).unwrap();
    let mut generator = Generator::new();
    let reachability = Reachability::compute(&program, &analysis, &mut generator, &entry);
    let selectors = SelectorTable::build(&program, &reachability);
    (program, selectors)
}

fn render(program: &Program, selectors: &SelectorTable) -> String {
    selectors
        .iter()
        .map(|(idx, s)| {
            let kind = match s.kind {
                SelectorKind::Method => "method",
                SelectorKind::Field => "field",
            };
            let mut name = program.resolve(s.name).to_string();
            if !s.type_arguments.is_empty() {
                let args: Vec<_> = s
                    .type_arguments
                    .iter()
                    .map(|t| program.display_type(t))
                    .collect();
                name = format!("{name}[{}]", args.join(", "));
            }
            format!("{idx} {kind} {name}\n")
        })
        .collect()
}

#[test]
fn numbering_follows_entity_layout() {
    let (program, selectors) = table(SHAPES);

    insta::assert_snapshot!(render(&program, &selectors), @r"
    #0 method main
    #1 method final
    #2 method area
    #3 field side
    #4 method get
    #5 field value
    ");
    assert_eq!(selectors.len(), 6);
    assert!(!selectors.is_empty());
}

#[test]
fn lookup_and_get_agree() {
    let (mut program, selectors) = table(SHAPES);
    let area = Selector::method(program.intern("area"), Vec::new());
    let side = Selector::field(program.intern("side"));

    assert_eq!(selectors.lookup(&area), Some(selectors.get(&area)));
    assert_eq!(selectors.get(&side).0, 3);
}

#[test]
fn method_and_field_with_same_name_are_distinct() {
    let (mut program, selectors) = table(SHAPES);
    let name = program.intern("value");

    assert!(selectors.lookup(&Selector::field(name)).is_some());
    assert!(selectors.lookup(&Selector::method(name, Vec::new())).is_none());
}

#[test]
fn method_type_arguments_split_selectors() {
    let json = indoc! {r#"
        {"entities": [
          {"name": "U64", "kind": "primitive"},
          {"name": "Bool", "kind": "primitive"},
          {"name": "Mapper", "methods": [
            {"name": "map", "generics": ["T"], "receiver": {"entity": {"name": "Mapper"}},
             "body": {"parameters": [0], "blocks": [{"terminator": {"return": null}}]}}
          ]},
          {"name": "Main", "methods": [
            {"name": "main", "body": {"blocks": [
              {"statements": [
                {"op": "new", "output": 0, "class": {"entity": {"name": "Mapper"}}},
                {"op": "call", "output": 1, "receiver": 0, "method": "map",
                 "type_arguments": [{"entity": {"name": "U64"}}]},
                {"op": "call", "output": 2, "receiver": 0, "method": "map",
                 "type_arguments": [{"entity": {"name": "Bool"}}]}
              ], "terminator": {"return": null}}
            ]}}
          ]}
        ]}
    "#};
    let (program, selectors) = table(json);

    insta::assert_snapshot!(render(&program, &selectors), @r"
    #0 method main
    #1 method map[U64]
    #2 method map[Bool]
    ");
}

#[test]
#[should_panic(expected = "no index for")]
fn get_of_unreachable_selector_panics() {
    let (mut program, selectors) = table(SHAPES);
    let name = program.intern("missing");
    selectors.get(&Selector::method(name, Vec::new()));
}
