//! Whole-program discovery of the entity and method instantiations reachable from the entry point.
//!
//! Discovery order is observable: it fixes descriptor indices and the layout
//! of the function section.

use std::collections::VecDeque;

use indexmap::{IndexMap, IndexSet};

use super::entry::Entry;
use super::generator::{Generator, Label, Relocatable};
use super::invariants::{not_a_class, not_an_entity_type, static_call_without_body, unknown_static_callee};
use super::selector::{Selector, SelectorKind};
use crate::analysis::{AnalysisResults, Statement};
use crate::instantiation::{CodegenItem, EntityItem, Instantiation, MethodItem};
use crate::interner::Symbol;
use crate::program::{EntityKind, Program, Type};

/// Name of the method run when an instance of a class is collected.
pub const FINALISER_NAME: &str = "final";

/// The closed set of reachable items.
#[derive(Debug)]
pub struct Reachability {
    /// Insertion order is descriptor index order.
    pub entities: IndexMap<EntityItem, EntityReachability>,
    /// Selectors mentioned by dynamic calls and field accesses.
    pub selectors: IndexSet<Selector>,
}

#[derive(Debug)]
pub struct EntityReachability {
    pub descriptor: Relocatable,
    pub methods: IndexMap<MethodItem, MethodReachability>,
    pub finaliser: Option<MethodItem>,
}

#[derive(Debug)]
pub struct MethodReachability {
    /// `None` for methods without a body.
    pub label: Option<Label>,
}

impl Reachability {
    /// Discover everything reachable from `entry`, reserving a descriptor slot
    /// per entity and a label per method with a body.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn compute(
        program: &Program,
        analysis: &AnalysisResults,
        generator: &mut Generator,
        entry: &Entry,
    ) -> Self {
        let mut discovery = Discovery {
            program,
            analysis,
            generator,
            finaliser_name: program.interner().lookup(FINALISER_NAME),
            result: Reachability {
                entities: IndexMap::new(),
                selectors: IndexSet::new(),
            },
            queue: VecDeque::new(),
        };

        discovery.add_entity(entry.class.clone());
        discovery.add_method(entry.main.clone());
        while let Some(item) = discovery.queue.pop_front() {
            discovery.visit_method(&item);
        }

        let result = discovery.result;
        tracing::debug!(
            entities = result.entities.len(),
            selectors = result.selectors.len(),
            "reachability closed"
        );
        result
    }

    pub fn entity(&self, item: &EntityItem) -> &EntityReachability {
        self.ensure_entity(item)
    }

    pub fn method(&self, program: &Program, item: &MethodItem) -> &MethodReachability {
        self.ensure_method(&owner_of(program, item), item)
    }

    /// Code label of a reachable method with a body.
    pub fn method_label(&self, program: &Program, item: &MethodItem) -> Label {
        self.method(program, item).ensure_label(item)
    }

    pub fn descriptor_index(&self, item: &EntityItem) -> Option<usize> {
        self.entities.get_index_of(item)
    }
}

/// The entity item owning `item`, under the entity's share of the instantiation.
pub fn owner_of(program: &Program, item: &MethodItem) -> EntityItem {
    let entity = program.entity(item.definition.entity);
    CodegenItem::new(
        item.definition.entity,
        item.instantiation.restrict(&entity.generics),
    )
}

/// The entity item a fully substituted entity type denotes.
pub fn entity_item_of(program: &Program, ty: &Type) -> EntityItem {
    let Some(et) = ty.as_entity() else {
        not_an_entity_type(program, ty);
    };
    let entity = program.entity(et.entity);
    CodegenItem::new(et.entity, Instantiation::new(&entity.generics, &et.arguments))
}

/// Resolve a static call written inside a method generated under `instantiation`.
pub fn static_callee(
    program: &Program,
    instantiation: &Instantiation,
    entity: &Type,
    method: Symbol,
    type_arguments: &[Type],
) -> MethodItem {
    let owner = entity_item_of(program, &instantiation.apply(entity));
    let Some(id) = program.lookup_method(owner.definition, method) else {
        unknown_static_callee(program, &owner, method);
    };
    let generics = &program.method(id).signature.generics;
    let callee_inst = owner
        .instantiation
        .extend(generics, &instantiation.apply_list(type_arguments));
    CodegenItem::new(id, callee_inst)
}

struct Discovery<'a> {
    program: &'a Program,
    analysis: &'a AnalysisResults,
    generator: &'a mut Generator,
    finaliser_name: Option<Symbol>,
    result: Reachability,
    queue: VecDeque<MethodItem>,
}

impl Discovery<'_> {
    fn add_entity(&mut self, item: EntityItem) {
        if self.result.entities.contains_key(&item) {
            return;
        }

        let program = self.program;
        let descriptor = self.generator.create_relocatable();
        tracing::trace!(
            entity = %program.display_entity(item.definition, &item.instantiation),
            index = self.result.entities.len(),
            "entity reachable"
        );
        self.result.entities.insert(
            item.clone(),
            EntityReachability {
                descriptor,
                methods: IndexMap::new(),
                finaliser: None,
            },
        );

        let entity = program.entity(item.definition);
        for supertype in &entity.supertypes {
            self.add_type(&item.instantiation.apply(supertype));
        }
        for field in &entity.fields {
            self.add_type(&item.instantiation.apply(&field.ty));
        }

        if entity.kind != EntityKind::Interface {
            let selectors: Vec<_> = self
                .result
                .selectors
                .iter()
                .filter(|s| s.kind == SelectorKind::Method)
                .cloned()
                .collect();
            for selector in &selectors {
                self.add_selector_target(&item, selector);
            }
        }
    }

    fn add_type(&mut self, ty: &Type) {
        if ty.as_entity().is_some() {
            self.add_entity(entity_item_of(self.program, ty));
        }
    }

    fn add_method(&mut self, item: MethodItem) {
        let program = self.program;
        let owner = owner_of(program, &item);
        self.add_entity(owner.clone());

        if self.result.ensure_entity(&owner).methods.contains_key(&item) {
            return;
        }

        let method = program.method(item.definition);
        let label = method.has_body().then(|| self.generator.create_label());
        tracing::trace!(
            entity = %program.display_entity(owner.definition, &owner.instantiation),
            method = program.resolve(method.name.symbol),
            "method reachable"
        );

        self.result
            .ensure_entity_mut(&owner)
            .methods
            .insert(item.clone(), MethodReachability { label });
        if label.is_some() {
            self.queue.push_back(item);
        }
    }

    fn add_selector(&mut self, selector: Selector) {
        if !self.result.selectors.insert(selector.clone()) {
            return;
        }
        if selector.kind != SelectorKind::Method {
            return;
        }

        let program = self.program;
        let targets: Vec<_> = self
            .result
            .entities
            .keys()
            .filter(|e| program.entity(e.definition).kind != EntityKind::Interface)
            .cloned()
            .collect();
        for target in &targets {
            self.add_selector_target(target, &selector);
        }
    }

    /// Make the method `entity` answers `selector` with reachable, if it has one.
    fn add_selector_target(&mut self, entity: &EntityItem, selector: &Selector) {
        let program = self.program;
        let Some(id) = program.lookup_method(entity.definition, selector.name) else {
            return;
        };
        let generics = &program.method(id).signature.generics;
        if generics.len() != selector.type_arguments.len() {
            return;
        }

        let instantiation = entity.instantiation.extend(generics, &selector.type_arguments);
        self.add_method(CodegenItem::new(id, instantiation));
    }

    fn add_finaliser(&mut self, class: &EntityItem) {
        let program = self.program;
        let Some(name) = self.finaliser_name else {
            return;
        };
        if self.result.ensure_entity(class).finaliser.is_some() {
            return;
        }
        let Some(id) = program.lookup_method(class.definition, name) else {
            return;
        };
        let signature = &program.method(id).signature;
        if !program.method(id).has_body()
            || !signature.arguments.is_empty()
            || !signature.generics.is_empty()
        {
            return;
        }

        let item = CodegenItem::new(id, class.instantiation.clone());
        self.add_method(item.clone());
        self.result.ensure_entity_mut(class).finaliser = Some(item);
    }

    fn visit_method(&mut self, item: &MethodItem) {
        let program = self.program;
        let results = self.analysis;
        let analysis = results.ensure_function(item.definition);
        let inst = &item.instantiation;

        for stmt in analysis.ir.blocks.iter().flat_map(|b| &b.statements) {
            match stmt {
                Statement::New { class, .. } => {
                    let class = entity_item_of(program, &inst.apply(class));
                    if program.entity(class.definition).kind != EntityKind::Class {
                        not_a_class(program, &class);
                    }
                    self.add_entity(class.clone());
                    self.add_finaliser(&class);
                }
                Statement::Call {
                    method,
                    type_arguments,
                    ..
                } => {
                    self.add_selector(Selector::method(*method, inst.apply_list(type_arguments)));
                }
                Statement::StaticCall {
                    entity,
                    method,
                    type_arguments,
                    ..
                } => {
                    let callee = static_callee(program, inst, entity, *method, type_arguments);
                    if !program.method(callee.definition).has_body() {
                        static_call_without_body(program, &callee);
                    }
                    self.add_method(callee);
                }
                Statement::ReadField { field, .. } | Statement::WriteField { field, .. } => {
                    self.add_selector(Selector::field(*field));
                }
                Statement::TypeTest { ty, .. } => {
                    self.add_entity(entity_item_of(program, &inst.apply(ty)));
                }
                Statement::Integer { .. }
                | Statement::String { .. }
                | Statement::Unit { .. }
                | Statement::Copy { .. } => {}
            }
        }
    }
}
