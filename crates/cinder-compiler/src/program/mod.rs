//! Validated program model consumed by code generation.
//!
//! Declarations live in arenas owned by [`Program`] and are referred to by
//! copyable ids. Ids stand in for declaration identity everywhere downstream.

mod types;


use std::collections::HashMap;

use rowan::TextRange;

use crate::instantiation::Instantiation;
use crate::interner::{Interner, Symbol};

pub use types::{EntityType, Type};

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct EntityId(pub(crate) u32);

/// A method, identified by its owning entity and declaration position.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct MethodId {
    pub entity: EntityId,
    pub index: u32,
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct TypeParamId(pub(crate) u32);

/// A declared name with its source location, if known.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Name {
    pub symbol: Symbol,
    pub range: Option<TextRange>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EntityKind {
    Class,
    Interface,
    Primitive,
}

#[derive(Clone, Debug)]
pub struct Entity {
    pub name: Name,
    pub kind: EntityKind,
    pub generics: Vec<TypeParamId>,
    pub supertypes: Vec<Type>,
    pub fields: Vec<Field>,
    pub methods: Vec<Method>,
}

#[derive(Clone, Debug)]
pub struct Field {
    pub name: Name,
    pub ty: Type,
}

#[derive(Clone, Debug)]
pub struct Method {
    pub name: Name,
    pub signature: FnSignature,
    /// `None` for abstract and natively provided methods.
    pub body: Option<Body>,
}

#[derive(Clone, Debug)]
pub struct FnSignature {
    pub generics: Vec<TypeParamId>,
    pub receiver: Option<Type>,
    pub arguments: Vec<Type>,
    pub return_type: Type,
}

/// Marker for a method that has code. The analysed IR lives in `AnalysisResults`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Body {
    pub range: Option<TextRange>,
}

#[derive(Clone, Debug)]
pub struct TypeParam {
    pub name: Symbol,
}

impl Method {
    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }
}

/// The whole compiled unit.
#[derive(Debug, Default)]
pub struct Program {
    entities: Vec<Entity>,
    type_params: Vec<TypeParam>,
    interner: Interner,
    entity_index: HashMap<Symbol, EntityId>,
    source: Option<String>,
}

impl Program {
    pub fn new(source: Option<String>) -> Self {
        Self {
            source,
            ..Self::default()
        }
    }

    pub fn intern(&mut self, s: &str) -> Symbol {
        self.interner.intern(s)
    }

    pub fn resolve(&self, sym: Symbol) -> &str {
        self.interner.resolve(sym)
    }

    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    /// Source text the name ranges point into.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn add_type_param(&mut self, name: Symbol) -> TypeParamId {
        let id = TypeParamId(self.type_params.len() as u32);
        self.type_params.push(TypeParam { name });
        id
    }

    /// Add an entity. Returns `None` if an entity with the same name exists.
    pub fn add_entity(&mut self, entity: Entity) -> Option<EntityId> {
        if self.entity_index.contains_key(&entity.name.symbol) {
            return None;
        }
        let id = EntityId(self.entities.len() as u32);
        self.entity_index.insert(entity.name.symbol, id);
        self.entities.push(entity);
        Some(id)
    }

    pub fn entity(&self, id: EntityId) -> &Entity {
        &self.entities[id.0 as usize]
    }

    pub fn entity_mut(&mut self, id: EntityId) -> &mut Entity {
        &mut self.entities[id.0 as usize]
    }

    pub fn entities(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.entities
            .iter()
            .enumerate()
            .map(|(i, e)| (EntityId(i as u32), e))
    }

    pub fn type_param(&self, id: TypeParamId) -> &TypeParam {
        &self.type_params[id.0 as usize]
    }

    /// Look up a top-level entity by name.
    pub fn find_entity(&self, name: &str) -> Option<EntityId> {
        let sym = self.interner.lookup(name)?;
        self.entity_index.get(&sym).copied()
    }

    pub fn method(&self, id: MethodId) -> &Method {
        &self.entity(id.entity).methods[id.index as usize]
    }

    /// Look up a member method by name.
    pub fn lookup_method(&self, entity: EntityId, name: Symbol) -> Option<MethodId> {
        self.entity(entity)
            .methods
            .iter()
            .position(|m| m.name.symbol == name)
            .map(|index| MethodId {
                entity,
                index: index as u32,
            })
    }

    /// Look up a member method by its string name.
    pub fn find_method(&self, entity: EntityId, name: &str) -> Option<MethodId> {
        let sym = self.interner.lookup(name)?;
        self.lookup_method(entity, sym)
    }

    /// Look up a member field by name.
    pub fn lookup_field(&self, entity: EntityId, name: Symbol) -> Option<&Field> {
        self.entity(entity).fields.iter().find(|f| f.name.symbol == name)
    }

    /// Render a type, e.g. `Box[U64]`.
    pub fn display_type(&self, ty: &Type) -> String {
        match ty {
            Type::Unit => "Unit".to_string(),
            Type::Param(param) => self.resolve(self.type_param(*param).name).to_string(),
            Type::Entity(et) => {
                let name = self.resolve(self.entity(et.entity).name.symbol);
                if et.arguments.is_empty() {
                    return name.to_string();
                }
                let args: Vec<_> = et.arguments.iter().map(|a| self.display_type(a)).collect();
                format!("{name}[{}]", args.join(", "))
            }
        }
    }

    /// Render an entity under an instantiation of its type parameters.
    pub fn display_entity(&self, entity: EntityId, instantiation: &Instantiation) -> String {
        let arguments = self
            .entity(entity)
            .generics
            .iter()
            .map(|&p| instantiation.apply(&Type::Param(p)))
            .collect();
        self.display_type(&Type::entity(entity, arguments))
    }
}
