//! Type expressions as they appear in signatures, member declarations and method bodies.

use super::{EntityId, TypeParamId};

/// A type expression.
///
/// After substitution by a complete instantiation a type contains no `Param`.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Type {
    /// The canonical unit type.
    Unit,
    Entity(EntityType),
    Param(TypeParamId),
}

/// An entity applied to type arguments, e.g. `Box[U64]`.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct EntityType {
    pub entity: EntityId,
    pub arguments: Vec<Type>,
}

impl Type {
    pub fn entity(entity: EntityId, arguments: Vec<Type>) -> Self {
        Self::Entity(EntityType { entity, arguments })
    }

    pub fn is_unit(&self) -> bool {
        matches!(self, Self::Unit)
    }

    pub fn as_entity(&self) -> Option<&EntityType> {
        match self {
            Self::Entity(ty) => Some(ty),
            _ => None,
        }
    }
}
