//! Generic substitutions and the (declaration, instantiation) identity keys.
//!
//! A [`CodegenItem`] names "this declaration under this concrete substitution".
//! The same declaration under two instantiations is two distinct items, each
//! with its own descriptor slot or code label.

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::program::{EntityId, MethodId, Type, TypeParamId};

/// An immutable mapping from type parameters to concrete types.
///
/// Cloning is cheap; equality and hashing are structural.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct Instantiation(Rc<BTreeMap<TypeParamId, Type>>);

impl Instantiation {
    /// The neutral, no-substitution instantiation.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Bind `params` to `arguments` pairwise.
    pub fn new(params: &[TypeParamId], arguments: &[Type]) -> Self {
        Self::empty().extend(params, arguments)
    }

    /// A copy of `self` with `params` additionally bound to `arguments`.
    pub fn extend(&self, params: &[TypeParamId], arguments: &[Type]) -> Self {
        if params.is_empty() {
            return self.clone();
        }
        Self::ensure_arity(params, arguments);

        let mut map = (*self.0).clone();
        map.extend(params.iter().copied().zip(arguments.iter().cloned()));
        Self(Rc::new(map))
    }

    /// Keep only the bindings for `params`.
    pub fn restrict(&self, params: &[TypeParamId]) -> Self {
        if params.len() == self.0.len() && params.iter().all(|p| self.0.contains_key(p)) {
            return self.clone();
        }
        let map = params
            .iter()
            .filter_map(|p| self.0.get(p).map(|ty| (*p, ty.clone())))
            .collect();
        Self(Rc::new(map))
    }

    pub fn get(&self, param: TypeParamId) -> Option<&Type> {
        self.0.get(&param)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Substitute every type parameter in `ty`.
    ///
    /// # Panics
    /// Panics if `ty` mentions a parameter this instantiation does not bind.
    pub fn apply(&self, ty: &Type) -> Type {
        match ty {
            Type::Unit => Type::Unit,
            Type::Param(param) => self.ensure_bound(*param).clone(),
            Type::Entity(et) => Type::entity(et.entity, self.apply_list(&et.arguments)),
        }
    }

    pub fn apply_list(&self, types: &[Type]) -> Vec<Type> {
        types.iter().map(|ty| self.apply(ty)).collect()
    }
}

/// A declaration paired with the instantiation it is generated under.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct CodegenItem<D> {
    pub definition: D,
    pub instantiation: Instantiation,
}

pub type EntityItem = CodegenItem<EntityId>;
pub type MethodItem = CodegenItem<MethodId>;

impl<D> CodegenItem<D> {
    pub fn new(definition: D, instantiation: Instantiation) -> Self {
        Self {
            definition,
            instantiation,
        }
    }
}
