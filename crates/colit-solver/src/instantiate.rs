//! Type parameter substitution.
//!
//! A candidate's free type parameters are replaced with fresh inference
//! placeholders before constraint collection; a factory's element parameter
//! is replaced with the concrete element type during desugaring. Both are the
//! same structural walk over interned types.

use crate::intern::TypeInterner;
use crate::types::{TypeData, TypeId};
use colit_common::interner::Atom;
use rustc_hash::FxHashMap;

/// Mapping from type parameter names to replacement types.
#[derive(Clone, Debug, Default)]
pub struct TypeSubstitution {
    map: FxHashMap<Atom, TypeId>,
}

impl TypeSubstitution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: Atom, ty: TypeId) {
        self.map.insert(name, ty);
    }

    pub fn get(&self, name: Atom) -> Option<TypeId> {
        self.map.get(&name).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }
}

/// Replace type parameters in `ty` according to `subst`.
///
/// Unmapped parameters are left in place. Interned types are immutable, so
/// unchanged subtrees are returned as-is without re-interning.
pub fn instantiate_type(interner: &TypeInterner, ty: TypeId, subst: &TypeSubstitution) -> TypeId {
    if subst.is_empty() {
        return ty;
    }
    match interner.lookup(ty) {
        Some(TypeData::TypeParameter(info)) => subst.get(info.name).unwrap_or(ty),
        Some(TypeData::Application(def, args)) => {
            let new_args: smallvec::SmallVec<[TypeId; 1]> = args
                .iter()
                .map(|&a| instantiate_type(interner, a, subst))
                .collect();
            if new_args == args {
                ty
            } else {
                interner.application(def, new_args)
            }
        }
        Some(TypeData::Function(shape)) => {
            let new_params: Vec<TypeId> = shape
                .params
                .iter()
                .map(|&p| instantiate_type(interner, p, subst))
                .collect();
            let new_ret = instantiate_type(interner, shape.ret, subst);
            if new_ret == shape.ret && new_params.iter().copied().eq(shape.params.iter().copied()) {
                ty
            } else {
                interner.function(new_params, new_ret)
            }
        }
        _ => ty,
    }
}
