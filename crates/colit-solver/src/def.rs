//! Definition identifiers and storage.
//!
//! Container and class types are nominal: `List<Int>` and `Set<Int>` differ
//! because their definitions differ, regardless of structure. A `DefId` is a
//! solver-owned handle into the [`DefinitionStore`], which is populated once
//! during registration and read-only during resolution.

use crate::types::TypeParamInfo;
use colit_common::interner::{Atom, Interner};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU32, Ordering};

/// Solver-owned definition identifier.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DefId(pub u32);

impl DefId {
    /// Sentinel value for invalid `DefId`.
    pub const INVALID: Self = Self(0);

    /// First valid `DefId`.
    pub const FIRST_VALID: u32 = 1;

    pub const fn is_valid(self) -> bool {
        self.0 >= Self::FIRST_VALID
    }
}

/// Kind of type definition.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DefKind {
    /// Generic container definition: `List<E>`, `Set<E>`.
    Container,

    /// Plain nominal class, no type parameters: `MyType`.
    Class,
}

/// Complete information about a type definition.
#[derive(Clone, Debug)]
pub struct DefinitionInfo {
    pub kind: DefKind,

    /// Name of the definition (for diagnostics).
    pub name: Atom,

    /// Type parameters for generic definitions.
    pub type_params: Vec<TypeParamInfo>,

    /// Nominal supertype edge (`List <: Collection`), if any.
    pub extends: Option<DefId>,
}

impl DefinitionInfo {
    pub const fn container(name: Atom, type_params: Vec<TypeParamInfo>) -> Self {
        Self {
            kind: DefKind::Container,
            name,
            type_params,
            extends: None,
        }
    }

    pub const fn class(name: Atom) -> Self {
        Self {
            kind: DefKind::Class,
            name,
            type_params: Vec::new(),
            extends: None,
        }
    }

    pub const fn with_extends(mut self, parent: DefId) -> Self {
        self.extends = Some(parent);
        self
    }
}

/// Storage for type definitions.
///
/// Writes happen during the registration phase; resolution only reads, so
/// the store can be shared across concurrent resolutions without locks.
pub struct DefinitionStore {
    defs: DashMap<u32, DefinitionInfo>,
    next: AtomicU32,
}

impl DefinitionStore {
    pub fn new() -> Self {
        Self {
            defs: DashMap::new(),
            next: AtomicU32::new(DefId::FIRST_VALID),
        }
    }

    /// Register a definition, returning its fresh `DefId`.
    pub fn register(&self, info: DefinitionInfo) -> DefId {
        let id = DefId(self.next.fetch_add(1, Ordering::Relaxed));
        self.defs.insert(id.0, info);
        id
    }

    pub fn get(&self, id: DefId) -> Option<DefinitionInfo> {
        self.defs.get(&id.0).map(|d| d.clone())
    }

    pub fn name_of(&self, id: DefId, strings: &Interner) -> Option<String> {
        self.get(id).and_then(|d| strings.resolve(d.name))
    }

    /// Whether `sub` equals `sup` or reaches it along `extends` edges.
    pub fn is_nominal_subdef(&self, sub: DefId, sup: DefId) -> bool {
        let mut current = sub;
        // extends chains are acyclic by construction; the walk is bounded by
        // the number of definitions as a backstop.
        let mut remaining = self.defs.len() + 1;
        loop {
            if current == sup {
                return true;
            }
            if remaining == 0 {
                return false;
            }
            remaining -= 1;
            match self.get(current).and_then(|d| d.extends) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }
}

impl Default for DefinitionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colit_common::interner::Interner;

    #[test]
    fn nominal_chain_walk() {
        let strings = Interner::new();
        let store = DefinitionStore::new();
        let e = TypeParamInfo::new(strings.intern("E"));
        let collection =
            store.register(DefinitionInfo::container(strings.intern("Collection"), vec![e.clone()]));
        let list = store.register(
            DefinitionInfo::container(strings.intern("List"), vec![e.clone()]).with_extends(collection),
        );
        let set = store.register(DefinitionInfo::container(strings.intern("Set"), vec![e]));

        assert!(store.is_nominal_subdef(list, collection));
        assert!(store.is_nominal_subdef(list, list));
        assert!(!store.is_nominal_subdef(collection, list));
        assert!(!store.is_nominal_subdef(set, collection));
    }
}
