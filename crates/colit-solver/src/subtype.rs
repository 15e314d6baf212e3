//! Ambient subtyping relation.
//!
//! The engine consumes the subtyping/specificity relation from its host; the
//! [`AssignabilityOracle`] trait is that seam. [`StructuralRelation`] is the
//! in-tree default used by tests and by hosts that have no richer relation:
//! reflexive, nominal along `extends` edges, covariant over container
//! applications, contravariant/covariant over function shapes, and tolerant
//! of inference placeholders (bound accumulation happens in the constraint
//! engine, not here).

use crate::def::DefinitionStore;
use crate::intern::TypeInterner;
use crate::types::{TypeData, TypeId};
use colit_common::limits::MAX_SUBTYPE_DEPTH;
use rustc_hash::FxHashSet;

/// Host-supplied subtyping relation.
///
/// `&mut self` so host implementations can cache or collect telemetry, the
/// same way checker-side adapters do.
pub trait AssignabilityOracle {
    fn is_subtype_of(&mut self, sub: TypeId, sup: TypeId) -> bool;
}

/// Default structural relation over the engine's own type representation.
pub struct StructuralRelation<'a> {
    interner: &'a TypeInterner,
    defs: &'a DefinitionStore,
    /// Extra declared edges between intrinsic or nominal types, e.g. a host
    /// that wants `Int <: Double` registers that pair here.
    edges: FxHashSet<(TypeId, TypeId)>,
}

impl<'a> StructuralRelation<'a> {
    pub fn new(interner: &'a TypeInterner, defs: &'a DefinitionStore) -> Self {
        Self {
            interner,
            defs,
            edges: FxHashSet::default(),
        }
    }

    /// Declare `sub <: sup` as an axiom (transitivity is the caller's
    /// responsibility; declare the closure you need).
    pub fn add_edge(&mut self, sub: TypeId, sup: TypeId) {
        self.edges.insert((sub, sup));
    }

    fn check(&self, sub: TypeId, sup: TypeId, depth: u32) -> bool {
        if sub == sup {
            return true;
        }
        if depth > MAX_SUBTYPE_DEPTH {
            return false;
        }
        // Error poisons nothing; Any is top, Never is bottom.
        if sub == TypeId::ERROR || sup == TypeId::ERROR || sup == TypeId::ANY {
            return true;
        }
        if sub == TypeId::NEVER {
            return true;
        }
        if self.edges.contains(&(sub, sup)) {
            return true;
        }

        let (Some(sub_data), Some(sup_data)) = (self.interner.lookup(sub), self.interner.lookup(sup))
        else {
            return false;
        };

        // Placeholders compare permissively; the constraint engine records
        // bounds for them before ever asking the relation.
        if matches!(sub_data, TypeData::Infer(_)) || matches!(sup_data, TypeData::Infer(_)) {
            return true;
        }

        match (&sub_data, &sup_data) {
            (TypeData::Class(d1), TypeData::Class(d2)) => self.defs.is_nominal_subdef(*d1, *d2),
            (TypeData::Application(d1, args1), TypeData::Application(d2, args2)) => {
                self.defs.is_nominal_subdef(*d1, *d2)
                    && args1.len() == args2.len()
                    && args1
                        .iter()
                        .zip(args2.iter())
                        .all(|(&a1, &a2)| self.check(a1, a2, depth + 1))
            }
            (TypeData::Function(f1), TypeData::Function(f2)) => {
                f1.params.len() == f2.params.len()
                    && f1
                        .params
                        .iter()
                        .zip(f2.params.iter())
                        .all(|(&p1, &p2)| self.check(p2, p1, depth + 1))
                    && self.check(f1.ret, f2.ret, depth + 1)
            }
            // A bounded type parameter is a subtype of whatever its bound is.
            (TypeData::TypeParameter(info), _) => match info.constraint {
                Some(bound) => self.check(bound, sup, depth + 1),
                None => false,
            },
            _ => false,
        }
    }
}

impl AssignabilityOracle for StructuralRelation<'_> {
    fn is_subtype_of(&mut self, sub: TypeId, sup: TypeId) -> bool {
        self.check(sub, sup, 0)
    }
}
