//! Callable signatures and overload sets.
//!
//! The signature table is populated once during registration and read-only
//! thereafter. Overload sets are keyed by callee name; their order carries no
//! semantic weight.

use crate::types::{TypeId, TypeParamInfo};
use colit_common::interner::Atom;
use dashmap::DashMap;
use smallvec::SmallVec;
use std::sync::atomic::{AtomicU32, Ordering};

/// Signature identifier within one [`SignatureTable`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SigId(pub u32);

/// Whether a parameter binds exactly one argument or absorbs the rest.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ParamArity {
    Fixed,
    Variadic,
}

/// One declared parameter: its type expression and arity marker. For a
/// variadic parameter the type is the per-argument element type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParamDecl {
    pub ty: TypeId,
    pub arity: ParamArity,
}

impl ParamDecl {
    pub const fn fixed(ty: TypeId) -> Self {
        Self {
            ty,
            arity: ParamArity::Fixed,
        }
    }

    pub const fn variadic(ty: TypeId) -> Self {
        Self {
            ty,
            arity: ParamArity::Variadic,
        }
    }
}

/// A callable signature. Immutable once registered.
#[derive(Clone, Debug)]
pub struct CallableSignature {
    pub name: Atom,
    pub params: Vec<ParamDecl>,
    pub ret: TypeId,
    pub type_params: Vec<TypeParamInfo>,
}

impl CallableSignature {
    pub fn new(name: Atom, params: Vec<ParamDecl>, ret: TypeId) -> Self {
        Self {
            name,
            params,
            ret,
            type_params: Vec::new(),
        }
    }

    pub fn generic(
        name: Atom,
        type_params: Vec<TypeParamInfo>,
        params: Vec<ParamDecl>,
        ret: TypeId,
    ) -> Self {
        Self {
            name,
            params,
            ret,
            type_params,
        }
    }

    /// Argument count bounds: (minimum, maximum if bounded).
    pub fn arg_count_bounds(&self) -> (usize, Option<usize>) {
        let variadic = self.params.iter().any(|p| p.arity == ParamArity::Variadic);
        let fixed = self
            .params
            .iter()
            .filter(|p| p.arity == ParamArity::Fixed)
            .count();
        (fixed, if variadic { None } else { Some(fixed) })
    }

    /// Declared type for the argument at `index`, expanding a trailing
    /// variadic parameter over the remaining positions.
    pub fn param_type_at(&self, index: usize) -> Option<TypeId> {
        if index < self.params.len() {
            let decl = &self.params[index];
            return Some(decl.ty);
        }
        match self.params.last() {
            Some(last) if last.arity == ParamArity::Variadic => Some(last.ty),
            _ => None,
        }
    }
}

/// Overload sets by callable name.
pub struct SignatureTable {
    sigs: DashMap<u32, CallableSignature>,
    by_name: DashMap<Atom, SmallVec<[SigId; 4]>>,
    next: AtomicU32,
}

impl SignatureTable {
    pub fn new() -> Self {
        Self {
            sigs: DashMap::new(),
            by_name: DashMap::new(),
            next: AtomicU32::new(0),
        }
    }

    pub fn register(&self, sig: CallableSignature) -> SigId {
        let id = SigId(self.next.fetch_add(1, Ordering::Relaxed));
        self.by_name.entry(sig.name).or_default().push(id);
        self.sigs.insert(id.0, sig);
        id
    }

    pub fn get(&self, id: SigId) -> Option<CallableSignature> {
        self.sigs.get(&id.0).map(|s| s.clone())
    }

    /// The overload set registered under `name` (empty if unknown).
    pub fn overloads(&self, name: Atom) -> SmallVec<[SigId; 4]> {
        self.by_name
            .get(&name)
            .map(|ids| ids.clone())
            .unwrap_or_default()
    }
}

impl Default for SignatureTable {
    fn default() -> Self {
        Self::new()
    }
}
