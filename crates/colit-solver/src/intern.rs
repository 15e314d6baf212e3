//! Type interning.
//!
//! Hash-conses [`TypeData`] into [`TypeId`] handles. The interner is sharded
//! (DashMap) so registration can run from multiple threads; during resolution
//! it is append-only (fresh inference placeholders) and lock-free to read.

use crate::def::{DefId, DefinitionStore};
use crate::types::{FunctionShape, IntrinsicKind, TypeData, TypeId};
use colit_common::interner::Interner;
use dashmap::DashMap;
use smallvec::SmallVec;
use std::sync::atomic::{AtomicU32, Ordering};

/// Global counter for inference placeholder ids.
///
/// Placeholder uniqueness must hold across resolution attempts that share an
/// interner (concurrent attempts over one translation unit), so the counter
/// is process-wide rather than per-interner.
static NEXT_INFER_ID: AtomicU32 = AtomicU32::new(0);

pub struct TypeInterner {
    by_data: DashMap<TypeData, TypeId>,
    by_id: DashMap<u32, TypeData>,
    next: AtomicU32,
}

impl TypeInterner {
    pub fn new() -> Self {
        let interner = Self {
            by_data: DashMap::new(),
            by_id: DashMap::new(),
            next: AtomicU32::new(TypeId::FIRST_INTERNED),
        };
        // Pre-intern intrinsics at their fixed ids so lookup works uniformly.
        for kind in [
            IntrinsicKind::Error,
            IntrinsicKind::Any,
            IntrinsicKind::Never,
            IntrinsicKind::Boolean,
            IntrinsicKind::Int,
            IntrinsicKind::Double,
            IntrinsicKind::String,
        ] {
            let id = kind.type_id();
            interner.by_data.insert(TypeData::Intrinsic(kind), id);
            interner.by_id.insert(id.0, TypeData::Intrinsic(kind));
        }
        interner
    }

    /// Intern structural type data, returning its stable id.
    pub fn intern(&self, data: TypeData) -> TypeId {
        if let Some(existing) = self.by_data.get(&data) {
            return *existing;
        }
        // The reverse mapping is populated under the forward entry's shard
        // guard, so once `intern` returns an id, `lookup` of that id cannot
        // miss — racing interners block on the entry until both maps agree.
        *self.by_data.entry(data.clone()).or_insert_with(|| {
            let id = TypeId(self.next.fetch_add(1, Ordering::Relaxed));
            self.by_id.insert(id.0, data);
            id
        })
    }

    /// Look up the structural data for an interned type.
    pub fn lookup(&self, type_id: TypeId) -> Option<TypeData> {
        self.by_id.get(&type_id.0).map(|d| d.clone())
    }

    /// Intern a nullary nominal type.
    pub fn class(&self, def: DefId) -> TypeId {
        self.intern(TypeData::Class(def))
    }

    /// Intern a generic application such as `List<Int>`.
    pub fn application(&self, def: DefId, args: impl IntoIterator<Item = TypeId>) -> TypeId {
        self.intern(TypeData::Application(def, args.into_iter().collect()))
    }

    /// Intern a function-shaped type.
    pub fn function(&self, params: impl IntoIterator<Item = TypeId>, ret: TypeId) -> TypeId {
        self.intern(TypeData::Function(FunctionShape {
            params: params.into_iter().collect(),
            ret,
        }))
    }

    /// Allocate a fresh, globally unique inference placeholder.
    pub fn fresh_infer(&self) -> TypeId {
        let id = NEXT_INFER_ID.fetch_add(1, Ordering::Relaxed);
        self.intern(TypeData::Infer(id))
    }

    /// The definition a nominal type refers to, if any.
    pub fn def_of(&self, type_id: TypeId) -> Option<DefId> {
        match self.lookup(type_id)? {
            TypeData::Class(def) => Some(def),
            TypeData::Application(def, _) => Some(def),
            _ => None,
        }
    }

    /// Type arguments of a generic application (empty for other types).
    pub fn application_args(&self, type_id: TypeId) -> SmallVec<[TypeId; 1]> {
        match self.lookup(type_id) {
            Some(TypeData::Application(_, args)) => args,
            _ => SmallVec::new(),
        }
    }

    /// Whether `type_id` contains an inference placeholder anywhere.
    pub fn contains_infer(&self, type_id: TypeId) -> bool {
        match self.lookup(type_id) {
            Some(TypeData::Infer(_)) => true,
            Some(TypeData::Application(_, args)) => {
                args.iter().any(|&arg| self.contains_infer(arg))
            }
            Some(TypeData::Function(shape)) => {
                shape.params.iter().any(|&p| self.contains_infer(p))
                    || self.contains_infer(shape.ret)
            }
            _ => false,
        }
    }

    /// Render a type for diagnostics: `List<Int>`, `(Int) -> ?12`, ...
    pub fn display(&self, type_id: TypeId, defs: &DefinitionStore, strings: &Interner) -> String {
        match self.lookup(type_id) {
            Some(TypeData::Intrinsic(kind)) => kind.name().to_string(),
            Some(TypeData::Class(def)) => defs
                .name_of(def, strings)
                .unwrap_or_else(|| format!("#{}", def.0)),
            Some(TypeData::Application(def, args)) => {
                let name = defs
                    .name_of(def, strings)
                    .unwrap_or_else(|| format!("#{}", def.0));
                let args = args
                    .iter()
                    .map(|&a| self.display(a, defs, strings))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{name}<{args}>")
            }
            Some(TypeData::TypeParameter(info)) => strings
                .resolve(info.name)
                .unwrap_or_else(|| "T".to_string()),
            Some(TypeData::Function(shape)) => {
                let params = shape
                    .params
                    .iter()
                    .map(|&p| self.display(p, defs, strings))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("({params}) -> {}", self.display(shape.ret, defs, strings))
            }
            Some(TypeData::Infer(id)) => format!("?{id}"),
            None => format!("<unknown type {}>", type_id.0),
        }
    }
}

impl Default for TypeInterner {
    fn default() -> Self {
        Self::new()
    }
}
