//! Structural type representation.
//!
//! Types are hash-consed into `TypeId` handles by the [`TypeInterner`], so
//! equality is an O(1) integer comparison. A small set of intrinsic types is
//! pre-interned at fixed ids; everything else (nominal classes, generic
//! applications, function shapes, inference placeholders) is interned on
//! demand.
//!
//! [`TypeInterner`]: crate::intern::TypeInterner

use crate::def::DefId;
use colit_common::interner::Atom;
use smallvec::SmallVec;

/// Interned type handle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

impl TypeId {
    /// Error type. Produced when an earlier stage already failed; relations
    /// treat it permissively so one failure does not cascade.
    pub const ERROR: Self = Self(0);
    /// Top type: every type is a subtype of `ANY`.
    pub const ANY: Self = Self(1);
    /// Bottom type: `NEVER` is a subtype of every type.
    pub const NEVER: Self = Self(2);
    pub const BOOLEAN: Self = Self(3);
    pub const INT: Self = Self(4);
    pub const DOUBLE: Self = Self(5);
    pub const STRING: Self = Self(6);

    /// First id handed out for interned (non-intrinsic) types.
    pub const FIRST_INTERNED: u32 = 7;

    pub const fn is_intrinsic(self) -> bool {
        self.0 < Self::FIRST_INTERNED
    }
}

/// Intrinsic type kinds, mirroring the `TypeId` constants.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum IntrinsicKind {
    Error,
    Any,
    Never,
    Boolean,
    Int,
    Double,
    String,
}

impl IntrinsicKind {
    pub const fn type_id(self) -> TypeId {
        match self {
            Self::Error => TypeId::ERROR,
            Self::Any => TypeId::ANY,
            Self::Never => TypeId::NEVER,
            Self::Boolean => TypeId::BOOLEAN,
            Self::Int => TypeId::INT,
            Self::Double => TypeId::DOUBLE,
            Self::String => TypeId::STRING,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Any => "Any",
            Self::Never => "Never",
            Self::Boolean => "Boolean",
            Self::Int => "Int",
            Self::Double => "Double",
            Self::String => "String",
        }
    }
}

/// A declared type parameter (on a callable signature or a container
/// definition), with an optional upper-bound constraint.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeParamInfo {
    pub name: Atom,
    pub constraint: Option<TypeId>,
}

impl TypeParamInfo {
    pub const fn new(name: Atom) -> Self {
        Self {
            name,
            constraint: None,
        }
    }

    pub const fn with_constraint(name: Atom, constraint: TypeId) -> Self {
        Self {
            name,
            constraint: Some(constraint),
        }
    }
}

/// Shape of a function-valued type: parameter types and a return type.
///
/// A deferred (lambda-shaped) element whose return side is still unknown
/// carries an `Infer` placeholder as its return type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FunctionShape {
    pub params: SmallVec<[TypeId; 2]>,
    pub ret: TypeId,
}

/// Structural type data, hash-consed by the interner.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeData {
    /// Built-in type (`Int`, `Double`, ...).
    Intrinsic(IntrinsicKind),

    /// Nullary nominal type: `MyType`.
    Class(DefId),

    /// Generic container instantiation: `List<Int>`, `Set<T>`.
    Application(DefId, SmallVec<[TypeId; 1]>),

    /// Reference to a declared type parameter inside a signature or factory.
    TypeParameter(TypeParamInfo),

    /// Function-shaped type.
    Function(FunctionShape),

    /// Inference placeholder. The id is globally unique (allocated from an
    /// atomic counter), so placeholders from concurrent resolution attempts
    /// sharing one interner can never collide.
    Infer(u32),
}
