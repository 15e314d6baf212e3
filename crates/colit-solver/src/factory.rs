//! Factory capabilities: the static construction operation attached to a
//! type, used to desugar a literal into a value of that type.
//!
//! Validation runs once at registration, never per call. A rejected
//! registration leaves the definition with no capability; every later
//! `lookup` answers `NoFactory` and literal syntax stays unusable for that
//! type.

use crate::def::DefId;
use crate::intern::TypeInterner;
use crate::types::{TypeData, TypeId, TypeParamInfo};
use bitflags::bitflags;
use dashmap::DashMap;

bitflags! {
    /// Modifier tags on a construction signature. Opaque to the registry;
    /// passed through unchanged to the desugarer.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
    pub struct FactoryFlags: u8 {
        /// Specialized generically at each call site.
        const INLINE = 1 << 0;
        /// Coroutine-style suspension.
        const SUSPEND = 1 << 1;
        /// Tail-recursive lowering.
        const TAILREC = 1 << 2;
    }
}

/// Arity of one construction signature.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FactoryArity {
    /// The anchor: accepts any element count, including zero.
    Variadic,
    /// Convenience member for an exact element count.
    Fixed(usize),
}

/// One construction signature as submitted for registration.
#[derive(Clone, Debug)]
pub struct FactoryDecl {
    pub arity: FactoryArity,
    /// Per-element parameter type (normally the element type parameter).
    pub elem: TypeId,
    /// Declared return type; must be the owning type itself.
    pub ret: TypeId,
    /// Whether the signature declares an implicit/contextual receiver.
    pub has_receiver: bool,
    pub flags: FactoryFlags,
    /// Origin in a foreign (non-native) module. Accepted iff the signature
    /// independently satisfies every structural rule.
    pub foreign: bool,
}

/// A validated member of a capability.
#[derive(Clone, Debug)]
pub struct FactoryMember {
    pub arity: FactoryArity,
    pub flags: FactoryFlags,
    pub foreign: bool,
}

/// Index of a member within its capability.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FactoryMemberId(pub usize);

/// The validated construction capability of one definition.
#[derive(Clone, Debug)]
pub struct FactoryCapability {
    pub def: DefId,
    /// The element type parameter the members are generic over.
    pub elem_param: TypeParamInfo,
    /// `Application(def, [elem_param])` — the shared return type.
    pub constructed: TypeId,
    pub members: Vec<FactoryMember>,
    /// Index of the unique variable-arity member.
    pub anchor: FactoryMemberId,
}

impl FactoryCapability {
    pub fn anchor_member(&self) -> &FactoryMember {
        &self.members[self.anchor.0]
    }

    /// The member the desugarer should emit for `count` elements: the
    /// fixed-arity member with exactly that count when one exists, the
    /// anchor otherwise.
    pub fn member_for_count(&self, count: usize) -> FactoryMemberId {
        self.members
            .iter()
            .position(|m| m.arity == FactoryArity::Fixed(count))
            .map(FactoryMemberId)
            .unwrap_or(self.anchor)
    }
}

/// Registration-time structural violation. Aborts acceptance of the
/// offending capability only.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RegistrationError {
    DuplicateAnchor,
    MissingAnchor,
    ReturnTypeMismatch,
    InconsistentReturnTypes,
    ParameterShapeDivergence,
    ReceiverNotAllowed,
}

/// Lookup failure: the type has no usable construction capability.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NoFactory;

/// Registry of construction capabilities, keyed by definition.
pub struct FactoryRegistry {
    caps: DashMap<u32, FactoryCapability>,
}

impl FactoryRegistry {
    pub fn new() -> Self {
        Self {
            caps: DashMap::new(),
        }
    }

    /// Validate and register the construction signatures of `def`.
    ///
    /// `elem_param` is the element type parameter the signatures are generic
    /// over; every member must take elements of exactly that type and return
    /// `Application(def, [elem_param])`.
    pub fn register(
        &self,
        interner: &TypeInterner,
        def: DefId,
        elem_param: TypeParamInfo,
        decls: &[FactoryDecl],
    ) -> Result<(), RegistrationError> {
        let elem_ty = interner.intern(TypeData::TypeParameter(elem_param.clone()));
        let constructed = interner.application(def, [elem_ty]);

        let mut anchor = None;
        for decl in decls {
            if decl.has_receiver {
                return Err(RegistrationError::ReceiverNotAllowed);
            }
            if decl.arity == FactoryArity::Variadic {
                if anchor.is_some() {
                    return Err(RegistrationError::DuplicateAnchor);
                }
                anchor = Some(decl);
            }
        }
        let anchor_decl = anchor.ok_or(RegistrationError::MissingAnchor)?;

        // Members must agree on the return type among themselves and with
        // the owning type, by identity.
        for decl in decls {
            if decl.ret != anchor_decl.ret {
                return Err(RegistrationError::InconsistentReturnTypes);
            }
        }
        if anchor_decl.ret != constructed {
            return Err(RegistrationError::ReturnTypeMismatch);
        }

        // Members may differ only in parameter count, never in element type
        // or generic bound shape. Bound shape is covered by `elem_ty`
        // identity: the interned TypeParameter carries its constraint.
        for decl in decls {
            if decl.elem != anchor_decl.elem || decl.elem != elem_ty {
                return Err(RegistrationError::ParameterShapeDivergence);
            }
        }

        let members: Vec<FactoryMember> = decls
            .iter()
            .map(|d| FactoryMember {
                arity: d.arity,
                flags: d.flags,
                foreign: d.foreign,
            })
            .collect();
        let anchor_index = members
            .iter()
            .position(|m| m.arity == FactoryArity::Variadic)
            .map(FactoryMemberId)
            .ok_or(RegistrationError::MissingAnchor)?;

        self.caps.insert(
            def.0,
            FactoryCapability {
                def,
                elem_param,
                constructed,
                members,
                anchor: anchor_index,
            },
        );
        Ok(())
    }

    /// Pure lookup over immutable registration data.
    pub fn lookup(&self, interner: &TypeInterner, target: TypeId) -> Result<FactoryCapability, NoFactory> {
        let def = interner.def_of(target).ok_or(NoFactory)?;
        self.lookup_def(def)
    }

    pub fn lookup_def(&self, def: DefId) -> Result<FactoryCapability, NoFactory> {
        self.caps.get(&def.0).map(|c| c.clone()).ok_or(NoFactory)
    }
}

impl Default for FactoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}
