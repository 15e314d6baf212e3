//! Literal desugaring.
//!
//! Once a unique candidate is chosen and every literal carries a concrete
//! type, each literal is rewritten into an explicit construction call
//! against its factory: the fixed-arity member with exactly matching element
//! count when one exists, the anchor otherwise. No inference happens here;
//! the rewrite is pure and total. A missing concrete type means an earlier
//! stage misbehaved and is reported as an internal invariant violation.

use crate::ast::{CallExpr, DeferredShape, ElementExpr, ExprArena, LiteralId};
use crate::constraints::Bindings;
use crate::factory::{FactoryFlags, FactoryMemberId, FactoryRegistry};
use crate::intern::TypeInterner;
use crate::select::{ResolvedCall, ResolveError};
use crate::signatures::SigId;
use crate::types::{TypeData, TypeId};
use tracing::trace;

/// A desugared argument or literal element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DesugaredElement {
    /// A literal rewritten into an explicit construction call.
    Construction(ConstructionCall),

    /// A deferred function value, now with its concrete expected type.
    Deferred { shape: DeferredShape, expected: TypeId },

    /// An ordinary expression, unchanged.
    Plain(TypeId),
}

impl DesugaredElement {
    /// The type this element checks to after desugaring.
    pub fn type_of(&self) -> TypeId {
        match self {
            Self::Construction(call) => call.target,
            Self::Deferred { expected, .. } => *expected,
            Self::Plain(ty) => *ty,
        }
    }
}

/// An explicit factory invocation replacing a literal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConstructionCall {
    pub literal: LiteralId,
    /// The literal's now-definite type, e.g. `List<Int>`.
    pub target: TypeId,
    /// Concrete generic instantiation for the element type.
    pub elem_type: TypeId,
    /// The chosen capability member.
    pub member: FactoryMemberId,
    /// Modifier tags carried through from registration for downstream
    /// lowering.
    pub flags: FactoryFlags,
    pub elements: Vec<DesugaredElement>,
}

/// A fully desugared call expression.
#[derive(Clone, Debug)]
pub struct DesugaredCall {
    pub signature: SigId,
    pub return_type: TypeId,
    pub args: Vec<DesugaredElement>,
}

/// Rewrites resolved literals into construction calls.
pub struct Desugarer<'a> {
    interner: &'a TypeInterner,
    factories: &'a FactoryRegistry,
}

impl<'a> Desugarer<'a> {
    pub fn new(interner: &'a TypeInterner, factories: &'a FactoryRegistry) -> Self {
        Self {
            interner,
            factories,
        }
    }

    /// Lower a resolved call into its desugared form.
    pub fn desugar_call(
        &self,
        arena: &ExprArena,
        call: &CallExpr,
        resolved: &ResolvedCall,
    ) -> Result<DesugaredCall, ResolveError> {
        let mut args = Vec::with_capacity(call.args.len());
        for arg in &call.args {
            args.push(self.desugar_element(arena, arg, &resolved.bindings, None)?);
        }
        Ok(DesugaredCall {
            signature: resolved.signature,
            return_type: resolved.return_type,
            args,
        })
    }

    /// Lower one literal with known bindings.
    pub fn desugar_literal(
        &self,
        arena: &ExprArena,
        literal: LiteralId,
        bindings: &Bindings,
    ) -> Result<ConstructionCall, ResolveError> {
        let (Some(&target), Some(&elem_type)) = (
            bindings.literal_types.get(&literal),
            bindings.elem_types.get(&literal),
        ) else {
            debug_assert!(false, "desugaring a literal without a concrete type");
            return Err(ResolveError::Internal {
                message: "literal reached desugaring without a concrete type",
            });
        };
        let capability = self
            .factories
            .lookup(self.interner, target)
            .map_err(|_| ResolveError::Internal {
                message: "resolved literal type lost its factory capability",
            })?;

        let node = arena.get(literal);
        let member = capability.member_for_count(node.elements.len());
        let flags = capability.members[member.0].flags;
        trace!(literal = literal.0, member = member.0, "construction member chosen");

        let mut elements = Vec::with_capacity(node.elements.len());
        for element in &node.elements {
            elements.push(self.desugar_element(arena, element, bindings, Some(elem_type))?);
        }
        Ok(ConstructionCall {
            literal,
            target,
            elem_type,
            member,
            flags,
            elements,
        })
    }

    fn desugar_element(
        &self,
        arena: &ExprArena,
        element: &ElementExpr,
        bindings: &Bindings,
        expected_elem: Option<TypeId>,
    ) -> Result<DesugaredElement, ResolveError> {
        match element {
            ElementExpr::Literal(child) => Ok(DesugaredElement::Construction(
                self.desugar_literal(arena, *child, bindings)?,
            )),
            ElementExpr::Deferred(shape) => {
                let expected = match expected_elem {
                    Some(elem) => elem,
                    // A top-level deferred argument's expected type is the
                    // declared parameter type; the shape alone suffices for
                    // downstream lowering when it is not supplied here.
                    None => self.function_of_shape(shape),
                };
                Ok(DesugaredElement::Deferred {
                    shape: shape.clone(),
                    expected,
                })
            }
            ElementExpr::Plain(ty) => Ok(DesugaredElement::Plain(*ty)),
        }
    }

    fn function_of_shape(&self, shape: &DeferredShape) -> TypeId {
        let params: Vec<TypeId> = shape
            .param_types
            .iter()
            .map(|p| p.unwrap_or(TypeId::ANY))
            .collect();
        self.interner.function(params, TypeId::ANY)
    }

    /// Re-derive the type of a desugared element tree, the way a checker
    /// re-analyzing the lowered expression would.
    pub fn reanalyze(&self, element: &DesugaredElement) -> TypeId {
        match element {
            DesugaredElement::Construction(call) => {
                // The construction call's type is its factory's return type
                // instantiated at the concrete element type.
                match self.interner.lookup(call.target) {
                    Some(TypeData::Application(def, _)) => {
                        self.interner.application(def, [call.elem_type])
                    }
                    _ => call.target,
                }
            }
            other => other.type_of(),
        }
    }
}
