//! Call-site expression representation.
//!
//! The engine does not parse; a front end hands it pre-typed ordinary
//! arguments, deferred function values reduced to their signature shape, and
//! composite literals as trees of elements. Literal nodes live in an
//! [`ExprArena`] and are referenced by index (`LiteralId`), so nothing in a
//! resolution attempt holds lifetimes into the tree.

use crate::analyze::ElementClassification;
use crate::types::TypeId;
use colit_common::interner::Atom;
use once_cell::unsync::OnceCell;

/// Index of a literal node in its [`ExprArena`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LiteralId(pub u32);

/// Signature shape of a deferred function value (lambda or bound function
/// reference). Only the parameter side is usable as constraint input; the
/// body and return type are never inspected during resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeferredShape {
    /// Explicitly written parameter types, `None` where omitted.
    pub param_types: Vec<Option<TypeId>>,
}

impl DeferredShape {
    pub fn with_arity(count: usize) -> Self {
        Self {
            param_types: vec![None; count],
        }
    }

    pub fn with_params(param_types: Vec<Option<TypeId>>) -> Self {
        Self { param_types }
    }

    pub fn param_count(&self) -> usize {
        self.param_types.len()
    }
}

/// An element of a literal, or an argument of a call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ElementExpr {
    /// A nested composite literal.
    Literal(LiteralId),

    /// A deferred function value: lambda-shaped or bound-reference-shaped.
    Deferred(DeferredShape),

    /// Any other expression, already typed by the surrounding checker. The
    /// type may contain inference placeholders supplied by outer inference
    /// ("dependent" mode); it never triggers nested overload resolution here.
    Plain(TypeId),
}

/// A composite literal: an ordered element sequence plus an optional
/// explicit type annotation.
#[derive(Debug)]
pub struct LiteralExpr {
    pub elements: Vec<ElementExpr>,
    pub expected: Option<TypeId>,
    /// Classification cache, filled once per resolution attempt by the
    /// literal analyzer and never invalidated within it.
    pub(crate) classifications: OnceCell<Box<[ElementClassification]>>,
}

impl LiteralExpr {
    pub fn new(elements: Vec<ElementExpr>) -> Self {
        Self {
            elements,
            expected: None,
            classifications: OnceCell::new(),
        }
    }

    pub fn annotated(elements: Vec<ElementExpr>, expected: TypeId) -> Self {
        Self {
            elements,
            expected: Some(expected),
            classifications: OnceCell::new(),
        }
    }
}

/// Arena of literal nodes for one call expression (or one translation-unit
/// fragment). Created fresh per resolution attempt and discarded with it.
#[derive(Default, Debug)]
pub struct ExprArena {
    nodes: Vec<LiteralExpr>,
}

impl ExprArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, literal: LiteralExpr) -> LiteralId {
        let id = LiteralId(self.nodes.len() as u32);
        self.nodes.push(literal);
        id
    }

    pub fn get(&self, id: LiteralId) -> &LiteralExpr {
        &self.nodes[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// A call expression entering resolution: a callee name and its arguments.
#[derive(Clone, Debug)]
pub struct CallExpr {
    pub callee: Atom,
    pub args: Vec<ElementExpr>,
}

impl CallExpr {
    pub fn new(callee: Atom, args: Vec<ElementExpr>) -> Self {
        Self { callee, args }
    }
}
