//! Literal element classification.
//!
//! Purely structural: classification never consults candidate types. Nested
//! literals are tagged but not descended into — their own elements are
//! classified lazily, once their expected type is known, which keeps a
//! literal nested `k` levels deep from being analyzed once per outer
//! candidate.

use crate::ast::{ElementExpr, ExprArena, LiteralId};

/// Classification of one literal element.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ElementClassification {
    /// Element is itself a composite literal; analyzed later, when its
    /// expected type becomes known.
    NestedLiteral,

    /// Lambda-shaped or bound-function-reference-shaped. Only parameter
    /// count and explicit parameter types feed the constraint system.
    DeferredFunctionValued,

    /// Everything else; typed in dependent mode by the surrounding checker.
    Plain,
}

/// Classifies literal elements, caching the result on the node.
pub struct LiteralAnalyzer<'a> {
    arena: &'a ExprArena,
}

impl<'a> LiteralAnalyzer<'a> {
    pub fn new(arena: &'a ExprArena) -> Self {
        Self { arena }
    }

    /// Classify the elements of `literal`.
    ///
    /// Computed once per node per resolution attempt; subsequent calls hit
    /// the node's cache.
    pub fn classify(&self, literal: LiteralId) -> &'a [ElementClassification] {
        let node = self.arena.get(literal);
        node.classifications.get_or_init(|| {
            node.elements
                .iter()
                .map(|elem| match elem {
                    ElementExpr::Literal(_) => ElementClassification::NestedLiteral,
                    ElementExpr::Deferred(_) => ElementClassification::DeferredFunctionValued,
                    ElementExpr::Plain(_) => ElementClassification::Plain,
                })
                .collect()
        })
    }
}
