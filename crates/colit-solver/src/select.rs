//! Two-stage candidate selection.
//!
//! Stage 1 filters the overload set by applicability (constraint-system
//! satisfiability per candidate); stage 2 picks the most specific applicable
//! candidate under the ambient relation. Both stages are pure functions over
//! explicit candidate lists so an ambiguity's full tied set is always
//! recoverable for diagnostics.
//!
//! Nested literal resolution happens here, after a unique winner exists, and
//! exactly once per literal node — the constraint engine only ever checked
//! nested literals structurally.

use crate::ast::{CallExpr, ElementExpr, ExprArena, LiteralId};
use crate::constraints::{
    Bindings, CandidateVerdict, ConstraintSystem, EngineContext, InapplicableReason,
};
use crate::def::DefinitionStore;
use crate::factory::FactoryRegistry;
use crate::intern::TypeInterner;
use crate::signatures::{SigId, SignatureTable};
use crate::subtype::AssignabilityOracle;
use crate::types::TypeId;
use colit_common::interner::Atom;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

/// Whole-call resolution failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolveError {
    /// No overloads are registered under the callee name.
    UnknownCallee { name: Atom },

    /// Stage 1 discarded every candidate.
    NoApplicableCandidate {
        rejected: Vec<(SigId, InapplicableReason)>,
    },

    /// Stage 2 found no unique most specific candidate; carries the tied
    /// set for diagnostics.
    AmbiguousResolution { candidates: Vec<SigId> },

    /// A literal's explicit expected type matches no registered factory.
    TypeMismatch { literal: LiteralId, expected: TypeId },

    /// A zero-element, unannotated literal with no derivable expected type.
    UnderconstrainedLiteral { literal: LiteralId },

    /// An earlier stage failed to produce a concrete type for a literal.
    /// Programming error in the caller, not a user-facing outcome.
    Internal { message: &'static str },
}

/// A successful resolution: the winning signature and the fully inferred
/// literal-to-type assignments (including nested literals).
#[derive(Clone, Debug)]
pub struct ResolvedCall {
    pub signature: SigId,
    pub return_type: TypeId,
    pub bindings: Bindings,
}

/// Counters exposed for tests and tracing.
#[derive(Clone, Debug, Default)]
pub struct ResolutionStats {
    /// Stage-1 constraint-system evaluations.
    pub candidates_evaluated: u32,
    /// Full resolutions per literal node. Nested literals must show exactly
    /// one entry here regardless of the outer overload set's size.
    pub literal_resolutions: FxHashMap<LiteralId, u32>,
}

/// Shared immutable registration state consumed by resolution.
pub struct CallContext<'a> {
    pub interner: &'a TypeInterner,
    pub defs: &'a DefinitionStore,
    pub signatures: &'a SignatureTable,
    pub factories: &'a FactoryRegistry,
}

impl<'a> CallContext<'a> {
    fn engine(&self) -> EngineContext<'a> {
        EngineContext {
            interner: self.interner,
            defs: self.defs,
            factories: self.factories,
        }
    }
}

/// Resolves call expressions against one registration state.
pub struct Resolver<'a, O: AssignabilityOracle> {
    ctx: &'a CallContext<'a>,
    oracle: &'a mut O,
    stats: ResolutionStats,
}

impl<'a, O: AssignabilityOracle> Resolver<'a, O> {
    pub fn new(ctx: &'a CallContext<'a>, oracle: &'a mut O) -> Self {
        Self {
            ctx,
            oracle,
            stats: ResolutionStats::default(),
        }
    }

    pub fn stats(&self) -> &ResolutionStats {
        &self.stats
    }

    /// Resolve one call expression to a unique candidate and a concrete type
    /// per literal argument.
    pub fn resolve_call(
        &mut self,
        arena: &ExprArena,
        call: &CallExpr,
    ) -> Result<ResolvedCall, ResolveError> {
        let overloads = self.ctx.signatures.overloads(call.callee);
        if overloads.is_empty() {
            return Err(ResolveError::UnknownCallee { name: call.callee });
        }

        // An explicit annotation that no factory can produce fails the call
        // before any candidate is considered.
        self.check_annotations(arena, &call.args)?;

        let (applicable, rejected) = self.stage1_filter(arena, call, &overloads);
        debug!(
            callee = call.callee.0,
            applicable = applicable.len(),
            rejected = rejected.len(),
            "stage 1 complete"
        );

        if applicable.is_empty() {
            // A literal nobody could constrain is the sharper diagnostic.
            for (_, reason) in &rejected {
                if let InapplicableReason::UnderconstrainedLiteral { literal } = reason {
                    return Err(ResolveError::UnderconstrainedLiteral { literal: *literal });
                }
            }
            return Err(ResolveError::NoApplicableCandidate { rejected });
        }

        let winner = match self.stage2_most_specific(&applicable) {
            Ok(winner) => winner,
            Err(tied) => return Err(ResolveError::AmbiguousResolution { candidates: tied }),
        };
        let Some((signature, mut bindings)) =
            applicable.into_iter().find(|(id, _)| *id == winner)
        else {
            return Err(ResolveError::Internal {
                message: "stage 2 winner missing from the applicable set",
            });
        };
        debug!(signature = signature.0, "stage 2 winner");

        // Deferred nested-literal resolution: at most once per literal node.
        for arg in &call.args {
            if let ElementExpr::Literal(literal) = arg {
                self.resolve_nested(arena, *literal, &mut bindings)?;
            }
        }

        Ok(ResolvedCall {
            signature,
            return_type: bindings.return_type,
            bindings,
        })
    }

    /// Resolve a standalone literal against a known expected type (the entry
    /// point a host uses for `val x: List<Int> = [1, 2]`).
    pub fn resolve_literal(
        &mut self,
        arena: &ExprArena,
        literal: LiteralId,
        expected: TypeId,
    ) -> Result<Bindings, ResolveError> {
        let mut bindings = self.resolve_literal_once(arena, literal, expected)?;
        self.resolve_nested(arena, literal, &mut bindings)?;
        bindings.return_type = bindings.literal_types[&literal];
        Ok(bindings)
    }

    /// Stage 1: run the constraint engine for every candidate; keep the
    /// applicable ones, remember why the rest were discarded.
    fn stage1_filter(
        &mut self,
        arena: &ExprArena,
        call: &CallExpr,
        overloads: &[SigId],
    ) -> (Vec<(SigId, Bindings)>, Vec<(SigId, InapplicableReason)>) {
        let engine = self.ctx.engine();
        let mut applicable = Vec::new();
        let mut rejected = Vec::new();
        for &id in overloads {
            let Some(sig) = self.ctx.signatures.get(id) else {
                continue;
            };
            self.stats.candidates_evaluated += 1;
            let system = ConstraintSystem::new(&engine, arena, self.oracle);
            match system.evaluate(&sig, call) {
                CandidateVerdict::Applicable(bindings) => {
                    trace!(candidate = id.0, "applicable");
                    applicable.push((id, bindings));
                }
                CandidateVerdict::Inapplicable(reason) => {
                    trace!(candidate = id.0, ?reason, "inapplicable");
                    rejected.push((id, reason));
                }
            }
        }
        (applicable, rejected)
    }

    /// Stage 2: the unique most specific candidate, or the tied set.
    fn stage2_most_specific(
        &mut self,
        applicable: &[(SigId, Bindings)],
    ) -> Result<SigId, Vec<SigId>> {
        if applicable.len() == 1 {
            return Ok(applicable[0].0);
        }
        let ids: Vec<SigId> = applicable.iter().map(|(id, _)| *id).collect();
        let mut maxima = Vec::new();
        for &candidate in &ids {
            let beats_all = ids
                .iter()
                .filter(|&&other| other != candidate)
                .all(|&other| self.at_least_as_specific(candidate, other));
            if beats_all {
                maxima.push(candidate);
            }
        }
        match maxima.as_slice() {
            [winner] => Ok(*winner),
            [] => Err(ids),
            _ => Err(maxima),
        }
    }

    /// `a` is at least as specific as `b` when every declared parameter type
    /// of `a` is a subtype of `b`'s at the same position.
    fn at_least_as_specific(&mut self, a: SigId, b: SigId) -> bool {
        let (Some(sig_a), Some(sig_b)) = (self.ctx.signatures.get(a), self.ctx.signatures.get(b))
        else {
            return false;
        };
        let positions = sig_a.params.len().max(sig_b.params.len());
        for index in 0..positions {
            match (sig_a.param_type_at(index), sig_b.param_type_at(index)) {
                (Some(ta), Some(tb)) => {
                    if !self.oracle.is_subtype_of(ta, tb) {
                        return false;
                    }
                }
                (None, None) => {}
                _ => return false,
            }
        }
        true
    }

    /// Reject annotations no registered factory can produce, anywhere in the
    /// literal trees of `elements`.
    fn check_annotations(
        &mut self,
        arena: &ExprArena,
        elements: &[ElementExpr],
    ) -> Result<(), ResolveError> {
        for element in elements {
            if let ElementExpr::Literal(literal) = element {
                let node = arena.get(*literal);
                if let Some(expected) = node.expected {
                    if self
                        .ctx
                        .factories
                        .lookup(self.ctx.interner, expected)
                        .is_err()
                    {
                        return Err(ResolveError::TypeMismatch {
                            literal: *literal,
                            expected,
                        });
                    }
                }
                self.check_annotations(arena, &node.elements)?;
            }
        }
        Ok(())
    }

    /// Resolve every nested literal of `literal` against the now-concrete
    /// element type, recursively, once per node.
    fn resolve_nested(
        &mut self,
        arena: &ExprArena,
        literal: LiteralId,
        bindings: &mut Bindings,
    ) -> Result<(), ResolveError> {
        let Some(&elem) = bindings.elem_types.get(&literal) else {
            return Err(ResolveError::Internal {
                message: "literal resolved without an element type",
            });
        };
        let node = arena.get(literal);
        for element in &node.elements {
            if let ElementExpr::Literal(child) = element {
                let child_bindings = self.resolve_literal_once(arena, *child, elem)?;
                bindings.literal_types.extend(child_bindings.literal_types);
                bindings.elem_types.extend(child_bindings.elem_types);
                self.resolve_nested(arena, *child, bindings)?;
            }
        }
        Ok(())
    }

    /// One full resolution of one literal against a known expected type.
    fn resolve_literal_once(
        &mut self,
        arena: &ExprArena,
        literal: LiteralId,
        expected: TypeId,
    ) -> Result<Bindings, ResolveError> {
        *self.stats.literal_resolutions.entry(literal).or_insert(0) += 1;
        let engine = self.ctx.engine();
        let system = ConstraintSystem::new(&engine, arena, self.oracle);
        system
            .resolve_literal(literal, expected)
            .map_err(|reason| match reason {
                InapplicableReason::UnderconstrainedLiteral { literal } => {
                    ResolveError::UnderconstrainedLiteral { literal }
                }
                _ => ResolveError::TypeMismatch { literal, expected },
            })
    }
}
