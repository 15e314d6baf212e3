//! Per-candidate constraint systems.
//!
//! For one candidate signature and one call expression, this module builds
//! the subtyping constraint system linking literal element types, a fresh
//! element-type variable per literal, and the candidate's declared parameter
//! types, then propagates it to a fixed point.
//!
//! Nested literals are never resolved here: their elements contribute only a
//! deferred structural check against whatever the outer element variable is
//! ultimately bound to. Full resolution of nested literals happens once, in
//! the selector, after a unique outer winner exists — a literal nested `k`
//! levels deep is never resolved against more than one outer candidate's
//! context.

use crate::analyze::{ElementClassification, LiteralAnalyzer};
use crate::ast::{CallExpr, DeferredShape, ElementExpr, ExprArena, LiteralId};
use crate::def::DefinitionStore;
use crate::factory::FactoryRegistry;
use crate::infer::{InferenceContext, InferenceError, InferenceVar};
use crate::instantiate::{TypeSubstitution, instantiate_type};
use crate::intern::TypeInterner;
use crate::signatures::CallableSignature;
use crate::subtype::AssignabilityOracle;
use crate::types::{TypeData, TypeId};
use colit_common::limits::MAX_LITERAL_NESTING_DEPTH;
use rustc_hash::FxHashMap;
use tracing::trace;

/// Why a candidate was discarded. Recovered locally; never surfaced alone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InapplicableReason {
    /// The declared parameter type at this position has no construction
    /// capability.
    NoFactory { arg_index: usize },

    ArgumentCountMismatch {
        expected_min: usize,
        expected_max: Option<usize>,
        actual: usize,
    },

    /// A fixed (non-literal, non-deferred) argument does not type-check.
    FixedArgMismatch {
        arg_index: usize,
        arg: TypeId,
        declared: TypeId,
    },

    /// Two constraints admit no common solution.
    ConstraintConflict { sub: TypeId, sup: TypeId },

    /// Bound propagation failed (conflicting bounds, occurs check, ...).
    InferenceFailure(InferenceError),

    /// A zero-element, unannotated literal with no derivable element type.
    UnderconstrainedLiteral { literal: LiteralId },
}

/// Inferred results of an applicable candidate.
#[derive(Clone, Debug)]
pub struct Bindings {
    pub return_type: TypeId,
    /// Concrete container type per literal (top-level literals after
    /// candidate evaluation; nested ones are added by the selector).
    pub literal_types: FxHashMap<LiteralId, TypeId>,
    /// Concrete element type per literal.
    pub elem_types: FxHashMap<LiteralId, TypeId>,
}

impl Default for Bindings {
    fn default() -> Self {
        Self {
            return_type: TypeId::ERROR,
            literal_types: FxHashMap::default(),
            elem_types: FxHashMap::default(),
        }
    }
}

/// Per-candidate verdict.
#[derive(Clone, Debug)]
pub enum CandidateVerdict {
    Applicable(Bindings),
    Inapplicable(InapplicableReason),
}

/// Shared immutable registration state a constraint system reads.
pub struct EngineContext<'a> {
    pub interner: &'a TypeInterner,
    pub defs: &'a DefinitionStore,
    pub factories: &'a FactoryRegistry,
}

#[derive(Copy, Clone)]
struct LiteralConstraint {
    literal: LiteralId,
    elem_var: InferenceVar,
    constructed: TypeId,
    empty_unannotated: bool,
}

/// Builds and solves the constraint system for one (candidate, call) pair.
pub struct ConstraintSystem<'a, O: AssignabilityOracle> {
    engine: &'a EngineContext<'a>,
    arena: &'a ExprArena,
    analyzer: LiteralAnalyzer<'a>,
    oracle: &'a mut O,
    cx: InferenceContext<'a>,
    /// Variables that must reach a concrete type: signature type parameters
    /// and literal element variables. Deferred-function placeholders stay
    /// free (their return side is never inspected).
    must_resolve: Vec<InferenceVar>,
    literals: Vec<LiteralConstraint>,
    /// Nested literals awaiting a structural check against the resolved
    /// outer element type.
    deferred: Vec<(LiteralId, TypeId)>,
}

impl<'a, O: AssignabilityOracle> ConstraintSystem<'a, O> {
    pub fn new(engine: &'a EngineContext<'a>, arena: &'a ExprArena, oracle: &'a mut O) -> Self {
        Self {
            engine,
            arena,
            analyzer: LiteralAnalyzer::new(arena),
            oracle,
            cx: InferenceContext::new(engine.interner),
            must_resolve: Vec::new(),
            literals: Vec::new(),
            deferred: Vec::new(),
        }
    }

    /// Evaluate a candidate against the call's arguments.
    pub fn evaluate(mut self, sig: &CallableSignature, call: &CallExpr) -> CandidateVerdict {
        let (min_args, max_args) = sig.arg_count_bounds();
        if call.args.len() < min_args || max_args.is_some_and(|max| call.args.len() > max) {
            return CandidateVerdict::Inapplicable(InapplicableReason::ArgumentCountMismatch {
                expected_min: min_args,
                expected_max: max_args,
                actual: call.args.len(),
            });
        }

        // Instantiate free type parameters with fresh placeholders before
        // any constraint is collected.
        let mut subst = TypeSubstitution::new();
        for tp in &sig.type_params {
            let var = self.cx.fresh_var();
            if let Some(bound) = tp.constraint {
                self.cx.add_upper_bound(var, bound);
            }
            subst.insert(tp.name, self.cx.placeholder(var));
            self.must_resolve.push(var);
        }

        for (index, arg) in call.args.iter().enumerate() {
            let Some(declared) = sig.param_type_at(index) else {
                return CandidateVerdict::Inapplicable(InapplicableReason::ArgumentCountMismatch {
                    expected_min: min_args,
                    expected_max: max_args,
                    actual: call.args.len(),
                });
            };
            let declared = instantiate_type(self.engine.interner, declared, &subst);

            let outcome = match arg {
                ElementExpr::Plain(ty) => self.constrain_plain_argument(index, *ty, declared),
                ElementExpr::Deferred(shape) => {
                    let lambda = self.deferred_type(shape);
                    self.collect(lambda, declared)
                }
                ElementExpr::Literal(literal) => {
                    self.constrain_literal_argument(index, *literal, declared)
                }
            };
            if let Err(reason) = outcome {
                return CandidateVerdict::Inapplicable(reason);
            }
        }

        let mut bindings = match self.solve() {
            Ok(bindings) => bindings,
            Err(reason) => return CandidateVerdict::Inapplicable(reason),
        };
        let ret = instantiate_type(self.engine.interner, sig.ret, &subst);
        bindings.return_type = self.cx.substitute(ret);

        trace!(return_type = ?bindings.return_type, "candidate applicable");
        CandidateVerdict::Applicable(bindings)
    }

    /// Resolve one literal against a known expected type. Used by the
    /// selector for nested literals after the outer winner is fixed, and for
    /// annotated literals checked in isolation.
    pub fn resolve_literal(
        mut self,
        literal: LiteralId,
        expected: TypeId,
    ) -> Result<Bindings, InapplicableReason> {
        self.constrain_literal_argument(0, literal, expected)?;
        self.solve()
    }

    /// Propagate all constraints to a fixed point, run the deferred nested
    /// structural checks, and read back per-literal bindings.
    fn solve(&mut self) -> Result<Bindings, InapplicableReason> {
        // Innermost variables first: element variables were created after
        // the type parameters they feed.
        for var in self.must_resolve.clone().into_iter().rev() {
            if let Err(err) = self.cx.resolve_with_constraints(var, self.oracle) {
                return Err(self.map_inference_error(err));
            }
        }

        // Deferred structural checks for nested literals, now that the outer
        // element variables are concrete.
        for (literal, elem_placeholder) in std::mem::take(&mut self.deferred) {
            let expected = self.cx.substitute(elem_placeholder);
            self.check_nested_structure(literal, expected, 0)?;
        }

        let mut bindings = Bindings::default();
        for index in 0..self.literals.len() {
            let LiteralConstraint {
                literal,
                elem_var,
                constructed,
                empty_unannotated,
            } = self.literals[index];
            let elem = self.cx.substitute(self.cx.placeholder(elem_var));
            let container = self.cx.substitute(constructed);
            if self.engine.interner.contains_infer(elem)
                || self.engine.interner.contains_infer(container)
            {
                return Err(if empty_unannotated {
                    InapplicableReason::UnderconstrainedLiteral { literal }
                } else {
                    InapplicableReason::ConstraintConflict {
                        sub: elem,
                        sup: container,
                    }
                });
            }
            bindings.literal_types.insert(literal, container);
            bindings.elem_types.insert(literal, elem);
        }
        Ok(bindings)
    }

    fn map_inference_error(&mut self, err: InferenceError) -> InapplicableReason {
        if let InferenceError::Underconstrained { var } = err {
            let root = self.cx.root(var);
            // Underconstraint can surface on a type parameter the element
            // variable resolved into rather than on the element variable
            // itself; the empty literal is blamed only when its element
            // variable actually feeds the failing one.
            let literals = self.literals.clone();
            for lit in &literals {
                if !lit.empty_unannotated {
                    continue;
                }
                if self.cx.root(lit.elem_var) == root || self.cx.depends_on(lit.elem_var, root) {
                    return InapplicableReason::UnderconstrainedLiteral {
                        literal: lit.literal,
                    };
                }
            }
        }
        InapplicableReason::InferenceFailure(err)
    }

    fn constrain_plain_argument(
        &mut self,
        arg_index: usize,
        arg: TypeId,
        declared: TypeId,
    ) -> Result<(), InapplicableReason> {
        let interner = self.engine.interner;
        if interner.contains_infer(declared) || interner.contains_infer(arg) {
            return self.collect(arg, declared);
        }
        if self.oracle.is_subtype_of(arg, declared) {
            Ok(())
        } else {
            Err(InapplicableReason::FixedArgMismatch {
                arg_index,
                arg,
                declared,
            })
        }
    }

    /// The three-step procedure of the constraint engine for one literal
    /// argument at one parameter position.
    fn constrain_literal_argument(
        &mut self,
        arg_index: usize,
        literal: LiteralId,
        declared: TypeId,
    ) -> Result<(), InapplicableReason> {
        let node = self.arena.get(literal);
        let target = node.expected.unwrap_or(declared);

        // Step 1: the factory capability for the target type.
        let capability = self
            .engine
            .factories
            .lookup(self.engine.interner, target)
            .map_err(|_| InapplicableReason::NoFactory { arg_index })?;

        // Step 2: fresh element variable; the constructed type is the
        // anchor's return type parameterized over it. Always the anchor —
        // fixed-arity convenience members only matter to the desugarer.
        let elem_var = self.cx.fresh_var();
        let elem_placeholder = self.cx.placeholder(elem_var);
        let constructed = self
            .engine
            .interner
            .application(capability.def, [elem_placeholder]);

        // Step 3: every element constrains the element variable from below.
        let classifications = self.analyzer.classify(literal);
        for (element, classification) in node.elements.iter().zip(classifications) {
            match (element, classification) {
                (ElementExpr::Plain(ty), ElementClassification::Plain) => {
                    self.collect(*ty, elem_placeholder)?;
                }
                (ElementExpr::Deferred(shape), ElementClassification::DeferredFunctionValued) => {
                    let lambda = self.deferred_type(shape);
                    self.collect(lambda, elem_placeholder)?;
                }
                (ElementExpr::Literal(child), ElementClassification::NestedLiteral) => {
                    // No factory lookup, no stage 1/2 for the child here.
                    self.deferred.push((*child, elem_placeholder));
                }
                _ => unreachable!("classification diverged from element shape"),
            }
        }

        // Step 4: the constructed type must fit the declared parameter type
        // (and the explicit annotation, when one is written).
        if let Some(annotation) = node.expected {
            self.collect(constructed, annotation)?;
            self.collect(annotation, declared)?;
        } else {
            self.collect(constructed, declared)?;
        }

        self.must_resolve.push(elem_var);
        self.literals.push(LiteralConstraint {
            literal,
            elem_var,
            constructed,
            empty_unannotated: node.elements.is_empty() && node.expected.is_none(),
        });
        Ok(())
    }

    /// The type of a deferred function value: explicit parameter types where
    /// written, fresh placeholders elsewhere, and a free return placeholder.
    fn deferred_type(&mut self, shape: &DeferredShape) -> TypeId {
        let params: Vec<TypeId> = shape
            .param_types
            .iter()
            .map(|explicit| match explicit {
                Some(ty) => *ty,
                None => {
                    let var = self.cx.fresh_var();
                    self.cx.placeholder(var)
                }
            })
            .collect();
        let ret = {
            let var = self.cx.fresh_var();
            self.cx.placeholder(var)
        };
        self.engine.interner.function(params, ret)
    }

    /// Record `sub <: sup`, decomposing structurally and accumulating bounds
    /// on inference variables.
    fn collect(&mut self, sub: TypeId, sup: TypeId) -> Result<(), InapplicableReason> {
        if sub == sup {
            return Ok(());
        }
        let sub_var = self.cx.var_for_placeholder(sub);
        let sup_var = self.cx.var_for_placeholder(sup);
        match (sub_var, sup_var) {
            (Some(a), Some(b)) => {
                self.cx.add_upper_bound(a, sup);
                self.cx.add_lower_bound(b, sub);
                Ok(())
            }
            (Some(a), None) => {
                self.cx.add_upper_bound(a, sup);
                Ok(())
            }
            (None, Some(b)) => {
                self.cx.add_lower_bound(b, sub);
                Ok(())
            }
            (None, None) => self.collect_structural(sub, sup),
        }
    }

    fn collect_structural(&mut self, sub: TypeId, sup: TypeId) -> Result<(), InapplicableReason> {
        let interner = self.engine.interner;
        let conflict = InapplicableReason::ConstraintConflict { sub, sup };
        match (interner.lookup(sub), interner.lookup(sup)) {
            (Some(TypeData::Application(d1, args1)), Some(TypeData::Application(d2, args2)))
                if self.engine.defs.is_nominal_subdef(d1, d2) && args1.len() == args2.len() =>
            {
                for (&a1, &a2) in args1.iter().zip(args2.iter()) {
                    self.collect(a1, a2)?;
                }
                Ok(())
            }
            (Some(TypeData::Function(f1)), Some(TypeData::Function(f2)))
                if f1.params.len() == f2.params.len() =>
            {
                for (&p1, &p2) in f1.params.iter().zip(f2.params.iter()) {
                    // Contravariant in parameters.
                    self.collect(p2, p1)?;
                }
                self.collect(f1.ret, f2.ret)
            }
            _ => {
                if !interner.contains_infer(sub) && !interner.contains_infer(sup) {
                    if self.oracle.is_subtype_of(sub, sup) {
                        return Ok(());
                    }
                }
                Err(conflict)
            }
        }
    }

    /// Structural compatibility of a nested literal with the outer element
    /// type. Purely shape-level: no factory is picked for the child, no
    /// candidates are filtered.
    fn check_nested_structure(
        &mut self,
        literal: LiteralId,
        expected: TypeId,
        depth: u32,
    ) -> Result<(), InapplicableReason> {
        if depth > MAX_LITERAL_NESTING_DEPTH {
            return Err(InapplicableReason::ConstraintConflict {
                sub: expected,
                sup: expected,
            });
        }
        let node = self.arena.get(literal);
        let expected = match node.expected {
            Some(annotation) => {
                if !self.oracle.is_subtype_of(annotation, expected) {
                    return Err(InapplicableReason::ConstraintConflict {
                        sub: annotation,
                        sup: expected,
                    });
                }
                annotation
            }
            None => expected,
        };
        let interner = self.engine.interner;
        let elem = match interner.lookup(expected) {
            Some(TypeData::Application(_, args)) if args.len() == 1 => args[0],
            _ => {
                // The literal must construct into a one-parameter container.
                return Err(InapplicableReason::ConstraintConflict {
                    sub: expected,
                    sup: expected,
                });
            }
        };
        for element in &node.elements {
            match element {
                ElementExpr::Plain(ty) => {
                    if !self.oracle.is_subtype_of(*ty, elem) {
                        return Err(InapplicableReason::ConstraintConflict {
                            sub: *ty,
                            sup: elem,
                        });
                    }
                }
                ElementExpr::Deferred(shape) => {
                    let Some(TypeData::Function(f)) = interner.lookup(elem) else {
                        return Err(InapplicableReason::ConstraintConflict {
                            sub: elem,
                            sup: elem,
                        });
                    };
                    if f.params.len() != shape.param_count() {
                        return Err(InapplicableReason::ConstraintConflict {
                            sub: elem,
                            sup: elem,
                        });
                    }
                    for (&declared, explicit) in f.params.iter().zip(&shape.param_types) {
                        if let Some(explicit) = explicit {
                            if !self.oracle.is_subtype_of(declared, *explicit) {
                                return Err(InapplicableReason::ConstraintConflict {
                                    sub: declared,
                                    sup: *explicit,
                                });
                            }
                        }
                    }
                }
                ElementExpr::Literal(child) => {
                    self.check_nested_structure(*child, elem, depth + 1)?;
                }
            }
        }
        Ok(())
    }
}
