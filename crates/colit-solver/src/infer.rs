//! Inference variables and constraint resolution.
//!
//! Each candidate evaluation owns one [`InferenceContext`]: a union-find
//! table (ena) of inference variables, each carrying accumulating lower and
//! upper bound sets. Variables are materialized in the type representation as
//! globally unique `Infer` placeholders so they can sit inside composite
//! types (`List<?3>`) while constraints are collected.
//!
//! Contexts are created fresh per (candidate, call) evaluation and discarded
//! with the verdict; they are never shared, pooled, or reused across call
//! sites.

use crate::intern::TypeInterner;
use crate::subtype::AssignabilityOracle;
use crate::types::{TypeData, TypeId};
use ena::unify::{InPlaceUnificationTable, NoError, UnifyKey, UnifyValue};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Inference variable key.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct InferenceVar(pub u32);

impl UnifyKey for InferenceVar {
    type Value = InferenceInfo;

    fn index(&self) -> u32 {
        self.0
    }

    fn from_index(u: u32) -> Self {
        Self(u)
    }

    fn tag() -> &'static str {
        "InferenceVar"
    }
}

/// Per-variable state: the resolved type (once fixed) and the accumulated
/// bound sets.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InferenceInfo {
    pub resolved: Option<TypeId>,
    pub lower_bounds: SmallVec<[TypeId; 2]>,
    pub upper_bounds: SmallVec<[TypeId; 2]>,
}

impl UnifyValue for InferenceInfo {
    type Error = NoError;

    fn unify_values(a: &Self, b: &Self) -> Result<Self, NoError> {
        let mut merged = a.clone();
        for &lower in &b.lower_bounds {
            if !merged.lower_bounds.contains(&lower) {
                merged.lower_bounds.push(lower);
            }
        }
        for &upper in &b.upper_bounds {
            if !merged.upper_bounds.contains(&upper) {
                merged.upper_bounds.push(upper);
            }
        }
        if merged.resolved.is_none() {
            merged.resolved = b.resolved;
        }
        Ok(merged)
    }
}

/// Constraint resolution failure for one variable. Recovered locally by
/// discarding the candidate that owns the context.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InferenceError {
    /// Lower bounds admit no common solution.
    NoCommonLowerBound { var: InferenceVar },

    /// The chosen lower bound violates an upper bound.
    BoundsViolation {
        var: InferenceVar,
        lower: TypeId,
        upper: TypeId,
    },

    /// Resolution would make the variable contain itself.
    OccursCheck { var: InferenceVar, ty: TypeId },

    /// Nothing constrains the variable at all.
    Underconstrained { var: InferenceVar },
}

/// One candidate evaluation's inference state.
pub struct InferenceContext<'a> {
    interner: &'a TypeInterner,
    table: InPlaceUnificationTable<InferenceVar>,
    var_of_placeholder: FxHashMap<TypeId, InferenceVar>,
    placeholder_of_var: Vec<TypeId>,
}

impl<'a> InferenceContext<'a> {
    pub fn new(interner: &'a TypeInterner) -> Self {
        Self {
            interner,
            table: InPlaceUnificationTable::new(),
            var_of_placeholder: FxHashMap::default(),
            placeholder_of_var: Vec::new(),
        }
    }

    /// Allocate a fresh variable and its placeholder type.
    pub fn fresh_var(&mut self) -> InferenceVar {
        let var = self.table.new_key(InferenceInfo::default());
        let placeholder = self.interner.fresh_infer();
        self.var_of_placeholder.insert(placeholder, var);
        debug_assert_eq!(self.placeholder_of_var.len(), var.0 as usize);
        self.placeholder_of_var.push(placeholder);
        var
    }

    /// The placeholder type standing for `var` inside composite types.
    pub fn placeholder(&self, var: InferenceVar) -> TypeId {
        self.placeholder_of_var[var.0 as usize]
    }

    /// The variable a placeholder type stands for, if it belongs to this
    /// context. Placeholders from other resolution attempts are unknown here.
    pub fn var_for_placeholder(&self, ty: TypeId) -> Option<InferenceVar> {
        self.var_of_placeholder.get(&ty).copied()
    }

    pub fn add_lower_bound(&mut self, var: InferenceVar, ty: TypeId) {
        self.table.union_value(
            var,
            InferenceInfo {
                lower_bounds: smallvec::smallvec![ty],
                ..InferenceInfo::default()
            },
        );
    }

    pub fn add_upper_bound(&mut self, var: InferenceVar, ty: TypeId) {
        self.table.union_value(
            var,
            InferenceInfo {
                upper_bounds: smallvec::smallvec![ty],
                ..InferenceInfo::default()
            },
        );
    }

    /// Unify two variables into one equivalence class, merging bounds.
    pub fn unify(&mut self, a: InferenceVar, b: InferenceVar) {
        self.table.union(a, b);
    }

    /// The resolved type for `var`, if fixed.
    pub fn probe(&mut self, var: InferenceVar) -> Option<TypeId> {
        self.table.probe_value(var).resolved
    }

    /// Representative of `var`'s equivalence class.
    pub fn root(&mut self, var: InferenceVar) -> InferenceVar {
        self.table.find(var)
    }

    /// Replace resolved placeholders inside `ty`; unresolved ones stay.
    pub fn substitute(&mut self, ty: TypeId) -> TypeId {
        match self.interner.lookup(ty) {
            Some(TypeData::Infer(_)) => match self.var_for_placeholder(ty) {
                Some(var) => match self.probe(var) {
                    Some(resolved) if resolved != ty => self.substitute(resolved),
                    _ => ty,
                },
                None => ty,
            },
            Some(TypeData::Application(def, args)) => {
                let new_args: SmallVec<[TypeId; 1]> =
                    args.iter().map(|&a| self.substitute(a)).collect();
                if new_args == args {
                    ty
                } else {
                    self.interner.application(def, new_args)
                }
            }
            Some(TypeData::Function(shape)) => {
                let params: Vec<TypeId> = shape.params.iter().map(|&p| self.substitute(p)).collect();
                let ret = self.substitute(shape.ret);
                if ret == shape.ret && params.iter().copied().eq(shape.params.iter().copied()) {
                    ty
                } else {
                    self.interner.function(params, ret)
                }
            }
            _ => ty,
        }
    }

    /// Whether `var`'s current resolution, after substitution, still
    /// mentions `other`'s placeholder.
    pub fn depends_on(&mut self, var: InferenceVar, other: InferenceVar) -> bool {
        let other_root = self.root(other);
        let target = self.placeholder(other_root);
        let resolved = self.substitute(self.placeholder(var));
        self.type_mentions(resolved, target)
    }

    fn occurs_in(&mut self, var: InferenceVar, ty: TypeId) -> bool {
        let root = self.table.find(var);
        let placeholder = self.placeholder(root);
        let substituted = self.substitute(ty);
        self.type_mentions(substituted, placeholder)
    }

    fn type_mentions(&self, ty: TypeId, placeholder: TypeId) -> bool {
        if ty == placeholder {
            return true;
        }
        match self.interner.lookup(ty) {
            Some(TypeData::Application(_, args)) => {
                args.iter().any(|&a| self.type_mentions(a, placeholder))
            }
            Some(TypeData::Function(shape)) => {
                shape.params.iter().any(|&p| self.type_mentions(p, placeholder))
                    || self.type_mentions(shape.ret, placeholder)
            }
            _ => false,
        }
    }

    fn filter_relevant_bounds(&mut self, bounds: &[TypeId]) -> Vec<TypeId> {
        let mut seen = Vec::with_capacity(bounds.len());
        for &bound in bounds {
            let bound = self.substitute(bound);
            if matches!(bound, TypeId::ANY | TypeId::ERROR) {
                continue;
            }
            if !seen.contains(&bound) {
                seen.push(bound);
            }
        }
        seen
    }

    /// Resolve an inference variable using its collected constraints.
    ///
    /// Algorithm:
    /// 1. If already fixed, return that.
    /// 2. Pick the best common lower bound (a bound every other lower bound
    ///    is a subtype of).
    /// 3. With no usable lower bounds, fall back to the upper bound.
    /// 4. Validate against upper bounds and the occurs check, then fix.
    pub fn resolve_with_constraints<O: AssignabilityOracle>(
        &mut self,
        var: InferenceVar,
        oracle: &mut O,
    ) -> Result<TypeId, InferenceError> {
        if let Some(ty) = self.probe(var) {
            return Ok(ty);
        }

        let root = self.table.find(var);
        let info = self.table.probe_value(root);
        let lowers = self.filter_relevant_bounds(&info.lower_bounds);
        let uppers = self.filter_relevant_bounds(&info.upper_bounds);

        // Lower bounds still containing unresolved placeholders (deferred
        // function elements) cannot anchor the result; they are checked
        // against it afterwards.
        let (concrete, pending): (Vec<TypeId>, Vec<TypeId>) = lowers
            .iter()
            .copied()
            .partition(|&ty| !self.interner.contains_infer(ty));

        let result = if !concrete.is_empty() {
            concrete
                .iter()
                .copied()
                .find(|&candidate| {
                    concrete
                        .iter()
                        .all(|&other| oracle.is_subtype_of(other, candidate))
                })
                .ok_or(InferenceError::NoCommonLowerBound { var: root })?
        } else if let Some(&upper) = uppers.first() {
            upper
        } else if pending.is_empty() {
            return Err(InferenceError::Underconstrained { var: root });
        } else {
            // Only placeholder-bearing lower bounds and no upper bound:
            // nothing concrete can be chosen.
            return Err(InferenceError::Underconstrained { var: root });
        };

        for &upper in &uppers {
            if !oracle.is_subtype_of(result, upper) {
                return Err(InferenceError::BoundsViolation {
                    var: root,
                    lower: result,
                    upper,
                });
            }
        }
        for &lower in &pending {
            if !oracle.is_subtype_of(lower, result) {
                return Err(InferenceError::BoundsViolation {
                    var: root,
                    lower,
                    upper: result,
                });
            }
        }

        if self.occurs_in(root, result) {
            return Err(InferenceError::OccursCheck { var: root, ty: result });
        }

        self.table.union_value(
            root,
            InferenceInfo {
                resolved: Some(result),
                ..InferenceInfo::default()
            },
        );

        Ok(result)
    }
}
