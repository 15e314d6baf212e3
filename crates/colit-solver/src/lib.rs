//! Constraint-Based Literal Resolution
//!
//! This crate resolves call expressions whose arguments are composite
//! (collection-like) literals: given an overload set and literals whose
//! concrete container types are still unknown, it selects a candidate,
//! infers a type for each literal, and desugars every literal into an
//! explicit factory construction call. It uses:
//!
//! - **Ena**: union-find over inference variables with accumulating bounds
//! - **Interned `TypeData`**: structural type representation with O(1)
//!   equality via `TypeId` comparison
//! - **Two-stage selection**: applicability filtering, then specificity
//!
//! Registration state (signatures, factories, definitions) is immutable once
//! built and shareable across concurrent resolutions; each resolution
//! attempt owns its inference state and discards it with the verdict.

pub mod analyze;
pub mod ast;
pub mod constraints;
pub mod def;
pub mod desugar;
mod diagnostics;
pub mod factory;
pub mod infer;
pub mod instantiate;
mod intern;
pub mod select;
pub mod signatures;
pub mod subtype;
pub mod types;

pub use analyze::{ElementClassification, LiteralAnalyzer};
pub use ast::{CallExpr, DeferredShape, ElementExpr, ExprArena, LiteralExpr, LiteralId};
pub use constraints::{
    Bindings, CandidateVerdict, ConstraintSystem, EngineContext, InapplicableReason,
};
pub use def::{DefId, DefKind, DefinitionInfo, DefinitionStore};
pub use desugar::{ConstructionCall, DesugaredCall, DesugaredElement, Desugarer};
pub use diagnostics::{registration_diagnostic, resolve_diagnostic};
pub use factory::{
    FactoryArity, FactoryCapability, FactoryDecl, FactoryFlags, FactoryMember, FactoryMemberId,
    FactoryRegistry, NoFactory, RegistrationError,
};
pub use infer::{InferenceContext, InferenceError, InferenceVar};
pub use instantiate::{TypeSubstitution, instantiate_type};
pub use intern::TypeInterner;
pub use select::{CallContext, ResolutionStats, ResolveError, ResolvedCall, Resolver};
pub use signatures::{CallableSignature, ParamArity, ParamDecl, SigId, SignatureTable};
pub use subtype::{AssignabilityOracle, StructuralRelation};
pub use types::{FunctionShape, IntrinsicKind, TypeData, TypeId, TypeParamInfo};
