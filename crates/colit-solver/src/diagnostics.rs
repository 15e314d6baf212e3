//! Rendering of resolution failures into host-facing diagnostics.

use crate::def::DefinitionStore;
use crate::factory::RegistrationError;
use crate::intern::TypeInterner;
use crate::select::ResolveError;
use colit_common::diagnostics::{Diagnostic, codes};
use colit_common::interner::Interner;

pub fn registration_diagnostic(err: RegistrationError) -> Diagnostic {
    let code = match err {
        RegistrationError::DuplicateAnchor => codes::DUPLICATE_ANCHOR,
        RegistrationError::MissingAnchor => codes::MISSING_ANCHOR,
        RegistrationError::ReturnTypeMismatch => codes::RETURN_TYPE_MISMATCH,
        RegistrationError::InconsistentReturnTypes => codes::INCONSISTENT_RETURN_TYPES,
        RegistrationError::ParameterShapeDivergence => codes::PARAMETER_SHAPE_DIVERGENCE,
        RegistrationError::ReceiverNotAllowed => codes::RECEIVER_NOT_ALLOWED,
    };
    Diagnostic::from_code(code, None)
}

pub fn resolve_diagnostic(
    err: &ResolveError,
    interner: &TypeInterner,
    defs: &DefinitionStore,
    strings: &Interner,
) -> Diagnostic {
    match err {
        ResolveError::UnknownCallee { name } => {
            let name = strings.resolve(*name).unwrap_or_else(|| "<unknown>".to_string());
            Diagnostic::from_code(codes::UNKNOWN_CALLEE, Some(format!("Callee: `{name}`.").as_str()))
        }
        ResolveError::NoApplicableCandidate { rejected } => Diagnostic::from_code(
            codes::NO_APPLICABLE_CANDIDATE,
            Some(format!("{} candidate(s) considered.", rejected.len()).as_str()),
        ),
        ResolveError::AmbiguousResolution { candidates } => Diagnostic::from_code(
            codes::AMBIGUOUS_RESOLUTION,
            Some(format!("{} candidates remain tied.", candidates.len()).as_str()),
        ),
        ResolveError::TypeMismatch { expected, .. } => {
            let expected = interner.display(*expected, defs, strings);
            Diagnostic::from_code(codes::TYPE_MISMATCH, Some(format!("Expected: `{expected}`.").as_str()))
        }
        ResolveError::UnderconstrainedLiteral { .. } => {
            Diagnostic::from_code(codes::UNDERCONSTRAINED_LITERAL, None)
        }
        ResolveError::Internal { message } => {
            Diagnostic::from_code(codes::INTERNAL_ERROR, Some(*message))
        }
    }
}
