//! Diagnostic structures with stable numeric codes.
//!
//! The resolution engine itself returns typed errors; this module is the
//! rendering target a host front end consumes. Codes are stable so test
//! suites and editor integrations can match on them.

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DiagnosticCategory {
    Warning,
    Error,
    Message,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub category: DiagnosticCategory,
    pub message: &'static str,
}

/// Stable diagnostic codes.
///
/// 1xxx: factory registration violations (abort acceptance of the offending
/// capability, not the whole program). 2xxx: call-site resolution failures.
pub mod codes {
    pub const DUPLICATE_ANCHOR: u32 = 1001;
    pub const MISSING_ANCHOR: u32 = 1002;
    pub const RETURN_TYPE_MISMATCH: u32 = 1003;
    pub const INCONSISTENT_RETURN_TYPES: u32 = 1004;
    pub const PARAMETER_SHAPE_DIVERGENCE: u32 = 1005;
    pub const RECEIVER_NOT_ALLOWED: u32 = 1006;

    pub const UNKNOWN_CALLEE: u32 = 2001;
    pub const NO_APPLICABLE_CANDIDATE: u32 = 2002;
    pub const AMBIGUOUS_RESOLUTION: u32 = 2003;
    pub const TYPE_MISMATCH: u32 = 2004;
    pub const UNDERCONSTRAINED_LITERAL: u32 = 2005;
    pub const INTERNAL_ERROR: u32 = 2099;
}

pub const DIAGNOSTIC_MESSAGES: &[DiagnosticMessage] = &[
    DiagnosticMessage {
        code: codes::DUPLICATE_ANCHOR,
        category: DiagnosticCategory::Error,
        message: "Type declares more than one variable-arity construction signature.",
    },
    DiagnosticMessage {
        code: codes::MISSING_ANCHOR,
        category: DiagnosticCategory::Error,
        message: "Type declares no variable-arity construction signature.",
    },
    DiagnosticMessage {
        code: codes::RETURN_TYPE_MISMATCH,
        category: DiagnosticCategory::Error,
        message: "Construction signature does not return the type it is attached to.",
    },
    DiagnosticMessage {
        code: codes::INCONSISTENT_RETURN_TYPES,
        category: DiagnosticCategory::Error,
        message: "Construction signatures disagree on their return type.",
    },
    DiagnosticMessage {
        code: codes::PARAMETER_SHAPE_DIVERGENCE,
        category: DiagnosticCategory::Error,
        message: "Construction signatures may differ only in parameter count.",
    },
    DiagnosticMessage {
        code: codes::RECEIVER_NOT_ALLOWED,
        category: DiagnosticCategory::Error,
        message: "Construction signatures must not declare a contextual receiver.",
    },
    DiagnosticMessage {
        code: codes::UNKNOWN_CALLEE,
        category: DiagnosticCategory::Error,
        message: "No overloads are registered under this name.",
    },
    DiagnosticMessage {
        code: codes::NO_APPLICABLE_CANDIDATE,
        category: DiagnosticCategory::Error,
        message: "No overload is applicable to these arguments.",
    },
    DiagnosticMessage {
        code: codes::AMBIGUOUS_RESOLUTION,
        category: DiagnosticCategory::Error,
        message: "Call is ambiguous between multiple equally specific overloads.",
    },
    DiagnosticMessage {
        code: codes::TYPE_MISMATCH,
        category: DiagnosticCategory::Error,
        message: "Literal's expected type matches no registered construction capability.",
    },
    DiagnosticMessage {
        code: codes::UNDERCONSTRAINED_LITERAL,
        category: DiagnosticCategory::Error,
        message: "Cannot infer an element type for an empty, unannotated literal.",
    },
    DiagnosticMessage {
        code: codes::INTERNAL_ERROR,
        category: DiagnosticCategory::Error,
        message: "Internal invariant violation during literal desugaring.",
    },
];

pub fn get_message_template(code: u32) -> Option<&'static str> {
    DIAGNOSTIC_MESSAGES
        .iter()
        .find(|m| m.code == code)
        .map(|m| m.message)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub category: DiagnosticCategory,
    pub code: u32,
    pub message_text: String,
}

impl Diagnostic {
    pub fn error(code: u32, message: impl Into<String>) -> Self {
        Self {
            category: DiagnosticCategory::Error,
            code,
            message_text: message.into(),
        }
    }

    /// Build a diagnostic from the static template for `code`, appending
    /// `detail` when present.
    pub fn from_code(code: u32, detail: Option<&str>) -> Self {
        let template = get_message_template(code).unwrap_or("Unknown diagnostic.");
        let message_text = match detail {
            Some(detail) => format!("{template} {detail}"),
            None => template.to_string(),
        };
        Self {
            category: DiagnosticCategory::Error,
            code,
            message_text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_code_has_a_template() {
        for code in [
            codes::DUPLICATE_ANCHOR,
            codes::MISSING_ANCHOR,
            codes::RETURN_TYPE_MISMATCH,
            codes::INCONSISTENT_RETURN_TYPES,
            codes::PARAMETER_SHAPE_DIVERGENCE,
            codes::RECEIVER_NOT_ALLOWED,
            codes::UNKNOWN_CALLEE,
            codes::NO_APPLICABLE_CANDIDATE,
            codes::AMBIGUOUS_RESOLUTION,
            codes::TYPE_MISMATCH,
            codes::UNDERCONSTRAINED_LITERAL,
            codes::INTERNAL_ERROR,
        ] {
            assert!(get_message_template(code).is_some(), "missing template for {code}");
        }
    }
}
