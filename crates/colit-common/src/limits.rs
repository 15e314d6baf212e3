//! Centralized limits and thresholds for the resolution engine.
//!
//! Keeping these in one place prevents duplicate definitions with
//! inconsistent values and documents the rationale for each limit.

/// Maximum literal nesting depth the constraint engine will follow.
///
/// Resolution recursion is proportional to literal nesting depth (a literal
/// nested `k` levels deep is visited once per level, never once per outer
/// candidate), so this bound exists only to turn a pathological input like
/// `[[[[...]]]]` thousands of levels deep into a clean conflict instead of a
/// stack overflow.
pub const MAX_LITERAL_NESTING_DEPTH: u32 = 256;

/// Maximum depth for structural subtype decomposition.
///
/// Applications and function shapes in this engine are shallow, but the
/// ambient relation is caller-supplied and may be handed recursive types.
pub const MAX_SUBTYPE_DEPTH: u32 = 128;
