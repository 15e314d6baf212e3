//! Common types and utilities for the colit resolution engine.
//!
//! This crate provides foundational types used across all colit crates:
//! - String interning (`Atom`, `Interner`)
//! - Diagnostics (`Diagnostic`, message tables, stable codes)
//! - Centralized limits and thresholds

// String interning for identifier deduplication
pub mod interner;
pub use interner::{Atom, Interner};

// Diagnostics with stable numeric codes
pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticMessage};

// Centralized limits and thresholds
pub mod limits;
