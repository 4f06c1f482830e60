//! Diagnostics exposed at the API boundary.
//!
//! Errors carrying a source location convert to a [`Diagnostic`] so that
//! front-ends can render them without knowing the internal error types.

use crate::parser::Span;

/// An error message with source location.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Primary diagnostic message.
    pub message: String,

    /// Source location of the primary issue.
    pub span: Span,

    /// Related locations that provide additional context.
    pub related: Vec<RelatedInfo>,

    /// Help text suggesting how to fix the issue.
    pub help: Vec<String>,

    /// Optional error code (e.g., "P001") for documentation lookup.
    pub code: Option<String>,
}

/// A secondary location, e.g. where an unclosed list runs out of input.
#[derive(Debug, Clone)]
pub struct RelatedInfo {
    pub span: Span,
    pub message: String,
}
