//! Diagnostic and error types for the declaration compiler.
//!
//! ## Error Hierarchy
//!
//! ```text
//! TranslateError (internal to the translate pass)
//! ├── Diagnostic    - a positioned compiler diagnostic (DiagnosticKind + message)
//! └── CodegenError  - a failure reported by the code generator backend
//! ```
//!
//! Every pass returns `Result<_, Diagnostic>` to its caller. The translate pass
//! additionally meets backend failures; the sequence driver folds those into a
//! [`DiagnosticKind::TranslationFailed`] diagnostic so the outermost caller only
//! ever sees one failure shape.
//!
//! Position and file are optional on a [`Diagnostic`]. They are filled in by the
//! nearest enclosing declaration when unset and never overwritten once set.

use std::fmt;

use thiserror::Error;

use crate::Span;

// ============================================================================
// Diagnostics
// ============================================================================

/// Categories of compiler diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// A name was declared twice in the same table.
    DuplicateIdentifier,
    /// A label was referenced but never defined in its function.
    UndefinedLabel,
    /// An expression that must fold to a constant did not.
    NotConstant,
    /// A struct field initializer is not a constant of a storable kind.
    InvalidFieldInitializer,
    /// A type could not be resolved.
    UnknownType,
    /// A name could not be resolved.
    UnknownIdentifier,
    /// A declaration refers to a type that no longer exists.
    NullType,
    /// An expression could not be converted to the required type.
    TypeMismatch,
    /// An array dimension is negative or the capacity overflows.
    InvalidArraySize,
    /// A non-diagnostic failure escaped the translate pass.
    TranslationFailed,
    /// A compiler invariant was broken.
    Internal,
}

impl DiagnosticKind {
    /// Returns a human-readable name for this diagnostic kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::DuplicateIdentifier => "duplicate identifier",
            DiagnosticKind::UndefinedLabel => "undefined label",
            DiagnosticKind::NotConstant => "not constant",
            DiagnosticKind::InvalidFieldInitializer => "invalid field initializer",
            DiagnosticKind::UnknownType => "unknown type",
            DiagnosticKind::UnknownIdentifier => "unknown identifier",
            DiagnosticKind::NullType => "null type",
            DiagnosticKind::TypeMismatch => "type mismatch",
            DiagnosticKind::InvalidArraySize => "invalid array size",
            DiagnosticKind::TranslationFailed => "translation failed",
            DiagnosticKind::Internal => "internal error",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A compiler diagnostic with optional location.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}{kind}: {message}", location(.file, .pos))]
pub struct Diagnostic {
    /// The category of this diagnostic.
    pub kind: DiagnosticKind,
    /// A detailed message.
    pub message: String,
    /// Where the problem was found, if known.
    pub pos: Option<Span>,
    /// The source file, if known.
    pub file: Option<String>,
}

/// `file:line:col: `, `file: `, `at line:col: ` or nothing.
fn location(file: &Option<String>, pos: &Option<Span>) -> String {
    match (file, pos) {
        (Some(file), Some(pos)) => format!("{file}:{pos}: "),
        (Some(file), None) => format!("{file}: "),
        (None, Some(pos)) => format!("at {pos}: "),
        (None, None) => String::new(),
    }
}

impl Diagnostic {
    /// Create a diagnostic with no location.
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            pos: None,
            file: None,
        }
    }

    /// Attach a position, replacing any existing one.
    pub fn at(mut self, pos: Span) -> Self {
        self.pos = Some(pos);
        self
    }

    /// Fill the position only if it has not been set yet.
    pub fn with_position_if_unset(mut self, pos: Span) -> Self {
        if self.pos.is_none() {
            self.pos = Some(pos);
        }
        self
    }

    /// Fill the file only if it has not been set yet.
    pub fn with_file_if_unset(mut self, file: Option<&str>) -> Self {
        if self.file.is_none() {
            self.file = file.map(str::to_string);
        }
        self
    }

    /// Create a "duplicate identifier" diagnostic.
    pub fn duplicate(what: &str, name: &str) -> Self {
        Self::new(
            DiagnosticKind::DuplicateIdentifier,
            format!("duplicate {what} '{name}'"),
        )
    }

    /// Create a "not constant" diagnostic.
    pub fn not_constant(message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::NotConstant, message)
    }

    /// Create an "unknown type" diagnostic.
    pub fn unknown_type(message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::UnknownType, message)
    }

    /// Create a "type mismatch" diagnostic.
    pub fn type_mismatch(message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::TypeMismatch, message)
    }

    /// Create the generic translation failure.
    pub fn translation_failed() -> Self {
        Self::new(DiagnosticKind::TranslationFailed, "translation failed")
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Internal, message)
    }
}

// ============================================================================
// Backend Errors
// ============================================================================

/// Errors reported by a code generator backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodegenError {
    /// A label was defined twice in the output.
    #[error("label '{0}' defined twice")]
    LabelRedefined(String),

    /// A function was left without being entered, or entered twice.
    #[error("unbalanced function frame: {0}")]
    UnbalancedFrame(String),

    /// Any other backend failure.
    #[error("{0}")]
    Backend(String),
}

/// Failure of the translate pass before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslateError {
    /// A compiler diagnostic.
    #[error(transparent)]
    Diagnostic(#[from] Diagnostic),

    /// A backend failure.
    #[error("codegen failure: {0}")]
    Codegen(#[from] CodegenError),
}

impl TranslateError {
    /// Fold into the uniform diagnostic shape.
    ///
    /// Diagnostics pass through untouched; backend failures become
    /// [`DiagnosticKind::TranslationFailed`] with no position.
    pub fn into_diagnostic(self) -> Diagnostic {
        match self {
            TranslateError::Diagnostic(diag) => diag,
            TranslateError::Codegen(_) => Diagnostic::translation_failed(),
        }
    }
}
