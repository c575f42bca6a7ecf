//! Basalt core types.
//!
//! Shared vocabulary for the declaration compiler: source spans, diagnostics,
//! folded literals, declaration flags and runtime record tags.

mod decl_flags;
mod error;
mod literal;
mod span;

pub use decl_flags::{DataTag, DeclFlags, WORD_SIZE};
pub use error::{CodegenError, Diagnostic, DiagnosticKind, TranslateError};
pub use literal::Literal;
pub use span::Span;
