//! Basalt: a declaration-level compiler for a BASIC-family language.
//!
//! The crate is a thin facade over the workspace:
//!
//! - [`basalt_core`]: spans, diagnostics, literals and declaration flags
//! - [`basalt_registry`]: types and declaration tables
//! - [`basalt_compiler`]: declarations, passes and the code generator contract
//!
//! Most users only need [`Unit`].

mod unit;

pub use unit::{BuildError, CompileOptions, Unit, UnitError};

pub use basalt_compiler;
pub use basalt_core;
pub use basalt_registry;

pub use basalt_compiler::{Codegen, Emission, Listing};
pub use basalt_core::{Diagnostic, DiagnosticKind};
