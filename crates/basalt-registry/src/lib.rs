//! Basalt type registry.
//!
//! Holds the types and declaration tables produced while compiling one unit:
//!
//! - [`TypeArena`]: owns every [`Type`] of the unit, addressed by [`TypeId`]
//! - [`DeclTable`]: ordered, duplicate-rejecting name → [`Decl`] mapping

mod arena;
mod decl;
mod types;

pub use arena::{TypeArena, TypeId, TypeMark, primitives};
pub use decl::{Decl, DeclTable};
pub use types::{FunctionType, StructType, Type, VectorType};

use thiserror::Error;

/// Errors raised by registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The name is already declared in the table.
    #[error("'{name}' is already declared")]
    Duplicate {
        /// The rejected name.
        name: String,
    },
}
