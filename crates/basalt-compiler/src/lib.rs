//! Basalt declaration compiler.
//!
//! Turns a tree of top-level declarations into a populated type registry,
//! checked function bodies and code for a [`Codegen`] backend.
//!
//! ## Passes
//!
//! - **proto**: register names and types; no bodies are checked
//! - **semant**: check function bodies and lay out struct fields
//! - **translate**: emit code, struct and array descriptors, global slots
//! - **transdata**: emit `Data` records
//!
//! ## Modules
//!
//! - [`codegen`]: the backend contract, intermediate trees and [`Listing`]
//! - [`context`]: per-unit state: types, scopes, labels
//! - [`decl`]: the declaration kinds and the [`DeclSeq`] driver
//! - [`expr`] / [`stmt`]: the expression and statement interfaces
//! - [`frame`]: stack frame layout for function bodies
//! - [`passes`]: the [`Compiler`] running the passes in order

pub mod codegen;
pub mod context;
pub mod decl;
pub mod descriptor;
pub mod expr;
pub mod frame;
mod labels;
pub mod passes;
pub mod scope;
pub mod stmt;
mod translate;

pub use codegen::{Codegen, Emission, IrNode, Listing};
pub use context::{CompilationContext, DeclTarget, TypeTag};
pub use decl::{
    DataDecl, DeclNode, DeclSeq, Declaration, FuncDecl, StructDecl, VarDecl, VectorDecl,
};
pub use expr::{CheckedExpr, ExprNode, LiteralExpr, NameExpr, NewExpr};
pub use frame::Frame;
pub use labels::LabelGen;
pub use passes::{Compiler, Pass};
pub use scope::{EnvId, Environment, ScopeKind};
pub use stmt::{BlockStmt, DeclStmt, ExprStmt, GotoStmt, LabelStmt, StmtNode, StmtSeq};
pub use translate::Translator;

pub use basalt_core::{Diagnostic, DiagnosticKind};
