//! Declarations and the four passes they go through.
//!
//! Every declaration kind implements the same contract:
//!
//! | pass        | effect                                                    |
//! |-------------|-----------------------------------------------------------|
//! | `proto`     | register the name and its type; no bodies are checked     |
//! | `semant`    | check bodies and lay out structs, all siblings now visible |
//! | `translate` | emit executable code and static descriptors               |
//! | `transdata` | emit `Data` records into the static data segment          |
//!
//! [`Declaration`] is a closed set. Dispatch is an exhaustive `match` in
//! [`DeclNode`], so adding a kind means touching every pass.

mod data;
mod func;
mod seq;
mod struct_decl;
mod var;
mod vector;

pub use data::DataDecl;
pub use func::FuncDecl;
pub use seq::DeclSeq;
pub use struct_decl::StructDecl;
pub use var::VarDecl;
pub use vector::VectorDecl;

use basalt_core::{Diagnostic, Span, TranslateError};

use crate::context::{CompilationContext, DeclTarget};
use crate::scope::EnvId;
use crate::translate::Translator;

/// The declaration kinds.
#[derive(Debug)]
pub enum Declaration {
    Var(VarDecl),
    Func(FuncDecl),
    Struct(StructDecl),
    Data(DataDecl),
    Vector(VectorDecl),
}

impl Declaration {
    /// Short kind name used in logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Declaration::Var(_) => "var",
            Declaration::Func(_) => "function",
            Declaration::Struct(_) => "struct",
            Declaration::Data(_) => "data",
            Declaration::Vector(_) => "vector",
        }
    }

    /// The declared name; `Data` statements have none.
    pub fn ident(&self) -> Option<&str> {
        match self {
            Declaration::Var(v) => Some(&v.ident),
            Declaration::Func(f) => Some(&f.ident),
            Declaration::Struct(s) => Some(&s.ident),
            Declaration::Data(_) => None,
            Declaration::Vector(v) => Some(&v.ident),
        }
    }
}

/// A declaration with its source location.
#[derive(Debug)]
pub struct DeclNode {
    /// Where the declaration starts.
    pub pos: Span,
    /// The file it was read from.
    pub file: Option<String>,
    pub decl: Declaration,
}

impl DeclNode {
    pub fn new(pos: Span, decl: Declaration) -> Self {
        Self {
            pos,
            file: None,
            decl,
        }
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Fill an escaping diagnostic's position and file where unset.
    pub fn decorate(&self, diag: Diagnostic) -> Diagnostic {
        diag.with_position_if_unset(self.pos)
            .with_file_if_unset(self.file.as_deref())
    }

    /// Register the declaration into `target`, resolving names from `env`.
    pub fn proto(
        &mut self,
        ctx: &mut CompilationContext,
        env: EnvId,
        target: DeclTarget,
    ) -> Result<(), Diagnostic> {
        match &mut self.decl {
            Declaration::Var(d) => d.proto(ctx, env, target),
            Declaration::Func(d) => d.proto(ctx, env, target),
            Declaration::Struct(d) => d.proto(ctx, env, target),
            Declaration::Data(d) => d.proto(ctx, env),
            Declaration::Vector(d) => d.proto(ctx, env, target),
        }
    }

    /// Check the declaration with every sibling visible.
    pub fn semant(&mut self, ctx: &mut CompilationContext, env: EnvId) -> Result<(), Diagnostic> {
        match &mut self.decl {
            Declaration::Var(_) | Declaration::Data(_) | Declaration::Vector(_) => Ok(()),
            Declaration::Func(d) => d.semant(ctx, env),
            Declaration::Struct(d) => d.semant(ctx, env),
        }
    }

    /// Emit code and static descriptors.
    pub fn translate(&self, tx: &mut Translator<'_>) -> Result<(), TranslateError> {
        match &self.decl {
            Declaration::Var(d) => d.translate(tx),
            Declaration::Func(d) => d.translate(tx),
            Declaration::Struct(d) => d.translate(tx),
            Declaration::Data(d) => d.translate(tx),
            Declaration::Vector(d) => d.translate(tx),
        }
    }

    /// Emit data-segment records.
    pub fn transdata(&self, tx: &mut Translator<'_>) -> Result<(), TranslateError> {
        match &self.decl {
            Declaration::Data(d) => d.transdata(tx),
            Declaration::Var(_)
            | Declaration::Func(_)
            | Declaration::Struct(_)
            | Declaration::Vector(_) => Ok(()),
        }
    }
}

impl From<VarDecl> for Declaration {
    fn from(d: VarDecl) -> Self {
        Declaration::Var(d)
    }
}

impl From<FuncDecl> for Declaration {
    fn from(d: FuncDecl) -> Self {
        Declaration::Func(d)
    }
}

impl From<StructDecl> for Declaration {
    fn from(d: StructDecl) -> Self {
        Declaration::Struct(d)
    }
}

impl From<DataDecl> for Declaration {
    fn from(d: DataDecl) -> Self {
        Declaration::Data(d)
    }
}

impl From<VectorDecl> for Declaration {
    fn from(d: VectorDecl) -> Self {
        Declaration::Vector(d)
    }
}
