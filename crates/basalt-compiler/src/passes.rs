//! The four compiler passes.
//!
//! ```text
//! proto ──▶ semant ──▶ translate ──▶ transdata
//! ```
//!
//! Each pass runs over the whole unit before the next one starts, so a
//! function body checked in `semant` sees every name registered by `proto`
//! regardless of textual order. The first failing declaration aborts the
//! pass and the unit.

use std::fmt;

use basalt_core::Diagnostic;
use tracing::debug;

use crate::codegen::Codegen;
use crate::context::{CompilationContext, DeclTarget};
use crate::decl::DeclSeq;
use crate::translate::Translator;

/// A compiler pass, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Pass {
    Proto,
    Semant,
    Translate,
    Transdata,
}

impl Pass {
    /// The pass that must have completed before this one.
    pub fn previous(self) -> Option<Pass> {
        match self {
            Pass::Proto => None,
            Pass::Semant => Some(Pass::Proto),
            Pass::Translate => Some(Pass::Semant),
            Pass::Transdata => Some(Pass::Translate),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Pass::Proto => "proto",
            Pass::Semant => "semant",
            Pass::Translate => "translate",
            Pass::Transdata => "transdata",
        }
    }
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Drives one unit through the passes.
///
/// Passes must be run in order, each exactly once.
#[derive(Debug, Default)]
pub struct Compiler {
    ctx: CompilationContext,
    completed: Option<Pass>,
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// The compilation state built so far.
    pub fn context(&self) -> &CompilationContext {
        &self.ctx
    }

    pub fn into_context(self) -> CompilationContext {
        self.ctx
    }

    /// The last pass that completed successfully.
    pub fn completed(&self) -> Option<Pass> {
        self.completed
    }

    fn begin(&self, pass: Pass, program: &DeclSeq) -> Result<(), Diagnostic> {
        if self.completed != pass.previous() {
            return Err(Diagnostic::internal(format!(
                "{pass} pass run out of order (last completed: {})",
                self.completed.map_or("none", Pass::as_str)
            )));
        }
        debug!(%pass, decls = program.len(), "starting pass");
        Ok(())
    }

    fn finish(&mut self, pass: Pass, result: Result<(), Diagnostic>) -> Result<(), Diagnostic> {
        match &result {
            Ok(()) => {
                debug!(%pass, "pass complete");
                self.completed = Some(pass);
            }
            Err(diag) => debug!(%pass, diagnostic = %diag, "pass failed"),
        }
        result
    }

    /// Register every top-level name and type.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn proto(&mut self, program: &mut DeclSeq) -> Result<(), Diagnostic> {
        self.begin(Pass::Proto, program)?;
        let root = self.ctx.root();
        let result = program.proto(&mut self.ctx, root, DeclTarget::Scope(root));
        self.finish(Pass::Proto, result)
    }

    /// Check function bodies and lay out structs.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn semant(&mut self, program: &mut DeclSeq) -> Result<(), Diagnostic> {
        self.begin(Pass::Semant, program)?;
        let root = self.ctx.root();
        let result = program.semant(&mut self.ctx, root);
        self.finish(Pass::Semant, result)
    }

    /// Emit code and descriptors into `g`.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn translate(&mut self, program: &DeclSeq, g: &mut dyn Codegen) -> Result<(), Diagnostic> {
        self.begin(Pass::Translate, program)?;
        let result = program.translate(&mut Translator::new(&mut self.ctx, g));
        self.finish(Pass::Translate, result)
    }

    /// Emit `Data` records into `g`.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn transdata(&mut self, program: &DeclSeq, g: &mut dyn Codegen) -> Result<(), Diagnostic> {
        self.begin(Pass::Transdata, program)?;
        let result = program.transdata(&mut Translator::new(&mut self.ctx, g));
        self.finish(Pass::Transdata, result)
    }

    /// Run all four passes in order.
    pub fn compile(&mut self, program: &mut DeclSeq, g: &mut dyn Codegen) -> Result<(), Diagnostic> {
        self.proto(program)?;
        self.semant(program)?;
        self.translate(program, g)?;
        self.transdata(program, g)
    }
}
