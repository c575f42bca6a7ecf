//! Compilation unit API.
//!
//! A [`Unit`] collects the top-level declarations of one program and runs
//! them through the compiler passes.
//!
//! # Example
//!
//! ```
//! use basalt::{CompileOptions, Unit};
//! use basalt::basalt_compiler::{DeclNode, TypeTag, VarDecl};
//! use basalt::basalt_core::{DeclFlags, Span};
//!
//! let mut unit = Unit::new(CompileOptions::default());
//! unit.add_decl(DeclNode::new(
//!     Span::point(1, 1),
//!     VarDecl::new("score", TypeTag::Int, DeclFlags::GLOBAL).into(),
//! ))?;
//!
//! let listing = unit.build()?;
//! assert!(listing.is_defined("_vscore"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use basalt_compiler::{CompilationContext, Codegen, Compiler, DeclNode, DeclSeq, Listing};
use basalt_core::Diagnostic;
use tracing::debug;

/// Options applied to a whole unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Emit debugger enter/leave calls around every function.
    pub debug: bool,
    /// File reported by diagnostics that carry no file of their own.
    pub default_file: Option<String>,
}

impl CompileOptions {
    /// Switch debug instrumentation on or off.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Set the fallback file name for diagnostics.
    pub fn with_default_file(mut self, file: impl Into<String>) -> Self {
        self.default_file = Some(file.into());
        self
    }
}

#[derive(Debug)]
enum State {
    Open(DeclSeq),
    Built(CompilationContext),
    Failed,
}

/// A compilation unit.
///
/// Declarations are added with [`add_decl`](Unit::add_decl) and compiled
/// once with [`build`](Unit::build) or [`build_with`](Unit::build_with).
/// A failed build releases everything the unit held.
#[derive(Debug)]
pub struct Unit {
    options: CompileOptions,
    state: State,
}

impl Default for Unit {
    fn default() -> Self {
        Self::new(CompileOptions::default())
    }
}

impl Unit {
    /// Create an empty unit.
    pub fn new(options: CompileOptions) -> Self {
        Self {
            options,
            state: State::Open(DeclSeq::new()),
        }
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Add a top-level declaration.
    ///
    /// # Errors
    ///
    /// Returns an error once the unit has been built.
    pub fn add_decl(&mut self, decl: DeclNode) -> Result<(), UnitError> {
        match &mut self.state {
            State::Open(program) => {
                program.push(decl);
                Ok(())
            }
            State::Built(_) => Err(UnitError::AlreadyBuilt),
            State::Failed => Err(UnitError::Failed),
        }
    }

    /// Number of declarations waiting to be built.
    pub fn decl_count(&self) -> usize {
        match &self.state {
            State::Open(program) => program.len(),
            State::Built(_) | State::Failed => 0,
        }
    }

    /// Build into a fresh [`Listing`].
    ///
    /// # Errors
    ///
    /// Returns the first diagnostic raised by any pass.
    pub fn build(&mut self) -> Result<Listing, BuildError> {
        let mut listing = Listing::with_debug(self.options.debug);
        self.build_with(&mut listing)?;
        Ok(listing)
    }

    /// Build into a caller-supplied backend.
    ///
    /// The backend decides whether debug instrumentation is emitted.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn build_with(&mut self, g: &mut dyn Codegen) -> Result<(), BuildError> {
        let mut program = match std::mem::replace(&mut self.state, State::Failed) {
            State::Open(program) => program,
            built @ State::Built(_) => {
                self.state = built;
                return Err(BuildError::AlreadyBuilt);
            }
            State::Failed => return Err(BuildError::Failed),
        };

        debug!(decls = program.len(), debug = g.debug(), "building unit");
        let mut compiler = Compiler::new();
        match compiler.compile(&mut program, g) {
            Ok(()) => {
                self.state = State::Built(compiler.into_context());
                Ok(())
            }
            Err(diag) => {
                let diag = diag.with_file_if_unset(self.options.default_file.as_deref());
                debug!(diagnostic = %diag, "unit failed");
                Err(BuildError::Compilation(diag))
            }
        }
    }

    /// The compiled registry, once built.
    pub fn context(&self) -> Option<&CompilationContext> {
        match &self.state {
            State::Built(ctx) => Some(ctx),
            State::Open(_) | State::Failed => None,
        }
    }

    /// Check if the unit has been built.
    pub fn is_built(&self) -> bool {
        matches!(self.state, State::Built(_))
    }
}

/// Errors that can occur when modifying a unit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnitError {
    /// The unit has already been built
    #[error("unit has already been built")]
    AlreadyBuilt,

    /// An earlier build failed and released the unit
    #[error("unit failed to build and was released")]
    Failed,
}

/// Errors that can occur during unit building.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// Unit has already been built
    #[error("unit has already been built")]
    AlreadyBuilt,

    /// An earlier build failed and released the unit
    #[error("unit failed to build and was released")]
    Failed,

    /// A pass raised a diagnostic
    #[error(transparent)]
    Compilation(#[from] Diagnostic),
}

impl BuildError {
    /// The diagnostic behind a compilation failure.
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            BuildError::Compilation(diag) => Some(diag),
            BuildError::AlreadyBuilt | BuildError::Failed => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use basalt_compiler::{TypeTag, VarDecl};
    use basalt_core::{DeclFlags, DiagnosticKind, Span};

    fn global(name: &str) -> DeclNode {
        DeclNode::new(
            Span::point(1, 1),
            VarDecl::new(name, TypeTag::Int, DeclFlags::GLOBAL).into(),
        )
    }

    #[test]
    fn build_once() {
        let mut unit = Unit::default();
        unit.add_decl(global("a")).unwrap();
        assert_eq!(unit.decl_count(), 1);
        unit.build().unwrap();
        assert!(unit.is_built());
        assert!(unit.context().is_some());

        assert_eq!(unit.add_decl(global("b")), Err(UnitError::AlreadyBuilt));
        assert_eq!(unit.build().unwrap_err(), BuildError::AlreadyBuilt);
    }

    #[test]
    fn failed_build_releases_unit() {
        let mut unit = Unit::new(CompileOptions::default().with_default_file("game.bb"));
        unit.add_decl(global("a")).unwrap();
        unit.add_decl(global("a")).unwrap();

        let err = unit.build().unwrap_err();
        let diag = err.diagnostic().unwrap();
        assert_eq!(diag.kind, DiagnosticKind::DuplicateIdentifier);
        assert_eq!(diag.file.as_deref(), Some("game.bb"));
        assert!(!unit.is_built());
        assert!(unit.context().is_none());
        assert_eq!(unit.add_decl(global("b")), Err(UnitError::Failed));
    }
}
