//! State threaded through the translate and transdata passes.

use basalt_core::{DeclFlags, Diagnostic, TranslateError};

use crate::codegen::{Codegen, IrNode, runtime};
use crate::context::CompilationContext;
use crate::descriptor::global_label;
use crate::frame::Frame;
use crate::scope::EnvId;

/// Couples the compilation context with a backend.
///
/// Declarations are read-only at this stage; the context is borrowed mutably
/// only so that fresh labels can be generated.
pub struct Translator<'a> {
    ctx: &'a mut CompilationContext,
    g: &'a mut dyn Codegen,
    frame: Option<Frame>,
}

impl<'a> Translator<'a> {
    /// Create a translator over `ctx` emitting into `g`.
    pub fn new(ctx: &'a mut CompilationContext, g: &'a mut dyn Codegen) -> Self {
        Self { ctx, g, frame: None }
    }

    /// The compilation context.
    pub fn ctx(&self) -> &CompilationContext {
        &*self.ctx
    }

    /// The backend.
    pub fn codegen(&mut self) -> &mut (dyn Codegen + 'a) {
        &mut *self.g
    }

    /// Whether debug instrumentation is on.
    pub fn debug(&self) -> bool {
        self.g.debug()
    }

    /// Generate a fresh unit-unique label.
    pub fn gen_label(&mut self) -> String {
        self.ctx.gen_label()
    }

    /// The frame of the function being translated, if any.
    pub fn frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    /// Install a frame, returning the previous one.
    pub fn replace_frame(&mut self, frame: Option<Frame>) -> Option<Frame> {
        std::mem::replace(&mut self.frame, frame)
    }

    /// The storage location of variable `name` declared in `env`.
    pub fn var_location(&self, env: EnvId, name: &str) -> Result<IrNode, Diagnostic> {
        let (owner, decl) = self
            .ctx
            .lookup(env, name)
            .ok_or_else(|| Diagnostic::internal(format!("variable '{name}' vanished")))?;

        if decl.kind.contains(DeclFlags::GLOBAL) {
            return Ok(IrNode::global_word(global_label(name)));
        }
        if decl.kind.intersects(DeclFlags::LOCAL | DeclFlags::PARAM) {
            return self
                .frame
                .as_ref()
                .and_then(|f| f.offset(owner, name))
                .map(IrNode::Local)
                .ok_or_else(|| Diagnostic::internal(format!("variable '{name}' has no frame slot")));
        }
        Err(Diagnostic::internal(format!("'{name}' has no storage")))
    }

    /// Emit a string payload and return code producing a string from it.
    pub fn string_constant(&mut self, value: &str) -> Result<IrNode, TranslateError> {
        let label = self.gen_label();
        self.g.emit_string(value, &label)?;
        Ok(IrNode::call(runtime::STR_CONST, vec![IrNode::Global(label)]))
    }
}
