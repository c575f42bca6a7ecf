//! Fixed-size array declarations.

use basalt_core::{DataTag, DeclFlags, Diagnostic, DiagnosticKind, TranslateError};
use basalt_registry::{Decl, Type, TypeId, VectorType, primitives};

use crate::context::{CompilationContext, DeclTarget, TypeTag};
use crate::descriptor::{global_label, type_descriptor};
use crate::expr::ExprNode;
use crate::scope::EnvId;
use crate::translate::Translator;

/// `Dim name[tag][d1, d2, ...]`
///
/// Each dimension stores one slot more than declared, so `[2, 3]` holds
/// `3 * 4` elements.
#[derive(Debug)]
pub struct VectorDecl {
    pub ident: String,
    pub tag: TypeTag,
    pub kind: DeclFlags,
    pub sizes: Vec<Box<dyn ExprNode>>,
    ty: Option<TypeId>,
}

impl VectorDecl {
    pub fn new(ident: impl Into<String>, tag: TypeTag, kind: DeclFlags) -> Self {
        Self {
            ident: ident.into(),
            tag,
            kind,
            sizes: Vec::new(),
            ty: None,
        }
    }

    pub fn with_dim(mut self, size: impl ExprNode + 'static) -> Self {
        self.sizes.push(Box::new(size));
        self
    }

    /// The array's type, once `proto` has run.
    pub fn ty(&self) -> Option<TypeId> {
        self.ty
    }

    pub(super) fn proto(
        &mut self,
        ctx: &mut CompilationContext,
        env: EnvId,
        target: DeclTarget,
    ) -> Result<(), Diagnostic> {
        let element = ctx.resolve_tag(&self.tag, env)?.unwrap_or(primitives::INT);

        let mut sizes = Vec::with_capacity(self.sizes.len());
        for expr in &self.sizes {
            let n = expr
                .semant(ctx, env)?
                .constant_fold()
                .ok_or_else(|| Diagnostic::not_constant("array sizes must be constant"))?
                .as_int();
            let n = u32::try_from(n).map_err(|_| {
                Diagnostic::new(
                    DiagnosticKind::InvalidArraySize,
                    "array sizes must not be negative",
                )
                .at(expr.span())
            })?;
            sizes.push(n + 1);
        }

        let mark = ctx.type_mark();
        let label = ctx.gen_label();
        let ty = ctx.mint(
            env,
            Type::Vector(VectorType {
                label,
                element,
                sizes,
            }),
        );
        if let Err(e) = ctx.insert_decl(target, Decl::new(&self.ident, ty, self.kind), "identifier") {
            ctx.release_types(mark);
            return Err(e);
        }
        self.ty = Some(ty);
        Ok(())
    }

    /// Emit the array descriptor, then the storage slot for a global.
    pub(super) fn translate(&self, tx: &mut Translator<'_>) -> Result<(), TranslateError> {
        let ty = self
            .ty
            .ok_or_else(|| Diagnostic::internal(format!("array '{}' used before proto", self.ident)))?;
        let vector = tx
            .ctx()
            .ty(ty)
            .and_then(Type::as_vector)
            .ok_or_else(|| Diagnostic::new(DiagnosticKind::NullType, "array type released"))?;
        let label = vector.label.clone();
        let capacity = vector.capacity().ok_or_else(|| {
            Diagnostic::new(DiagnosticKind::InvalidArraySize, "array capacity overflows")
        })?;
        let element = type_descriptor(tx.ctx().types(), vector.element)?;

        let g = tx.codegen();
        g.align_data(4)?;
        g.emit_word(DataTag::VectorType.into(), Some(&label))?;
        g.emit_word(capacity, None)?;
        g.emit_pointer(&element)?;
        if self.kind.contains(DeclFlags::GLOBAL) {
            g.emit_word(0, Some(&global_label(&self.ident)))?;
        }
        Ok(())
    }
}
