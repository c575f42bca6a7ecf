//! Struct type declarations.

use basalt_core::{DataTag, DeclFlags, Diagnostic, DiagnosticKind, TranslateError, WORD_SIZE};
use basalt_registry::{Decl, DeclTable, StructType, Type, TypeId};

use super::DeclSeq;
use crate::context::{CompilationContext, DeclTarget};
use crate::descriptor::{struct_label, type_descriptor};
use crate::scope::EnvId;
use crate::translate::Translator;

/// Number of object list heads in a struct descriptor: used and free.
const LIST_HEADS: usize = 2;

/// `Type Name Field ... End Type`
#[derive(Debug)]
pub struct StructDecl {
    pub ident: String,
    /// Field declarations, each a [`VarDecl`](super::VarDecl) of kind FIELD.
    pub fields: DeclSeq,
    ty: Option<TypeId>,
}

impl StructDecl {
    pub fn new(ident: impl Into<String>, fields: DeclSeq) -> Self {
        Self {
            ident: ident.into(),
            fields,
            ty: None,
        }
    }

    /// The struct's type, once `proto` has run.
    pub fn ty(&self) -> Option<TypeId> {
        self.ty
    }

    pub(super) fn proto(
        &mut self,
        ctx: &mut CompilationContext,
        env: EnvId,
        target: DeclTarget,
    ) -> Result<(), Diagnostic> {
        let mark = ctx.type_mark();
        let ty = ctx.mint(
            env,
            Type::Struct(StructType {
                name: self.ident.clone(),
                fields: DeclTable::new(),
            }),
        );
        if let Err(e) = ctx.insert_decl(
            target,
            Decl::new(&self.ident, ty, DeclFlags::STRUCT),
            "identifier",
        ) {
            ctx.release_types(mark);
            return Err(e);
        }
        self.ty = Some(ty);
        Ok(())
    }

    /// Register the fields and lay them out one word apart.
    pub(super) fn semant(
        &mut self,
        ctx: &mut CompilationContext,
        env: EnvId,
    ) -> Result<(), Diagnostic> {
        let ty = self.ty.ok_or_else(|| unregistered(&self.ident))?;
        self.fields.proto(ctx, env, DeclTarget::Fields(ty))?;
        ctx.assign_field_offsets(ty, WORD_SIZE)
    }

    /// Emit the static descriptor the runtime allocates objects from.
    ///
    /// ```text
    /// _tName:  .word 5
    ///          2 x { L: .word 0, .ptr L, .ptr L, .word 0, .word -1 }
    ///          .word field_count
    ///          field descriptors    (layout)
    ///          field descriptors    (initial values)
    /// ```
    pub(super) fn translate(&self, tx: &mut Translator<'_>) -> Result<(), TranslateError> {
        self.fields.translate(tx)?;

        let ty = self.ty.ok_or_else(|| unregistered(&self.ident))?;
        let fields = tx
            .ctx()
            .table(DeclTarget::Fields(ty))
            .ok_or_else(|| Diagnostic::new(DiagnosticKind::NullType, "struct type released"))?;
        let descriptors = fields
            .iter()
            .map(|field| {
                type_descriptor(tx.ctx().types(), field.ty).map_err(|e| Diagnostic {
                    message: format!("field '{}': {}", field.name, e.message),
                    ..e
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let heads: Vec<String> = (0..LIST_HEADS).map(|_| tx.gen_label()).collect();
        let g = tx.codegen();
        g.align_data(4)?;
        g.emit_word(DataTag::StructType.into(), Some(&struct_label(&self.ident)))?;
        for head in &heads {
            g.emit_word(0, Some(head))?;
            g.emit_pointer(head)?;
            g.emit_pointer(head)?;
            g.emit_word(0, None)?;
            g.emit_word(-1, None)?;
        }
        g.emit_word(descriptors.len() as i32, None)?;
        // layout list, then the initial-values list
        for _ in 0..2 {
            for descriptor in &descriptors {
                g.emit_pointer(descriptor)?;
            }
        }
        Ok(())
    }
}

fn unregistered(ident: &str) -> Diagnostic {
    Diagnostic::internal(format!("struct '{ident}' used before proto"))
}
