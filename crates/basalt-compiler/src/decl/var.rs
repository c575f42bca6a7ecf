//! Variable, constant, parameter and field declarations.

use basalt_core::{DeclFlags, Diagnostic, DiagnosticKind, Literal, TranslateError};
use basalt_registry::{Decl, Type, TypeId, primitives};

use crate::codegen::IrNode;
use crate::context::{CompilationContext, DeclTarget, TypeTag};
use crate::descriptor::global_label;
use crate::expr::{CheckedExpr, ExprNode};
use crate::scope::EnvId;
use crate::translate::Translator;

/// `[Global|Local|Const] name[tag] [= init]`, a parameter, or a struct field.
///
/// The storage kind is carried in `kind`: exactly one of GLOBAL, LOCAL,
/// PARAM or FIELD, plus CONST for constants.
#[derive(Debug)]
pub struct VarDecl {
    pub ident: String,
    pub tag: TypeTag,
    pub kind: DeclFlags,
    pub init: Option<Box<dyn ExprNode>>,
    registered: Option<Registered>,
}

#[derive(Debug)]
struct Registered {
    env: EnvId,
    init: Option<Box<dyn CheckedExpr>>,
}

impl VarDecl {
    pub fn new(ident: impl Into<String>, tag: TypeTag, kind: DeclFlags) -> Self {
        Self {
            ident: ident.into(),
            tag,
            kind,
            init: None,
            registered: None,
        }
    }

    pub fn with_init(mut self, init: impl ExprNode + 'static) -> Self {
        self.init = Some(Box::new(init));
        self
    }

    fn is_const(&self) -> bool {
        self.kind.contains(DeclFlags::CONST)
    }

    pub(super) fn proto(
        &mut self,
        ctx: &mut CompilationContext,
        env: EnvId,
        target: DeclTarget,
    ) -> Result<(), Diagnostic> {
        if self.registered.is_some() {
            return Ok(());
        }

        let declared = ctx.resolve_tag(&self.tag, env)?.unwrap_or(primitives::INT);
        let mark = ctx.type_mark();

        let Some(init) = &self.init else {
            if self.is_const() {
                return Err(Diagnostic::not_constant("constants must be initialized"));
            }
            ctx.insert_decl(target, Decl::new(&self.ident, declared, self.kind), "variable")?;
            self.registered = Some(Registered { env, init: None });
            return Ok(());
        };

        let checked = init.semant(ctx, env)?.cast_to(declared, ctx, env)?;

        let (decl, retained) = if self.kind.contains(DeclFlags::FIELD) {
            let default = field_default(ctx, env, declared, &*checked)?;
            let decl = Decl::new(&self.ident, declared, self.kind).with_default(Some(default));
            (decl, None)
        } else if self.is_const() || self.kind.contains(DeclFlags::PARAM) {
            let value = checked
                .constant_fold()
                .ok_or_else(|| Diagnostic::not_constant("expression must be constant"))?;
            let value = if ctx.types().is_struct(declared) {
                Literal::Null
            } else {
                value
            };
            let wrapped = ctx.mint(env, Type::Const(value));
            let decl = if self.kind.contains(DeclFlags::PARAM) {
                Decl::new(&self.ident, declared, self.kind).with_default(Some(wrapped))
            } else {
                Decl::new(&self.ident, wrapped, self.kind)
            };
            (decl, None)
        } else {
            (Decl::new(&self.ident, declared, self.kind), Some(checked))
        };

        if let Err(e) = ctx.insert_decl(target, decl, "variable") {
            ctx.release_types(mark);
            return Err(e);
        }
        self.registered = Some(Registered {
            env,
            init: retained,
        });
        Ok(())
    }

    pub(super) fn translate(&self, tx: &mut Translator<'_>) -> Result<(), TranslateError> {
        if self.kind.contains(DeclFlags::GLOBAL) {
            let g = tx.codegen();
            g.align_data(4)?;
            g.emit_word(0, Some(&global_label(&self.ident)))?;
        }
        let Some(Registered {
            env,
            init: Some(init),
        }) = &self.registered
        else {
            return Ok(());
        };
        let value = init.translate(tx)?;
        let target = tx.var_location(*env, &self.ident)?;
        tx.codegen().emit_code(IrNode::store(target, value))?;
        Ok(())
    }
}

/// Fold a field initializer into the constant stored as the field's default.
///
/// Only Int, Float and String constants and the null struct reference are
/// accepted.
fn field_default(
    ctx: &mut CompilationContext,
    env: EnvId,
    declared: TypeId,
    init: &dyn CheckedExpr,
) -> Result<TypeId, Diagnostic> {
    let invalid = |msg: &str| Diagnostic::new(DiagnosticKind::InvalidFieldInitializer, msg);

    let value = init
        .constant_fold()
        .ok_or_else(|| invalid("field initializer must be constant"))?;
    let value = match ctx.ty(declared) {
        Some(Type::Int) => Literal::Int(value.as_int()),
        Some(Type::Float) => Literal::float(value.as_float()),
        Some(Type::String) => Literal::String(value.as_string()),
        Some(Type::Struct(_)) if value.is_null() => Literal::Null,
        Some(Type::Struct(_)) => {
            return Err(invalid("struct field initializers must be null"));
        }
        _ => return Err(invalid("field type cannot have an initializer")),
    };
    Ok(ctx.mint(env, Type::Const(value)))
}
