//! The expression interface consumed by declarations.
//!
//! Declarations only need four things from an expression: check it in an
//! environment ([`ExprNode::semant`]), coerce the result to a type
//! ([`CheckedExpr::cast_to`]), fold it to a constant
//! ([`CheckedExpr::constant_fold`]) and translate it to intermediate code
//! ([`CheckedExpr::translate`]).
//!
//! The nodes below cover what declarations are written with: literals, null,
//! names, and `New` of a struct type.

use std::fmt;

use basalt_core::{DeclFlags, Diagnostic, DiagnosticKind, Literal, Span, TranslateError};
use basalt_registry::{Type, TypeArena, TypeId, primitives};

use crate::codegen::{IrNode, runtime};
use crate::context::CompilationContext;
use crate::descriptor::struct_label;
use crate::scope::EnvId;
use crate::translate::Translator;

/// An unchecked expression.
pub trait ExprNode: fmt::Debug {
    /// Where the expression starts.
    fn span(&self) -> Span;

    /// Type check the expression in `env`.
    fn semant(
        &self,
        ctx: &mut CompilationContext,
        env: EnvId,
    ) -> Result<Box<dyn CheckedExpr>, Diagnostic>;
}

/// A type-checked expression.
pub trait CheckedExpr: fmt::Debug {
    /// The expression's type.
    fn ty(&self) -> TypeId;

    /// Coerce to `ty`.
    fn cast_to(
        self: Box<Self>,
        ty: TypeId,
        ctx: &mut CompilationContext,
        env: EnvId,
    ) -> Result<Box<dyn CheckedExpr>, Diagnostic>;

    /// The folded value, if this is a compile-time constant.
    fn constant_fold(&self) -> Option<Literal>;

    /// Translate to intermediate code computing the value.
    fn translate(&self, tx: &mut Translator<'_>) -> Result<IrNode, TranslateError>;
}

// ============================================================================
// Syntax nodes
// ============================================================================

/// A literal constant.
#[derive(Debug, Clone, PartialEq)]
pub struct LiteralExpr {
    pub value: Literal,
    pub span: Span,
}

impl LiteralExpr {
    pub fn new(value: Literal, span: Span) -> Self {
        Self { value, span }
    }

    pub fn null(span: Span) -> Self {
        Self::new(Literal::Null, span)
    }
}

impl ExprNode for LiteralExpr {
    fn span(&self) -> Span {
        self.span
    }

    fn semant(
        &self,
        _ctx: &mut CompilationContext,
        _env: EnvId,
    ) -> Result<Box<dyn CheckedExpr>, Diagnostic> {
        Ok(Box::new(ConstValue {
            ty: TypeArena::literal_type(&self.value),
            value: self.value.clone(),
        }))
    }
}

/// A reference to a named variable or constant.
#[derive(Debug, Clone, PartialEq)]
pub struct NameExpr {
    pub name: String,
    pub span: Span,
}

impl NameExpr {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

impl ExprNode for NameExpr {
    fn span(&self) -> Span {
        self.span
    }

    fn semant(
        &self,
        ctx: &mut CompilationContext,
        env: EnvId,
    ) -> Result<Box<dyn CheckedExpr>, Diagnostic> {
        let (owner, decl) = ctx.lookup(env, &self.name).ok_or_else(|| {
            Diagnostic::new(
                DiagnosticKind::UnknownIdentifier,
                format!("identifier '{}' not found", self.name),
            )
            .at(self.span)
        })?;

        if let Some(Type::Const(lit)) = ctx.ty(decl.ty) {
            return Ok(Box::new(ConstValue {
                ty: TypeArena::literal_type(lit),
                value: lit.clone(),
            }));
        }
        if !decl.kind.is_variable() {
            return Err(
                Diagnostic::type_mismatch(format!("'{}' is not a variable", self.name))
                    .at(self.span),
            );
        }
        Ok(Box::new(VarValue {
            env: owner,
            name: self.name.clone(),
            ty: decl.ty,
        }))
    }
}

/// `New Struct` - a fresh, live struct object.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpr {
    pub type_name: String,
    pub span: Span,
}

impl NewExpr {
    pub fn new(type_name: impl Into<String>, span: Span) -> Self {
        Self {
            type_name: type_name.into(),
            span,
        }
    }
}

impl ExprNode for NewExpr {
    fn span(&self) -> Span {
        self.span
    }

    fn semant(
        &self,
        ctx: &mut CompilationContext,
        env: EnvId,
    ) -> Result<Box<dyn CheckedExpr>, Diagnostic> {
        let ty = ctx.find_struct(env, &self.type_name).ok_or_else(|| {
            Diagnostic::unknown_type(format!("type '{}' not found", self.type_name)).at(self.span)
        })?;
        Ok(Box::new(NewValue {
            ty,
            label: struct_label(&self.type_name),
        }))
    }
}

// ============================================================================
// Checked nodes
// ============================================================================

/// A folded constant.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstValue {
    value: Literal,
    ty: TypeId,
}

impl CheckedExpr for ConstValue {
    fn ty(&self) -> TypeId {
        self.ty
    }

    fn cast_to(
        self: Box<Self>,
        ty: TypeId,
        ctx: &mut CompilationContext,
        _env: EnvId,
    ) -> Result<Box<dyn CheckedExpr>, Diagnostic> {
        if ctx.types().same(self.ty, ty) {
            return Ok(self);
        }
        let value = match (ctx.ty(ty), &self.value) {
            (_, Literal::Null) if ctx.types().is_struct(ty) => Literal::Null,
            (_, Literal::Null) => {
                return Err(mismatch(ctx.types(), self.ty, ty));
            }
            (Some(Type::Int), v) => Literal::Int(v.as_int()),
            (Some(Type::Float), v) => Literal::float(v.as_float()),
            (Some(Type::String), v) => Literal::String(v.as_string()),
            _ => return Err(mismatch(ctx.types(), self.ty, ty)),
        };
        Ok(Box::new(ConstValue { value, ty }))
    }

    fn constant_fold(&self) -> Option<Literal> {
        Some(self.value.clone())
    }

    fn translate(&self, tx: &mut Translator<'_>) -> Result<IrNode, TranslateError> {
        match &self.value {
            Literal::Int(v) => Ok(IrNode::Const(*v)),
            Literal::Float(v) => Ok(IrNode::Const(v.0.to_bits() as i32)),
            Literal::String(s) => tx.string_constant(s),
            Literal::Null => Ok(IrNode::Const(0)),
        }
    }
}

/// A variable read.
#[derive(Debug, Clone, PartialEq)]
pub struct VarValue {
    env: EnvId,
    name: String,
    ty: TypeId,
}

impl CheckedExpr for VarValue {
    fn ty(&self) -> TypeId {
        self.ty
    }

    fn cast_to(
        self: Box<Self>,
        ty: TypeId,
        ctx: &mut CompilationContext,
        _env: EnvId,
    ) -> Result<Box<dyn CheckedExpr>, Diagnostic> {
        convert(self, ty, ctx)
    }

    fn constant_fold(&self) -> Option<Literal> {
        None
    }

    fn translate(&self, tx: &mut Translator<'_>) -> Result<IrNode, TranslateError> {
        Ok(tx.var_location(self.env, &self.name)?)
    }
}

/// A freshly allocated struct object.
#[derive(Debug, Clone, PartialEq)]
pub struct NewValue {
    ty: TypeId,
    label: String,
}

impl CheckedExpr for NewValue {
    fn ty(&self) -> TypeId {
        self.ty
    }

    fn cast_to(
        self: Box<Self>,
        ty: TypeId,
        ctx: &mut CompilationContext,
        _env: EnvId,
    ) -> Result<Box<dyn CheckedExpr>, Diagnostic> {
        convert(self, ty, ctx)
    }

    fn constant_fold(&self) -> Option<Literal> {
        None
    }

    fn translate(&self, _tx: &mut Translator<'_>) -> Result<IrNode, TranslateError> {
        Ok(IrNode::call(
            runtime::OBJ_NEW,
            vec![IrNode::Global(self.label.clone())],
        ))
    }
}

/// A runtime conversion between primitive types.
#[derive(Debug)]
pub struct Converted {
    inner: Box<dyn CheckedExpr>,
    from: TypeId,
    ty: TypeId,
}

impl CheckedExpr for Converted {
    fn ty(&self) -> TypeId {
        self.ty
    }

    fn cast_to(
        self: Box<Self>,
        ty: TypeId,
        ctx: &mut CompilationContext,
        _env: EnvId,
    ) -> Result<Box<dyn CheckedExpr>, Diagnostic> {
        convert(self, ty, ctx)
    }

    fn constant_fold(&self) -> Option<Literal> {
        None
    }

    fn translate(&self, tx: &mut Translator<'_>) -> Result<IrNode, TranslateError> {
        let value = self.inner.translate(tx)?;
        let node = match (self.from, self.ty) {
            (primitives::INT, primitives::FLOAT) => IrNode::IntToFloat(Box::new(value)),
            (primitives::FLOAT, primitives::INT) => IrNode::FloatToInt(Box::new(value)),
            (primitives::INT, primitives::STRING) => {
                IrNode::call(runtime::STR_FROM_INT, vec![value])
            }
            (primitives::FLOAT, primitives::STRING) => {
                IrNode::call(runtime::STR_FROM_FLOAT, vec![value])
            }
            (primitives::STRING, primitives::INT) => IrNode::call(runtime::STR_TO_INT, vec![value]),
            (primitives::STRING, primitives::FLOAT) => {
                IrNode::call(runtime::STR_TO_FLOAT, vec![value])
            }
            _ => value,
        };
        Ok(node)
    }
}

/// Coerce a non-constant expression to `ty`.
///
/// Same type: unchanged. Null to any struct: unchanged. Between Int, Float
/// and String: a runtime conversion. Anything else is a mismatch.
fn convert(
    expr: Box<dyn CheckedExpr>,
    ty: TypeId,
    ctx: &CompilationContext,
) -> Result<Box<dyn CheckedExpr>, Diagnostic> {
    let from = expr.ty();
    let types = ctx.types();
    if types.same(from, ty) || (from == primitives::NULL && types.is_struct(ty)) {
        return Ok(expr);
    }
    let both_primitive = matches!(
        (types.get(from), types.get(ty)),
        (Some(a), Some(b)) if a.is_primitive() && b.is_primitive()
    );
    if !both_primitive {
        return Err(mismatch(types, from, ty));
    }
    Ok(Box::new(Converted {
        inner: expr,
        from,
        ty,
    }))
}

fn mismatch(types: &TypeArena, from: TypeId, to: TypeId) -> Diagnostic {
    Diagnostic::type_mismatch(format!(
        "cannot convert {} to {}",
        types.name(from),
        types.name(to)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::Listing;
    use crate::context::DeclTarget;
    use basalt_registry::{Decl, DeclTable, StructType};

    fn point(ctx: &mut CompilationContext) -> TypeId {
        let root = ctx.root();
        let ty = ctx.mint(
            root,
            Type::Struct(StructType {
                name: "Point".into(),
                fields: DeclTable::new(),
            }),
        );
        ctx.insert_decl(
            DeclTarget::Scope(root),
            Decl::new("Point", ty, DeclFlags::STRUCT),
            "identifier",
        )
        .unwrap();
        ty
    }

    fn check(
        expr: &dyn ExprNode,
        ctx: &mut CompilationContext,
    ) -> Result<Box<dyn CheckedExpr>, Diagnostic> {
        let root = ctx.root();
        expr.semant(ctx, root)
    }

    #[test]
    fn literal_casts_fold() {
        let mut ctx = CompilationContext::new();
        let root = ctx.root();
        let e = check(&LiteralExpr::new(Literal::Int(3), Span::default()), &mut ctx).unwrap();
        let e = e.cast_to(primitives::FLOAT, &mut ctx, root).unwrap();
        assert_eq!(e.ty(), primitives::FLOAT);
        assert_eq!(e.constant_fold(), Some(Literal::float(3.0)));

        let e = e.cast_to(primitives::STRING, &mut ctx, root).unwrap();
        assert_eq!(e.constant_fold(), Some(Literal::String("3.0".into())));
    }

    #[test]
    fn null_casts_to_struct_only() {
        let mut ctx = CompilationContext::new();
        let root = ctx.root();
        let p = point(&mut ctx);

        let e = check(&LiteralExpr::null(Span::default()), &mut ctx).unwrap();
        let e = e.cast_to(p, &mut ctx, root).unwrap();
        assert_eq!(e.ty(), p);
        assert_eq!(e.constant_fold(), Some(Literal::Null));

        let e = check(&LiteralExpr::null(Span::default()), &mut ctx).unwrap();
        let err = e.cast_to(primitives::INT, &mut ctx, root).unwrap_err();
        assert_eq!(err.kind, DiagnosticKind::TypeMismatch);
    }

    #[test]
    fn int_does_not_cast_to_struct() {
        let mut ctx = CompilationContext::new();
        let root = ctx.root();
        let p = point(&mut ctx);
        let e = check(&LiteralExpr::new(Literal::Int(1), Span::default()), &mut ctx).unwrap();
        assert_eq!(
            e.cast_to(p, &mut ctx, root).unwrap_err().kind,
            DiagnosticKind::TypeMismatch
        );
    }

    #[test]
    fn new_is_live_and_not_constant() {
        let mut ctx = CompilationContext::new();
        let p = point(&mut ctx);
        let e = check(&NewExpr::new("Point", Span::default()), &mut ctx).unwrap();
        assert_eq!(e.ty(), p);
        assert_eq!(e.constant_fold(), None);

        let err = check(&NewExpr::new("Nope", Span::point(4, 2)), &mut ctx).unwrap_err();
        assert_eq!(err.kind, DiagnosticKind::UnknownType);
        assert_eq!(err.pos, Some(Span::point(4, 2)));
    }

    #[test]
    fn names_resolve_constants_and_variables() {
        let mut ctx = CompilationContext::new();
        let root = ctx.root();
        let c = ctx.mint(root, Type::Const(Literal::Int(7)));
        ctx.insert_decl(
            DeclTarget::Scope(root),
            Decl::new("seven", c, DeclFlags::GLOBAL | DeclFlags::CONST),
            "variable",
        )
        .unwrap();
        ctx.insert_decl(
            DeclTarget::Scope(root),
            Decl::new("v", primitives::INT, DeclFlags::GLOBAL),
            "variable",
        )
        .unwrap();

        let e = check(&NameExpr::new("seven", Span::default()), &mut ctx).unwrap();
        assert_eq!(e.constant_fold(), Some(Literal::Int(7)));
        assert_eq!(e.ty(), primitives::INT);

        let e = check(&NameExpr::new("v", Span::default()), &mut ctx).unwrap();
        assert_eq!(e.constant_fold(), None);

        let err = check(&NameExpr::new("w", Span::default()), &mut ctx).unwrap_err();
        assert_eq!(err.kind, DiagnosticKind::UnknownIdentifier);
    }

    #[test]
    fn variable_conversion_translates_to_runtime_call() {
        let mut ctx = CompilationContext::new();
        let root = ctx.root();
        ctx.insert_decl(
            DeclTarget::Scope(root),
            Decl::new("v", primitives::INT, DeclFlags::GLOBAL),
            "variable",
        )
        .unwrap();
        let e = check(&NameExpr::new("v", Span::default()), &mut ctx).unwrap();
        let e = e.cast_to(primitives::STRING, &mut ctx, root).unwrap();

        let mut g = Listing::new();
        let mut tx = Translator::new(&mut ctx, &mut g);
        assert_eq!(
            e.translate(&mut tx).unwrap(),
            IrNode::call(runtime::STR_FROM_INT, vec![IrNode::global_word("_vv")])
        );
    }

    #[test]
    fn string_constant_emits_payload() {
        let mut ctx = CompilationContext::new();
        let e = check(
            &LiteralExpr::new(Literal::String("hi".into()), Span::default()),
            &mut ctx,
        )
        .unwrap();

        let mut g = Listing::new();
        let ir = {
            let mut tx = Translator::new(&mut ctx, &mut g);
            e.translate(&mut tx).unwrap()
        };
        assert_eq!(
            ir,
            IrNode::call(runtime::STR_CONST, vec![IrNode::Global("_1".into())])
        );
        assert!(g.is_defined("_1"));
    }
}
