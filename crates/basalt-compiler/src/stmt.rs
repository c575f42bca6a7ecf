//! The statement interface consumed by function bodies.
//!
//! Statement-level control flow lives outside this crate; function bodies
//! are driven through [`StmtNode`]. The nodes here are what a body needs to
//! exercise declarations: local declarations, nested blocks, `Goto`, labels
//! and bare expressions.

use std::fmt;

use basalt_core::{Diagnostic, Span, TranslateError};

use crate::codegen::IrNode;
use crate::context::{CompilationContext, DeclTarget};
use crate::decl::DeclNode;
use crate::expr::{CheckedExpr, ExprNode};
use crate::scope::EnvId;
use crate::translate::Translator;

/// A statement inside a function body.
pub trait StmtNode: fmt::Debug {
    /// Where the statement starts.
    fn span(&self) -> Span;

    /// Check the statement in `env`.
    fn semant(&mut self, ctx: &mut CompilationContext, env: EnvId) -> Result<(), Diagnostic>;

    /// Emit code for the statement.
    fn translate(&self, tx: &mut Translator<'_>) -> Result<(), TranslateError>;
}

/// An ordered statement list.
///
/// A failing statement's diagnostic takes the statement's position unless it
/// already carries one.
#[derive(Debug, Default)]
pub struct StmtSeq {
    stmts: Vec<Box<dyn StmtNode>>,
}

impl StmtSeq {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, stmt: impl StmtNode + 'static) {
        self.stmts.push(Box::new(stmt));
    }

    pub fn len(&self) -> usize {
        self.stmts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stmts.is_empty()
    }

    pub fn semant(&mut self, ctx: &mut CompilationContext, env: EnvId) -> Result<(), Diagnostic> {
        for stmt in &mut self.stmts {
            let pos = stmt.span();
            stmt.semant(ctx, env)
                .map_err(|e| e.with_position_if_unset(pos))?;
        }
        Ok(())
    }

    pub fn translate(&self, tx: &mut Translator<'_>) -> Result<(), TranslateError> {
        for stmt in &self.stmts {
            let pos = stmt.span();
            stmt.translate(tx).map_err(|e| match e {
                TranslateError::Diagnostic(d) => d.with_position_if_unset(pos).into(),
                other => other,
            })?;
        }
        Ok(())
    }
}

impl FromIterator<Box<dyn StmtNode>> for StmtSeq {
    fn from_iter<I: IntoIterator<Item = Box<dyn StmtNode>>>(iter: I) -> Self {
        Self {
            stmts: iter.into_iter().collect(),
        }
    }
}

fn not_checked(what: &str) -> TranslateError {
    Diagnostic::internal(format!("{what} translated before semant")).into()
}

// ============================================================================
// Statements
// ============================================================================

/// A declaration inside a body, registered and checked on the spot.
#[derive(Debug)]
pub struct DeclStmt {
    pub decl: DeclNode,
}

impl DeclStmt {
    pub fn new(decl: DeclNode) -> Self {
        Self { decl }
    }
}

impl StmtNode for DeclStmt {
    fn span(&self) -> Span {
        self.decl.pos
    }

    fn semant(&mut self, ctx: &mut CompilationContext, env: EnvId) -> Result<(), Diagnostic> {
        let result = self
            .decl
            .proto(ctx, env, DeclTarget::Scope(env))
            .and_then(|()| self.decl.semant(ctx, env));
        result.map_err(|e| self.decl.decorate(e))
    }

    fn translate(&self, tx: &mut Translator<'_>) -> Result<(), TranslateError> {
        self.decl.translate(tx).map_err(|e| match e {
            TranslateError::Diagnostic(d) => self.decl.decorate(d).into(),
            other => other,
        })
    }
}

/// A nested block with its own scope.
#[derive(Debug)]
pub struct BlockStmt {
    pub body: StmtSeq,
    pub span: Span,
}

impl BlockStmt {
    pub fn new(body: StmtSeq, span: Span) -> Self {
        Self { body, span }
    }
}

impl StmtNode for BlockStmt {
    fn span(&self) -> Span {
        self.span
    }

    fn semant(&mut self, ctx: &mut CompilationContext, env: EnvId) -> Result<(), Diagnostic> {
        let block = ctx.new_block_scope(env);
        self.body.semant(ctx, block)
    }

    fn translate(&self, tx: &mut Translator<'_>) -> Result<(), TranslateError> {
        self.body.translate(tx)
    }
}

/// `Goto name`
#[derive(Debug)]
pub struct GotoStmt {
    pub label: String,
    pub span: Span,
    env: Option<EnvId>,
}

impl GotoStmt {
    pub fn new(label: impl Into<String>, span: Span) -> Self {
        Self {
            label: label.into(),
            span,
            env: None,
        }
    }
}

impl StmtNode for GotoStmt {
    fn span(&self) -> Span {
        self.span
    }

    fn semant(&mut self, ctx: &mut CompilationContext, env: EnvId) -> Result<(), Diagnostic> {
        ctx.reference_label(env, &self.label, self.span);
        self.env = Some(env);
        Ok(())
    }

    fn translate(&self, tx: &mut Translator<'_>) -> Result<(), TranslateError> {
        let env = self.env.ok_or_else(|| not_checked("goto"))?;
        let symbol = tx.ctx().label_symbol(env, &self.label);
        tx.codegen().emit_code(IrNode::Jump(symbol))?;
        Ok(())
    }
}

/// `.name` - a jump target.
#[derive(Debug)]
pub struct LabelStmt {
    pub name: String,
    pub span: Span,
    env: Option<EnvId>,
}

impl LabelStmt {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
            env: None,
        }
    }
}

impl StmtNode for LabelStmt {
    fn span(&self) -> Span {
        self.span
    }

    fn semant(&mut self, ctx: &mut CompilationContext, env: EnvId) -> Result<(), Diagnostic> {
        ctx.define_label(env, &self.name, self.span)?;
        self.env = Some(env);
        Ok(())
    }

    fn translate(&self, tx: &mut Translator<'_>) -> Result<(), TranslateError> {
        let env = self.env.ok_or_else(|| not_checked("label"))?;
        let symbol = tx.ctx().label_symbol(env, &self.name);
        tx.codegen().define_label(&symbol)?;
        Ok(())
    }
}

/// An expression evaluated for its effect.
#[derive(Debug)]
pub struct ExprStmt {
    pub expr: Box<dyn ExprNode>,
    checked: Option<Box<dyn CheckedExpr>>,
}

impl ExprStmt {
    pub fn new(expr: impl ExprNode + 'static) -> Self {
        Self {
            expr: Box::new(expr),
            checked: None,
        }
    }
}

impl StmtNode for ExprStmt {
    fn span(&self) -> Span {
        self.expr.span()
    }

    fn semant(&mut self, ctx: &mut CompilationContext, env: EnvId) -> Result<(), Diagnostic> {
        self.checked = Some(self.expr.semant(ctx, env)?);
        Ok(())
    }

    fn translate(&self, tx: &mut Translator<'_>) -> Result<(), TranslateError> {
        let checked = self.checked.as_ref().ok_or_else(|| not_checked("expression"))?;
        let code = checked.translate(tx)?;
        tx.codegen().emit_code(code)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::{Emission, Listing};
    use crate::expr::NameExpr;
    use basalt_core::DiagnosticKind;
    use basalt_registry::primitives;

    #[test]
    fn goto_and_label_share_function_symbol() {
        let mut ctx = CompilationContext::new();
        let func = ctx.new_function_scope(ctx.root(), primitives::INT);
        let mut body = StmtSeq::new();
        body.push(GotoStmt::new("done", Span::point(2, 1)));
        body.push(LabelStmt::new("done", Span::point(3, 1)));
        body.semant(&mut ctx, func).unwrap();

        let symbol = format!("{}_l_done", ctx.env(func).func_label());
        let mut g = Listing::new();
        let mut tx = Translator::new(&mut ctx, &mut g);
        body.translate(&mut tx).unwrap();
        assert_eq!(
            g.emissions(),
            &[
                Emission::Code(IrNode::Jump(symbol.clone())),
                Emission::Label(symbol),
            ]
        );
    }

    #[derive(Debug)]
    struct Failing(Span);

    impl StmtNode for Failing {
        fn span(&self) -> Span {
            self.0
        }

        fn semant(&mut self, _: &mut CompilationContext, _: EnvId) -> Result<(), Diagnostic> {
            Err(Diagnostic::internal("boom"))
        }

        fn translate(&self, _: &mut Translator<'_>) -> Result<(), TranslateError> {
            Ok(())
        }
    }

    #[test]
    fn failing_statement_takes_its_position() {
        let mut ctx = CompilationContext::new();
        let func = ctx.new_function_scope(ctx.root(), primitives::INT);
        let mut body = StmtSeq::new();
        body.push(LabelStmt::new("l", Span::point(1, 1)));
        body.push(Failing(Span::point(2, 5)));

        let err = body.semant(&mut ctx, func).unwrap_err();
        assert_eq!(err.pos, Some(Span::point(2, 5)));
    }

    #[test]
    fn unknown_name_keeps_its_own_position() {
        let mut ctx = CompilationContext::new();
        let func = ctx.new_function_scope(ctx.root(), primitives::INT);
        let mut body = StmtSeq::new();
        body.push(ExprStmt::new(NameExpr::new("missing", Span::point(4, 9))));

        let err = body.semant(&mut ctx, func).unwrap_err();
        assert_eq!(err.kind, DiagnosticKind::UnknownIdentifier);
        assert_eq!(err.pos, Some(Span::point(4, 9)));
    }

    #[test]
    fn blocks_open_child_scopes() {
        let mut ctx = CompilationContext::new();
        let func = ctx.new_function_scope(ctx.root(), primitives::INT);
        let mut block = BlockStmt::new(StmtSeq::new(), Span::point(1, 1));
        block.semant(&mut ctx, func).unwrap();
        assert_eq!(ctx.env(func).children().len(), 1);
    }
}
