//! The sequence driver.

use basalt_core::{Diagnostic, TranslateError};
use tracing::{debug, trace};

use super::{DeclNode, Declaration};
use crate::context::{CompilationContext, DeclTarget};
use crate::scope::EnvId;
use crate::translate::Translator;

/// An ordered list of declarations run through one pass at a time.
///
/// Children are visited in declaration order and the first failure stops the
/// pass. A failing child's diagnostic gets the child's position and file
/// unless something deeper already set them. `translate` skips empty slots
/// and folds backend failures into a single "translation failed" diagnostic.
#[derive(Debug, Default)]
pub struct DeclSeq {
    decls: Vec<Option<DeclNode>>,
}

impl DeclSeq {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a declaration.
    pub fn push(&mut self, decl: DeclNode) {
        self.decls.push(Some(decl));
    }

    /// Append an empty slot, left behind where a parser dropped a node.
    pub fn push_empty(&mut self) {
        self.decls.push(None);
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeclNode> {
        self.decls.iter().flatten()
    }

    /// Register every declaration into `target`.
    ///
    /// Struct types are registered first, so signatures and variables can
    /// name a struct declared further down.
    pub fn proto(
        &mut self,
        ctx: &mut CompilationContext,
        env: EnvId,
        target: DeclTarget,
    ) -> Result<(), Diagnostic> {
        self.proto_where(ctx, env, target, |d| matches!(d, Declaration::Struct(_)))?;
        self.proto_where(ctx, env, target, |d| !matches!(d, Declaration::Struct(_)))
    }

    fn proto_where(
        &mut self,
        ctx: &mut CompilationContext,
        env: EnvId,
        target: DeclTarget,
        select: impl Fn(&Declaration) -> bool,
    ) -> Result<(), Diagnostic> {
        for (k, decl) in self.decls.iter_mut().enumerate() {
            let Some(decl) = decl else { continue };
            if !select(&decl.decl) {
                continue;
            }
            trace!(index = k, kind = decl.decl.kind_name(), "proto");
            decl.proto(ctx, env, target)
                .map_err(|e| escape(decl, e, "proto"))?;
        }
        Ok(())
    }

    pub fn semant(&mut self, ctx: &mut CompilationContext, env: EnvId) -> Result<(), Diagnostic> {
        for (k, decl) in self.decls.iter_mut().enumerate() {
            let Some(decl) = decl else { continue };
            trace!(index = k, kind = decl.decl.kind_name(), "semant");
            decl.semant(ctx, env)
                .map_err(|e| escape(decl, e, "semant"))?;
        }
        Ok(())
    }

    pub fn translate(&self, tx: &mut Translator<'_>) -> Result<(), Diagnostic> {
        for (k, decl) in self.decls.iter().enumerate() {
            let Some(decl) = decl else {
                trace!(index = k, "skipping empty declaration");
                continue;
            };
            trace!(index = k, kind = decl.decl.kind_name(), "translate");
            decl.translate(tx)
                .map_err(|e| normalize(decl, e, "translate"))?;
        }
        Ok(())
    }

    pub fn transdata(&self, tx: &mut Translator<'_>) -> Result<(), Diagnostic> {
        for decl in self.iter() {
            decl.transdata(tx)
                .map_err(|e| normalize(decl, e, "transdata"))?;
        }
        Ok(())
    }
}

fn escape(decl: &DeclNode, diag: Diagnostic, pass: &str) -> Diagnostic {
    let diag = decl.decorate(diag);
    debug!(pass, diagnostic = %diag, "declaration failed");
    diag
}

/// Backend failures carry no source position and are not decorated.
fn normalize(decl: &DeclNode, err: TranslateError, pass: &str) -> Diagnostic {
    match err {
        TranslateError::Diagnostic(d) => escape(decl, d, pass),
        TranslateError::Codegen(err) => {
            debug!(pass, error = %err, "backend failure");
            Diagnostic::translation_failed()
        }
    }
}

impl FromIterator<DeclNode> for DeclSeq {
    fn from_iter<I: IntoIterator<Item = DeclNode>>(iter: I) -> Self {
        Self {
            decls: iter.into_iter().map(Some).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::{Codegen, IrNode, Listing};
    use crate::context::TypeTag;
    use crate::decl::{Declaration, StructDecl, VarDecl};
    use basalt_core::{CodegenError, DeclFlags, DiagnosticKind, Span};

    fn global(name: &str, line: u32) -> DeclNode {
        DeclNode::new(
            Span::point(line, 1),
            VarDecl::new(name, TypeTag::Int, DeclFlags::GLOBAL).into(),
        )
        .with_file("main.bb")
    }

    #[test]
    fn duplicate_takes_failing_declaration_position() {
        let mut seq: DeclSeq = [global("a", 1), global("b", 2), global("a", 3)]
            .into_iter()
            .collect();
        let mut ctx = CompilationContext::new();
        let root = ctx.root();

        let err = seq.proto(&mut ctx, root, DeclTarget::Scope(root)).unwrap_err();
        assert_eq!(err.kind, DiagnosticKind::DuplicateIdentifier);
        assert_eq!(err.pos, Some(Span::point(3, 1)));
        assert_eq!(err.file.as_deref(), Some("main.bb"));
        assert_eq!(ctx.env(root).decls().len(), 2);
    }

    #[test]
    fn unresolved_tag_is_positioned_at_declaration() {
        let var = VarDecl::new("x", TypeTag::Named("Missing".into()), DeclFlags::GLOBAL);
        let mut seq: DeclSeq = [DeclNode::new(Span::point(7, 1), Declaration::Var(var))]
            .into_iter()
            .collect();
        let mut ctx = CompilationContext::new();
        let root = ctx.root();

        let err = seq.proto(&mut ctx, root, DeclTarget::Scope(root)).unwrap_err();
        assert_eq!(err.kind, DiagnosticKind::UnknownType);
        assert_eq!(err.pos, Some(Span::point(7, 1)));
        assert!(err.file.is_none());
    }

    #[test]
    fn structs_register_before_other_declarations() {
        let var = VarDecl::new("p", TypeTag::Named("Point".into()), DeclFlags::GLOBAL);
        let mut seq: DeclSeq = [
            DeclNode::new(Span::point(1, 1), var.into()),
            DeclNode::new(
                Span::point(2, 1),
                StructDecl::new("Point", DeclSeq::new()).into(),
            ),
        ]
        .into_iter()
        .collect();
        let mut ctx = CompilationContext::new();
        let root = ctx.root();

        seq.proto(&mut ctx, root, DeclTarget::Scope(root)).unwrap();
        let names: Vec<_> = ctx.env(root).decls().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["Point", "p"]);
        assert_eq!(
            ctx.env(root).decls().get("p").map(|d| d.ty),
            ctx.find_struct(root, "Point")
        );
    }

    #[test]
    fn struct_failure_stops_proto_before_other_kinds() {
        let mut seq: DeclSeq = [
            global("a", 1),
            DeclNode::new(Span::point(2, 1), StructDecl::new("S", DeclSeq::new()).into()),
            DeclNode::new(Span::point(3, 1), StructDecl::new("S", DeclSeq::new()).into()),
        ]
        .into_iter()
        .collect();
        let mut ctx = CompilationContext::new();
        let root = ctx.root();

        let err = seq.proto(&mut ctx, root, DeclTarget::Scope(root)).unwrap_err();
        assert_eq!(err.kind, DiagnosticKind::DuplicateIdentifier);
        assert_eq!(err.pos, Some(Span::point(3, 1)));
        assert!(!ctx.env(root).decls().contains("a"));
    }

    #[test]
    fn translate_skips_empty_slots() {
        let mut seq = DeclSeq::new();
        seq.push_empty();
        seq.push(global("a", 1));
        let mut ctx = CompilationContext::new();
        let root = ctx.root();
        seq.proto(&mut ctx, root, DeclTarget::Scope(root)).unwrap();
        seq.semant(&mut ctx, root).unwrap();

        let mut g = Listing::new();
        let mut tx = Translator::new(&mut ctx, &mut g);
        seq.translate(&mut tx).unwrap();
        assert!(g.is_defined("_va"));
    }

    #[derive(Debug, Default)]
    struct Broken;

    impl Codegen for Broken {
        fn debug(&self) -> bool {
            false
        }
        fn align_data(&mut self, _: u32) -> Result<(), CodegenError> {
            Err(CodegenError::Backend("out of space".into()))
        }
        fn emit_word(&mut self, _: i32, _: Option<&str>) -> Result<(), CodegenError> {
            Ok(())
        }
        fn emit_pointer(&mut self, _: &str) -> Result<(), CodegenError> {
            Ok(())
        }
        fn emit_string(&mut self, _: &str, _: &str) -> Result<(), CodegenError> {
            Ok(())
        }
        fn define_label(&mut self, _: &str) -> Result<(), CodegenError> {
            Ok(())
        }
        fn enter_function(&mut self, _: &str, _: u32) -> Result<(), CodegenError> {
            Ok(())
        }
        fn leave_function(&mut self, _: Option<IrNode>, _: u32) -> Result<(), CodegenError> {
            Ok(())
        }
        fn emit_code(&mut self, _: IrNode) -> Result<(), CodegenError> {
            Ok(())
        }
    }

    #[test]
    fn backend_failure_is_normalized() {
        let mut seq: DeclSeq = [global("a", 4)].into_iter().collect();
        let mut ctx = CompilationContext::new();
        let root = ctx.root();
        seq.proto(&mut ctx, root, DeclTarget::Scope(root)).unwrap();

        let mut g = Broken;
        let mut tx = Translator::new(&mut ctx, &mut g);
        let err = seq.translate(&mut tx).unwrap_err();
        assert_eq!(err.kind, DiagnosticKind::TranslationFailed);
        assert!(err.pos.is_none());
        assert!(err.file.is_none());
    }
}
