//! Function declarations.

use basalt_core::{DeclFlags, Diagnostic, DiagnosticKind, TranslateError, WORD_SIZE};
use basalt_registry::{Decl, DeclTable, FunctionType, Type, TypeId, primitives};

use super::DeclSeq;
use crate::codegen::{IrNode, runtime};
use crate::context::{CompilationContext, DeclTarget, TypeTag};
use crate::descriptor::function_label;
use crate::frame::Frame;
use crate::scope::EnvId;
use crate::stmt::StmtSeq;
use crate::translate::Translator;

/// `Function name[tag](params) body End Function`
#[derive(Debug)]
pub struct FuncDecl {
    pub ident: String,
    pub tag: TypeTag,
    /// Parameter declarations, each a [`VarDecl`](super::VarDecl) of kind PARAM.
    pub params: DeclSeq,
    pub body: StmtSeq,
    ty: Option<TypeId>,
    env: Option<EnvId>,
}

impl FuncDecl {
    pub fn new(ident: impl Into<String>, tag: TypeTag, params: DeclSeq, body: StmtSeq) -> Self {
        Self {
            ident: ident.into(),
            tag,
            params,
            body,
            ty: None,
            env: None,
        }
    }

    /// The function's scope, once `semant` has run.
    pub fn env(&self) -> Option<EnvId> {
        self.env
    }

    pub(super) fn proto(
        &mut self,
        ctx: &mut CompilationContext,
        env: EnvId,
        target: DeclTarget,
    ) -> Result<(), Diagnostic> {
        let return_type = ctx.resolve_tag(&self.tag, env)?.unwrap_or(primitives::INT);

        let mark = ctx.type_mark();
        let ty = ctx.mint(
            env,
            Type::Function(FunctionType {
                return_type,
                params: DeclTable::new(),
            }),
        );
        let registered = self
            .params
            .proto(ctx, env, DeclTarget::Params(ty))
            .and_then(|()| {
                ctx.insert_decl(target, Decl::new(&self.ident, ty, DeclFlags::FUNC), "identifier")
            });
        if let Err(e) = registered {
            ctx.release_types(mark);
            return Err(e);
        }
        self.ty = Some(ty);
        Ok(())
    }

    pub(super) fn semant(
        &mut self,
        ctx: &mut CompilationContext,
        env: EnvId,
    ) -> Result<(), Diagnostic> {
        let ty = self.ty.ok_or_else(|| unregistered(&self.ident))?;
        let function = ctx
            .ty(ty)
            .and_then(Type::as_function)
            .ok_or_else(|| Diagnostic::new(DiagnosticKind::NullType, "function type released"))?;
        let return_type = function.return_type;
        let params: Vec<Decl> = function
            .params
            .iter()
            .map(|p| Decl::new(&p.name, p.ty, p.kind))
            .collect();

        let scope = ctx.new_function_scope(env, return_type);
        for param in params {
            ctx.insert_decl(DeclTarget::Scope(scope), param, "identifier")?;
        }
        self.env = Some(scope);
        self.body.semant(ctx, scope)
    }

    pub(super) fn translate(&self, tx: &mut Translator<'_>) -> Result<(), TranslateError> {
        let env = self.env.ok_or_else(|| unregistered(&self.ident))?;

        let frame = Frame::layout(tx.ctx(), env);
        tx.codegen()
            .enter_function(&function_label(&self.ident), frame.size())?;

        if let Some(init) = frame.init_code(tx.ctx()) {
            tx.codegen().emit_code(init)?;
        }
        if tx.debug() {
            let name = tx.gen_label();
            tx.codegen().emit_string(&self.ident, &name)?;
            tx.codegen().emit_code(IrNode::call(
                runtime::DEBUG_ENTER,
                vec![
                    IrNode::FramePointer,
                    IrNode::Const(env.index() as i32),
                    IrNode::Global(name),
                ],
            ))?;
        }

        let param_count = frame.param_count();
        let previous = tx.replace_frame(Some(frame));
        let body = self.body.translate(tx);
        let frame = tx.replace_frame(previous);
        body?;

        if let Some(label) = tx.ctx().env(env).undefined_labels().next() {
            let diag = Diagnostic::new(
                DiagnosticKind::UndefinedLabel,
                format!("label '{}' is never defined", label.name),
            );
            return Err(match label.referenced {
                Some(pos) => diag.at(pos),
                None => diag,
            }
            .into());
        }

        let leave = tx.ctx().exit_label(env);
        tx.codegen().define_label(&leave)?;

        let teardown = frame.and_then(|f| f.teardown_code(tx.ctx()));
        let teardown = if tx.debug() {
            let mut nodes = vec![IrNode::call(runtime::DEBUG_LEAVE, Vec::new())];
            nodes.extend(teardown);
            IrNode::seq(nodes)
        } else {
            teardown
        };
        tx.codegen()
            .leave_function(teardown, param_count * WORD_SIZE)?;
        Ok(())
    }
}

fn unregistered(ident: &str) -> Diagnostic {
    Diagnostic::internal(format!("function '{ident}' used before proto"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::{Emission, Listing};
    use crate::decl::{DeclNode, VarDecl};
    use crate::stmt::{DeclStmt, GotoStmt, LabelStmt};
    use basalt_core::Span;

    fn param(name: &str, tag: TypeTag) -> DeclNode {
        DeclNode::new(
            Span::default(),
            VarDecl::new(name, tag, DeclFlags::PARAM).into(),
        )
    }

    fn local(name: &str, tag: TypeTag) -> DeclStmt {
        DeclStmt::new(DeclNode::new(
            Span::default(),
            VarDecl::new(name, tag, DeclFlags::LOCAL).into(),
        ))
    }

    fn compile(func: &mut FuncDecl, ctx: &mut CompilationContext) -> Result<(), Diagnostic> {
        let root = ctx.root();
        func.proto(ctx, root, DeclTarget::Scope(root))?;
        func.semant(ctx, root)
    }

    #[test]
    fn proto_registers_function_type() {
        let mut ctx = CompilationContext::new();
        let params: DeclSeq = [param("a", TypeTag::Int), param("b", TypeTag::Float)]
            .into_iter()
            .collect();
        let mut func = FuncDecl::new("add", TypeTag::Float, params, StmtSeq::new());
        let root = ctx.root();
        func.proto(&mut ctx, root, DeclTarget::Scope(root)).unwrap();

        let decl = ctx.env(root).decls().get("add").unwrap();
        assert_eq!(decl.kind, DeclFlags::FUNC);
        let f = ctx.ty(decl.ty).and_then(Type::as_function).unwrap();
        assert_eq!(f.return_type, primitives::FLOAT);
        let names: Vec<_> = f.params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn duplicate_function_releases_type() {
        let mut ctx = CompilationContext::new();
        let root = ctx.root();
        let mut first = FuncDecl::new("f", TypeTag::Int, DeclSeq::new(), StmtSeq::new());
        first.proto(&mut ctx, root, DeclTarget::Scope(root)).unwrap();
        let before = ctx.types().len();

        let mut second = FuncDecl::new("f", TypeTag::Int, DeclSeq::new(), StmtSeq::new());
        let err = second
            .proto(&mut ctx, root, DeclTarget::Scope(root))
            .unwrap_err();
        assert_eq!(err.kind, DiagnosticKind::DuplicateIdentifier);
        assert_eq!(ctx.types().len(), before);
        assert_eq!(ctx.env(root).types().len(), 1);
    }

    #[test]
    fn duplicate_parameter_is_rejected() {
        let mut ctx = CompilationContext::new();
        let params: DeclSeq = [param("a", TypeTag::Int), param("a", TypeTag::Int)]
            .into_iter()
            .collect();
        let mut func = FuncDecl::new("f", TypeTag::Int, params, StmtSeq::new());
        let err = compile(&mut func, &mut ctx).unwrap_err();
        assert_eq!(err.kind, DiagnosticKind::DuplicateIdentifier);
    }

    #[test]
    fn translate_emits_frame_and_return() {
        let mut ctx = CompilationContext::new();
        let params: DeclSeq = [param("a", TypeTag::Int), param("b", TypeTag::Int)]
            .into_iter()
            .collect();
        let mut body = StmtSeq::new();
        body.push(local("s", TypeTag::String));
        let mut func = FuncDecl::new("f", TypeTag::Int, params, body);
        compile(&mut func, &mut ctx).unwrap();

        let leave = ctx.exit_label(func.env().unwrap());
        let mut g = Listing::new();
        let mut tx = Translator::new(&mut ctx, &mut g);
        func.translate(&mut tx).unwrap();
        assert_eq!(
            g.emissions(),
            &[
                Emission::Enter {
                    label: "_ff".into(),
                    frame_size: 4,
                },
                Emission::Code(IrNode::store(IrNode::Local(-4), IrNode::Const(0))),
                Emission::Label(leave),
                Emission::Leave {
                    teardown: Some(IrNode::call(runtime::STR_RELEASE, vec![IrNode::Local(-4)])),
                    param_bytes: 8,
                },
            ]
        );
    }

    #[test]
    fn debug_mode_announces_entry_and_exit() {
        let mut ctx = CompilationContext::new();
        let mut func = FuncDecl::new("f", TypeTag::Int, DeclSeq::new(), StmtSeq::new());
        compile(&mut func, &mut ctx).unwrap();
        let env = func.env().unwrap();

        let mut g = Listing::with_debug(true);
        let mut tx = Translator::new(&mut ctx, &mut g);
        func.translate(&mut tx).unwrap();

        let emissions = g.emissions();
        let Emission::Str { value, label } = &emissions[1] else {
            panic!("expected function name payload, got {:?}", emissions[1]);
        };
        assert_eq!(value, "f");
        assert_eq!(
            emissions[2],
            Emission::Code(IrNode::call(
                runtime::DEBUG_ENTER,
                vec![
                    IrNode::FramePointer,
                    IrNode::Const(env.index() as i32),
                    IrNode::Global(label.clone()),
                ],
            ))
        );
        assert_eq!(
            emissions.last(),
            Some(&Emission::Leave {
                teardown: Some(IrNode::call(runtime::DEBUG_LEAVE, Vec::new())),
                param_bytes: 0,
            })
        );
    }

    #[test]
    fn undefined_label_reports_reference_position() {
        let mut ctx = CompilationContext::new();
        let mut body = StmtSeq::new();
        body.push(LabelStmt::new("top", Span::point(2, 1)));
        body.push(GotoStmt::new("nowhere", Span::point(3, 5)));
        let mut func = FuncDecl::new("f", TypeTag::Int, DeclSeq::new(), body);
        compile(&mut func, &mut ctx).unwrap();

        let mut g = Listing::new();
        let mut tx = Translator::new(&mut ctx, &mut g);
        let err = func.translate(&mut tx).unwrap_err().into_diagnostic();
        assert_eq!(err.kind, DiagnosticKind::UndefinedLabel);
        assert_eq!(err.pos, Some(Span::point(3, 5)));
    }
}
