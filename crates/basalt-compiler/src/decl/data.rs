//! `Data` statements.

use basalt_core::{DataTag, Diagnostic, Literal, TranslateError};

use crate::context::CompilationContext;
use crate::expr::ExprNode;
use crate::scope::EnvId;
use crate::translate::Translator;

/// `Data value` - one constant readable at runtime with `Read`.
#[derive(Debug)]
pub struct DataDecl {
    pub expr: Box<dyn ExprNode>,
    folded: Option<Folded>,
}

#[derive(Debug, Clone, PartialEq)]
struct Folded {
    value: Literal,
    /// Label of the string payload; only strings have one.
    label: Option<String>,
}

impl DataDecl {
    pub fn new(expr: impl ExprNode + 'static) -> Self {
        Self {
            expr: Box::new(expr),
            folded: None,
        }
    }

    /// The folded value, once `proto` has run.
    pub fn value(&self) -> Option<&Literal> {
        self.folded.as_ref().map(|f| &f.value)
    }

    pub(super) fn proto(&mut self, ctx: &mut CompilationContext, env: EnvId) -> Result<(), Diagnostic> {
        let value = self
            .expr
            .semant(ctx, env)?
            .constant_fold()
            .ok_or_else(|| Diagnostic::not_constant("data expression must be constant"))?;
        let label = match &value {
            Literal::String(_) => Some(ctx.gen_label()),
            Literal::Int(_) | Literal::Float(_) => None,
            Literal::Null => {
                return Err(Diagnostic::type_mismatch(
                    "data must be an integer, float or string",
                ));
            }
        };
        self.folded = Some(Folded { value, label });
        Ok(())
    }

    /// Emit the string payload; numbers are stored inline by `transdata`.
    pub(super) fn translate(&self, tx: &mut Translator<'_>) -> Result<(), TranslateError> {
        let folded = self.folded()?;
        if let (Literal::String(s), Some(label)) = (&folded.value, &folded.label) {
            tx.codegen().emit_string(s, label)?;
        }
        Ok(())
    }

    /// Emit the tagged record: tag word, then the value or payload pointer.
    pub(super) fn transdata(&self, tx: &mut Translator<'_>) -> Result<(), TranslateError> {
        let folded = self.folded()?;
        let g = tx.codegen();
        match (&folded.value, &folded.label) {
            (Literal::Int(v), _) => {
                g.emit_word(DataTag::Int.into(), None)?;
                g.emit_word(*v, None)?;
            }
            (Literal::Float(v), _) => {
                g.emit_word(DataTag::Float.into(), None)?;
                g.emit_word(v.0.to_bits() as i32, None)?;
            }
            (Literal::String(_), Some(label)) => {
                g.emit_word(DataTag::String.into(), None)?;
                g.emit_pointer(label)?;
            }
            (Literal::String(_), None) | (Literal::Null, _) => {
                return Err(Diagnostic::internal("data record without payload").into());
            }
        }
        Ok(())
    }

    fn folded(&self) -> Result<&Folded, Diagnostic> {
        self.folded
            .as_ref()
            .ok_or_else(|| Diagnostic::internal("data used before proto"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::{Emission, Listing};
    use crate::context::{DeclTarget, TypeTag};
    use crate::decl::VarDecl;
    use crate::expr::{LiteralExpr, NameExpr};
    use basalt_core::{DeclFlags, DiagnosticKind, Span};

    fn data(value: Literal) -> DataDecl {
        DataDecl::new(LiteralExpr::new(value, Span::default()))
    }

    fn run(decl: &mut DataDecl) -> (Vec<Emission>, Vec<Emission>) {
        let mut ctx = CompilationContext::new();
        let root = ctx.root();
        decl.proto(&mut ctx, root).unwrap();

        let mut g = Listing::new();
        let mut tx = Translator::new(&mut ctx, &mut g);
        decl.translate(&mut tx).unwrap();
        let mark = g.len();
        let mut tx = Translator::new(&mut ctx, &mut g);
        decl.transdata(&mut tx).unwrap();
        (g.emissions()[..mark].to_vec(), g.since(mark).to_vec())
    }

    #[test]
    fn string_data_has_payload_and_pointer() {
        let (translated, records) = run(&mut data(Literal::String("hello".into())));
        assert_eq!(
            translated,
            [Emission::Str {
                value: "hello".into(),
                label: "_1".into(),
            }]
        );
        assert_eq!(records, [Emission::word(4), Emission::pointer("_1")]);
    }

    #[test]
    fn int_data_is_inline() {
        let (translated, records) = run(&mut data(Literal::Int(42)));
        assert!(translated.is_empty());
        assert_eq!(records, [Emission::word(1), Emission::word(42)]);
    }

    #[test]
    fn float_data_carries_bit_pattern() {
        let (_, records) = run(&mut data(Literal::float(1.5)));
        assert_eq!(
            records,
            [Emission::word(2), Emission::word(1.5f32.to_bits() as i32)]
        );
    }

    #[test]
    fn variable_data_is_not_constant() {
        let mut ctx = CompilationContext::new();
        let root = ctx.root();
        let mut var = VarDecl::new("x", TypeTag::Int, DeclFlags::GLOBAL);
        var.proto(&mut ctx, root, DeclTarget::Scope(root)).unwrap();

        let mut decl = DataDecl::new(NameExpr::new("x", Span::default()));
        assert_eq!(
            decl.proto(&mut ctx, root).unwrap_err().kind,
            DiagnosticKind::NotConstant
        );
    }

    #[test]
    fn null_data_is_rejected() {
        let mut ctx = CompilationContext::new();
        let root = ctx.root();
        let mut decl = data(Literal::Null);
        assert_eq!(
            decl.proto(&mut ctx, root).unwrap_err().kind,
            DiagnosticKind::TypeMismatch
        );
    }
}
