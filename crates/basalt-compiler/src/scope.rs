//! Lexical scopes of a compilation unit.
//!
//! An [`Environment`] is one scope: the unit itself, a function body, or a
//! nested block inside a function. Environments live in the
//! [`CompilationContext`](crate::CompilationContext) and refer to each other by
//! [`EnvId`], so the parent chain never owns anything.
//!
//! Each environment tracks:
//! - its own declaration table (locals of this scope)
//! - the types minted while processing it
//! - the labels referenced or defined in it (function scopes only)
//! - the return type of the enclosing function

use std::fmt;

use basalt_core::Span;
use basalt_registry::{DeclTable, TypeId};

/// Index of an environment in its compilation context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnvId(u32);

impl EnvId {
    /// Create an environment id from a raw index.
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Get the underlying index.
    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for EnvId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "env_{}", self.0)
    }
}

/// What kind of scope an environment is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// The top level of the compilation unit.
    Unit,
    /// A function body.
    Function,
    /// A nested block inside a function.
    Block,
}

/// A label used inside a function.
///
/// A label may be referenced before it is defined. By the time the function
/// has been translated every referenced label must have a definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelUse {
    /// Source-level label name.
    pub name: String,
    /// Where the label is defined, once seen.
    pub defined: Option<Span>,
    /// Where the label was first referenced, if it has been.
    pub referenced: Option<Span>,
}

/// One lexical scope.
#[derive(Debug)]
pub struct Environment {
    kind: ScopeKind,
    decls: DeclTable,
    parent: Option<EnvId>,
    children: Vec<EnvId>,
    types: Vec<TypeId>,
    func_label: String,
    return_type: Option<TypeId>,
    labels: Vec<LabelUse>,
}

impl Environment {
    pub(crate) fn new(
        kind: ScopeKind,
        parent: Option<EnvId>,
        func_label: String,
        return_type: Option<TypeId>,
    ) -> Self {
        Self {
            kind,
            decls: DeclTable::new(),
            parent,
            children: Vec::new(),
            types: Vec::new(),
            func_label,
            return_type,
            labels: Vec::new(),
        }
    }

    /// The kind of scope.
    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    /// Declarations local to this scope.
    pub fn decls(&self) -> &DeclTable {
        &self.decls
    }

    pub(crate) fn decls_mut(&mut self) -> &mut DeclTable {
        &mut self.decls
    }

    /// The enclosing scope.
    pub fn parent(&self) -> Option<EnvId> {
        self.parent
    }

    /// Nested block scopes, in creation order.
    pub fn children(&self) -> &[EnvId] {
        &self.children
    }

    pub(crate) fn add_child(&mut self, child: EnvId) {
        self.children.push(child);
    }

    /// Types minted while processing this scope.
    pub fn types(&self) -> &[TypeId] {
        &self.types
    }

    pub(crate) fn types_mut(&mut self) -> &mut Vec<TypeId> {
        &mut self.types
    }

    /// Label of the enclosing function.
    pub fn func_label(&self) -> &str {
        &self.func_label
    }

    /// Return type of the enclosing function, if inside one.
    pub fn return_type(&self) -> Option<TypeId> {
        self.return_type
    }

    /// Labels used in this scope.
    pub fn labels(&self) -> &[LabelUse] {
        &self.labels
    }

    /// Labels referenced but never defined.
    pub fn undefined_labels(&self) -> impl Iterator<Item = &LabelUse> {
        self.labels.iter().filter(|l| l.defined.is_none())
    }

    pub(crate) fn label_mut(&mut self, name: &str) -> &mut LabelUse {
        let idx = match self.labels.iter().position(|l| l.name == name) {
            Some(idx) => idx,
            None => {
                self.labels.push(LabelUse {
                    name: name.to_string(),
                    defined: None,
                    referenced: None,
                });
                self.labels.len() - 1
            }
        };
        &mut self.labels[idx]
    }
}
