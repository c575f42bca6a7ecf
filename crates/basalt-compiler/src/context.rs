//! CompilationContext - the state of one compilation unit.
//!
//! Owns the unit's [`TypeArena`], every [`Environment`] created while compiling
//! it, and the label generator. Declarations and expressions receive the
//! context plus the [`EnvId`] they are being processed in.
//!
//! ```text
//! ┌──────────────────────────────┐
//! │ CompilationContext           │
//! │  types:  TypeArena           │ ← Struct / Vector / Function / Const types
//! │  scopes: [Environment]       │ ← unit, function and block scopes
//! │  labels: LabelGen            │
//! └──────────────────────────────┘
//! ```
//!
//! Dropping the context tears down everything minted for the unit at once.

use basalt_core::{DeclFlags, Diagnostic, Span};
use basalt_registry::{Decl, DeclTable, RegistryError, Type, TypeArena, TypeId, TypeMark, primitives};

use crate::labels::LabelGen;
use crate::scope::{EnvId, Environment, ScopeKind};

/// A declaration table that a `proto` pass inserts into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclTarget {
    /// The local table of an environment.
    Scope(EnvId),
    /// The field table of a struct type.
    Fields(TypeId),
    /// The parameter table of a function type.
    Params(TypeId),
}

/// The type annotation written on a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TypeTag {
    /// No annotation; the declaration's default type applies.
    #[default]
    Default,
    /// `%`
    Int,
    /// `#`
    Float,
    /// `$`
    String,
    /// `.Name` - a struct type.
    Named(String),
}

/// Compilation state for one unit.
#[derive(Debug)]
pub struct CompilationContext {
    types: TypeArena,
    scopes: Vec<Environment>,
    labels: LabelGen,
}

impl Default for CompilationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl CompilationContext {
    /// Create a context with a single unit-level scope.
    pub fn new() -> Self {
        Self {
            types: TypeArena::new(),
            scopes: vec![Environment::new(
                ScopeKind::Unit,
                None,
                "_main".to_string(),
                None,
            )],
            labels: LabelGen::new(),
        }
    }

    /// The unit-level scope.
    pub fn root(&self) -> EnvId {
        EnvId::new(0)
    }

    /// The unit's type arena.
    pub fn types(&self) -> &TypeArena {
        &self.types
    }

    /// Get a type by id.
    pub fn ty(&self, id: TypeId) -> Option<&Type> {
        self.types.get(id)
    }

    /// Get an environment.
    pub fn env(&self, id: EnvId) -> &Environment {
        &self.scopes[id.index() as usize]
    }

    fn env_mut(&mut self, id: EnvId) -> &mut Environment {
        &mut self.scopes[id.index() as usize]
    }

    /// Number of environments created so far.
    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    /// Generate a fresh unit-unique label.
    pub fn gen_label(&mut self) -> String {
        self.labels.next_label()
    }

    // ==========================================================================
    // Scopes
    // ==========================================================================

    /// Create the scope of a function body.
    pub fn new_function_scope(&mut self, parent: EnvId, return_type: TypeId) -> EnvId {
        let label = self.gen_label();
        self.push_scope(Environment::new(
            ScopeKind::Function,
            Some(parent),
            label,
            Some(return_type),
        ))
    }

    /// Create a nested block scope inside `parent`.
    pub fn new_block_scope(&mut self, parent: EnvId) -> EnvId {
        let (label, ret) = {
            let p = self.env(parent);
            (p.func_label().to_string(), p.return_type())
        };
        let id = self.push_scope(Environment::new(ScopeKind::Block, Some(parent), label, ret));
        self.env_mut(parent).add_child(id);
        id
    }

    fn push_scope(&mut self, env: Environment) -> EnvId {
        let id = EnvId::new(self.scopes.len() as u32);
        self.scopes.push(env);
        id
    }

    /// The function (or unit) scope that owns `env`.
    pub fn function_scope(&self, mut env: EnvId) -> EnvId {
        while self.env(env).kind() == ScopeKind::Block {
            match self.env(env).parent() {
                Some(parent) => env = parent,
                None => break,
            }
        }
        env
    }

    // ==========================================================================
    // Types
    // ==========================================================================

    /// Add a type to the arena and record it as minted in `env`.
    pub fn mint(&mut self, env: EnvId, ty: Type) -> TypeId {
        let id = self.types.alloc(ty);
        self.env_mut(env).types_mut().push(id);
        id
    }

    /// Current end of the type arena.
    pub fn type_mark(&self) -> TypeMark {
        self.types.mark()
    }

    /// Release every type minted since `mark`.
    pub fn release_types(&mut self, mark: TypeMark) {
        let types = &self.types;
        for env in &mut self.scopes {
            env.types_mut().retain(|&id| !types.is_since(id, mark));
        }
        self.types.truncate(mark);
    }

    /// Resolve a type annotation.
    ///
    /// Returns `Ok(None)` for [`TypeTag::Default`].
    pub fn resolve_tag(&self, tag: &TypeTag, env: EnvId) -> Result<Option<TypeId>, Diagnostic> {
        match tag {
            TypeTag::Default => Ok(None),
            TypeTag::Int => Ok(Some(primitives::INT)),
            TypeTag::Float => Ok(Some(primitives::FLOAT)),
            TypeTag::String => Ok(Some(primitives::STRING)),
            TypeTag::Named(name) => self
                .find_struct(env, name)
                .map(Some)
                .ok_or_else(|| Diagnostic::unknown_type(format!("type '{name}' not found"))),
        }
    }

    /// Find a struct type visible from `env`.
    pub fn find_struct(&self, env: EnvId, name: &str) -> Option<TypeId> {
        let (_, decl) = self.lookup(env, name)?;
        if decl.kind.contains(DeclFlags::STRUCT) && self.types.is_struct(decl.ty) {
            Some(decl.ty)
        } else {
            None
        }
    }

    // ==========================================================================
    // Declarations
    // ==========================================================================

    /// Look up a name from `env` outwards. Returns the owning scope too.
    pub fn lookup(&self, env: EnvId, name: &str) -> Option<(EnvId, &Decl)> {
        let mut current = Some(env);
        while let Some(id) = current {
            let scope = self.env(id);
            if let Some(decl) = scope.decls().get(name) {
                return Some((id, decl));
            }
            current = scope.parent();
        }
        None
    }

    /// Borrow a declaration table.
    pub fn table(&self, target: DeclTarget) -> Option<&DeclTable> {
        match target {
            DeclTarget::Scope(env) => Some(self.env(env).decls()),
            DeclTarget::Fields(id) => match self.types.get(id) {
                Some(Type::Struct(s)) => Some(&s.fields),
                _ => None,
            },
            DeclTarget::Params(id) => match self.types.get(id) {
                Some(Type::Function(f)) => Some(&f.params),
                _ => None,
            },
        }
    }

    fn table_mut(&mut self, target: DeclTarget) -> Result<&mut DeclTable, Diagnostic> {
        match target {
            DeclTarget::Scope(env) => Ok(self.env_mut(env).decls_mut()),
            DeclTarget::Fields(id) => match self.types.get_mut(id) {
                Some(Type::Struct(s)) => Ok(&mut s.fields),
                _ => Err(Diagnostic::internal(format!("{id} is not a struct type"))),
            },
            DeclTarget::Params(id) => match self.types.get_mut(id) {
                Some(Type::Function(f)) => Ok(&mut f.params),
                _ => Err(Diagnostic::internal(format!("{id} is not a function type"))),
            },
        }
    }

    /// Insert a declaration into a table.
    ///
    /// A name clash is reported as a duplicate `what` and leaves the table as it was.
    pub fn insert_decl(
        &mut self,
        target: DeclTarget,
        decl: Decl,
        what: &str,
    ) -> Result<usize, Diagnostic> {
        self.table_mut(target)?
            .insert(decl)
            .map_err(|RegistryError::Duplicate { name }| Diagnostic::duplicate(what, &name))
    }

    /// Assign `index * word` offsets to a struct's fields.
    pub fn assign_field_offsets(&mut self, ty: TypeId, word: u32) -> Result<(), Diagnostic> {
        self.table_mut(DeclTarget::Fields(ty))?.assign_offsets(word);
        Ok(())
    }

    // ==========================================================================
    // Labels
    // ==========================================================================

    /// Record a reference to a label from inside `env`.
    pub fn reference_label(&mut self, env: EnvId, name: &str, pos: Span) {
        let func = self.function_scope(env);
        let label = self.env_mut(func).label_mut(name);
        if label.referenced.is_none() {
            label.referenced = Some(pos);
        }
    }

    /// Record the definition of a label inside `env`.
    pub fn define_label(&mut self, env: EnvId, name: &str, pos: Span) -> Result<(), Diagnostic> {
        let func = self.function_scope(env);
        let label = self.env_mut(func).label_mut(name);
        if label.defined.is_some() {
            return Err(Diagnostic::duplicate("label", name).at(pos));
        }
        label.defined = Some(pos);
        Ok(())
    }

    /// Output symbol of a source-level label used inside `env`.
    ///
    /// User labels live under `<func>_l_`, apart from the exit label.
    pub fn label_symbol(&self, env: EnvId, name: &str) -> String {
        let func = self.function_scope(env);
        format!("{}_l_{}", self.env(func).func_label(), name)
    }

    /// Symbol of the exit point of the function enclosing `env`.
    pub fn exit_label(&self, env: EnvId) -> String {
        let func = self.function_scope(env);
        format!("{}_leave", self.env(func).func_label())
    }
}
