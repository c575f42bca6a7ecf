//! TypeArena - per-unit storage for every type minted during compilation.
//!
//! # Storage Model
//!
//! - **Primitives**: Int, Float, String and the built-in `Null` struct occupy
//!   fixed slots at the front of every arena (see [`primitives`]).
//! - **Minted types**: Struct, Vector, Function and Const types are appended
//!   as declarations are processed and addressed by [`TypeId`].
//! - **Teardown**: the arena is dropped once with its compilation unit. A
//!   declaration that fails after minting types can hand them back with
//!   [`TypeArena::truncate`].
//!
//! Types that need to refer to each other (a struct field of the struct's own
//! type, a function type whose parameters refer to struct types) do so by id,
//! so the arena never holds reference cycles.

use std::fmt;

use basalt_core::Literal;

use crate::{DeclTable, StructType, Type};

/// Index of a type in a [`TypeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u32);

impl TypeId {
    /// Create a type id from a raw index.
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

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type_{}", self.0)
    }
}

/// Ids of the types every arena starts with.
pub mod primitives {
    use super::TypeId;

    /// `Int`.
    pub const INT: TypeId = TypeId::new(0);
    /// `Float`.
    pub const FLOAT: TypeId = TypeId::new(1);
    /// `String`.
    pub const STRING: TypeId = TypeId::new(2);
    /// The struct type of the null literal.
    pub const NULL: TypeId = TypeId::new(3);

    pub(crate) const COUNT: u32 = 4;
}

/// A position in the arena that can be rolled back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeMark(u32);

/// Arena owning all types of one compilation unit.
#[derive(Debug, Clone)]
pub struct TypeArena {
    types: Vec<Type>,
}

impl Default for TypeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeArena {
    /// Create an arena with the primitives pre-registered.
    pub fn new() -> Self {
        Self {
            types: vec![
                Type::Int,
                Type::Float,
                Type::String,
                Type::Struct(StructType {
                    name: "Null".to_string(),
                    fields: DeclTable::new(),
                }),
            ],
        }
    }

    /// Add a type and return its id.
    pub fn alloc(&mut self, ty: Type) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(ty);
        id
    }

    /// Get a type by id.
    pub fn get(&self, id: TypeId) -> Option<&Type> {
        self.types.get(id.0 as usize)
    }

    /// Get a mutable type by id.
    pub fn get_mut(&mut self, id: TypeId) -> Option<&mut Type> {
        self.types.get_mut(id.0 as usize)
    }

    /// Number of types, primitives included.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether only the primitives are present.
    pub fn is_empty(&self) -> bool {
        self.types.len() as u32 == primitives::COUNT
    }

    /// Current end of the arena.
    pub fn mark(&self) -> TypeMark {
        TypeMark(self.types.len() as u32)
    }

    /// Drop every type minted since `mark`. Primitives are never dropped.
    pub fn truncate(&mut self, mark: TypeMark) {
        let keep = mark.0.max(primitives::COUNT) as usize;
        self.types.truncate(keep);
    }

    /// Whether `id` was minted at or after `mark`.
    pub fn is_since(&self, id: TypeId, mark: TypeMark) -> bool {
        id.0 >= mark.0
    }

    /// Whether two ids denote the same type.
    ///
    /// Identity for everything except Const types, which compare by literal.
    pub fn same(&self, a: TypeId, b: TypeId) -> bool {
        if a == b {
            return true;
        }
        match (self.get(a), self.get(b)) {
            (Some(Type::Const(x)), Some(Type::Const(y))) => x == y,
            _ => false,
        }
    }

    /// The value type of a constant's literal, or `id` itself for non-constants.
    pub fn value_type(&self, id: TypeId) -> TypeId {
        match self.get(id) {
            Some(Type::Const(lit)) => Self::literal_type(lit),
            _ => id,
        }
    }

    /// The primitive type a literal belongs to.
    pub fn literal_type(lit: &Literal) -> TypeId {
        match lit {
            Literal::Int(_) => primitives::INT,
            Literal::Float(_) => primitives::FLOAT,
            Literal::String(_) => primitives::STRING,
            Literal::Null => primitives::NULL,
        }
    }

    /// Whether `id` is a struct type (including `Null`).
    pub fn is_struct(&self, id: TypeId) -> bool {
        matches!(self.get(id), Some(Type::Struct(_)))
    }

    /// Display name for diagnostics.
    pub fn name(&self, id: TypeId) -> String {
        match self.get(id) {
            Some(ty) => ty.to_string(),
            None => format!("<missing {id}>"),
        }
    }
}
