//! The type model.

use std::fmt;

use basalt_core::Literal;

use crate::{DeclTable, TypeId};

/// A compile-time type.
///
/// Struct, Vector and Function types have identity: two of them are the same
/// type only if they are the same arena entry. Const types compare by the
/// literal they carry.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    /// 32-bit integer.
    Int,
    /// 32-bit float.
    Float,
    /// Reference-counted string.
    String,
    /// User struct.
    Struct(StructType),
    /// Fixed-size array.
    Vector(VectorType),
    /// Function signature.
    Function(FunctionType),
    /// Wrapper around a folded constant.
    Const(Literal),
}

/// A user-declared struct type.
#[derive(Debug, Clone, PartialEq)]
pub struct StructType {
    /// Struct name.
    pub name: String,
    /// Field declarations in layout order.
    pub fields: DeclTable,
}

/// A fixed-size array type.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorType {
    /// Label of the array's static type descriptor.
    pub label: String,
    /// Element type.
    pub element: TypeId,
    /// Stored size of each dimension (declared size plus one).
    pub sizes: Vec<u32>,
}

impl VectorType {
    /// Total element capacity, or `None` if it does not fit in a word.
    pub fn capacity(&self) -> Option<i32> {
        self.sizes
            .iter()
            .try_fold(1i32, |acc, &n| acc.checked_mul(i32::try_from(n).ok()?))
    }
}

/// A function signature.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionType {
    /// Return type.
    pub return_type: TypeId,
    /// Parameters in call order.
    pub params: DeclTable,
}

impl Type {
    /// Get the struct type, if this is one.
    pub fn as_struct(&self) -> Option<&StructType> {
        match self {
            Type::Struct(s) => Some(s),
            _ => None,
        }
    }

    /// Get the vector type, if this is one.
    pub fn as_vector(&self) -> Option<&VectorType> {
        match self {
            Type::Vector(v) => Some(v),
            _ => None,
        }
    }

    /// Get the function type, if this is one.
    pub fn as_function(&self) -> Option<&FunctionType> {
        match self {
            Type::Function(f) => Some(f),
            _ => None,
        }
    }

    /// Get the folded literal, if this is a constant type.
    pub fn as_const(&self) -> Option<&Literal> {
        match self {
            Type::Const(lit) => Some(lit),
            _ => None,
        }
    }

    /// Whether values of this type are Int, Float or String.
    pub fn is_primitive(&self) -> bool {
        matches!(self, Type::Int | Type::Float | Type::String)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "Int"),
            Type::Float => write!(f, "Float"),
            Type::String => write!(f, "String"),
            Type::Struct(s) => write!(f, "{}", s.name),
            Type::Vector(v) => write!(f, "Vector({})", v.label),
            Type::Function(_) => write!(f, "Function"),
            Type::Const(lit) => write!(f, "Const({lit})"),
        }
    }
}
