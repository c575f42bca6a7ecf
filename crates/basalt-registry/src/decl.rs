//! Declarations and ordered declaration tables.

use basalt_core::DeclFlags;
use rustc_hash::FxHashMap;

use crate::{RegistryError, TypeId};

/// A named binding.
#[derive(Debug, Clone, PartialEq)]
pub struct Decl {
    /// Name, unique within its table.
    pub name: String,
    /// The bound type (owned by the unit's arena).
    pub ty: TypeId,
    /// What kind of binding this is.
    pub kind: DeclFlags,
    /// Folded default value (a `Type::Const`), for fields and parameters.
    pub default: Option<TypeId>,
    /// Byte offset within the owning struct (fields only).
    pub offset: Option<u32>,
}

impl Decl {
    /// Create a declaration with no default and no offset.
    pub fn new(name: impl Into<String>, ty: TypeId, kind: DeclFlags) -> Self {
        Self {
            name: name.into(),
            ty,
            kind,
            default: None,
            offset: None,
        }
    }

    /// Attach a folded default value.
    pub fn with_default(mut self, default: Option<TypeId>) -> Self {
        self.default = default;
        self
    }
}

/// Ordered, duplicate-rejecting mapping from name to [`Decl`].
///
/// Insertion order is significant: it is the field layout order of a struct
/// and the parameter order of a function.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeclTable {
    decls: Vec<Decl>,
    index: FxHashMap<String, usize>,
}

impl DeclTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a declaration.
    ///
    /// Fails without touching the table if the name is already present.
    /// Returns the insertion index on success.
    pub fn insert(&mut self, decl: Decl) -> Result<usize, RegistryError> {
        if self.index.contains_key(&decl.name) {
            return Err(RegistryError::Duplicate { name: decl.name });
        }
        let idx = self.decls.len();
        self.index.insert(decl.name.clone(), idx);
        self.decls.push(decl);
        Ok(idx)
    }

    /// Look up a declaration by name.
    pub fn get(&self, name: &str) -> Option<&Decl> {
        self.index.get(name).map(|&i| &self.decls[i])
    }

    /// Whether a name is declared in this table.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Declaration at an insertion index.
    pub fn at(&self, idx: usize) -> Option<&Decl> {
        self.decls.get(idx)
    }

    /// Iterate declarations in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Decl> {
        self.decls.iter()
    }

    /// Number of declarations.
    pub fn len(&self) -> usize {
        self.decls.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    /// Assign each declaration the offset `index * word`.
    pub fn assign_offsets(&mut self, word: u32) {
        for (k, decl) in self.decls.iter_mut().enumerate() {
            decl.offset = Some(k as u32 * word);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives;

    #[test]
    fn insert_preserves_order() {
        let mut table = DeclTable::new();
        table.insert(Decl::new("b", primitives::INT, DeclFlags::LOCAL)).unwrap();
        table.insert(Decl::new("a", primitives::FLOAT, DeclFlags::LOCAL)).unwrap();

        let names: Vec<_> = table.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["b", "a"]);
        assert_eq!(table.get("a").map(|d| d.ty), Some(primitives::FLOAT));
    }

    #[test]
    fn duplicate_insert_leaves_table_unchanged() {
        let mut table = DeclTable::new();
        table.insert(Decl::new("x", primitives::INT, DeclFlags::GLOBAL)).unwrap();
        let before = table.clone();

        let err = table
            .insert(Decl::new("x", primitives::STRING, DeclFlags::GLOBAL))
            .unwrap_err();
        assert_eq!(err, RegistryError::Duplicate { name: "x".into() });
        assert_eq!(table, before);
        assert_eq!(table.get("x").map(|d| d.ty), Some(primitives::INT));
    }

    #[test]
    fn offsets_follow_declaration_order() {
        let mut table = DeclTable::new();
        table.insert(Decl::new("x", primitives::INT, DeclFlags::FIELD)).unwrap();
        table.insert(Decl::new("y", primitives::INT, DeclFlags::FIELD)).unwrap();
        table.assign_offsets(4);

        let offsets: Vec<_> = table.iter().map(|d| d.offset).collect();
        assert_eq!(offsets, [Some(0), Some(4)]);
    }
}
