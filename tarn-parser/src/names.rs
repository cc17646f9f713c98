// Tarn Name Interning
// Identifiers are interned once and referred to by NameId everywhere else

use indexmap::IndexSet;
use std::fmt;

/// Index of an interned identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NameId(pub u32);

impl NameId {
    pub const INT: NameId = NameId(0);
    pub const LONG: NameId = NameId(1);
    pub const DOUBLE: NameId = NameId(2);
    pub const BOOL: NameId = NameId(3);
    pub const STRING: NameId = NameId(4);
    pub const VOID: NameId = NameId(5);
    /// The distinguished function type constructor `F`
    pub const FUNCTION: NameId = NameId(6);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Names every table starts with, in `NameId` order
const PREDEFINED: [&str; 7] = ["Int", "Long", "Double", "Bool", "String", "Void", "F"];

/// Insertion-ordered identifier table
#[derive(Debug, Clone)]
pub struct NameTable {
    names: IndexSet<String>,
}

impl NameTable {
    pub fn new() -> Self {
        let mut names = IndexSet::new();
        for name in PREDEFINED {
            names.insert(name.to_string());
        }
        Self { names }
    }

    /// Intern a name, returning the existing id when it was seen before
    pub fn intern(&mut self, name: &str) -> NameId {
        if let Some(index) = self.names.get_index_of(name) {
            return NameId(index as u32);
        }
        let (index, _) = self.names.insert_full(name.to_string());
        NameId(index as u32)
    }

    pub fn get(&self, name: &str) -> Option<NameId> {
        self.names.get_index_of(name).map(|index| NameId(index as u32))
    }

    pub fn resolve(&self, id: NameId) -> Option<&str> {
        self.names.get_index(id.index()).map(String::as_str)
    }

    /// Resolve for display purposes, never failing
    pub fn display(&self, id: NameId) -> &str {
        self.resolve(id).unwrap_or("<unnamed>")
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for NameTable {
    fn default() -> Self {
        Self::new()
    }
}
