//! What each interned name currently refers to

use crate::types::{EntityId, TypeId};
use std::collections::HashMap;
use tarn_parser::NameId;

/// Handle of a name's overload list, before or after finalization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverloadRef {
    /// Index into the raw (declaration-ordered) overload lists
    Raw(usize),
    /// Index of the finalized, outer-type-sorted table
    Final(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Binding {
    #[default]
    Unbound,
    Type(TypeId),
    Entity(EntityId),
    Overloaded(OverloadRef),
}

/// Name to binding map with scoped save/restore for parameters
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    map: HashMap<NameId, Binding>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: NameId) -> Binding {
        self.map.get(&name).copied().unwrap_or_default()
    }

    /// Bind a name, returning what it was bound to before
    pub fn set(&mut self, name: NameId, binding: Binding) -> Binding {
        self.map.insert(name, binding).unwrap_or_default()
    }

    /// Put back a binding saved by `set`
    pub fn restore(&mut self, name: NameId, previous: Binding) {
        match previous {
            Binding::Unbound => {
                self.map.remove(&name);
            }
            other => {
                self.map.insert(name, other);
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (NameId, Binding)> + '_ {
        self.map.iter().map(|(name, binding)| (*name, *binding))
    }
}
