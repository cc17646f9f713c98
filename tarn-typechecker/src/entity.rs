//! Entities: functions, parameters and variables

use crate::types::TypeId;
use tarn_parser::{NameId, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityClass {
    Function,
    Immutable,
    Mutable,
}

/// A concrete binding, created once and addressed by `EntityId`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub name: NameId,
    /// `None` until the type is declared or inferred from a call
    pub type_id: Option<TypeId>,
    pub class: EntityClass,
    pub span: Option<Span>,
}

impl Entity {
    pub fn new(name: NameId, type_id: Option<TypeId>, class: EntityClass, span: Option<Span>) -> Self {
        Self {
            name,
            type_id,
            class,
            span,
        }
    }
}
