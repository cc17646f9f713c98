//! Overload registry
//!
//! Overloads are collected per function name in declaration order during the
//! signature pass. Finalization sorts each name's overloads by the outer type
//! of their first parameter into parallel arrays, validates that no two of them
//! can accept the same first argument, and freezes the registry. Calls are then
//! dispatched by searching the sorted outer types.

mod lookup;
mod validation;

use crate::arena::TypeArena;
use crate::error::{InternalError, TypeResult};
use crate::internal_error;
use crate::types::{EntityId, OuterType, TypeElement, TypeId};
use indexmap::IndexMap;
use tarn_parser::{NameId, NameTable, Span};

/// A declared overload before finalization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawOverload {
    /// `None` for functions without parameters
    pub first_param: Option<TypeElement>,
    pub fn_type: TypeId,
    pub entity: EntityId,
    pub span: Option<Span>,
}

/// The finalized overloads of one name, co-sorted by outer type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverloadTable {
    pub name: NameId,
    pub outer_types: Vec<OuterType>,
    pub entities: Vec<EntityId>,
    pub fn_types: Vec<TypeId>,
}

impl OverloadTable {
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct OverloadRegistry {
    raw: IndexMap<NameId, Vec<RawOverload>>,
    tables: Vec<OverloadTable>,
    frozen: bool,
}

impl OverloadRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an overload to its name's raw list, returning the list handle
    pub fn add_raw_overload(
        &mut self,
        name: NameId,
        fn_type: TypeId,
        entity: EntityId,
        span: Option<Span>,
        arena: &TypeArena,
    ) -> TypeResult<usize> {
        if self.frozen {
            return Err(internal_error!(InternalError::RegistryFrozen));
        }
        if !arena.is_function(fn_type) {
            return Err(internal_error!(InternalError::NotAFunction));
        }

        let entry = self.raw.entry(name);
        let handle = entry.index();
        entry.or_default().push(RawOverload {
            first_param: arena.first_param(fn_type),
            fn_type,
            entity,
            span,
        });
        Ok(handle)
    }

    pub fn raw_overloads(&self, name: NameId) -> &[RawOverload] {
        self.raw.get(&name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Sort, validate and store one name's overloads, returning the table id
    pub fn create_name_overloads(
        &mut self,
        name: NameId,
        arena: &TypeArena,
        names: &NameTable,
    ) -> TypeResult<usize> {
        let mut entries: Vec<(OuterType, RawOverload)> = self
            .raw_overloads(name)
            .iter()
            .map(|overload| {
                let outer = match overload.first_param {
                    None => OuterType::ZeroArity,
                    Some(element) => arena.element_outer(element),
                };
                (outer, *overload)
            })
            .collect();

        // Stable, so equal outer types keep declaration order for error reporting
        entries.sort_by_key(|(outer, _)| *outer);
        validation::validate_overloads(names.display(name), &entries, arena)?;

        let (outer_types, overloads): (Vec<_>, Vec<_>) = entries.into_iter().unzip();
        let table = OverloadTable {
            name,
            outer_types,
            entities: overloads.iter().map(|overload| overload.entity).collect(),
            fn_types: overloads.iter().map(|overload| overload.fn_type).collect(),
        };

        tracing::debug!(
            name = names.display(name),
            overloads = table.len(),
            "finalized overloads"
        );
        self.tables.push(table);
        Ok(self.tables.len() - 1)
    }

    /// Finalize every name in declaration order and freeze the registry
    pub fn finalize(&mut self, arena: &TypeArena, names: &NameTable) -> TypeResult<Vec<(NameId, usize)>> {
        if self.frozen {
            return Err(internal_error!(InternalError::RegistryFrozen));
        }
        let pending: Vec<NameId> = self.raw.keys().copied().collect();
        let mut finalized = Vec::with_capacity(pending.len());
        for name in pending {
            let table = self.create_name_overloads(name, arena, names)?;
            finalized.push((name, table));
        }
        self.frozen = true;
        Ok(finalized)
    }

    pub fn table(&self, id: usize) -> Option<&OverloadTable> {
        self.tables.get(id)
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }
}
