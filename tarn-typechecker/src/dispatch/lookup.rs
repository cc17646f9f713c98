//! First-argument dispatch over a finalized table

use super::{OverloadRegistry, OverloadTable};
use crate::arena::TypeArena;
use crate::generics::{GenericMatcher, ParamBindings};
use crate::types::{OuterType, TypeId};

impl OverloadRegistry {
    /// Find the overload of table `table_id` for a call whose first argument has
    /// type `first_arg`, or `None` for a call without arguments.
    ///
    /// Returns the index of the entry within the table.
    pub fn find_overload(
        &self,
        table_id: usize,
        first_arg: Option<TypeId>,
        arena: &TypeArena,
    ) -> Option<usize> {
        let table = self.table(table_id)?;
        let Some(arg) = first_arg else {
            return table.outer_types.binary_search(&OuterType::ZeroArity).ok();
        };

        let matcher = GenericMatcher::new(arena);
        let outer = arena.outer(arg);

        let exact = match outer {
            OuterType::Concrete(_) | OuterType::Function { .. } => {
                table.outer_types.binary_search(&outer).ok()
            }
            OuterType::Param { .. } | OuterType::ZeroArity => None,
        };
        if let Some(index) = exact.filter(|index| accepts(table, *index, arg, &matcher, arena)) {
            return Some(index);
        }

        // Generic fallback: a parameter applied like the argument, then a bare parameter
        let applied = arena.applied_arity(arg);
        let mut arities = vec![applied];
        if applied != 0 {
            arities.push(0);
        }
        for arity in arities {
            if let Ok(index) = table.outer_types.binary_search(&OuterType::Param { arity }) {
                if accepts(table, index, arg, &matcher, arena) {
                    return Some(index);
                }
            }
        }

        // Keep the same-outer entry so the argument check can say what was expected
        exact
    }
}

/// Whether the first parameter of entry `index` accepts `arg`
fn accepts(
    table: &OverloadTable,
    index: usize,
    arg: TypeId,
    matcher: &GenericMatcher<'_>,
    arena: &TypeArena,
) -> bool {
    table
        .fn_types
        .get(index)
        .and_then(|fn_type| arena.first_param(*fn_type))
        .is_some_and(|first| matcher.match_element(first, arg, &mut ParamBindings::new()))
}
