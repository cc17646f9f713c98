//! Overload shape rules
//!
//! Given a name's overloads sorted by outer type:
//! - at most one overload takes no parameters;
//! - concrete and function outer types are pairwise distinct;
//! - parameter outer types have pairwise distinct arities;
//! - a parameter entry excludes every concrete entry whose constructor takes
//!   as many type arguments as the parameter is applied to.

use super::RawOverload;
use crate::arena::TypeArena;
use crate::error::{to_source_span, TypeError, TypeResult};
use crate::types::OuterType;

pub(super) fn validate_overloads(
    name: &str,
    entries: &[(OuterType, RawOverload)],
    arena: &TypeArena,
) -> TypeResult<()> {
    for pair in entries.windows(2) {
        let [(previous, _), (outer, overload)] = pair else {
            continue;
        };
        if previous != outer {
            continue;
        }
        return Err(match outer {
            OuterType::ZeroArity => TypeError::TypeOverloadsOnlyOneZero {
                name: name.to_string(),
                span: to_source_span(overload.span),
            },
            _ => TypeError::TypeOverloadsIntersect {
                name: name.to_string(),
                span: to_source_span(overload.span),
            },
        });
    }

    for (outer, param_overload) in entries {
        let OuterType::Param { arity } = outer else {
            continue;
        };
        let collision = entries.iter().find(|(other, _)| match other {
            OuterType::Concrete(ctor) => arena.tyrity(*ctor) == *arity as usize,
            _ => false,
        });
        if let Some((_, concrete_overload)) = collision {
            return Err(TypeError::TypeOverloadsIntersect {
                name: name.to_string(),
                span: to_source_span(param_overload.span.or(concrete_overload.span)),
            });
        }
    }

    Ok(())
}
