//! Tarn Typechecker
//!
//! Structural type interning, first-argument overload dispatch and expression checking.

#![allow(clippy::uninlined_format_args)]
//!
//! ## Architecture
//!
//! Types are packed into a single word arena and interned, so two types are equal
//! exactly when their ids are. Key components:
//!
//! - **Type Arena**: flat storage with hash-bucket interning of type records
//! - **Type Expressions**: builder and evaluator turning declaration tokens into types
//! - **Overload Registry**: per-name tables sorted by the outer type of the first parameter
//! - **Expression Checker**: right-to-left folding of prefix expressions with back-propagation
//! - **Generic Matcher**: parameter binding, template intersection and instantiation
//!
//! ## Passes
//!
//! A [`Compiler`] declares every type and function signature first, then finalizes
//! the overload tables, then checks function bodies against the frozen tables.

pub mod arena;
pub mod bindings;
pub mod checker;
pub mod compiler;
pub mod dispatch;
pub mod entity;
pub mod error;
pub mod generics;
pub mod options;
pub mod prelude;
pub mod type_expr;
pub mod types;

// Re-export public API
pub use arena::{TypeArena, TypeBuilder};
pub use bindings::{Binding, Bindings, OverloadRef};
pub use checker::{lower_nodes, Callee, ExprKind, ExprNode, ExpressionTypeChecker};
pub use compiler::{CheckedBody, CheckedFunction, CheckedModule, Compiler};
pub use dispatch::{OverloadRegistry, OverloadTable, RawOverload};
pub use entity::{Entity, EntityClass};
pub use error::{CompilerError, InternalError, TypeError, TypeResult};
pub use generics::{instantiate, Constructor, GenericMatcher, ParamBinding, ParamBindings};
pub use options::CompilerOptions;
pub use type_expr::{DeclKind, DefinedType};
pub use types::{EntityId, OuterType, Sort, TypeElement, TypeHeader, TypeId};

#[cfg(test)]
mod tests;

/// Parse and check a complete source file with the default options
#[allow(clippy::result_large_err)]
pub fn typecheck_source(source: &str) -> Result<(Compiler, CheckedModule), CompilerError> {
    typecheck_source_with_options(source, CompilerOptions::default())
}

#[allow(clippy::result_large_err)]
pub fn typecheck_source_with_options(
    source: &str,
    options: CompilerOptions,
) -> Result<(Compiler, CheckedModule), CompilerError> {
    let mut compiler = Compiler::with_options(options)?;
    let module = tarn_parser::parse_module(source, compiler.names_mut())?;
    let checked = compiler.check_module(&module)?;
    Ok((compiler, checked))
}
