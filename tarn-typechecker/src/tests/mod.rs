//! Typechecker tests
//!
//! Declarations are written in Tarn source and parsed with the compiler's own
//! name table, so token and node names line up with the checker's bindings.

mod test_arena;
mod test_expressions;
mod test_generics;
mod test_type_definitions;

use crate::checker::{lower_nodes, ExprNode};
use crate::compiler::{CheckedModule, Compiler};
use crate::entity::EntityClass;
use crate::error::TypeResult;
use crate::options::CompilerOptions;
use crate::types::{EntityId, TypeId};
use tarn_parser::{parse_expression, parse_module, Item};

pub(crate) fn bare_compiler() -> Compiler {
    Compiler::with_options(CompilerOptions::default().with_prelude(false)).unwrap()
}

/// Declare every item of `source`, then finalize the overloads
pub(crate) fn declare(compiler: &mut Compiler, source: &str) -> TypeResult<CheckedModule> {
    let module = parse_module(source, compiler.names_mut()).unwrap();
    compiler.check_module(&module)
}

/// Define a single `type` declaration and return its id
pub(crate) fn define(compiler: &mut Compiler, source: &str) -> TypeResult<TypeId> {
    let module = parse_module(source, compiler.names_mut()).unwrap();
    let Some(Item::Type(decl)) = module.items.first() else {
        panic!("Expected a type declaration in {:?}", source);
    };
    compiler.define_type(Some(decl.name), module.type_tokens(decl), Some(decl.span))
}

/// Type check a standalone expression against the finalized overloads
pub(crate) fn check_expr(compiler: &mut Compiler, source: &str) -> TypeResult<(TypeId, Vec<ExprNode>)> {
    let parsed = parse_expression(source, compiler.names_mut()).unwrap();
    let mut nodes = lower_nodes(&parsed);
    let type_id = compiler.type_check_expression(&mut nodes)?;
    Ok((type_id, nodes))
}

pub(crate) fn variable(compiler: &mut Compiler, name: &str, type_id: Option<TypeId>) -> EntityId {
    let name = compiler.names_mut().intern(name);
    compiler
        .declare_entity(name, type_id, EntityClass::Mutable, None)
        .unwrap()
}

/// Entity of the only function called `name` in a checked module
pub(crate) fn function_entity(compiler: &Compiler, module: &CheckedModule, name: &str) -> EntityId {
    let name = compiler.names().get(name).unwrap();
    let mut matching = module.functions.iter().filter(|function| function.name == name);
    let function = matching.next().unwrap();
    assert!(matching.next().is_none(), "expected a single overload");
    function.entity
}
