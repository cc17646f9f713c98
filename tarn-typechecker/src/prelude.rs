//! Built-in declarations
//!
//! Generic types and functions are declared from Tarn source, operators and
//! conversions from concrete function types.

use crate::compiler::Compiler;
use crate::entity::EntityClass;
use crate::error::{InternalError, TypeResult};
use crate::internal_error;
use crate::types::{EntityId, TypeId};

pub const PRELUDE: &str = r#"
# Generic containers
type List<T> = (items T)
type Array<T> = (len Int)
type Tuple<A B> = (first A second B)

fn list<T>(item T -> List(T))
fn append<T>(items List(T) item T -> List(T))
fn first<T>(items List(T) -> T)
fn length<T>(items List(T) -> Int)
fn fill<T>(len Int item T -> Array(T))
fn length<T>(items Array(T) -> Int)
fn tuple<A B>(first A second B -> Tuple(A B))
fn left<A B>(pair Tuple(A B) -> A)
fn right<A B>(pair Tuple(A B) -> B)
fn map<C/1 A B>(items C(A) f F(A -> B) -> C(B))
"#;

const NUMERIC: [TypeId; 3] = [TypeId::INT, TypeId::LONG, TypeId::DOUBLE];

/// Declare the prelude into a fresh compiler
pub(crate) fn load(compiler: &mut Compiler) -> TypeResult<()> {
    let module = match tarn_parser::parse_module(PRELUDE, compiler.names_mut()) {
        Ok(module) => module,
        Err(err) => {
            tracing::error!(error = %err, "prelude failed to parse");
            return Err(internal_error!(InternalError::PreludeFailure));
        }
    };
    compiler.declare_items(&module)?;

    for op in ["+", "-", "*", "/", "%"] {
        for ty in NUMERIC {
            builtin(compiler, op, &[ty, ty], ty)?;
        }
    }
    for op in ["<", ">", "<=", ">="] {
        for ty in NUMERIC {
            builtin(compiler, op, &[ty, ty], TypeId::BOOL)?;
        }
    }
    for op in ["==", "!="] {
        for ty in [TypeId::INT, TypeId::LONG, TypeId::DOUBLE, TypeId::BOOL, TypeId::STRING] {
            builtin(compiler, op, &[ty, ty], TypeId::BOOL)?;
        }
    }
    for op in ["&&", "||"] {
        builtin(compiler, op, &[TypeId::BOOL, TypeId::BOOL], TypeId::BOOL)?;
    }

    for ty in [TypeId::INT, TypeId::LONG, TypeId::DOUBLE, TypeId::BOOL, TypeId::STRING] {
        builtin(compiler, "print", &[ty], TypeId::VOID)?;
    }
    for ty in [TypeId::INT, TypeId::LONG, TypeId::DOUBLE, TypeId::BOOL] {
        builtin(compiler, "toString", &[ty], TypeId::STRING)?;
    }
    builtin(compiler, "toDouble", &[TypeId::INT], TypeId::DOUBLE)?;
    builtin(compiler, "toLong", &[TypeId::INT], TypeId::LONG)?;
    builtin(compiler, "concat", &[TypeId::STRING, TypeId::STRING], TypeId::STRING)?;
    builtin(compiler, "length", &[TypeId::STRING], TypeId::INT)?;

    tracing::debug!(names = compiler.names().len(), "prelude loaded");
    Ok(())
}

fn builtin(compiler: &mut Compiler, name: &str, params: &[TypeId], ret: TypeId) -> TypeResult<EntityId> {
    let name = compiler.names_mut().intern(name);
    let fn_type = compiler.add_concr_fn_type(params, ret)?;
    let entity = compiler.declare_entity(name, Some(fn_type), EntityClass::Function, None)?;
    compiler.declare_overload(name, fn_type, entity)?;
    Ok(entity)
}
