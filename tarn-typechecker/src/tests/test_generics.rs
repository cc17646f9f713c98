use super::*;
use crate::error::TypeError;
use crate::generics::{GenericMatcher, ParamBinding};
use crate::types::TypeElement;
use pretty_assertions::assert_eq;

fn prelude_compiler() -> Compiler {
    let mut compiler = Compiler::new().unwrap();
    compiler.finalize_overloads().unwrap();
    compiler
}

#[test]
fn test_list_round_trip() {
    let mut compiler = prelude_compiler();

    let (list, _) = check_expr(&mut compiler, "list(1)").unwrap();
    assert_eq!(compiler.describe_type(list), "List(Int)");

    assert_eq!(check_expr(&mut compiler, "first(list(1))").unwrap().0, TypeId::INT);
    assert_eq!(
        check_expr(&mut compiler, "first(append(list(\"a\"), \"b\"))").unwrap().0,
        TypeId::STRING
    );
    assert_eq!(check_expr(&mut compiler, "length(list(true))").unwrap().0, TypeId::INT);
}

#[test]
fn test_instantiated_types_are_interned() {
    let mut compiler = Compiler::new().unwrap();
    let written = define(&mut compiler, "type Ints = List(Int)").unwrap();
    compiler.finalize_overloads().unwrap();

    let (inferred, _) = check_expr(&mut compiler, "list(1)").unwrap();
    assert_eq!(inferred, written);
}

#[test]
fn test_tuple_accessors() {
    let mut compiler = prelude_compiler();

    assert_eq!(check_expr(&mut compiler, "left(tuple(1, \"a\"))").unwrap().0, TypeId::INT);
    assert_eq!(check_expr(&mut compiler, "right(tuple(1, \"a\"))").unwrap().0, TypeId::STRING);

    let (pair, _) = check_expr(&mut compiler, "tuple(list(1.5), false)").unwrap();
    assert_eq!(compiler.describe_type(pair), "Tuple(List(Double) Bool)");
}

#[test]
fn test_map_binds_constructor_and_function() {
    let mut compiler = Compiler::new().unwrap();
    declare(
        &mut compiler,
        "type Strings = List(String)
         fn show(x Int -> String)",
    )
    .unwrap();

    let (mapped, _) = check_expr(&mut compiler, "map(list(1), show)").unwrap();
    assert_eq!(compiler.describe_type(mapped), "List(String)");
    assert_eq!(Some(mapped), compiler.lookup_type("Strings"));
}

#[test]
fn test_inconsistent_bindings() {
    let mut compiler = prelude_compiler();
    let err = check_expr(&mut compiler, "append(list(1), \"a\")").unwrap_err();
    assert!(matches!(err, TypeError::TypeWrongArgumentType { ref found, .. } if found == "String"));
}

#[test]
fn test_unresolved_return_param() {
    let mut compiler = bare_compiler();
    declare(&mut compiler, "fn make<T>(seed Int -> T)").unwrap();

    let err = check_expr(&mut compiler, "make(1)").unwrap_err();
    assert!(matches!(err, TypeError::TypeUnresolvedParam { ref param, .. } if param == "T0"));
}

#[test]
fn test_satisfies_generic_binds_params() {
    let mut compiler = Compiler::new().unwrap();
    let ints = define(&mut compiler, "type Ints = List(Int)").unwrap();
    let first = compiler.names().get("first").unwrap();
    let overload = compiler.overloads().raw_overloads(first)[0];
    let Some(TypeElement::Concrete(template)) = overload.first_param else {
        panic!("Expected `first` to take an interned List(T)");
    };

    let matcher = GenericMatcher::new(compiler.arena());
    let bindings = matcher.satisfies_generic(ints, template).unwrap();
    assert_eq!(bindings.len(), 1);
    assert_eq!(bindings.get(0), Some(&ParamBinding::Tree(vec![TypeId::INT.0])));

    assert!(matcher.satisfies_generic(TypeId::INT, template).is_none());
}

#[test]
fn test_partial_record_matches_by_field() {
    let mut compiler = bare_compiler();
    declare(
        &mut compiler,
        "fn pick<T>(flag Bool pair (left T right T) -> T)
         fn both(-> (left Bool right Bool))
         fn mixed(-> (left Bool right Int))",
    )
    .unwrap();

    assert_eq!(check_expr(&mut compiler, "pick(true, both())").unwrap().0, TypeId::BOOL);
    let err = check_expr(&mut compiler, "pick(true, mixed())").unwrap_err();
    assert!(matches!(err, TypeError::TypeWrongArgumentType { .. }));
}

#[test]
fn test_array_is_distinct_from_list() {
    let mut compiler = prelude_compiler();

    let (array, _) = check_expr(&mut compiler, "fill(3, 1.5)").unwrap();
    assert_eq!(compiler.describe_type(array), "Array(Double)");
    assert_eq!(compiler.arena().tyrity(compiler.lookup_type("Array").unwrap()), 1);

    let (list, _) = check_expr(&mut compiler, "list(1.5)").unwrap();
    assert_ne!(array, list);

    assert_eq!(check_expr(&mut compiler, "length(fill(3, true))").unwrap().0, TypeId::INT);
    let err = check_expr(&mut compiler, "first(fill(3, true))").unwrap_err();
    assert!(matches!(err, TypeError::TypeNoMatchingOverload { ref name, .. } if name == "first"));
}
