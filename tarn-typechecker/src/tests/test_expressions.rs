use super::*;
use crate::checker::{Callee, ExprKind};
use crate::error::TypeError;
use pretty_assertions::assert_eq;

fn prelude_compiler() -> Compiler {
    let mut compiler = Compiler::new().unwrap();
    compiler.finalize_overloads().unwrap();
    compiler
}

#[test]
fn test_literal_types() {
    let mut compiler = prelude_compiler();
    let cases = [
        ("42", TypeId::INT),
        ("42L", TypeId::LONG),
        ("4.2", TypeId::DOUBLE),
        ("true", TypeId::BOOL),
        ("\"forty two\"", TypeId::STRING),
    ];
    for (source, expected) in cases {
        assert_eq!(check_expr(&mut compiler, source).unwrap().0, expected, "{}", source);
    }
}

#[test]
fn test_operator_on_matching_types() {
    let mut compiler = prelude_compiler();
    assert_eq!(check_expr(&mut compiler, "==(1, 2)").unwrap().0, TypeId::BOOL);
    assert_eq!(check_expr(&mut compiler, "+(1.5, 2.5)").unwrap().0, TypeId::DOUBLE);
    assert_eq!(check_expr(&mut compiler, "&&(true, false)").unwrap().0, TypeId::BOOL);
}

#[test]
fn test_equality_picks_overload_by_first_argument() {
    let mut compiler = bare_compiler();
    let module = declare(
        &mut compiler,
        "fn ==(a Double b Double -> Bool)\nfn ==(a Int b Int -> Bool)",
    )
    .unwrap();
    let on_double = module.functions[0].entity;
    let on_int = module.functions[1].entity;

    let (type_id, nodes) = check_expr(&mut compiler, "==(1, 2)").unwrap();
    assert_eq!(type_id, TypeId::BOOL);
    assert_eq!(nodes[0].resolved(), Some(on_int));

    let (_, nodes) = check_expr(&mut compiler, "==(1.0, 2.0)").unwrap();
    assert_eq!(nodes[0].resolved(), Some(on_double));
}

#[test]
fn test_operator_on_mixed_types() {
    let mut compiler = prelude_compiler();
    let err = check_expr(&mut compiler, "==(1, 2.0)").unwrap_err();

    assert!(matches!(
        err,
        TypeError::TypeWrongArgumentType { ref expected, ref found, .. }
            if expected == "Int" && found == "Double"
    ));
}

#[test]
fn test_nested_calls_resolve_inside_out() {
    let mut compiler = bare_compiler();
    let module = declare(
        &mut compiler,
        "fn g(a Int -> Double)\nfn f(a Double b Int -> Bool)",
    )
    .unwrap();
    let f = function_entity(&compiler, &module, "f");
    let g = function_entity(&compiler, &module, "g");

    let (type_id, nodes) = check_expr(&mut compiler, "f(g(1), 2)").unwrap();
    assert_eq!(type_id, TypeId::BOOL);
    assert_eq!(nodes[0].resolved(), Some(f));
    assert_eq!(nodes[1].resolved(), Some(g));
    assert_eq!(nodes[2].kind, ExprKind::Literal(TypeId::INT));
}

#[test]
fn test_deeply_nested_arithmetic() {
    let mut compiler = prelude_compiler();
    let (type_id, nodes) = check_expr(&mut compiler, "<(+(*(2, 3), 4), -(10, %(7, 2)))").unwrap();

    assert_eq!(type_id, TypeId::BOOL);
    let unresolved = nodes
        .iter()
        .filter(|node| {
            matches!(
                node.kind,
                ExprKind::Call {
                    callee: Callee::Unresolved(_),
                    ..
                }
            )
        })
        .count();
    assert_eq!(unresolved, 0);
}

#[test]
fn test_no_matching_overload() {
    let mut compiler = bare_compiler();
    declare(&mut compiler, "fn h(a Double -> Int)").unwrap();
    variable(&mut compiler, "x", Some(TypeId::INT));

    let err = check_expr(&mut compiler, "h(x)").unwrap_err();
    assert!(matches!(
        err,
        TypeError::TypeNoMatchingOverload { ref name, ref found, .. } if name == "h" && found == "Int"
    ));
}

#[test]
fn test_wrong_argument_count() {
    let mut compiler = prelude_compiler();
    let err = check_expr(&mut compiler, "+(1)").unwrap_err();
    assert!(matches!(err, TypeError::TypeNoMatchingOverload { ref name, .. } if name == "+"));
}

#[test]
fn test_zero_arity_call() {
    let mut compiler = bare_compiler();
    let module = declare(&mut compiler, "fn now(-> Long)\nfn now(zone String -> Long)").unwrap();
    let now = module.functions[0].entity;

    let (type_id, nodes) = check_expr(&mut compiler, "now()").unwrap();
    assert_eq!(type_id, TypeId::LONG);
    assert_eq!(nodes[0].resolved(), Some(now));
}

#[test]
fn test_back_propagation_types_variable() {
    let mut compiler = prelude_compiler();
    let n = variable(&mut compiler, "n", None);

    assert_eq!(check_expr(&mut compiler, "+(1.5, n)").unwrap().0, TypeId::DOUBLE);
    assert_eq!(compiler.entity(n).unwrap().type_id, Some(TypeId::DOUBLE));

    // Now typed, so it can lead a call
    assert_eq!(check_expr(&mut compiler, "*(n, 2.0)").unwrap().0, TypeId::DOUBLE);
}

#[test]
fn test_untyped_first_argument() {
    let mut compiler = prelude_compiler();
    variable(&mut compiler, "n", None);

    let err = check_expr(&mut compiler, "+(n, 1)").unwrap_err();
    assert!(matches!(err, TypeError::TypeUnknownFirstArg { ref name, .. } if name == "+"));
}

#[test]
fn test_untyped_expression_is_unresolved() {
    let mut compiler = prelude_compiler();
    variable(&mut compiler, "n", None);

    let err = check_expr(&mut compiler, "n").unwrap_err();
    assert!(matches!(err, TypeError::UnresolvedExpression { .. }));
}

#[test]
fn test_unknown_names() {
    let mut compiler = prelude_compiler();

    let err = check_expr(&mut compiler, "missing").unwrap_err();
    assert!(matches!(err, TypeError::UnknownIdentifier { ref name, .. } if name == "missing"));

    let err = check_expr(&mut compiler, "nope(1)").unwrap_err();
    assert!(matches!(err, TypeError::UnknownFunction { ref name, .. } if name == "nope"));
}

#[test]
fn test_function_value_identifier() {
    let mut compiler = bare_compiler();
    declare(&mut compiler, "fn inc(x Int -> Int)").unwrap();

    let (type_id, _) = check_expr(&mut compiler, "inc").unwrap();
    assert!(compiler.type_is_function(type_id));
    assert_eq!(compiler.describe_type(type_id), "F(Int -> Int)");
}

#[test]
fn test_string_functions() {
    let mut compiler = prelude_compiler();
    let (type_id, _) = check_expr(&mut compiler, "concat(\"n = \", toString(+(1, 2)))").unwrap();
    assert_eq!(type_id, TypeId::STRING);

    let (type_id, _) = check_expr(&mut compiler, "print(length(\"abc\"))").unwrap();
    assert_eq!(type_id, TypeId::VOID);
}
