use super::*;
use crate::error::TypeError;
use crate::types::{Sort, TypeElement};
use crate::typecheck_source;
use pretty_assertions::assert_eq;

#[test]
fn test_identical_redefinition_is_allowed() {
    let (compiler, module) = typecheck_source(
        "type Foo = (id Int name String)
         type Foo = (id Int name String)",
    )
    .unwrap();

    assert_eq!(module.types.len(), 2);
    assert_eq!(module.types[0].1, module.types[1].1);
    assert_eq!(compiler.lookup_type("Foo"), Some(module.types[0].1));
}

#[test]
fn test_conflicting_redefinition() {
    let mut compiler = bare_compiler();
    define(&mut compiler, "type Foo = (id Int)").unwrap();
    let err = define(&mut compiler, "type Foo = (id String)").unwrap_err();

    assert!(matches!(err, TypeError::AssignmentShadowing { ref name, .. } if name == "Foo"));
}

#[test]
fn test_record_layout() {
    let mut compiler = bare_compiler();
    let point = define(&mut compiler, "type Point = (x Int y Double)").unwrap();
    let header = compiler.arena().header(point).unwrap();

    assert_eq!(header.sort, Sort::Record);
    assert_eq!(header.arity, 2);
    assert_eq!(header.tyrity, 0);
    assert_eq!(header.name(), compiler.names().get("Point"));

    let fields: Vec<_> = compiler
        .arena()
        .fields(point)
        .into_iter()
        .map(|(name, element)| (compiler.names().display(name).to_string(), element))
        .collect();
    assert_eq!(
        fields,
        vec![
            ("x".to_string(), TypeElement::Concrete(TypeId::INT)),
            ("y".to_string(), TypeElement::Concrete(TypeId::DOUBLE)),
        ]
    );
}

#[test]
fn test_generic_record_params() {
    let mut compiler = bare_compiler();
    let boxed = define(&mut compiler, "type Boxed<T C/1> = (value T wrapped C(T))").unwrap();

    assert_eq!(compiler.arena().tyrity(boxed), 2);
    assert_eq!(compiler.arena().param_arities(boxed), vec![0, 1]);

    let fields = compiler.arena().fields(boxed);
    assert_eq!(fields[0].1, TypeElement::Param { index: 0, arity: 0 });
    let TypeElement::Concrete(wrapped) = fields[1].1 else {
        panic!("Expected the applied parameter to be interned");
    };
    assert_eq!(compiler.describe_type(wrapped), "T1(T0)");
}

#[test]
fn test_nested_anonymous_record() {
    let mut compiler = bare_compiler();
    let line = define(&mut compiler, "type Line = (from (x Int y Int) to (x Int y Int))").unwrap();
    let fields = compiler.arena().fields(line);

    assert_eq!(fields[0].1, fields[1].1, "identical nested records share one id");
    let TypeElement::Concrete(point) = fields[0].1 else {
        panic!("Expected a concrete field");
    };
    assert_eq!(compiler.describe_type(point), "(x Int y Int)");
}

#[test]
fn test_alias_binds_existing_type() {
    let mut compiler = bare_compiler();
    let num = define(&mut compiler, "type Num = Int").unwrap();

    assert_eq!(num, TypeId::INT);
    assert_eq!(compiler.lookup_type("Num"), Some(TypeId::INT));
}

#[test]
fn test_unknown_type() {
    let mut compiler = bare_compiler();
    let err = define(&mut compiler, "type Foo = (bar Bar)").unwrap_err();
    assert!(matches!(err, TypeError::UnknownType { ref name, .. } if name == "Bar"));
}

#[test]
fn test_unknown_type_constructor() {
    let mut compiler = bare_compiler();
    let err = define(&mut compiler, "type Foo = (items List(Int))").unwrap_err();
    assert!(matches!(err, TypeError::UnknownTypeConstructor { ref name, .. } if name == "List"));

    let err = define(&mut compiler, "type Bar = (x Int(Bool))").unwrap_err();
    assert!(matches!(err, TypeError::UnknownTypeConstructor { ref name, .. } if name == "Int"));
}

#[test]
fn test_constructor_wrong_arity() {
    let mut compiler = Compiler::new().unwrap();
    let err = define(&mut compiler, "type Foo = (items List(Int String))").unwrap_err();
    assert!(matches!(
        err,
        TypeError::TypeConstructorWrongArity {
            ref name,
            expected: 1,
            found: 2,
            ..
        } if name == "List"
    ));

    let err = define(&mut compiler, "type Bar = (items List)").unwrap_err();
    assert!(matches!(
        err,
        TypeError::TypeConstructorWrongArity {
            expected: 1,
            found: 0,
            ..
        }
    ));
}

#[test]
fn test_duplicate_field() {
    let mut compiler = bare_compiler();
    let err = define(&mut compiler, "type Foo = (id Int id String)").unwrap_err();
    assert!(matches!(err, TypeError::DuplicateName { ref name, .. } if name == "id"));
}

#[test]
fn test_duplicate_type_param() {
    let mut compiler = bare_compiler();
    let err = define(&mut compiler, "type Foo<T T> = (value T)").unwrap_err();
    assert!(matches!(err, TypeError::AssignmentShadowing { ref name, .. } if name == "T"));
}

#[test]
fn test_type_param_cap() {
    let options = CompilerOptions::default()
        .with_prelude(false)
        .with_max_type_params(2);
    let mut compiler = Compiler::with_options(options).unwrap();

    define(&mut compiler, "type Two<A B> = (a A b B)").unwrap();
    let err = define(&mut compiler, "type Three<A B C> = (a A)").unwrap_err();
    assert!(matches!(err, TypeError::WordLengthExceeded { .. }));
}

#[test]
fn test_default_type_param_cap() {
    let params = |count: usize| {
        (0..count)
            .map(|index| format!("P{}", index))
            .collect::<Vec<_>>()
            .join(" ")
    };
    let mut compiler = bare_compiler();

    let widest = define(&mut compiler, &format!("type Widest<{}> = (a P0)", params(254))).unwrap();
    assert_eq!(compiler.arena().tyrity(widest), 254);

    let err = define(&mut compiler, &format!("type TooWide<{}> = (a P0)", params(255))).unwrap_err();
    assert!(matches!(err, TypeError::WordLengthExceeded { .. }));
}

#[test]
fn test_arrow_outside_function() {
    let mut compiler = bare_compiler();
    let err = define(&mut compiler, "type Foo = (a Int -> Int)").unwrap_err();
    assert!(matches!(err, TypeError::TypeDefError { .. }));
}

#[test]
fn test_unnamed_field() {
    let mut compiler = bare_compiler();
    let err = define(&mut compiler, "type Foo = (Int)").unwrap_err();
    assert!(matches!(err, TypeError::TypeDefError { ref reason, .. } if reason.contains("named")));
}

#[test]
fn test_function_type_field() {
    let mut compiler = bare_compiler();
    let handler = define(&mut compiler, "type Handler = (run F(Int String -> Bool))").unwrap();
    let TypeElement::Concrete(run) = compiler.arena().fields(handler)[0].1 else {
        panic!("Expected a concrete field");
    };

    assert!(compiler.type_is_function(run));
    assert_eq!(compiler.describe_type(run), "F(Int String -> Bool)");
}

#[test]
fn test_signature_void_return() {
    let mut compiler = bare_compiler();
    declare(&mut compiler, "fn log(message String ->)").unwrap();
    let name = compiler.names().get("log").unwrap();
    let table = compiler.overloads().table(0).unwrap();

    assert_eq!(table.name, name);
    let fn_type = table.fn_types[0];
    assert_eq!(
        compiler.arena().fn_return(fn_type),
        Some(TypeElement::Concrete(TypeId::VOID))
    );
}

#[test]
fn test_signature_errors() {
    let cases = [
        ("fn f(a Int)", "missing return"),
        ("fn f(a Int -> Int -> Int)", "second arrow"),
        ("fn f(Int -> Int)", "unnamed parameter"),
        ("fn f(a Int a Int -> Int)", "duplicate parameter"),
    ];

    for (source, label) in cases {
        let mut compiler = bare_compiler();
        let err = declare(&mut compiler, source).unwrap_err();
        let expected = match label {
            "missing return" => matches!(err, TypeError::MissingReturnType { .. }),
            "second arrow" => matches!(err, TypeError::FnSingleReturnType { .. }),
            "unnamed parameter" => matches!(err, TypeError::TypeDefError { .. }),
            _ => matches!(err, TypeError::DuplicateName { .. }),
        };
        assert!(expected, "{}: unexpected error {:?}", label, err);
    }
}

#[test]
fn test_params_only_on_records() {
    let mut compiler = Compiler::new().unwrap();
    let err = define(&mut compiler, "type Wrapper<T> = List(T)").unwrap_err();
    assert!(matches!(err, TypeError::TypeDefError { .. }));
}
