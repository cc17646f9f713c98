use super::*;
use crate::generics::GenericMatcher;
use crate::types::{skip_element, tree_tyrity, OuterType, Sort, TypeElement, TypeHeader};
use pretty_assertions::assert_eq;
use tarn_parser::NameId;

#[test]
fn test_header_round_trip() {
    let header = TypeHeader::new(Sort::Record, 3, 2).named(NameId(42), 5);
    let unpacked = TypeHeader::unpack(header.pack(), header.name_and_len).unwrap();

    assert_eq!(unpacked, header);
    assert_eq!(unpacked.name(), Some(NameId(42)));
    assert_eq!(TypeHeader::new(Sort::Function, 1, 0).name(), None);
}

#[test]
fn test_element_words() {
    let param = TypeElement::Param { index: 3, arity: 1 };
    assert_eq!(param.encode(), 0xFF00_0301);
    assert_eq!(TypeElement::decode(param.encode()), param);

    let call = TypeElement::Call {
        target: TypeId(100),
        arg_count: 2,
    };
    assert_eq!(call.encode(), 0x0200_0064);
    assert_eq!(TypeElement::decode(call.encode()), call);
    assert_eq!(TypeElement::decode(TypeId::STRING.0), TypeElement::Concrete(TypeId::STRING));
}

#[test]
fn test_skip_element_walks_argument_subtrees() {
    let tree = [
        TypeElement::Call {
            target: TypeId(100),
            arg_count: 2,
        }
        .encode(),
        TypeElement::Call {
            target: TypeId(200),
            arg_count: 1,
        }
        .encode(),
        TypeId::INT.0,
        TypeElement::Param { index: 1, arity: 0 }.encode(),
        TypeId::BOOL.0,
    ];

    assert_eq!(skip_element(&tree, 0), 4);
    assert_eq!(skip_element(&tree, 1), 3);
    assert_eq!(skip_element(&tree, 4), 5);
    assert_eq!(tree_tyrity(&tree), 2);
}

#[test]
fn test_outer_type_order() {
    let mut outers = vec![
        OuterType::Function { arity: 3 },
        OuterType::Concrete(TypeId(100)),
        OuterType::ZeroArity,
        OuterType::Param { arity: 0 },
        OuterType::Function { arity: 0 },
        OuterType::Concrete(TypeId::INT),
        OuterType::Param { arity: 2 },
    ];
    outers.sort();

    assert_eq!(
        outers,
        vec![
            OuterType::Param { arity: 2 },
            OuterType::Param { arity: 0 },
            OuterType::ZeroArity,
            OuterType::Concrete(TypeId::INT),
            OuterType::Concrete(TypeId(100)),
            OuterType::Function { arity: 0 },
            OuterType::Function { arity: 3 },
        ]
    );
}

#[test]
fn test_interning_is_idempotent() {
    let mut compiler = bare_compiler();
    let first = define(&mut compiler, "type Foo = (id Int name String)").unwrap();
    let len = compiler.arena().len();
    let second = define(&mut compiler, "type Foo = (id Int name String)").unwrap();

    assert_eq!(first, second);
    assert_eq!(compiler.arena().len(), len, "a cache hit must not grow the arena");
}

#[test]
fn test_equal_structures_share_ids() {
    let mut compiler = Compiler::new().unwrap();
    let a = define(&mut compiler, "type A = (xs List(Int))").unwrap();
    let b = define(&mut compiler, "type B = (xs List(Int))").unwrap();
    assert_ne!(a, b, "named records are distinct");

    let fields_a = compiler.arena().fields(a);
    let fields_b = compiler.arena().fields(b);
    assert_eq!(fields_a, fields_b, "the anonymous List(Int) is interned once");
}

#[test]
fn test_primitive_introspection() {
    let compiler = bare_compiler();
    assert_eq!(compiler.type_arity(TypeId::INT), 0);
    assert!(!compiler.type_is_function(TypeId::INT));
    assert_eq!(compiler.type_get_outer(TypeId::DOUBLE), OuterType::Concrete(TypeId::DOUBLE));
    assert_eq!(compiler.describe_type(TypeId::STRING), "String");
}

#[test]
fn test_function_type_introspection() {
    let mut compiler = bare_compiler();
    let fn_type = compiler
        .add_concr_fn_type(&[TypeId::INT, TypeId::BOOL], TypeId::STRING)
        .unwrap();

    assert!(compiler.type_is_function(fn_type));
    assert_eq!(compiler.type_arity(fn_type), 2);
    assert_eq!(compiler.type_get_outer(fn_type), OuterType::Function { arity: 2 });
    assert_eq!(compiler.describe_type(fn_type), "F(Int Bool -> String)");
    assert_eq!(
        compiler.add_concr_fn_type(&[TypeId::INT, TypeId::BOOL], TypeId::STRING).unwrap(),
        fn_type
    );
}

#[test]
fn test_type_call_outer_is_constructor() {
    let mut compiler = Compiler::new().unwrap();
    let list = compiler.lookup_type("List").unwrap();
    let ints = define(&mut compiler, "type Ints = List(Int)").unwrap();

    assert_eq!(compiler.arena().sort(ints), Some(Sort::TypeCall));
    assert_eq!(compiler.type_get_outer(ints), OuterType::Concrete(list));
    assert_eq!(compiler.arena().applied_arity(ints), 1);
    assert_eq!(compiler.describe_type(ints), "List(Int)");
}

#[test]
fn test_generic_templates_intersect() {
    let compiler = Compiler::new().unwrap();
    let list = compiler.lookup_type("List").unwrap();
    let matcher = GenericMatcher::new(compiler.arena());

    let list_of = |arg: u32| {
        vec![
            TypeElement::Call {
                target: list,
                arg_count: 1,
            }
            .encode(),
            arg,
        ]
    };
    let param = TypeElement::Param { index: 0, arity: 0 }.encode();

    assert!(matcher.generics_intersect(&[param], &[TypeId::INT.0]));
    assert!(matcher.generics_intersect(&list_of(param), &list_of(TypeId::INT.0)));
    assert!(!matcher.generics_intersect(&list_of(TypeId::STRING.0), &list_of(TypeId::INT.0)));
    assert!(!matcher.generics_intersect(&list_of(param), &[TypeId::INT.0]));
}
