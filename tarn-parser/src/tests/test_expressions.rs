use crate::*;
use pretty_assertions::assert_eq;

#[test]
fn test_literals() {
    let mut names = NameTable::new();

    let cases = [
        ("42", NodeKind::Int(42)),
        ("-7", NodeKind::Int(-7)),
        ("42L", NodeKind::Long(42)),
        ("2.5", NodeKind::Double(2.5)),
        ("true", NodeKind::Bool(true)),
        ("\"hi\"", NodeKind::String("hi".to_string())),
    ];

    for (source, expected) in cases {
        let nodes = parse_expression(source, &mut names).unwrap();
        assert_eq!(nodes.len(), 1, "{source} should be a single node");
        assert_eq!(nodes[0].kind, expected, "wrong node for {source}");
    }
}

#[test]
fn test_nested_calls_are_prefix_ordered() {
    let mut names = NameTable::new();
    let nodes = parse_expression("f(g(1), 2)", &mut names).unwrap();

    let f = names.get("f").unwrap();
    let g = names.get("g").unwrap();
    assert_eq!(
        nodes.iter().map(|node| node.kind.clone()).collect::<Vec<_>>(),
        vec![
            NodeKind::Call { name: f, arity: 2 },
            NodeKind::Call { name: g, arity: 1 },
            NodeKind::Int(1),
            NodeKind::Int(2),
        ]
    );
}

#[test]
fn test_operator_calls_and_zero_arity() {
    let mut names = NameTable::new();
    let nodes = parse_expression("-(now(), x)", &mut names).unwrap();

    let minus = names.get("-").unwrap();
    let now = names.get("now").unwrap();
    let x = names.get("x").unwrap();
    assert_eq!(nodes[0].kind, NodeKind::Call { name: minus, arity: 2 });
    assert_eq!(nodes[1].kind, NodeKind::Call { name: now, arity: 0 });
    assert_eq!(nodes[2].kind, NodeKind::Ident(x));
}

#[test]
fn test_keyword_prefix_is_identifier() {
    let mut names = NameTable::new();
    let nodes = parse_expression("trueish", &mut names).unwrap();

    assert!(matches!(nodes[0].kind, NodeKind::Ident(_)));
}

#[test]
fn test_integer_overflow_is_reported() {
    let mut names = NameTable::new();
    let result = parse_expression("99999999999999999999", &mut names);

    assert!(matches!(result, Err(ParseError::InvalidInteger { .. })));
}

#[test]
fn test_spans_cover_source_text() {
    let mut names = NameTable::new();
    let source = "+(1, 23)";
    let nodes = parse_expression(source, &mut names).unwrap();

    assert_eq!(nodes[0].span, Span::new(0, source.len()));
    assert_eq!(&source[nodes[2].span.start..nodes[2].span.end], "23");
}
