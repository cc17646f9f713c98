use crate::*;

#[test]
fn test_predefined_names_have_fixed_ids() {
    let names = NameTable::new();

    assert_eq!(names.get("Int"), Some(NameId::INT));
    assert_eq!(names.get("Void"), Some(NameId::VOID));
    assert_eq!(names.get("F"), Some(NameId::FUNCTION));
}

#[test]
fn test_interning_is_idempotent() {
    let mut names = NameTable::new();
    let before = names.len();

    let first = names.intern("count");
    let second = names.intern("count");

    assert_eq!(first, second);
    assert_eq!(names.len(), before + 1);
    assert_eq!(names.resolve(first), Some("count"));
}

#[test]
fn test_display_of_unknown_name() {
    let names = NameTable::new();
    assert_eq!(names.display(NameId(9999)), "<unnamed>");
}
