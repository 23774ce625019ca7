use super::*;
use crate::Step;
use pretty_assertions::assert_eq;

fn list(items: Vec<Value>) -> Value {
    items
        .into_iter()
        .rev()
        .fold(Value::Null, |tail, item| Value::cons(item, tail))
}

#[test]
fn list_to_vec_walks_proper_list() {
    let value = list(vec![Value::Fixnum(1), Value::Fixnum(2), Value::Fixnum(3)]);
    assert_eq!(
        value.list_to_vec(),
        Some(vec![Value::Fixnum(1), Value::Fixnum(2), Value::Fixnum(3)])
    );
}

#[test]
fn list_to_vec_rejects_improper_list() {
    let value = Value::cons(Value::Fixnum(1), Value::Fixnum(2));
    assert_eq!(value.list_to_vec(), None);
}

#[test]
fn null_is_empty_list() {
    assert!(Value::Null.is_null());
    assert_eq!(Value::Null.list_to_vec(), Some(Vec::new()));
}

#[test]
fn display_lists_and_vectors() {
    let value = list(vec![Value::Fixnum(1), Value::Bool(true), Value::string("x")]);
    assert_eq!(value.to_string(), r#"(1 #t "x")"#);

    let dotted = Value::cons(Value::Fixnum(1), Value::Fixnum(2));
    assert_eq!(dotted.to_string(), "(1 . 2)");

    let vector = Value::vector(vec![Value::string("a"), Value::string("b")]);
    assert_eq!(vector.to_string(), r#"#("a" "b")"#);
}

#[test]
fn procedures_compare_by_identity() {
    let p = Procedure::from_fn("p", |_| Step::Return);
    let same = p.clone();
    let other = Procedure::from_fn("p", |_| Step::Return);

    assert_eq!(Value::Procedure(p.clone()), Value::Procedure(same));
    assert_ne!(Value::Procedure(p), Value::Procedure(other));
}

#[test]
fn as_procedure_only_matches_procedures() {
    let p = Procedure::from_fn("go", |_| Step::Return);
    assert_eq!(
        Value::Procedure(p.clone()).as_procedure().map(Procedure::name),
        Some("go")
    );
    assert!(Value::Fixnum(0).as_procedure().is_none());
}

#[test]
fn long_list_drops_without_recursion() {
    let long = (0..200_000).fold(Value::Null, |tail, n| Value::cons(Value::Fixnum(n), tail));
    assert_eq!(long.car(), Some(&Value::Fixnum(199_999)));
    drop(long);
}

#[test]
fn dropping_a_list_keeps_shared_tails_alive() {
    let shared = list(vec![Value::Fixnum(2), Value::Fixnum(3)]);
    let head = Value::cons(Value::Fixnum(1), shared.clone());

    drop(head);

    assert_eq!(
        shared.list_to_vec(),
        Some(vec![Value::Fixnum(2), Value::Fixnum(3)])
    );
}
