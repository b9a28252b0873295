use super::*;
use crate::errors::EvalErrorKind;
use crate::rows::Rows;
use pretty_assertions::assert_eq;

#[test]
fn kind_names() {
    assert_eq!(ValueKind::describe(&[ValueKind::Text]), "text");
    assert_eq!(
        ValueKind::describe(&[ValueKind::Text, ValueKind::Integer]),
        "text or integer"
    );
    assert_eq!(
        ValueKind::describe(&[ValueKind::Text, ValueKind::Integer, ValueKind::Rows]),
        "text, integer or rows"
    );
    assert_eq!(ValueKind::ParameterRef.to_string(), "parameter reference");
}

#[test]
fn accept_passes_allowed_kinds() {
    let value = Value::integer(7).accept(&[ValueKind::Text, ValueKind::Integer], "Log value");
    assert_eq!(value, Ok(Value::integer(7)));
}

#[test]
fn accept_rejects_with_both_kinds() {
    let Err(error) = Value::text("x").accept(&[ValueKind::Rows], "The loop source") else {
        panic!("text accepted as rows");
    };
    assert_eq!(
        error.kind,
        EvalErrorKind::Semantic {
            reason: "The loop source must be rows, not text".to_owned()
        }
    );
}

#[test]
fn no_implicit_conversion() {
    assert!(Value::integer(5).expect_text("The URL").is_err());
    assert!(Value::text("5").expect_integer("The size").is_err());
}

#[test]
fn display() {
    assert_eq!(Value::text("abc").to_string(), "abc");
    assert_eq!(Value::integer(-12).to_string(), "-12");
    assert_eq!(Value::ParameterRef("year".into()).to_string(), "${year}");
    assert_eq!(Value::Rows(RowsHandle::new(Rows::from_text(""))).to_string(), "<rows>");
}

#[test]
fn rows_values_compare_by_handle() {
    let rows = RowsHandle::new(Rows::from_text("a"));
    let same = Value::Rows(rows.clone());
    assert_eq!(Value::Rows(rows), same);
    assert_ne!(
        Value::Rows(RowsHandle::new(Rows::from_text("a"))),
        Value::Rows(RowsHandle::new(Rows::from_text("a")))
    );
}
