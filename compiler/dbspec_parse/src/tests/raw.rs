use super::*;
use dbspec_ir::Field;
use pretty_assertions::assert_eq;

/// Texts of the direct children of the first raw block.
fn raw_pieces(source: &str) -> Vec<String> {
    let tree = parse_ok(source);
    let Some(raw) = find(tree.root(), NodeKind::Raw) else {
        panic!("expected a raw block");
    };
    raw.children().map(|piece| piece.text().to_string()).collect()
}

#[test]
fn raw_block_is_deindented() {
    assert_eq!(
        raw_pieces("Log:\n    a\n      b\n\n    c\n\nNop\n"),
        vec!["a\n", "  b\n", "\n", "c\n"]
    );
}

#[test]
fn trailing_blank_lines_end_the_block() {
    let tree = parse_ok("Log:\n    a\n\n\nNop\n");
    let kinds: Vec<_> = tree.root().children().map(|n| n.kind()).collect();
    assert_eq!(kinds, vec![NodeKind::Log, NodeKind::Nop]);
}

#[test]
fn safe_interpolation_splits_the_line() {
    assert_eq!(
        raw_pieces("Execute SQL on c:\n    UPDATE t SET x = $${v}\n"),
        vec!["UPDATE t SET x = ", "$${v}", "\n"]
    );
    let tree = parse_ok("Execute SQL on c:\n    UPDATE t SET x = $${v}\n");
    let Some(safe) = find(tree.root(), NodeKind::SafeInterpolation) else {
        panic!("expected a safe interpolation");
    };
    assert_eq!(safe.child(0).map(|n| n.kind()), Some(NodeKind::VariableInstance));
}

#[test]
fn lone_dollar_signs_are_literal() {
    assert_eq!(
        raw_pieces("Log:\n    cost: $5 and $$ ${ x }\n"),
        vec!["cost: $5 and $$ ", "${ x }", "\n"]
    );
}

#[test]
fn crlf_terminators_stay_in_the_content() {
    assert_eq!(raw_pieces("Log:\r\n    a\r\n    b\r\n"), vec!["a\r\n", "b\r\n"]);
}

#[test]
fn last_line_without_terminator() {
    assert_eq!(raw_pieces("Log:\n    only"), vec!["only"]);
}

#[test]
fn empty_raw_block() {
    let tree = parse_ok("Set x:\nNop\n");
    let Some(set) = tree.root().child(0) else {
        panic!("expected a statement");
    };
    let Some(value) = set.field(Field::Value) else {
        panic!("expected a value");
    };
    assert_eq!(value.kind(), NodeKind::Raw);
    assert_eq!(value.child_count(), 0);
    assert_eq!(tree.root().child_count(), 2);
}

#[test]
fn comment_lines_are_raw_content() {
    assert_eq!(
        raw_pieces("Execute using \"/bin/sh\":\n    # not a comment\n    ls\n"),
        vec!["# not a comment\n", "ls\n"]
    );
}
