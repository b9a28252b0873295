use super::*;
use pretty_assertions::assert_eq;

/// `Set x = 42` built by hand.
fn set_tree() -> SyntaxTree {
    let source = "Set x = 42\n";
    let mut b = TreeBuilder::new();
    let name = b.leaf(NodeKind::Identifier, Span::new(4, 5));
    let value = b.leaf(NodeKind::Integer, Span::new(8, 10));
    let set = b.node(
        NodeKind::Set,
        Span::new(0, 10),
        [(Some(Field::Name), name), (Some(Field::Value), value)],
    );
    let root = b.node(NodeKind::SourceFile, Span::new(0, 11), [(None, set)]);
    b.finish(source, root)
}

#[test]
fn fields_and_text() {
    let tree = set_tree();
    let Some(set) = tree.root().child(0) else {
        panic!("expected a statement");
    };
    assert_eq!(set.kind(), NodeKind::Set);
    assert_eq!(set.field(Field::Name).map(|n| n.text()), Some("x"));
    assert_eq!(set.field(Field::Value).map(|n| n.text()), Some("42"));
    assert!(set.field(Field::Body).is_none());
}

#[test]
fn children_keep_order() {
    let tree = set_tree();
    let Some(set) = tree.root().child(0) else {
        panic!("expected a statement");
    };
    let kinds: Vec<_> = set.children().map(|n| n.kind()).collect();
    assert_eq!(kinds, vec![NodeKind::Identifier, NodeKind::Integer]);
    assert_eq!(set.child_count(), 2);
    assert!(set.child(2).is_none());
}

#[test]
fn sexp_labels_fields() {
    let tree = set_tree();
    assert_eq!(
        tree.root().to_sexp(),
        "(source_file (set name: (identifier) value: (integer)))"
    );
}

#[test]
fn archive_info_keywords() {
    assert_eq!(Field::archive_info("dbname"), Some(Field::Dbname));
    assert_eq!(
        Field::archive_info("dataOriginTimespan"),
        Some(Field::DataOriginTimespan)
    );
    assert_eq!(Field::archive_info("name"), None);
}

#[test]
fn node_kind_names() {
    assert_eq!(NodeKind::SafeInterpolation.to_string(), "safe_interpolation");
    assert_eq!(NodeKind::CommandDeclaration.as_str(), "command_declaration");
    assert!(NodeKind::Identifier.is_terminal());
    assert!(!NodeKind::Raw.is_terminal());
}
