use super::*;
use pretty_assertions::assert_eq;

#[test]
fn bind_resolve_unbind() {
    let mut ctx = Context::root();
    assert_eq!(ctx.resolve("x"), None);
    assert_eq!(ctx.bind("x", Value::integer(1)), Ok(()));
    assert_eq!(ctx.resolve("x"), Some(Value::integer(1)));
    assert_eq!(ctx.bind("x", Value::text("two")), Ok(()));
    assert_eq!(ctx.resolve("x"), Some(Value::text("two")));
    assert_eq!(ctx.unbind("x"), Ok(()));
    assert_eq!(ctx.resolve("x"), None);
    assert_eq!(ctx.unbind("never"), Ok(()));
}

#[test]
fn child_shadows_and_delegates() {
    let mut top = Context::root();
    let _ = top.bind("a", Value::text("outer"));
    let _ = top.bind("b", Value::text("only outer"));
    let mut inner = Context::child(&top);
    let _ = inner.bind("a", Value::text("inner"));
    assert_eq!(inner.resolve("a"), Some(Value::text("inner")));
    assert_eq!(inner.resolve("b"), Some(Value::text("only outer")));
    let _ = inner.unbind("b");
    assert_eq!(inner.resolve("b"), Some(Value::text("only outer")));
}

#[test]
fn command_scope_yields_parameter_refs() {
    let mut top = Context::root();
    let _ = top.bind("year", Value::integer(2024));
    let _ = top.bind("table", Value::text("orders"));
    let scope = Context::command(&top, ["year".to_owned()]);
    assert_eq!(scope.resolve("year"), Some(Value::ParameterRef("year".into())));
    assert_eq!(scope.resolve("table"), Some(Value::text("orders")));
    assert_eq!(scope.resolve("missing"), None);
}

#[test]
fn command_scope_is_read_only() {
    let top = Context::root();
    let mut scope = Context::command(&top, Vec::new());
    assert_eq!(
        scope.bind("x", Value::integer(1)),
        Err(ScopeError::ReadOnly("x".into()))
    );
    assert_eq!(scope.unbind("x"), Err(ScopeError::ReadOnly("x".into())));
    let error: EvalError = ScopeError::ReadOnly("x".into()).into();
    assert!(error.is_internal());
}

#[test]
fn local_bindings_skip_parents() {
    let mut top = Context::root();
    let _ = top.bind("a", Value::text("1"));
    let mut props = Context::child(&top);
    let _ = props.bind("user", Value::text("sa"));
    let names: Vec<_> = props.local_bindings().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["user"]);
}

#[test]
fn deep_chains_resolve_iteratively() {
    let root = {
        let mut root = Context::root();
        let _ = root.bind("deep", Value::integer(42));
        root
    };
    fn nest(parent: &Context<'_>, depth: usize) -> Option<Value> {
        if depth == 0 {
            return parent.resolve("deep");
        }
        let child = Context::child(parent);
        nest(&child, depth - 1)
    }
    assert_eq!(nest(&root, 200), Some(Value::integer(42)));
}
