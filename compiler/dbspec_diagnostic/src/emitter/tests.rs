use super::*;
use dbspec_ir::Span;
use pretty_assertions::assert_eq;

fn render(source: &str, diagnostic: &Diagnostic) -> String {
    let mut emitter = Emitter::new(source, Vec::new());
    let Ok(()) = emitter.emit(diagnostic) else {
        panic!("writing to a Vec cannot fail");
    };
    String::from_utf8_lossy(&emitter.into_inner()).into_owned()
}

#[test]
fn headline_only_without_span() {
    let out = render("Nop\n", &Diagnostic::error("Internal error: boom"));
    assert_eq!(out, "Internal error: boom\n");
}

#[test]
fn excerpt_lists_each_touched_line() {
    let source = "Set x = 1\nFor a in x:\n    Log a\n";
    let diagnostic = Diagnostic::error("Semantic error: Expected rows but got integer")
        .with_span(Span::new(10, 32));
    assert_eq!(
        render(source, &diagnostic),
        "Semantic error: Expected rows but got integer\n2:\tFor a in x:\n3:\t    Log a\n"
    );
}

#[test]
fn optional_span_none_keeps_headline() {
    let diagnostic = Diagnostic::error("careful").with_optional_span(None);
    assert_eq!(diagnostic.span, None);
    assert_eq!(render("x", &diagnostic), "careful\n");
}
