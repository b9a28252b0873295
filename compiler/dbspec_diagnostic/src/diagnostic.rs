use dbspec_ir::Span;

/// A reportable error in a script.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// One-line summary, e.g. `Semantic error: ...`.
    pub headline: String,
    /// Source region to excerpt below the headline.
    pub span: Option<Span>,
}

impl Diagnostic {
    pub fn error(headline: impl Into<String>) -> Self {
        Diagnostic {
            headline: headline.into(),
            span: None,
        }
    }

    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    #[must_use]
    pub fn with_optional_span(mut self, span: Option<Span>) -> Self {
        self.span = span;
        self
    }
}
