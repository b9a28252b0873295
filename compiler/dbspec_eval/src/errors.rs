//! Evaluation errors and their constructors.
//!
//! Every failure a run can hit is an [`EvalError`]: a categorized
//! [`EvalErrorKind`] plus the span of the node being evaluated when it
//! occurred. The kind decides the process outcome ([`StatusCode`]) and the
//! headline shown to the user.
//!
//! Construct errors through the `#[cold]` factory functions below rather
//! than building kinds inline, so message wording lives in one place.

use dbspec_ir::{NodeKind, Span};

use crate::rows::RowsError;
use crate::status::StatusCode;
use crate::value::ValueKind;

/// Result alias used throughout the evaluator.
pub type EvalResult<T = crate::Value> = Result<T, EvalError>;

/// Categorized evaluation failure.
///
/// The `Display` output is the user-facing headline.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EvalErrorKind {
    /// The tree does not have a shape the parser can produce.
    #[error("AST error - {reason}")]
    Ast { reason: String },
    /// A mistake in the script itself.
    #[error("Semantic error: {reason}")]
    Semantic { reason: String },
    #[error("SQL error - {reason}")]
    Sql { reason: String },
    #[error("Error in script - {reason}")]
    Script { reason: String },
    #[error("Assertion failed")]
    Assertion,
    /// Archive extraction, metadata adjustment or report generation failed.
    #[error("SIARD error - {reason}")]
    Archive { reason: String },
    #[error("Internal error - {reason}")]
    Internal { reason: String },
}

impl EvalErrorKind {
    /// Process outcome for this kind of failure.
    pub fn status(&self) -> StatusCode {
        match self {
            EvalErrorKind::Ast { .. } => StatusCode::AstError,
            EvalErrorKind::Semantic { .. } => StatusCode::SemanticError,
            EvalErrorKind::Sql { .. } => StatusCode::SqlError,
            EvalErrorKind::Script { .. } => StatusCode::ScriptError,
            EvalErrorKind::Assertion => StatusCode::AssertionFailure,
            EvalErrorKind::Archive { .. } => StatusCode::ArchiveError,
            EvalErrorKind::Internal { .. } => StatusCode::InternalError,
        }
    }
}

/// An evaluation failure located in the source.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{kind}")]
pub struct EvalError {
    pub kind: EvalErrorKind,
    /// Span of the offending node; `None` for internal failures.
    pub span: Option<Span>,
}

impl EvalError {
    pub fn from_kind(kind: EvalErrorKind) -> Self {
        EvalError { kind, span: None }
    }

    /// Attach a span, replacing any existing one.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Attach a span unless one is already set.
    ///
    /// Errors raised deep inside an expression keep the innermost location.
    #[must_use]
    pub fn or_span(mut self, span: Span) -> Self {
        if self.span.is_none() && !matches!(self.kind, EvalErrorKind::Internal { .. }) {
            self.span = Some(span);
        }
        self
    }

    pub fn status(&self) -> StatusCode {
        self.kind.status()
    }

    pub fn is_internal(&self) -> bool {
        matches!(self.kind, EvalErrorKind::Internal { .. })
    }
}

/// Traversal failures surface as script errors: a busy lock means the
/// script iterates the same rows twice.
impl From<RowsError> for EvalError {
    fn from(error: RowsError) -> Self {
        match error {
            RowsError::Locked => nested_iteration(),
            RowsError::Cursor(error) => rows_error(error),
        }
    }
}

// Tree shape

#[cold]
pub fn unexpected_node(kind: NodeKind, context: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Ast {
        reason: format!("unexpected {kind} in {context}"),
    })
}

#[cold]
pub fn missing_field(parent: NodeKind, field: dbspec_ir::Field) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Ast {
        reason: format!("{parent} has no {field}"),
    })
}

#[cold]
pub fn invalid_literal(what: &str, text: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Ast {
        reason: format!("invalid {what} '{text}'"),
    })
}

// Script mistakes

#[cold]
pub fn semantic(reason: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Semantic {
        reason: reason.into(),
    })
}

#[cold]
pub fn undefined_variable(name: &str) -> EvalError {
    semantic(format!("The variable '{name}' has not been set."))
}

/// A value of the wrong kind reached an operation.
#[cold]
pub fn wrong_kind(what: &str, allowed: &[ValueKind], actual: ValueKind) -> EvalError {
    semantic(format!(
        "{what} must be {}, not {actual}",
        ValueKind::describe(allowed)
    ))
}

#[cold]
pub fn cannot_compare(left: ValueKind, right: ValueKind) -> EvalError {
    semantic(format!(
        "Cannot compare {left} with {right}; convert explicitly (e.g. .as_integer or .as_text)"
    ))
}

#[cold]
pub fn operator_not_supported(operator: &str, kind: ValueKind) -> EvalError {
    semantic(format!("The operator '{operator}' cannot be applied to {kind}"))
}

#[cold]
pub fn unknown_operation(operation: &str, kind: ValueKind) -> EvalError {
    semantic(format!("Unknown operation '.{operation}' on {kind}"))
}

#[cold]
pub fn not_an_integer(text: &str) -> EvalError {
    semantic(format!("'{text}' is not an integer"))
}

#[cold]
pub fn nested_iteration() -> EvalError {
    semantic("Nested iteration over the same rows is not allowed")
}

#[cold]
pub fn rows_error(reason: impl std::fmt::Display) -> EvalError {
    semantic(format!("Error in rows: {reason}"))
}

#[cold]
pub fn safe_interpolation_not_allowed() -> EvalError {
    semantic("Safe interpolation ($${...}) is not allowed here")
}

#[cold]
pub fn interpolation_not_scalar(actual: ValueKind) -> EvalError {
    semantic(format!(
        "Interpolation must be text or integer, not {actual}"
    ))
}

#[cold]
pub fn parameter_in_sql(name: &str) -> EvalError {
    semantic(format!(
        "The command parameter '{name}' cannot be bound as an SQL argument"
    ))
}

// Collaborator failures

#[cold]
pub fn sql_error(reason: impl std::fmt::Display) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Sql {
        reason: reason.to_string(),
    })
}

#[cold]
pub fn script_error(reason: impl std::fmt::Display) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Script {
        reason: reason.to_string(),
    })
}

#[cold]
pub fn archive_error(reason: impl std::fmt::Display) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Archive {
        reason: reason.to_string(),
    })
}

// Outcomes

#[cold]
pub fn assertion_failed() -> EvalError {
    EvalError::from_kind(EvalErrorKind::Assertion)
}

#[cold]
pub fn internal(reason: impl std::fmt::Display) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Internal {
        reason: reason.to_string(),
    })
}
