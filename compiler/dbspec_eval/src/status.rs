//! Process outcomes.

use std::fmt;
use std::process::ExitCode;

/// Outcome of a run, reported as the process exit code.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum StatusCode {
    Ok,
    SpecUnreadable,
    SemanticError,
    SqlError,
    ScriptError,
    AssertionFailure,
    AstError,
    InternalError,
    ArchiveError,
    SyntaxError,
    CouldNotParseOptions,
    DirectoryDoesNotExist,
    DbspecFileNotSpecified,
    DbspecFileNotFound,
    ConfigFileUnreadable,
}

impl StatusCode {
    pub fn code(self) -> u8 {
        match self {
            StatusCode::Ok => 0,
            StatusCode::SpecUnreadable => 1,
            StatusCode::SemanticError => 2,
            StatusCode::SqlError => 3,
            StatusCode::ScriptError => 4,
            StatusCode::AssertionFailure => 5,
            StatusCode::AstError => 6,
            StatusCode::InternalError => 7,
            StatusCode::ArchiveError => 8,
            StatusCode::SyntaxError => 9,
            StatusCode::CouldNotParseOptions => 100,
            StatusCode::DirectoryDoesNotExist => 101,
            StatusCode::DbspecFileNotSpecified => 102,
            StatusCode::DbspecFileNotFound => 103,
            StatusCode::ConfigFileUnreadable => 104,
        }
    }

    pub fn is_ok(self) -> bool {
        self == StatusCode::Ok
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?} ({})", self.code())
    }
}

impl From<StatusCode> for ExitCode {
    fn from(status: StatusCode) -> Self {
        ExitCode::from(status.code())
    }
}
