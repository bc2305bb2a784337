use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("File I/O error for '{path}': {source}")]
    Io { path: String, source: io::Error },
    #[error("Parse error in '{path}' on line {line}: {kind}")]
    Parse {
        path: String,
        line: usize,
        kind: ParseErrorKind,
    },
    #[error("Unexpected end of '{path}' after line {line}: expected {expected}")]
    UnexpectedEof {
        path: String,
        line: usize,
        expected: String,
    },
}

impl InputError {
    /// The parse error kind, if this is a parse error.
    pub fn parse_kind(&self) -> Option<&ParseErrorKind> {
        match self {
            InputError::Parse { kind, .. } => Some(kind),
            _ => None,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseErrorKind {
    #[error("this {class} interaction requires at least {expected} entries, but only {found} were detected")]
    TooFewFields {
        class: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("invalid {field} (value: '{value}')")]
    InvalidNumber { field: &'static str, value: String },
    #[error("interaction mode '{mode}' is not recognized")]
    UnrecognizedMode { mode: String },
    #[error("unrecognized type '{token}'")]
    UnknownType { token: String },
    #[error("{class} interaction '{types}' is not among the defined interactions")]
    UndefinedInteraction { class: &'static str, types: String },
    #[error("expected table '{expected}' but found '{found}'")]
    TableNameMismatch { expected: &'static str, found: String },
    #[error(
        "table for {class} interactions lists {found} entries but {expected} interactions are tabulated"
    )]
    TableCountMismatch {
        class: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("{class} interaction '{types}' appears in the table but is not tabulated")]
    NotTabulated { class: &'static str, types: String },
    #[error("{class} interaction '{types}' already received a table")]
    DuplicateTable { class: &'static str, types: String },
    #[error("{missing} tabulated {class} interactions received no table")]
    MissingTables { class: &'static str, missing: usize },
}
