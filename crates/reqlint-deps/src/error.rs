use crate::models::Operator;
use thiserror::Error;

/// A declaration line that could not be parsed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {kind}")]
pub struct ParseError {
    pub line: usize,
    pub kind: ParseErrorKind,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("invalid package name '{0}'")]
    InvalidName(String),

    #[error("invalid extra name '{0}'")]
    InvalidExtra(String),

    #[error("unterminated extras list, expected ']'")]
    UnterminatedExtras,

    #[error("invalid version operator '{0}'")]
    InvalidOperator(String),

    #[error("missing version after '{0}'")]
    MissingVersion(Operator),

    #[error("invalid version '{version}' for operator '{operator}'")]
    InvalidVersion { operator: Operator, version: String },

    #[error("empty version clause")]
    EmptyClause,
}
