use thiserror::Error;

use crate::types::ResourceKind;

/// The metrics command could not produce output.
#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{command}` failed ({status}): {message}")]
    Failed {
        command: String,
        status: String,
        message: String,
    },
}

/// The metrics command's output did not match the expected table layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("line {line}: expected {expected} columns for {kind} metrics, found {found}")]
    MissingColumns {
        line: usize,
        kind: ResourceKind,
        expected: usize,
        found: usize,
    },
    #[error("invalid quantity '{0}'")]
    InvalidQuantity(String),
    #[error("invalid percentage '{0}'")]
    InvalidPercent(String),
    #[error("line {line}, column {column}: {source}")]
    InvalidField {
        line: usize,
        column: &'static str,
        source: Box<ParseError>,
    },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to get metrics: {0}")]
    Collection(#[from] CollectionError),
    #[error("failed to parse metrics: {0}")]
    Parse(#[from] ParseError),
    #[error("failed to encode report: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
