//! Error types for extraction, indexing and cache persistence.
//!
//! Almost every failure here is recovered close to where it happens: a file
//! that does not parse is dropped from the index, a corrupt cache is deleted.
//! Only [`IndexError::ProjectNotFound`] is expected to reach a consumer.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to turn one file's contents into symbols.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("syntax error at line {line}, column {column}")]
    Syntax { line: u32, column: u32 },

    #[error("file is not valid UTF-8")]
    Encoding,

    #[error("parser error: {0}")]
    Parser(String),
}

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("no project root found for '{path}'")]
    ProjectNotFound { path: PathBuf },

    #[error("'{path}' is outside of project root '{root}'")]
    OutsideProject { path: PathBuf, root: PathBuf },

    #[error("failed to read '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("index cache '{path}' is corrupt: {reason}")]
    CacheCorrupted { path: PathBuf, reason: String },

    #[error("failed to write index cache '{path}': {source}")]
    CacheWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("index worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl IndexError {
    /// Whether the error only means "this file is not part of any project".
    pub fn is_not_applicable(&self) -> bool {
        matches!(self, IndexError::ProjectNotFound { .. })
    }
}

pub type IndexResult<T> = Result<T, IndexError>;
