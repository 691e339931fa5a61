//! Error types.
//!
//! [`DumpError`] is the only failure a parse call ever returns. Everything else is a
//! [`ParseError`]: recorded as a diagnostic, logged, and skipped.

use serde::Serialize;
use thiserror::Error;

/// Fatal failure of a whole parse call.
#[derive(Debug, Error)]
pub enum DumpError {
    /// The underlying reader failed. Records assembled before the failure are discarded.
    #[error("failed to read stack dump: {0}")]
    Stream(#[from] std::io::Error),
}

/// A convenience `Result` alias over [`DumpError`].
pub type Result<T> = std::result::Result<T, DumpError>;

/// A recoverable grammar failure. `line` is the 1-based input line it was detected on.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind")]
pub enum ParseError {
    /// The header could not be decoded; the whole block is dropped.
    #[error("line {line}: skipping goroutine block: {reason}")]
    Block { line: usize, reason: HeaderError },

    /// A position line could not be decoded; only that frame is dropped.
    #[error("line {line}: dropping frame `{function}`: {reason}")]
    Frame {
        line: usize,
        function: String,
        reason: FrameError,
    },

    /// Input ended while the position line of `function` was still expected.
    #[error("line {line}: input ended before the position line of `{function}`")]
    TruncatedInput { line: usize, function: String },
}

impl ParseError {
    pub fn line(&self) -> usize {
        match self {
            ParseError::Block { line, .. }
            | ParseError::Frame { line, .. }
            | ParseError::TruncatedInput { line, .. } => *line,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum HeaderError {
    #[error("expected at least 3 space-separated tokens, found {0}")]
    TooFewTokens(usize),

    #[error("expected `goroutine`, found `{0}`")]
    NotAGoroutine(String),

    #[error("invalid goroutine id `{0}`")]
    InvalidId(String),

    #[error("missing `[status]:` clause")]
    MissingStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum FrameError {
    #[error("unexpected empty line")]
    EmptyLine,

    #[error("no `file:line` separator in `{0}`")]
    MissingSeparator(String),

    #[error("invalid line number `{0}`")]
    InvalidLine(String),

    #[error("invalid offset `{0}`")]
    InvalidOffset(String),
}
