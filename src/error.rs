//! Error types shared across the crate.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Syntax errors reported by the pattern matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("empty alternative around '|'")]
    EmptyAlternative,
    #[error("character class is missing its closing ']'")]
    UnclosedClass,
}

/// A problem attached to a single entry during traversal.
///
/// Diagnostics never abort the walk; they are rendered inline next to the
/// entry and counted toward the exit status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    #[error("error opening dir")]
    OpenFailed,
    #[error("{0} entries exceeds filelimit, not opening dir")]
    FileLimit(usize),
    #[error("recursive, not followed")]
    Recursive,
}

/// Fatal errors that stop the program before or during output.
#[derive(Debug, Error)]
pub enum CanopyError {
    #[error("invalid pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: PatternError,
    },
    #[error("invalid filename '{}': {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid time format '{0}'")]
    TimeFormat(String),
    #[error("invalid log level '{0}'")]
    Level(String),
    #[error("failed to initialize logging: {0}")]
    Logging(String),
    #[error("error writing output: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, CanopyError>;
