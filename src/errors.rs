/*!
 * Error types for the assqc checker.
 *
 * Each layer of the checker gets its own error enum, defined with the
 * thiserror crate. File-level and precondition failures are fatal and reach
 * the caller as a typed value; per-line content problems never show up here,
 * they go to the diagnostic report instead.
 */

use std::path::PathBuf;

use thiserror::Error;

/// A timestamp that does not follow the `H:MM:SS.CC` grammar
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Malformed timestamp: '{0}'")]
pub struct MalformedTimestamp(pub String);

/// Errors raised while decomposing one raw script line
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LineParseError {
    /// A Dialogue/Comment line has fewer than the 10 comma-delimited fields
    #[error("Line {line_num}: expected 10 event fields, found {found}")]
    TooFewFields {
        /// 1-based position in the raw file
        line_num: usize,
        /// Number of fields actually present
        found: usize,
    },

    /// A Dialogue/Comment line carries an unparseable start or end time
    #[error("Line {line_num}: {source}")]
    Timestamp {
        /// 1-based position in the raw file
        line_num: usize,
        /// The underlying timestamp error
        #[source]
        source: MalformedTimestamp,
    },
}

impl LineParseError {
    /// Line number the error refers to
    pub fn line_num(&self) -> usize {
        match self {
            Self::TooFewFields { line_num, .. } | Self::Timestamp { line_num, .. } => *line_num,
        }
    }
}

/// Errors raised when mutating a parsed line
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LineError {
    /// Timing was changed on a line that has no timing (Style or Header)
    #[error("Line {line_num} is not a Dialogue/Comment line and has no timing")]
    NotAnEvent {
        /// 1-based position in the raw file
        line_num: usize,
    },
}

/// Errors surfaced by the script checker
#[derive(Error, Debug)]
pub enum CheckerError {
    /// The input path does not exist
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// The input path does not carry an `.ass` extension
    #[error("Invalid extension, expected .ass: {0}")]
    InvalidExtension(PathBuf),

    /// `handle()`/`check()` was called before a script was loaded
    #[error("Checker not initialized: load a script before handling it")]
    NotInitialized,

    /// An in-memory script has no input location and no output directory was configured
    #[error("No output location: set an output directory for scripts loaded from memory")]
    NoOutputLocation,

    /// The loaded script has already been checked
    #[error("Script has already been checked; load it again to re-run")]
    AlreadyHandled,

    /// Reading or writing a file failed
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File being read or written
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Timing mutation hit a non-event line
    #[error("Line error: {0}")]
    Line(#[from] LineError),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the checker
    #[error("Checker error: {0}")]
    Checker(#[from] CheckerError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}
