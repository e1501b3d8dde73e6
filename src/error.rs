//! Error types shared by both record pipelines.
//!
//! Pipeline A (dedup/load) treats every data-path error as fatal, so each
//! failure class carries its own process exit code. Pipeline B (aggregation)
//! never surfaces per-record problems; only argument and I/O failures reach
//! this type there.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// Malformed or missing command-line input
    #[error("argument error: {0}")]
    Argument(String),

    /// The input path does not exist
    #[error("file is not exist: {}", path.display())]
    SourceNotFound { path: PathBuf },

    /// The input exists but could not be opened or read
    #[error("open file error: {}: {source}", path.display())]
    SourceAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A field that must be numeric is not
    #[error("line {line}: column {column} is not numeric: {value:?}")]
    Parse {
        line: usize,
        column: usize,
        value: String,
    },

    /// A line has fewer fields than the filter or projection references
    #[error("line {line}: expected at least {needed} fields, found {found}")]
    ShortRecord {
        line: usize,
        needed: usize,
        found: usize,
    },

    /// The sink rejected a write; rows already written stay written
    #[error("write table error: {0}")]
    SinkWrite(String),

    /// The grouping job failed as a whole
    #[error("job failed: {0}")]
    Job(#[from] anyhow::Error),
}

impl PipelineError {
    /// Process exit code for the dedup binary.
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::Argument(_) => 1,
            PipelineError::SourceAccess { .. } => -1,
            PipelineError::SourceNotFound { .. } => -2,
            PipelineError::SinkWrite(_) => -3,
            PipelineError::Parse { .. } | PipelineError::ShortRecord { .. } => -4,
            PipelineError::Job(_) => 1,
        }
    }

    /// Classify an I/O failure on `path` into not-found vs. access.
    pub fn from_io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        let path = path.into();
        if err.kind() == std::io::ErrorKind::NotFound {
            PipelineError::SourceNotFound { path }
        } else {
            PipelineError::SourceAccess { path, source: err }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn io_errors_are_classified_by_kind() {
        let missing = PipelineError::from_io("a.txt", Error::from(ErrorKind::NotFound));
        assert!(matches!(missing, PipelineError::SourceNotFound { .. }));
        assert_eq!(missing.exit_code(), -2);

        let denied = PipelineError::from_io("a.txt", Error::from(ErrorKind::PermissionDenied));
        assert!(matches!(denied, PipelineError::SourceAccess { .. }));
        assert_eq!(denied.exit_code(), -1);
    }

    #[test]
    fn exit_codes_are_distinct_per_class() {
        let codes = [
            PipelineError::Argument("x".into()).exit_code(),
            PipelineError::SinkWrite("x".into()).exit_code(),
            PipelineError::Parse { line: 1, column: 0, value: "x".into() }.exit_code(),
        ];
        assert_eq!(codes, [1, -3, -4]);
    }
}
