use std::path::PathBuf;

use crate::validate::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum TotoError {
    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("{}: missing column(s) {}", path.display(), missing.join(", "))]
    Schema { path: PathBuf, missing: Vec<String> },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid draw: {}", violations.iter().map(|v| v.to_string()).collect::<Vec<_>>().join("; "))]
    InvalidDraw { violations: Vec<ValidationError> },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error on {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

pub type Result<T> = std::result::Result<T, TotoError>;
