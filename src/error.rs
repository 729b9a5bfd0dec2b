use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SubtransError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Usage error: {0}")]
    Usage(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("External tool failure: {0}")]
    ExternalTool(String),

    #[error("Failed to back up {} to {}: {source}", from.display(), to.display())]
    Backup {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SubtransError {
    /// Per-line translation failures are compensated locally; everything else aborts the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::ExternalTool(_))
    }
}

pub type Result<T> = std::result::Result<T, SubtransError>;
