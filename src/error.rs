use std::path::PathBuf;
use thiserror::Error;

/// Error type for locale synchronisation
#[derive(Debug, Error)]
pub enum SyncError {
    /// The source locale file does not exist
    #[error("File '{path}' does not exist.\n\nTip: Check the input file path (INPUT_INPUT_FILE / --input-file)")]
    InputMissing { path: PathBuf },

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Revision history could not be read
    #[error("History unavailable: {0}")]
    History(String),

    /// The translation backend failed for one text
    #[error("Translation backend error: {0}")]
    Backend(String),

    /// Configuration rejected before any work started
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Document could not be handed to the parser at all
    #[error("Parse error: {0}")]
    Parse(String),
}

impl SyncError {
    /// Create an InputMissing error
    pub fn input_missing(path: impl Into<PathBuf>) -> Self {
        Self::InputMissing { path: path.into() }
    }

    /// Create a History error from anything printable
    pub fn history(reason: impl std::fmt::Display) -> Self {
        Self::History(reason.to_string())
    }

    /// Create a Backend error from anything printable
    pub fn backend(reason: impl std::fmt::Display) -> Self {
        Self::Backend(reason.to_string())
    }

    /// Errors that abort a whole run instead of a single target
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::InputMissing { .. } | Self::InvalidConfig(_))
    }
}

impl From<git2::Error> for SyncError {
    fn from(err: git2::Error) -> Self {
        Self::History(err.message().to_string())
    }
}

/// Result type alias for SyncError
pub type Result<T> = std::result::Result<T, SyncError>;
