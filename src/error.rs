use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the editing core and its collaborators
#[derive(Debug, Error)]
pub enum Error {
    /// Underlying filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings, dictionary or document JSON could not be read or written
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A document path that does not exist in the store
    #[error("Document not found: {}", .0.display())]
    NotFound(PathBuf),

    /// New documents need a non-blank title
    #[error("Document title must not be empty")]
    EmptyTitle,

    /// Dictionary words must contain at least one word character
    #[error("Dictionary word must not be empty")]
    EmptyWord,

    /// No dictionary entry carries this id
    #[error("Dictionary entry not found: {0}")]
    UnknownEntry(String),

    /// Dotted settings key that does not name a field
    #[error("Unknown setting: {0}")]
    UnknownSetting(String),

    /// Value rejected by the settings schema
    #[error("Invalid value for setting {key}: {reason}")]
    InvalidSetting { key: String, reason: String },

    /// Plain save on a document that was never given a path
    #[error("Document has no file path yet")]
    NoFilePath,
}
