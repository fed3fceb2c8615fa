//! Error types for Panelpack Core

use thiserror::Error;

/// Result type alias using PanelpackError
pub type Result<T> = std::result::Result<T, PanelpackError>;

/// Top-level error type for all Panelpack operations
#[derive(Debug, Error)]
pub enum PanelpackError {
    #[error("External tool '{tool}' not found. {hint}")]
    ToolNotFound { tool: String, hint: String },

    #[error("External tool '{tool}' failed (exit code: {}): {output}", code_label(.code))]
    ToolFailed {
        tool: String,
        code: Option<i32>,
        output: String,
    },

    #[error("Invalid archive: {0}")]
    InvalidArchive(String),

    #[error("No images found in converted archive")]
    NoImages,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PanelpackError {
    /// Whether this error should be reported as a warning rather than a failure
    pub fn is_warning(&self) -> bool {
        matches!(self, PanelpackError::NoImages)
    }
}

fn code_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "terminated by signal".to_string(),
    }
}

impl From<zip::result::ZipError> for PanelpackError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => PanelpackError::Io(e),
            other => PanelpackError::InvalidArchive(other.to_string()),
        }
    }
}
