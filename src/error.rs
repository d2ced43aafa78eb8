//! Error types and handling.

use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP transport failure (server unreachable, timeout, broken connection)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote call completed but reported failure
    #[error("Remote rejection: {}", .message.as_deref().unwrap_or("unspecified"))]
    Remote { message: Option<String> },

    /// Local file content is not valid structured data
    #[error("Parse error: {0}")]
    Parse(String),

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),
}

/// Result type alias for AppError
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// Create a parse error with message
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a config error with message
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a remote rejection with message
    pub fn remote(msg: impl Into<String>) -> Self {
        Self::Remote {
            message: Some(msg.into()),
        }
    }

    /// Resolve the user-facing message for a failure notification.
    ///
    /// A remote rejection carrying a structured message wins; rejections
    /// without one and plain transport failures fall back to the
    /// per-operation default the caller supplies.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            AppError::Remote { message: Some(m) } => m.clone(),
            AppError::Remote { message: None } | AppError::Http(_) => fallback.to_string(),
            other => other.to_string(),
        }
    }
}
