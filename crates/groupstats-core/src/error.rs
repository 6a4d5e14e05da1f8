//! Error types for GroupStats

use thiserror::Error;

/// Result type alias using GroupStats' Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for GroupStats operations
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid group catalog or settings. Fatal, never recovered automatically.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller-side validation failure (date window, malformed input)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found error
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Settings file or environment could not be loaded
    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),

    /// CSV writer error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this error came from an invalid catalog or settings
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Settings(_))
    }
}
