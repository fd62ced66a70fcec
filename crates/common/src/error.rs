//! Error types for sanction.
//!
//! Matchers and strategies never produce these; they degrade to `false` or
//! `None`. Errors only surface from configuration, the suspension service and
//! its collaborators.

use thiserror::Error;

/// Application result type.
pub type AppResult<T> = Result<T, AppError>;

/// Application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // === Client Errors ===
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Suspension not found: {0}")]
    SuspensionNotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unknown matcher type: {0}")]
    UnknownMatcher(String),

    #[error("Unknown strategy: {0}")]
    UnknownStrategy(String),

    // === Server Errors ===
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Event publisher error: {0}")]
    EventPublisher(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::SuspensionNotFound(_) => "SUSPENSION_NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::UnknownMatcher(_) => "UNKNOWN_MATCHER",
            Self::UnknownStrategy(_) => "UNKNOWN_STRATEGY",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::EventPublisher(_) => "EVENT_PUBLISHER_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns whether this error was caused by the caller's input.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_)
                | Self::SuspensionNotFound(_)
                | Self::Validation(_)
                | Self::Conflict(_)
                | Self::UnknownMatcher(_)
                | Self::UnknownStrategy(_)
        )
    }

    /// Returns whether this error should be logged at error level.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        !self.is_client_error()
    }
}

// === From implementations ===

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}
