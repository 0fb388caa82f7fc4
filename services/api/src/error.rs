//! services/api/src/error.rs
//!
//! Defines the primary error type for the API service and the mapping of
//! core errors onto HTTP responses.

use crate::config::ConfigError;
use axum::http::StatusCode;
use study_assistant_core::error::CoreError;
use study_assistant_core::ports::PortError;
use tracing::error;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents a failure while applying the database migrations.
    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

/// Turns a failed use case into the status and message sent to the client.
///
/// Unexpected collaborator failures are logged here and answered with a
/// generic message.
pub fn error_response(err: CoreError) -> (StatusCode, String) {
    match err {
        CoreError::Validation(e) => (StatusCode::BAD_REQUEST, e.to_string()),
        CoreError::State(e) => (StatusCode::CONFLICT, e.to_string()),
        CoreError::Collaborator { operation, source } => match source {
            PortError::NotFound(what) => (StatusCode::NOT_FOUND, what),
            PortError::Conflict(what) => (StatusCode::CONFLICT, what),
            PortError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            PortError::Unexpected(message) => {
                error!("{} failed: {}", operation, message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("{} failed", operation),
                )
            }
        },
    }
}
