//! crates/study_assistant_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or the
//! document analysis backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    Document, DocumentAnalysis, NewStudyPlan, StudyPlan, UploadedFile, User, UserCredentials,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- Auth Methods ---
    /// Fails with `PortError::Conflict` when the email is already registered.
    async fn create_user_with_email(&self, email: &str, hashed_password: &str)
        -> PortResult<User>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    /// Returns the owner of a live session. Unknown or expired sessions are
    /// `PortError::Unauthorized`.
    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;

    // --- Study Plans ---
    async fn insert_study_plan(&self, user_id: Uuid, plan: &NewStudyPlan)
        -> PortResult<StudyPlan>;

    /// All plans of a user, newest first.
    async fn list_study_plans(&self, user_id: Uuid) -> PortResult<Vec<StudyPlan>>;

    async fn get_study_plan(&self, user_id: Uuid, plan_id: Uuid) -> PortResult<StudyPlan>;

    /// Deleting an id that does not exist is not an error.
    async fn delete_study_plan(&self, user_id: Uuid, plan_id: Uuid) -> PortResult<()>;

    // --- Documents ---
    async fn insert_document(
        &self,
        user_id: Uuid,
        title: &str,
        analysis: &DocumentAnalysis,
    ) -> PortResult<Document>;

    /// All documents of a user, newest first.
    async fn list_documents(&self, user_id: Uuid) -> PortResult<Vec<Document>>;

    async fn get_document(&self, user_id: Uuid, document_id: Uuid) -> PortResult<Document>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentAnalyzer: Send + Sync {
    /// Summarizes a file into a summary, key points and a question set.
    async fn analyze(&self, file: &UploadedFile) -> PortResult<DocumentAnalysis>;
}
