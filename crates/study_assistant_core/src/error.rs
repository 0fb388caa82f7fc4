//! crates/study_assistant_core/src/error.rs
//!
//! Error types for the core's own rules. Failures coming from the outside
//! world (storage, analysis) arrive as `PortError` and are wrapped in
//! `CoreError::Collaborator` together with the name of the failed call.

use crate::ports::PortError;

/// A caller handed the core something that breaks a creation contract.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("A study plan needs a non-empty title")]
    EmptyTitle,
    #[error("Session {index} on {date} needs a duration of zero or more minutes")]
    InvalidDuration { date: String, index: usize },
    #[error("Cannot start a quiz on a document without questions")]
    EmptyQuestionSet,
    #[error("Question {index} has no options")]
    NoOptions { index: usize },
    #[error("The correct answer of question {index} is not one of its options")]
    CorrectAnswerNotInOptions { index: usize },
    #[error("Unsupported file type for '{0}', only PDF documents are accepted")]
    UnsupportedFileType(String),
}

/// An operation was attempted in the wrong quiz state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    #[error("The quiz session is already complete")]
    SessionComplete,
    #[error("The quiz session is not complete yet")]
    SessionNotComplete,
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid state: {0}")]
    State(#[from] StateError),

    #[error("{operation} failed: {source}")]
    Collaborator {
        operation: &'static str,
        #[source]
        source: PortError,
    },
}

impl CoreError {
    pub fn collaborator(operation: &'static str) -> impl FnOnce(PortError) -> CoreError {
        move |source| CoreError::Collaborator { operation, source }
    }
}

/// A convenience type alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;
