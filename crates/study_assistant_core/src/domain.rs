//! crates/study_assistant_core/src/domain.rs
//!
//! Defines the core data structures for the application.
//! These structs know nothing about the database or the web layer; they only
//! derive serde so that nested values (schedules, question lists) can be
//! stored and transported as JSON documents.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::error::ValidationError;

//=========================================================================================
// Users and Auth
//=========================================================================================

// Represents a user - used throughout app
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub user_id: Uuid,
    pub email: String,
}

// Only used internally for login/signup - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: Uuid,
    pub email: String,
    pub hashed_password: String,
}

// Represents a browser login session (auth cookie)
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub id: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

//=========================================================================================
// Study Plans
//=========================================================================================

/// One scheduled unit of study.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudySession {
    pub topics: Vec<String>,
    /// Planned length in minutes. Fractions are allowed.
    pub duration: f64,
    pub resources: Vec<String>,
}

/// Calendar of study sessions keyed by date string (e.g. `2024-01-01`).
///
/// Keys are not checked against the owning plan's date range.
pub type Schedule = BTreeMap<String, Vec<StudySession>>;

/// A user-owned study plan as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyPlan {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub schedule: Schedule,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StudyPlan {
    /// Number of dates that carry at least one entry in the schedule.
    pub fn scheduled_days(&self) -> usize {
        self.schedule.values().filter(|s| !s.is_empty()).count()
    }

    /// Total number of study sessions across all dates.
    pub fn session_count(&self) -> usize {
        self.schedule.values().map(Vec::len).sum()
    }

    pub fn total_minutes(&self) -> f64 {
        self.schedule.values().flatten().map(|s| s.duration).sum()
    }
}

/// The payload used to create a study plan. Id and timestamps come from storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewStudyPlan {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub schedule: Schedule,
}

impl NewStudyPlan {
    /// Checks the creation contract: a non-blank title and finite,
    /// non-negative durations. Date ordering is left to the caller.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        for (date, sessions) in &self.schedule {
            if let Some(index) = sessions
                .iter()
                .position(|s| !s.duration.is_finite() || s.duration < 0.0)
            {
                return Err(ValidationError::InvalidDuration {
                    date: date.clone(),
                    index,
                });
            }
        }
        Ok(())
    }
}

//=========================================================================================
// Documents and Questions
//=========================================================================================

/// Presentation hint for a question. Scoring ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    #[serde(alias = "mcq")]
    MultipleChoice,
    FillInBlank,
}

/// One evaluable question belonging to a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionItem {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
}

impl QuestionItem {
    pub fn is_correct(&self, answer: &str) -> bool {
        self.correct_answer == answer
    }
}

/// What the analysis step produces for an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentAnalysis {
    pub summary: String,
    pub key_points: Vec<String>,
    pub mcqs: Vec<QuestionItem>,
}

impl DocumentAnalysis {
    /// Every question must offer at least one option and its correct answer
    /// must be one of them.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (index, item) in self.mcqs.iter().enumerate() {
            if item.options.is_empty() {
                return Err(ValidationError::NoOptions { index });
            }
            if !item.options.iter().any(|o| o == &item.correct_answer) {
                return Err(ValidationError::CorrectAnswerNotInOptions { index });
            }
        }
        Ok(())
    }
}

/// An analyzed document as stored. Read-only once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub summary: String,
    pub key_points: Vec<String>,
    pub mcqs: Vec<QuestionItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A file handed in by the user for analysis.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl UploadedFile {
    pub fn is_pdf(&self) -> bool {
        let by_type = self
            .content_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case("application/pdf"));
        let by_name = self.file_name.to_ascii_lowercase().ends_with(".pdf");
        by_type || by_name
    }
}
