//! services/api/src/web/protocol.rs
//!
//! Defines the WebSocket message protocol between the browser client and the API server
//! for taking a quiz on an analyzed document.

use serde::{Deserialize, Serialize};
use study_assistant_core::domain::{QuestionItem, QuestionKind};
use study_assistant_core::quiz::ReviewEntry;
use utoipa::ToSchema;
use uuid::Uuid;

//=========================================================================================
// Messages Sent FROM the Client (Browser) TO the Server
//=========================================================================================

/// Represents the structured text messages a client can send to the server.
#[derive(Deserialize, Serialize, Debug, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Starts a quiz on one of the user's documents, replacing any quiz in progress.
    StartQuiz { document_id: Uuid },

    /// Asks the server to repeat the current question.
    CurrentQuestion,

    /// Answers the current question. There is no way to change an earlier answer.
    SubmitAnswer { answer: String },

    /// Leaves the quiz or the results view.
    ExitQuiz,
}

//=========================================================================================
// Messages Sent FROM the Server TO the Client (Browser)
//=========================================================================================

/// Represents the structured text messages the server can send to the client.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// The question to answer next. `index` is zero-based.
    Question {
        index: usize,
        total: usize,
        question: String,
        options: Vec<String>,
        #[schema(value_type = String)]
        kind: QuestionKind,
    },

    /// Sent after the last answer. The score is a percentage and is not rounded.
    QuizCompleted { score: f64, review: Vec<ReviewItem> },

    /// Confirms that the quiz was left.
    QuizClosed,

    /// Reports a failed request; the quiz state is unchanged.
    Error { message: String },
}

/// One line of the results view.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct ReviewItem {
    pub question: String,
    pub submitted_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
}

impl From<ReviewEntry<'_>> for ReviewItem {
    fn from(entry: ReviewEntry<'_>) -> Self {
        Self {
            question: entry.question.question.clone(),
            submitted_answer: entry.submitted_answer.to_string(),
            correct_answer: entry.correct_answer.to_string(),
            is_correct: entry.is_correct,
        }
    }
}

impl ServerMessage {
    pub fn question(index: usize, total: usize, item: &QuestionItem) -> Self {
        ServerMessage::Question {
            index,
            total,
            question: item.question.clone(),
            options: item.options.clone(),
            kind: item.kind,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }
}
