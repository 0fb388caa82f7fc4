//! services/api/src/web/ws_handler.rs
//!
//! The entry point and control loop for a quiz WebSocket connection.
//! Each connection owns at most one `QuizSession`; closing the socket abandons it.

use crate::error::error_response;
use crate::web::{
    protocol::{ClientMessage, ReviewItem, ServerMessage},
    state::AppState,
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
    Extension,
};
use futures::{stream::SplitSink, SinkExt, StreamExt};
use std::sync::Arc;
use study_assistant_core::{
    error::CoreError,
    quiz::{QuizProgress, QuizSession},
    DocumentLibrary,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// The handler for upgrading HTTP requests to WebSocket connections.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, app_state, user_id))
}

async fn handle_socket(socket: WebSocket, app_state: Arc<AppState>, user_id: Uuid) {
    info!("Quiz connection established for user: {}", user_id);

    let (mut sender, mut receiver) = socket.split();
    let mut quiz: Option<QuizSession> = None;

    while let Some(frame) = receiver.next().await {
        let text = match frame {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                warn!("WebSocket error for user {}: {}", user_id, e);
                break;
            }
        };

        let reply = match serde_json::from_str::<ClientMessage>(&text) {
            Ok(message) => {
                handle_client_message(&app_state.library, user_id, &mut quiz, message).await
            }
            Err(e) => ServerMessage::error(format!("Malformed message: {}", e)),
        };

        if send(&mut sender, &reply).await.is_err() {
            warn!("Failed to reply to user {}. Closing quiz connection.", user_id);
            break;
        }
    }

    if quiz.is_some_and(|q| !q.is_completed()) {
        info!("User {} left an unfinished quiz", user_id);
    }
    info!("Quiz connection closed for user: {}", user_id);
}

async fn send(
    sender: &mut SplitSink<WebSocket, Message>,
    message: &ServerMessage,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(message).map_err(axum::Error::new)?;
    sender.send(Message::Text(json.into())).await
}

/// Applies one client request to the connection's quiz and returns the reply.
///
/// Failed requests leave `quiz` untouched.
pub async fn handle_client_message(
    library: &DocumentLibrary,
    user_id: Uuid,
    quiz: &mut Option<QuizSession>,
    message: ClientMessage,
) -> ServerMessage {
    let result = match message {
        ClientMessage::StartQuiz { document_id } => {
            start_quiz(library, user_id, quiz, document_id).await
        }
        ClientMessage::CurrentQuestion => match quiz.as_ref() {
            Some(session) => current_question(session),
            None => return no_quiz(),
        },
        ClientMessage::SubmitAnswer { answer } => match quiz.as_mut() {
            Some(session) => submit_answer(session, answer),
            None => return no_quiz(),
        },
        ClientMessage::ExitQuiz => {
            *quiz = None;
            Ok(ServerMessage::QuizClosed)
        }
    };

    result.unwrap_or_else(|e| ServerMessage::error(error_response(e).1))
}

fn no_quiz() -> ServerMessage {
    ServerMessage::error("No quiz in progress")
}

async fn start_quiz(
    library: &DocumentLibrary,
    user_id: Uuid,
    quiz: &mut Option<QuizSession>,
    document_id: Uuid,
) -> Result<ServerMessage, CoreError> {
    let document = library.get_document(user_id, document_id).await?;
    let session = QuizSession::start(Arc::new(document))?;
    let first = current_question(&session)?;

    if quiz.replace(session).is_some() {
        debug!("Replaced the previous quiz of user {}", user_id);
    }
    info!("User {} started a quiz on document {}", user_id, document_id);
    Ok(first)
}

fn current_question(session: &QuizSession) -> Result<ServerMessage, CoreError> {
    let item = session.current_question()?;
    Ok(ServerMessage::question(
        session.current_index(),
        session.total_questions(),
        item,
    ))
}

fn submit_answer(session: &mut QuizSession, answer: String) -> Result<ServerMessage, CoreError> {
    match session.submit_answer(answer)? {
        QuizProgress::Next { .. } => current_question(session),
        QuizProgress::Completed { score } => {
            let review = session
                .review()?
                .into_iter()
                .map(ReviewItem::from)
                .collect();
            info!(
                "Quiz on document {} completed with score {:.1}",
                session.document().id,
                score
            );
            Ok(ServerMessage::QuizCompleted { score, review })
        }
    }
}
