//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::error::error_response;
use crate::web::{auth, protocol, state::AppState};
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use study_assistant_core::domain::{
    Document, NewStudyPlan, QuestionItem, Schedule, StudyPlan, UploadedFile,
};
use tracing::warn;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health_handler,
        auth::signup_handler,
        auth::login_handler,
        auth::logout_handler,
        list_plans_handler,
        create_plan_handler,
        get_plan_handler,
        delete_plan_handler,
        list_documents_handler,
        upload_document_handler,
        get_document_handler,
    ),
    components(
        schemas(
            HealthResponse,
            auth::SignupRequest,
            auth::LoginRequest,
            auth::AuthResponse,
            CreatePlanRequest,
            PlanResponse,
            DocumentResponse,
            protocol::ClientMessage,
            protocol::ServerMessage,
        )
    ),
    tags(
        (name = "Study Assistant API", description = "Study plans, analyzed documents and self-tests.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
}

/// The payload for creating a study plan.
#[derive(Deserialize, ToSchema)]
pub struct CreatePlanRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    /// Date string (e.g. `2024-01-01`) to the study sessions planned that day.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub schedule: Schedule,
}

impl From<CreatePlanRequest> for NewStudyPlan {
    fn from(req: CreatePlanRequest) -> Self {
        NewStudyPlan {
            title: req.title,
            description: req.description,
            start_date: req.start_date,
            end_date: req.end_date,
            schedule: req.schedule,
        }
    }
}

/// A stored study plan plus schedule totals for list views.
#[derive(Serialize, Deserialize, ToSchema)]
pub struct PlanResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[schema(value_type = Object)]
    pub schedule: Schedule,
    pub scheduled_days: usize,
    pub session_count: usize,
    pub total_minutes: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<StudyPlan> for PlanResponse {
    fn from(plan: StudyPlan) -> Self {
        Self {
            scheduled_days: plan.scheduled_days(),
            session_count: plan.session_count(),
            total_minutes: plan.total_minutes(),
            id: plan.id,
            title: plan.title,
            description: plan.description,
            start_date: plan.start_date,
            end_date: plan.end_date,
            schedule: plan.schedule,
            created_at: plan.created_at,
            updated_at: plan.updated_at,
        }
    }
}

/// An analyzed document with its question set.
#[derive(Serialize, Deserialize, ToSchema)]
pub struct DocumentResponse {
    pub id: Uuid,
    pub title: String,
    pub summary: String,
    pub key_points: Vec<String>,
    #[schema(value_type = Vec<Object>)]
    pub mcqs: Vec<QuestionItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Document> for DocumentResponse {
    fn from(doc: Document) -> Self {
        Self {
            id: doc.id,
            title: doc.title,
            summary: doc.summary,
            key_points: doc.key_points,
            mcqs: doc.mcqs,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}

//=========================================================================================
// Health
//=========================================================================================

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

//=========================================================================================
// Study Plan Handlers
//=========================================================================================

/// List the caller's study plans, newest first.
#[utoipa::path(
    get,
    path = "/plans",
    responses(
        (status = 200, description = "Study plans of the current user", body = [PlanResponse]),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn list_plans_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let plans = app_state
        .planner
        .list_plans(user_id)
        .await
        .map_err(error_response)?;
    let body: Vec<PlanResponse> = plans.into_iter().map(PlanResponse::from).collect();
    Ok(Json(body))
}

/// Create a study plan.
#[utoipa::path(
    post,
    path = "/plans",
    request_body = CreatePlanRequest,
    responses(
        (status = 201, description = "Study plan created", body = PlanResponse),
        (status = 400, description = "Empty title"),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn create_plan_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<CreatePlanRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let plan = app_state
        .planner
        .create_plan(user_id, req.into())
        .await
        .map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(PlanResponse::from(plan))))
}

/// Fetch a single study plan.
#[utoipa::path(
    get,
    path = "/plans/{id}",
    params(("id" = Uuid, Path, description = "Study plan id")),
    responses(
        (status = 200, description = "The study plan", body = PlanResponse),
        (status = 404, description = "No such plan for this user")
    )
)]
pub async fn get_plan_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(plan_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let plan = app_state
        .planner
        .get_plan(user_id, plan_id)
        .await
        .map_err(error_response)?;
    Ok(Json(PlanResponse::from(plan)))
}

/// Delete a study plan. Deleting an unknown id also succeeds.
#[utoipa::path(
    delete,
    path = "/plans/{id}",
    params(("id" = Uuid, Path, description = "Study plan id")),
    responses(
        (status = 204, description = "Study plan deleted"),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn delete_plan_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(plan_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    app_state
        .planner
        .delete_plan(user_id, plan_id)
        .await
        .map_err(error_response)?;
    Ok(StatusCode::NO_CONTENT)
}

//=========================================================================================
// Document Handlers
//=========================================================================================

/// List the caller's analyzed documents, newest first.
#[utoipa::path(
    get,
    path = "/documents",
    responses(
        (status = 200, description = "Documents of the current user", body = [DocumentResponse]),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn list_documents_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let documents = app_state
        .library
        .list_documents(user_id)
        .await
        .map_err(error_response)?;
    let body: Vec<DocumentResponse> = documents.into_iter().map(DocumentResponse::from).collect();
    Ok(Json(body))
}

/// Upload a PDF and store its analysis.
///
/// Accepts a multipart/form-data request with exactly one file part.
#[utoipa::path(
    post,
    path = "/documents",
    request_body(content_type = "multipart/form-data", description = "The PDF to analyze."),
    responses(
        (status = 201, description = "Document analyzed and stored", body = DocumentResponse),
        (status = 400, description = "Missing file, a field that is not a file, more than one file, or not a PDF"),
        (status = 401, description = "Not logged in"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn upload_document_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let mut upload: Option<UploadedFile> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            format!("Failed to read multipart data: {}", e),
        )
    })? {
        if upload.is_some() {
            return Err((
                StatusCode::BAD_REQUEST,
                "Only one file can be uploaded at a time".to_string(),
            ));
        }
        let Some(file_name) = field.file_name().map(str::to_string) else {
            return Err((
                StatusCode::BAD_REQUEST,
                format!(
                    "Field '{}' is not a file",
                    field.name().unwrap_or_default()
                ),
            ));
        };
        let content_type = field.content_type().map(str::to_string);
        let data: Bytes = field.bytes().await.map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                format!("Failed to read file bytes: {}", e),
            )
        })?;
        upload = Some(UploadedFile {
            file_name,
            content_type,
            data,
        });
    }

    let file = upload.ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            "Multipart form must include a file".to_string(),
        )
    })?;

    match app_state.library.upload(user_id, file).await {
        Ok(document) => Ok((StatusCode::CREATED, Json(DocumentResponse::from(document)))),
        Err(e) => {
            warn!("Document upload failed: {}", e);
            Err(error_response(e))
        }
    }
}

/// Fetch a single analyzed document.
#[utoipa::path(
    get,
    path = "/documents/{id}",
    params(("id" = Uuid, Path, description = "Document id")),
    responses(
        (status = 200, description = "The document", body = DocumentResponse),
        (status = 404, description = "No such document for this user")
    )
)]
pub async fn get_document_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(document_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let document = app_state
        .library
        .get_document(user_id, document_id)
        .await
        .map_err(error_response)?;
    Ok(Json(DocumentResponse::from(document)))
}
