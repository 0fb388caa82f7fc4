//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{types::Json, FromRow, PgPool};
use study_assistant_core::domain::{
    Document, DocumentAnalysis, NewStudyPlan, QuestionItem, Schedule, StudyPlan, User,
    UserCredentials,
};
use study_assistant_core::ports::{DatabaseService, PortError, PortResult};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn not_found_or_unexpected(what: String) -> impl FnOnce(sqlx::Error) -> PortError {
    move |e| match e {
        sqlx::Error::RowNotFound => PortError::NotFound(what),
        _ => PortError::Unexpected(e.to_string()),
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    user_id: Uuid,
    email: String,
    hashed_password: String,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            user_id: self.user_id,
            email: self.email,
        }
    }

    fn to_credentials(self) -> UserCredentials {
        UserCredentials {
            user_id: self.user_id,
            email: self.email,
            hashed_password: self.hashed_password,
        }
    }
}

#[derive(FromRow)]
struct StudyPlanRecord {
    id: Uuid,
    user_id: Uuid,
    title: String,
    description: String,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    schedule: Json<Schedule>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
impl StudyPlanRecord {
    fn to_domain(self) -> StudyPlan {
        StudyPlan {
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            description: self.description,
            start_date: self.start_date,
            end_date: self.end_date,
            schedule: self.schedule.0,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(FromRow)]
struct DocumentRecord {
    id: Uuid,
    user_id: Uuid,
    title: String,
    summary: String,
    key_points: Vec<String>,
    mcqs: Json<Vec<QuestionItem>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
impl DocumentRecord {
    fn to_domain(self) -> Document {
        Document {
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            summary: self.summary,
            key_points: self.key_points,
            mcqs: self.mcqs.0,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

const PLAN_COLUMNS: &str =
    "id, user_id, title, description, start_date, end_date, schedule, created_at, updated_at";
const DOCUMENT_COLUMNS: &str =
    "id, user_id, title, summary, key_points, mcqs, created_at, updated_at";

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (user_id, email, hashed_password) VALUES ($1, $2, $3) \
             RETURNING user_id, email, hashed_password",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(hashed_password)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                PortError::Conflict(format!("Email {} is already registered", email))
            }
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT user_id, email, hashed_password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found_or_unexpected(format!("User {} not found", email)))?;
        Ok(record.to_credentials())
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(session_id)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        let user_id = sqlx::query_scalar::<_, Uuid>(
            "SELECT user_id FROM auth_sessions WHERE id = $1 AND expires_at > NOW()",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        if user_id.is_none() {
            sqlx::query("DELETE FROM auth_sessions WHERE id = $1 AND expires_at <= NOW()")
                .bind(session_id)
                .execute(&self.pool)
                .await
                .map_err(unexpected)?;
        }
        user_id.ok_or(PortError::Unauthorized)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn insert_study_plan(
        &self,
        user_id: Uuid,
        plan: &NewStudyPlan,
    ) -> PortResult<StudyPlan> {
        let query = format!(
            "INSERT INTO study_plans (id, user_id, title, description, start_date, end_date, schedule) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
            PLAN_COLUMNS
        );
        let record = sqlx::query_as::<_, StudyPlanRecord>(&query)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(&plan.title)
            .bind(&plan.description)
            .bind(plan.start_date)
            .bind(plan.end_date)
            .bind(Json(&plan.schedule))
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn list_study_plans(&self, user_id: Uuid) -> PortResult<Vec<StudyPlan>> {
        let query = format!(
            "SELECT {} FROM study_plans WHERE user_id = $1 ORDER BY created_at DESC",
            PLAN_COLUMNS
        );
        let records = sqlx::query_as::<_, StudyPlanRecord>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;

        let plans = records.into_iter().map(|r| r.to_domain()).collect();
        Ok(plans)
    }

    async fn get_study_plan(&self, user_id: Uuid, plan_id: Uuid) -> PortResult<StudyPlan> {
        let query = format!(
            "SELECT {} FROM study_plans WHERE id = $1 AND user_id = $2",
            PLAN_COLUMNS
        );
        let record = sqlx::query_as::<_, StudyPlanRecord>(&query)
            .bind(plan_id)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(not_found_or_unexpected(format!(
                "Study plan {} not found",
                plan_id
            )))?;
        Ok(record.to_domain())
    }

    async fn delete_study_plan(&self, user_id: Uuid, plan_id: Uuid) -> PortResult<()> {
        sqlx::query("DELETE FROM study_plans WHERE id = $1 AND user_id = $2")
            .bind(plan_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn insert_document(
        &self,
        user_id: Uuid,
        title: &str,
        analysis: &DocumentAnalysis,
    ) -> PortResult<Document> {
        let query = format!(
            "INSERT INTO documents (id, user_id, title, summary, key_points, mcqs) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            DOCUMENT_COLUMNS
        );
        let record = sqlx::query_as::<_, DocumentRecord>(&query)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(title)
            .bind(&analysis.summary)
            .bind(&analysis.key_points)
            .bind(Json(&analysis.mcqs))
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn list_documents(&self, user_id: Uuid) -> PortResult<Vec<Document>> {
        let query = format!(
            "SELECT {} FROM documents WHERE user_id = $1 ORDER BY created_at DESC",
            DOCUMENT_COLUMNS
        );
        let records = sqlx::query_as::<_, DocumentRecord>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;

        let documents = records.into_iter().map(|r| r.to_domain()).collect();
        Ok(documents)
    }

    async fn get_document(&self, user_id: Uuid, document_id: Uuid) -> PortResult<Document> {
        let query = format!(
            "SELECT {} FROM documents WHERE id = $1 AND user_id = $2",
            DOCUMENT_COLUMNS
        );
        let record = sqlx::query_as::<_, DocumentRecord>(&query)
            .bind(document_id)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(not_found_or_unexpected(format!(
                "Document {} not found",
                document_id
            )))?;
        Ok(record.to_domain())
    }
}
