//! services/api/src/adapters/memory.rs
//!
//! An in-memory implementation of the `DatabaseService` port. Used when no
//! `DATABASE_URL` is configured and by the integration tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use study_assistant_core::domain::{
    AuthSession, Document, DocumentAnalysis, NewStudyPlan, StudyPlan, User, UserCredentials,
};
use study_assistant_core::ports::{DatabaseService, PortError, PortResult};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    users: HashMap<String, UserCredentials>,
    auth_sessions: HashMap<String, AuthSession>,
    // Insertion order is kept; listings walk these backwards.
    study_plans: Vec<StudyPlan>,
    documents: Vec<Document>,
}

#[derive(Default)]
pub struct InMemoryDb {
    tables: RwLock<Tables>,
}

impl InMemoryDb {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Newest first; rows created within the same instant keep reverse insertion order.
fn newest_first<T: Clone>(
    rows: &[T],
    keep: impl Fn(&T) -> bool,
    created: impl Fn(&T) -> DateTime<Utc>,
) -> Vec<T> {
    let mut out: Vec<T> = rows.iter().rev().filter(|r| keep(r)).cloned().collect();
    out.sort_by(|a, b| created(b).cmp(&created(a)));
    out
}

#[async_trait]
impl DatabaseService for InMemoryDb {
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.contains_key(email) {
            return Err(PortError::Conflict(format!(
                "Email {} is already registered",
                email
            )));
        }
        let credentials = UserCredentials {
            user_id: Uuid::new_v4(),
            email: email.to_string(),
            hashed_password: hashed_password.to_string(),
        };
        let user = User {
            user_id: credentials.user_id,
            email: credentials.email.clone(),
        };
        tables.users.insert(email.to_string(), credentials);
        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        self.tables
            .read()
            .await
            .users
            .get(email)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", email)))
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        let session = AuthSession {
            id: session_id.to_string(),
            user_id,
            expires_at,
        };
        self.tables
            .write()
            .await
            .auth_sessions
            .insert(session_id.to_string(), session);
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        let mut tables = self.tables.write().await;
        match tables.auth_sessions.get(session_id) {
            Some(session) if session.expires_at > Utc::now() => Ok(session.user_id),
            Some(_) => {
                tables.auth_sessions.remove(session_id);
                Err(PortError::Unauthorized)
            }
            None => Err(PortError::Unauthorized),
        }
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        self.tables.write().await.auth_sessions.remove(session_id);
        Ok(())
    }

    async fn insert_study_plan(
        &self,
        user_id: Uuid,
        plan: &NewStudyPlan,
    ) -> PortResult<StudyPlan> {
        let now = Utc::now();
        let stored = StudyPlan {
            id: Uuid::new_v4(),
            user_id,
            title: plan.title.clone(),
            description: plan.description.clone(),
            start_date: plan.start_date,
            end_date: plan.end_date,
            schedule: plan.schedule.clone(),
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.study_plans.push(stored.clone());
        Ok(stored)
    }

    async fn list_study_plans(&self, user_id: Uuid) -> PortResult<Vec<StudyPlan>> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            &tables.study_plans,
            |p| p.user_id == user_id,
            |p| p.created_at,
        ))
    }

    async fn get_study_plan(&self, user_id: Uuid, plan_id: Uuid) -> PortResult<StudyPlan> {
        self.tables
            .read()
            .await
            .study_plans
            .iter()
            .find(|p| p.id == plan_id && p.user_id == user_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Study plan {} not found", plan_id)))
    }

    async fn delete_study_plan(&self, user_id: Uuid, plan_id: Uuid) -> PortResult<()> {
        self.tables
            .write()
            .await
            .study_plans
            .retain(|p| !(p.id == plan_id && p.user_id == user_id));
        Ok(())
    }

    async fn insert_document(
        &self,
        user_id: Uuid,
        title: &str,
        analysis: &DocumentAnalysis,
    ) -> PortResult<Document> {
        let now = Utc::now();
        let document = Document {
            id: Uuid::new_v4(),
            user_id,
            title: title.to_string(),
            summary: analysis.summary.clone(),
            key_points: analysis.key_points.clone(),
            mcqs: analysis.mcqs.clone(),
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.documents.push(document.clone());
        Ok(document)
    }

    async fn list_documents(&self, user_id: Uuid) -> PortResult<Vec<Document>> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            &tables.documents,
            |d| d.user_id == user_id,
            |d| d.created_at,
        ))
    }

    async fn get_document(&self, user_id: Uuid, document_id: Uuid) -> PortResult<Document> {
        self.tables
            .read()
            .await
            .documents
            .iter()
            .find(|d| d.id == document_id && d.user_id == user_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Document {} not found", document_id)))
    }
}
