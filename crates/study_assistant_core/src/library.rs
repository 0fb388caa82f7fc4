//! crates/study_assistant_core/src/library.rs
//!
//! Document use cases: upload + analysis, and read access for the quiz.

use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{Document, UploadedFile};
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::ports::{DatabaseService, DocumentAnalyzer};

#[derive(Clone)]
pub struct DocumentLibrary {
    db: Arc<dyn DatabaseService>,
    analyzer: Arc<dyn DocumentAnalyzer>,
}

impl DocumentLibrary {
    pub fn new(db: Arc<dyn DatabaseService>, analyzer: Arc<dyn DocumentAnalyzer>) -> Self {
        Self { db, analyzer }
    }

    /// Analyzes a PDF and stores the result under the file's name.
    ///
    /// The analysis is checked before anything is written: every question's
    /// correct answer has to be one of its options.
    pub async fn upload(&self, user_id: Uuid, file: UploadedFile) -> CoreResult<Document> {
        if !file.is_pdf() {
            return Err(ValidationError::UnsupportedFileType(file.file_name).into());
        }

        info!("Analyzing '{}' ({} bytes)", file.file_name, file.data.len());
        let analysis = self
            .analyzer
            .analyze(&file)
            .await
            .map_err(CoreError::collaborator("analyze"))?;

        if let Err(e) = analysis.validate() {
            warn!("Rejected analysis of '{}': {}", file.file_name, e);
            return Err(e.into());
        }

        let document = self
            .db
            .insert_document(user_id, &file.file_name, &analysis)
            .await
            .map_err(CoreError::collaborator("insert_document"))?;
        info!(
            "Stored document {} with {} question(s)",
            document.id,
            document.mcqs.len()
        );
        Ok(document)
    }

    /// Newest first.
    pub async fn list_documents(&self, user_id: Uuid) -> CoreResult<Vec<Document>> {
        self.db
            .list_documents(user_id)
            .await
            .map_err(CoreError::collaborator("list_documents"))
    }

    pub async fn get_document(&self, user_id: Uuid, document_id: Uuid) -> CoreResult<Document> {
        self.db
            .get_document(user_id, document_id)
            .await
            .map_err(CoreError::collaborator("get_document"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DocumentAnalysis, QuestionItem, QuestionKind};
    use crate::ports::{MockDatabaseService, MockDocumentAnalyzer, PortError};
    use bytes::Bytes;
    use chrono::Utc;

    fn pdf(name: &str) -> UploadedFile {
        UploadedFile {
            file_name: name.to_string(),
            content_type: Some("application/pdf".to_string()),
            data: Bytes::from_static(b"%PDF-1.4"),
        }
    }

    fn analysis(correct: &str) -> DocumentAnalysis {
        DocumentAnalysis {
            summary: "About arithmetic".to_string(),
            key_points: vec!["Addition".to_string()],
            mcqs: vec![QuestionItem {
                question: "2+2?".to_string(),
                options: vec!["3".to_string(), "4".to_string()],
                correct_answer: correct.to_string(),
                kind: QuestionKind::MultipleChoice,
            }],
        }
    }

    #[tokio::test]
    async fn upload_stores_analysis_under_file_name() {
        let user_id = Uuid::new_v4();
        let mut analyzer = MockDocumentAnalyzer::new();
        analyzer
            .expect_analyze()
            .times(1)
            .returning(|_| Ok(analysis("4")));

        let mut db = MockDatabaseService::new();
        db.expect_insert_document()
            .withf(|_, title, _| title.to_string() == "maths.pdf")
            .times(1)
            .returning(|user_id, title, analysis| {
                let now = Utc::now();
                Ok(Document {
                    id: Uuid::new_v4(),
                    user_id,
                    title: title.to_string(),
                    summary: analysis.summary.clone(),
                    key_points: analysis.key_points.clone(),
                    mcqs: analysis.mcqs.clone(),
                    created_at: now,
                    updated_at: now,
                })
            });

        let library = DocumentLibrary::new(Arc::new(db), Arc::new(analyzer));
        let document = library.upload(user_id, pdf("maths.pdf")).await.unwrap();
        assert_eq!(document.title, "maths.pdf");
        assert_eq!(document.user_id, user_id);
        assert_eq!(document.mcqs.len(), 1);
    }

    #[tokio::test]
    async fn non_pdf_uploads_are_rejected_before_analysis() {
        let mut analyzer = MockDocumentAnalyzer::new();
        analyzer.expect_analyze().never();
        let mut db = MockDatabaseService::new();
        db.expect_insert_document().never();

        let library = DocumentLibrary::new(Arc::new(db), Arc::new(analyzer));
        let file = UploadedFile {
            file_name: "notes.txt".to_string(),
            content_type: Some("text/plain".to_string()),
            data: Bytes::from_static(b"hello"),
        };
        let result = library.upload(Uuid::new_v4(), file).await;
        assert!(matches!(
            result,
            Err(CoreError::Validation(ValidationError::UnsupportedFileType(_)))
        ));
    }

    #[tokio::test]
    async fn inconsistent_analysis_is_not_stored() {
        let mut analyzer = MockDocumentAnalyzer::new();
        analyzer.expect_analyze().returning(|_| Ok(analysis("5")));
        let mut db = MockDatabaseService::new();
        db.expect_insert_document().never();

        let library = DocumentLibrary::new(Arc::new(db), Arc::new(analyzer));
        let result = library.upload(Uuid::new_v4(), pdf("maths.pdf")).await;
        assert!(matches!(
            result,
            Err(CoreError::Validation(
                ValidationError::CorrectAnswerNotInOptions { index: 0 }
            ))
        ));
    }

    #[tokio::test]
    async fn analyzer_failures_surface_as_collaborator_errors() {
        let mut analyzer = MockDocumentAnalyzer::new();
        analyzer
            .expect_analyze()
            .returning(|_| Err(PortError::Unexpected("timeout".to_string())));
        let db = MockDatabaseService::new();

        let library = DocumentLibrary::new(Arc::new(db), Arc::new(analyzer));
        let result = library.upload(Uuid::new_v4(), pdf("maths.pdf")).await;
        assert!(matches!(
            result,
            Err(CoreError::Collaborator { operation: "analyze", .. })
        ));
    }
}
