//! services/api/src/adapters/analyzer.rs
//!
//! The document analysis adapter. There is no real analysis backend: the stub
//! waits a fixed delay and answers with the same canned analysis for every file.

use async_trait::async_trait;
use std::time::Duration;
use study_assistant_core::domain::{DocumentAnalysis, QuestionItem, QuestionKind, UploadedFile};
use study_assistant_core::ports::{DocumentAnalyzer, PortResult};
use tracing::debug;

/// An adapter that implements `DocumentAnalyzer` with a deterministic payload.
#[derive(Clone, Debug)]
pub struct StubDocumentAnalyzer {
    delay: Duration,
}

impl StubDocumentAnalyzer {
    /// Creates a new `StubDocumentAnalyzer` that answers after `delay`.
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl DocumentAnalyzer for StubDocumentAnalyzer {
    async fn analyze(&self, file: &UploadedFile) -> PortResult<DocumentAnalysis> {
        debug!(
            "Simulating analysis of '{}' for {:?}",
            file.file_name, self.delay
        );
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(canned_analysis())
    }
}

fn canned_analysis() -> DocumentAnalysis {
    DocumentAnalysis {
        summary: "This is a sample summary of the uploaded document...".to_string(),
        key_points: vec![
            "Key point 1 about the document".to_string(),
            "Key point 2 about important concepts".to_string(),
            "Key point 3 highlighting main ideas".to_string(),
        ],
        mcqs: vec![
            QuestionItem {
                question: "What is the main topic discussed in the document?".to_string(),
                options: ["Option A", "Option B", "Option C", "Option D"]
                    .map(String::from)
                    .to_vec(),
                correct_answer: "Option A".to_string(),
                kind: QuestionKind::MultipleChoice,
            },
            QuestionItem {
                question: "Fill in the blank: The document discusses _____ in detail."
                    .to_string(),
                options: ["concept", "theory", "practice", "methodology"]
                    .map(String::from)
                    .to_vec(),
                correct_answer: "theory".to_string(),
                kind: QuestionKind::FillInBlank,
            },
        ],
    }
}
