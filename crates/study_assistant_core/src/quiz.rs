//! crates/study_assistant_core/src/quiz.rs
//!
//! The quiz engine: a forward-only walk over a document's questions that
//! collects one answer per question and ends in a scored review.
//!
//! States are `index 0 .. index N-1` followed by `completed`. The only
//! transition is `submit_answer`; there is no way back to an earlier question.

use serde::Serialize;
use std::sync::Arc;

use crate::domain::{Document, QuestionItem};
use crate::error::{CoreResult, StateError, ValidationError};

/// What happened after an answer was accepted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QuizProgress {
    /// The quiz moved on to the question at `index`.
    Next { index: usize },
    /// That was the last question.
    Completed { score: f64 },
}

/// One line of the results view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewEntry<'a> {
    pub question: &'a QuestionItem,
    pub submitted_answer: &'a str,
    pub correct_answer: &'a str,
    pub is_correct: bool,
}

/// In-memory progress of a single quiz attempt. Never persisted.
#[derive(Debug, Clone)]
pub struct QuizSession {
    document: Arc<Document>,
    current_index: usize,
    answers: Vec<String>,
    score: Option<f64>,
}

impl QuizSession {
    /// Starts a quiz over `document`. Documents without questions are rejected.
    pub fn start(document: Arc<Document>) -> CoreResult<Self> {
        if document.mcqs.is_empty() {
            return Err(ValidationError::EmptyQuestionSet.into());
        }
        Ok(Self {
            document,
            current_index: 0,
            answers: Vec::new(),
            score: None,
        })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn total_questions(&self) -> usize {
        self.document.mcqs.len()
    }

    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    pub fn is_completed(&self) -> bool {
        self.score.is_some()
    }

    /// Percentage of correct answers; `None` until the quiz is complete.
    pub fn score(&self) -> Option<f64> {
        self.score
    }

    pub fn current_question(&self) -> CoreResult<&QuestionItem> {
        if self.is_completed() {
            return Err(StateError::SessionComplete.into());
        }
        Ok(&self.document.mcqs[self.current_index])
    }

    /// Records `answer` for the current question. The answer is stored as
    /// given; a string that is not among the options simply scores as wrong.
    pub fn submit_answer(&mut self, answer: impl Into<String>) -> CoreResult<QuizProgress> {
        if self.is_completed() {
            return Err(StateError::SessionComplete.into());
        }
        self.answers.push(answer.into());

        if self.current_index + 1 == self.total_questions() {
            self.current_index = self.total_questions();
            let score = score_answers(&self.document.mcqs, &self.answers);
            self.score = Some(score);
            Ok(QuizProgress::Completed { score })
        } else {
            self.current_index += 1;
            Ok(QuizProgress::Next {
                index: self.current_index,
            })
        }
    }

    /// Per-question comparison of submitted and correct answers.
    pub fn review(&self) -> CoreResult<Vec<ReviewEntry<'_>>> {
        if !self.is_completed() {
            return Err(StateError::SessionNotComplete.into());
        }
        Ok(self
            .document
            .mcqs
            .iter()
            .zip(&self.answers)
            .map(|(question, answer)| ReviewEntry {
                question,
                submitted_answer: answer,
                correct_answer: &question.correct_answer,
                is_correct: question.is_correct(answer),
            })
            .collect())
    }
}

/// `100 * correct / questions`, unrounded. Comparison is exact and case-sensitive.
pub fn score_answers(questions: &[QuestionItem], answers: &[String]) -> f64 {
    if questions.is_empty() {
        return 0.0;
    }
    let correct = questions
        .iter()
        .zip(answers)
        .filter(|(q, a)| q.is_correct(a))
        .count();
    100.0 * correct as f64 / questions.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::QuestionKind;
    use crate::error::CoreError;
    use chrono::Utc;
    use uuid::Uuid;

    fn item(question: &str, options: &[&str], correct: &str) -> QuestionItem {
        QuestionItem {
            question: question.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
            correct_answer: correct.to_string(),
            kind: QuestionKind::MultipleChoice,
        }
    }

    fn document(mcqs: Vec<QuestionItem>) -> Arc<Document> {
        let now = Utc::now();
        Arc::new(Document {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "notes.pdf".to_string(),
            summary: String::new(),
            key_points: vec![],
            mcqs,
            created_at: now,
            updated_at: now,
        })
    }

    fn four_questions() -> Arc<Document> {
        document(vec![
            item("a?", &["1", "2"], "1"),
            item("b?", &["1", "2"], "2"),
            item("c?", &["1", "2"], "1"),
            item("d?", &["1", "2"], "2"),
        ])
    }

    fn answer_all(doc: Arc<Document>, answers: &[&str]) -> QuizSession {
        let mut session = QuizSession::start(doc).unwrap();
        for a in answers {
            session.submit_answer(*a).unwrap();
        }
        session
    }

    #[test]
    fn index_advances_once_per_answer() {
        let doc = four_questions();
        let total = doc.mcqs.len();
        let mut session = QuizSession::start(doc).unwrap();
        assert_eq!(session.current_index(), 0);
        assert!(session.answers().is_empty());

        for i in 0..total {
            assert!(!session.is_completed());
            assert_eq!(session.answers().len(), session.current_index());
            session.submit_answer("1").unwrap();
            assert_eq!(session.current_index(), (i + 1).min(total));
        }
        assert!(session.is_completed());
        assert_eq!(session.answers().len(), total);
    }

    #[test]
    fn score_boundaries() {
        let all_right = answer_all(four_questions(), &["1", "2", "1", "2"]);
        assert_eq!(all_right.score(), Some(100.0));

        let all_wrong = answer_all(four_questions(), &["2", "1", "2", "1"]);
        assert_eq!(all_wrong.score(), Some(0.0));

        let three_of_four = answer_all(four_questions(), &["1", "2", "1", "1"]);
        assert_eq!(three_of_four.score(), Some(75.0));
    }

    #[test]
    fn score_is_not_rounded() {
        let doc = document(vec![
            item("a?", &["x"], "x"),
            item("b?", &["x"], "x"),
            item("c?", &["x"], "x"),
        ]);
        let session = answer_all(doc, &["x", "y", "y"]);
        assert_eq!(session.score(), Some(100.0 / 3.0));
    }

    #[test]
    fn answers_compare_case_sensitively() {
        let doc = document(vec![item("Capital?", &["Paris"], "Paris")]);
        let session = answer_all(doc, &["paris"]);
        assert_eq!(session.score(), Some(0.0));
    }

    #[test]
    fn empty_question_set_is_rejected() {
        let result = QuizSession::start(document(vec![]));
        assert!(matches!(
            result,
            Err(CoreError::Validation(ValidationError::EmptyQuestionSet))
        ));
    }

    #[test]
    fn submitting_after_completion_leaves_state_untouched() {
        let mut session = answer_all(four_questions(), &["1", "2", "1", "2"]);
        let result = session.submit_answer("1");
        assert!(matches!(
            result,
            Err(CoreError::State(StateError::SessionComplete))
        ));
        assert_eq!(session.answers().len(), 4);
        assert_eq!(session.current_index(), 4);
        assert_eq!(session.score(), Some(100.0));
    }

    #[test]
    fn no_current_question_after_completion() {
        let session = answer_all(four_questions(), &["1", "1", "1", "1"]);
        assert!(matches!(
            session.current_question(),
            Err(CoreError::State(StateError::SessionComplete))
        ));
    }

    #[test]
    fn review_requires_completion_and_is_repeatable() {
        let mut session = QuizSession::start(four_questions()).unwrap();
        assert!(matches!(
            session.review(),
            Err(CoreError::State(StateError::SessionNotComplete))
        ));
        for a in ["1", "1", "2", "2"] {
            session.submit_answer(a).unwrap();
        }
        let first = session.review().unwrap();
        let second = session.review().unwrap();
        assert_eq!(first, second);
        assert_eq!(
            first.iter().map(|e| e.is_correct).collect::<Vec<_>>(),
            vec![true, false, false, true]
        );
    }

    #[test]
    fn answers_outside_the_options_are_accepted() {
        let doc = document(vec![item("2+2?", &["3", "4"], "4")]);
        let mut session = QuizSession::start(doc).unwrap();
        let progress = session.submit_answer("five").unwrap();
        assert_eq!(progress, QuizProgress::Completed { score: 0.0 });
        assert_eq!(session.answers(), ["five".to_string()]);
    }

    #[test]
    fn two_question_walkthrough() {
        let doc = document(vec![
            item("2+2?", &["3", "4"], "4"),
            item("Capital of France?", &["Paris", "Lyon"], "Paris"),
        ]);
        let mut session = QuizSession::start(doc.clone()).unwrap();

        assert_eq!(session.current_question().unwrap(), &doc.mcqs[0]);
        assert_eq!(
            session.submit_answer("4").unwrap(),
            QuizProgress::Next { index: 1 }
        );
        assert_eq!(session.current_index(), 1);
        assert_eq!(session.current_question().unwrap(), &doc.mcqs[1]);

        assert_eq!(
            session.submit_answer("Lyon").unwrap(),
            QuizProgress::Completed { score: 50.0 }
        );
        assert!(session.is_completed());
        assert_eq!(session.score(), Some(50.0));

        let review = session.review().unwrap();
        assert_eq!(
            review,
            vec![
                ReviewEntry {
                    question: &doc.mcqs[0],
                    submitted_answer: "4",
                    correct_answer: "4",
                    is_correct: true,
                },
                ReviewEntry {
                    question: &doc.mcqs[1],
                    submitted_answer: "Lyon",
                    correct_answer: "Paris",
                    is_correct: false,
                },
            ]
        );
    }
}
