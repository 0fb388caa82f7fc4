pub mod domain;
pub mod error;
pub mod library;
pub mod planner;
pub mod ports;
pub mod quiz;

pub use domain::{
    AuthSession, Document, DocumentAnalysis, NewStudyPlan, QuestionItem, QuestionKind, Schedule,
    StudyPlan, StudySession, UploadedFile, User, UserCredentials,
};
pub use error::{CoreError, CoreResult, StateError, ValidationError};
pub use library::DocumentLibrary;
pub use planner::StudyPlanner;
pub use ports::{DatabaseService, DocumentAnalyzer, PortError, PortResult};
pub use quiz::{QuizProgress, QuizSession, ReviewEntry};
