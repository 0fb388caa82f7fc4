//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use std::sync::Arc;
use study_assistant_core::ports::{DatabaseService, DocumentAnalyzer};
use study_assistant_core::{DocumentLibrary, StudyPlanner};

//=========================================================================================
// AppState (Shared Across All Requests and Connections)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
///
/// Quiz progress is deliberately absent: each quiz lives inside the WebSocket
/// task that drives it.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub config: Arc<Config>,
    pub planner: StudyPlanner,
    pub library: DocumentLibrary,
}

impl AppState {
    /// Wires the core services to the given adapters.
    pub fn new(
        db: Arc<dyn DatabaseService>,
        analyzer: Arc<dyn DocumentAnalyzer>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            planner: StudyPlanner::new(db.clone()),
            library: DocumentLibrary::new(db.clone(), analyzer),
            db,
            config,
        }
    }
}
