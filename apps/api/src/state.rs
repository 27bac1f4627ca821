use std::sync::Arc;

use crate::config::Config;
use crate::extraction::ResumeExtractor;
use crate::jobs::registry::JobRegistry;
use crate::shortlisting::phase2::Phase2Reviewer;

/// Shared application state injected into all route handlers via Axum extractors.
/// Created once at startup; the registry lives for the whole process.
#[derive(Clone)]
pub struct AppState {
    pub jobs: JobRegistry,
    pub extractor: ResumeExtractor,
    /// Phase 2 reviewer, backed by the configured completion client.
    pub reviewer: Arc<Phase2Reviewer>,
    pub config: Config,
}
