use std::sync::Arc;

use crate::analysis::pipeline::ResumeAnalyzer;
use crate::store::ResumeStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ResumeStore>,
    pub analyzer: ResumeAnalyzer,
    /// Upper bound on the multipart request body.
    pub max_upload_bytes: usize,
}
