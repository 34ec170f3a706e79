use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::ModelProvider;
use crate::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable provider. Default: `GeminiClient`; tests swap in a fake.
    pub provider: Arc<dyn ModelProvider>,
    pub sessions: SessionStore,
    pub config: Config,
}
