use std::sync::Arc;

use crate::config::Config;
use crate::interview::capture::CaptureSettings;
use crate::interview::registry::CaptureRegistry;
use crate::llm_client::ChatBackend;
use crate::store::InterviewStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable persistence. Default: `PgStore`.
    pub store: Arc<dyn InterviewStore>,
    /// Source of completion sessions. Default: `LlmClient` (Gemini).
    pub llm: Arc<dyn ChatBackend>,
    pub config: Config,
    /// Live capture sessions, one per (interview, question).
    pub captures: CaptureRegistry,
}

impl AppState {
    pub fn capture_settings(&self) -> CaptureSettings {
        CaptureSettings {
            min_chars: self.config.capture_min_chars,
            stage_timeout: self.config.llm_timeout,
        }
    }
}
