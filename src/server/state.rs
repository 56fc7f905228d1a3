use crate::config::AppConfig;
use crate::logging::LogBuffer;
use crate::providers::ProviderRegistry;
use std::sync::Arc;

/// State for logging, including the in-memory buffer.
#[derive(Clone)]
pub struct LogState {
    pub log_buffer: LogBuffer,
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ProviderRegistry>,
    pub log_state: LogState,
}

impl AppState {
    pub fn new(config: &AppConfig, log_state: LogState) -> Self {
        Self {
            registry: Arc::new(config.registry()),
            log_state,
        }
    }
}
