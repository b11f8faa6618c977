// src/api/state.rs
use crate::config::RunnerConfig;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RunnerConfig>,
}

impl AppState {
    pub fn new(config: RunnerConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}
