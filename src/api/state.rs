use std::sync::Arc;

use crate::{
    config::{BackendKind, Config},
    services::Recommender,
};

/// What the page shows about the running configuration; never the API key
#[derive(Debug, Clone)]
pub struct ConfigSummary {
    pub api_base: String,
    pub model: String,
    pub backend: BackendKind,
}

impl From<&Config> for ConfigSummary {
    fn from(config: &Config) -> Self {
        Self {
            api_base: config.openai_api_base.clone(),
            model: config.openai_model.clone(),
            backend: config.backend,
        }
    }
}

/// Shared application state
///
/// The recommender is built once before the server starts and is read-only
/// afterwards, so no lock is needed.
#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<dyn Recommender>,
    pub summary: Arc<ConfigSummary>,
}

impl AppState {
    pub fn new(recommender: Arc<dyn Recommender>, summary: ConfigSummary) -> Self {
        Self {
            recommender,
            summary: Arc::new(summary),
        }
    }
}
