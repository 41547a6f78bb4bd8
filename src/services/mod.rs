//! Recommendation backends
//!
//! Two interchangeable strategies sit behind the `Recommender` trait. The
//! server builds exactly one of them at startup and shares it for the life of
//! the process; every query is a fresh invocation.

use std::sync::Arc;

use crate::{
    config::{BackendKind, Config},
    error::AppResult,
    models::Movie,
};

pub mod llm;
pub mod prompt_selection;
pub mod query_constructor;
pub mod self_query;
pub mod vector_store;

pub use llm::{ChatModel, Embedder, OpenAiClient};
pub use prompt_selection::PromptRecommender;
pub use self_query::SelfQueryRecommender;

/// Trait for recommendation backends
#[async_trait::async_trait]
pub trait Recommender: Send + Sync {
    /// Returns the catalog movies matching a free-text request, best first
    ///
    /// An empty vector means nothing matched; errors are per-query and the
    /// caller may simply resubmit.
    async fn recommend(&self, query: &str) -> AppResult<Vec<Movie>>;

    /// Backend name for logging and display
    fn name(&self) -> &'static str;
}

/// Constructs the configured backend once
pub async fn build_recommender(config: &Config) -> AppResult<Arc<dyn Recommender>> {
    let client = Arc::new(OpenAiClient::new(config));
    tracing::info!(model = %config.openai_model, "LLM initialized");

    let recommender: Arc<dyn Recommender> = match config.backend {
        BackendKind::SelfQuery => {
            tracing::info!(model = %config.embedding_model, "Embeddings initialized");
            Arc::new(SelfQueryRecommender::build(client.clone(), client, config.top_k).await?)
        }
        BackendKind::Prompt => Arc::new(PromptRecommender::new(client)),
    };

    Ok(recommender)
}
