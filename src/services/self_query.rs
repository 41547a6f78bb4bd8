use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{Movie, CATALOG},
    services::{
        llm::{ChatModel, Embedder},
        query_constructor::QueryConstructor,
        vector_store::VectorStore,
        Recommender,
    },
};

/// Self-querying retrieval: the model writes the metadata filter, embeddings
/// rank whatever passes it
pub struct SelfQueryRecommender {
    constructor: QueryConstructor,
    embedder: Arc<dyn Embedder>,
    store: VectorStore,
    top_k: usize,
}

impl SelfQueryRecommender {
    /// Embeds the catalog and wires up the query constructor
    ///
    /// Any failure here is fatal for the process; there is no retry.
    pub async fn build(
        llm: Arc<dyn ChatModel>,
        embedder: Arc<dyn Embedder>,
        top_k: usize,
    ) -> AppResult<Self> {
        let store = VectorStore::from_movies(&CATALOG, embedder.as_ref()).await?;
        let constructor = QueryConstructor::new(llm);
        tracing::info!(documents = store.len(), top_k, "Retriever initialized");

        Ok(Self {
            constructor,
            embedder,
            store,
            top_k,
        })
    }

    async fn embed_query(&self, text: &str) -> AppResult<Vec<f32>> {
        self.embedder
            .embed(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::ExternalApi("No embedding returned for query".to_string()))
    }
}

#[async_trait::async_trait]
impl Recommender for SelfQueryRecommender {
    async fn recommend(&self, query: &str) -> AppResult<Vec<Movie>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::InvalidInput("Query cannot be empty".to_string()));
        }

        let structured = self.constructor.construct(query).await?;

        let query_vector = if structured.query.is_empty() {
            None
        } else {
            Some(self.embed_query(&structured.query).await?)
        };

        let k = structured.limit.unwrap_or(self.top_k);
        let results = self.store.similarity_search(
            query_vector.as_deref(),
            structured.filter.as_ref(),
            k,
        );

        tracing::info!(
            results = results.len(),
            backend = self.name(),
            "Retrieval completed"
        );

        Ok(results.into_iter().map(|scored| *scored.movie).collect())
    }

    fn name(&self) -> &'static str {
        "self_query"
    }
}
