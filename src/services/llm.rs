//! Clients for the hosted model API
//!
//! Both backends talk to the model through these two traits so tests can
//! swap in mocks. `OpenAiClient` implements them against any
//! OpenAI-compatible endpoint (`/chat/completions` and `/embeddings`).

use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};

use crate::{
    config::Config,
    error::{AppError, AppResult},
};

/// Chat completion at temperature 0
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ChatModel: Send + Sync {
    /// Sends a system and a user message, returns the assistant reply text
    async fn complete(&self, system: &str, user: &str) -> AppResult<String>;
}

/// Text embeddings, one vector per input in input order
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Clone)]
pub struct OpenAiClient {
    http_client: HttpClient,
    api_key: String,
    api_base: String,
    chat_model: String,
    embedding_model: String,
}

impl OpenAiClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key: config.openai_api_key.clone(),
            api_base: config.openai_api_base.trim_end_matches('/').to_string(),
            chat_model: config.openai_model.clone(),
            embedding_model: config.embedding_model.clone(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path)
    }

    async fn post<B: Serialize + ?Sized, R: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> AppResult<R> {
        let response = self
            .http_client
            .post(self.endpoint(path))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Model API returned status {}: {}",
                status, body
            )));
        }

        let response_text = response.text().await?;
        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(error = %e, endpoint = path, "Failed to deserialize model API response");
            AppError::ExternalApi(format!("Failed to parse model API response: {}", e))
        })
    }
}

#[async_trait::async_trait]
impl ChatModel for OpenAiClient {
    async fn complete(&self, system: &str, user: &str) -> AppResult<String> {
        let request = ChatRequest {
            model: &self.chat_model,
            temperature: 0.0,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        };

        let response: ChatResponse = self.post("chat/completions", &request).await?;
        let content = first_content(response)?;

        tracing::debug!(model = %self.chat_model, reply = %content, "Chat completion received");

        Ok(content)
    }
}

#[async_trait::async_trait]
impl Embedder for OpenAiClient {
    async fn embed(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        let request = EmbeddingRequest {
            model: &self.embedding_model,
            input: texts,
        };

        let response: EmbeddingResponse = self.post("embeddings", &request).await?;
        let vectors = ordered_embeddings(response, texts.len())?;

        tracing::debug!(
            model = %self.embedding_model,
            count = vectors.len(),
            "Embeddings received"
        );

        Ok(vectors)
    }
}

fn first_content(response: ChatResponse) -> AppResult<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| AppError::ExternalApi("Model returned no completion".to_string()))
}

/// Sorts embeddings by their `index` and checks one came back per input
fn ordered_embeddings(response: EmbeddingResponse, expected: usize) -> AppResult<Vec<Vec<f32>>> {
    let mut data = response.data;
    if data.len() != expected {
        return Err(AppError::ExternalApi(format!(
            "Expected {} embeddings, got {}",
            expected,
            data.len()
        )));
    }
    data.sort_by_key(|d| d.index);
    Ok(data.into_iter().map(|d| d.embedding).collect())
}
