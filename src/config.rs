use std::collections::HashMap;
use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Secrets that must be present before anything else is constructed
pub const REQUIRED_SECRETS: [&str; 3] = ["OPENAI_API_KEY", "OPENAI_API_BASE", "OPENAI_MODEL"];

/// Which recommendation strategy the server runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Model-built metadata filter plus embedding similarity
    SelfQuery,
    /// Model picks titles from the serialized catalog
    Prompt,
}

impl Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::SelfQuery => write!(f, "self_query"),
            BackendKind::Prompt => write!(f, "prompt"),
        }
    }
}

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Bearer token for the model API
    pub openai_api_key: String,

    /// Base URL of an OpenAI-compatible API, e.g. `https://api.openai.com/v1`
    pub openai_api_base: String,

    /// Chat model used for query translation and title selection
    pub openai_model: String,

    /// Embedding model used by the self-query backend
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    #[serde(default = "default_backend")]
    pub backend: BackendKind,

    /// Movies retrieved by the self-query backend when the model sets no limit
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_backend() -> BackendKind {
    BackendKind::SelfQuery
}

fn default_top_k() -> usize {
    4
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present)
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Load configuration from an explicit set of key/value pairs
    ///
    /// Every required secret is checked up front so a single error names all
    /// of the missing ones.
    pub fn from_vars<I>(vars: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.to_uppercase(), v))
            .collect();

        let missing = missing_secrets(&vars);
        if !missing.is_empty() {
            return Err(AppError::Config(format!(
                "Missing required secrets: {}",
                missing.join(", ")
            )));
        }

        envy::from_iter::<_, Config>(vars)
            .map_err(|e| AppError::Config(format!("Failed to load config: {}", e)))
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Names of required secrets absent from `vars`, in declaration order
pub fn missing_secrets(vars: &HashMap<String, String>) -> Vec<&'static str> {
    REQUIRED_SECRETS
        .iter()
        .copied()
        .filter(|name| !vars.contains_key(*name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn complete() -> Vec<(String, String)> {
        vars(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_API_BASE", "https://api.example.com/v1"),
            ("OPENAI_MODEL", "gpt-4o-mini"),
        ])
    }

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_vars(complete()).unwrap();
        assert_eq!(config.openai_model, "gpt-4o-mini");
        assert_eq!(config.embedding_model, "text-embedding-3-small");
        assert_eq!(config.backend, BackendKind::SelfQuery);
        assert_eq!(config.top_k, 4);
        assert_eq!(config.bind_addr(), "127.0.0.1:3000");
    }

    #[test]
    fn test_optional_overrides() {
        let mut pairs = complete();
        pairs.extend(vars(&[("BACKEND", "prompt"), ("TOP_K", "6"), ("PORT", "8080")]));

        let config = Config::from_vars(pairs).unwrap();
        assert_eq!(config.backend, BackendKind::Prompt);
        assert_eq!(config.top_k, 6);
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_missing_secret_halts() {
        let pairs = vars(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_API_BASE", "https://api.example.com/v1"),
        ]);

        let err = Config::from_vars(pairs).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert_eq!(
            err.to_string(),
            "Configuration error: Missing required secrets: OPENAI_MODEL"
        );
    }

    #[test]
    fn test_all_missing_secrets_reported() {
        let err = Config::from_vars(Vec::new()).unwrap_err();
        let message = err.to_string();
        for name in REQUIRED_SECRETS {
            assert!(message.contains(name), "{} not reported", name);
        }
    }

    #[test]
    fn test_invalid_backend_rejected() {
        let mut pairs = complete();
        pairs.push(("BACKEND".to_string(), "telepathy".to_string()));

        assert!(matches!(
            Config::from_vars(pairs),
            Err(AppError::Config(_))
        ));
    }
}
