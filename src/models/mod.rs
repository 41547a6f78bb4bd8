use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod catalog;
pub mod movie;
pub mod query;

pub use catalog::{find_by_title, CATALOG};
pub use movie::{Attribute, AttributeType, MetadataValue, Movie};
pub use query::{Comparator, Filter, FilterValue, Operator, StructuredQuery};

use crate::config::BackendKind;

/// Body of `POST /api/v1/recommendations`
#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    pub query: String,
}

/// Result set for one query
#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub backend: BackendKind,
    pub movies: Vec<Movie>,
    pub generated_at: DateTime<Utc>,
}
