use crate::{
    error::{AppError, AppResult},
    models::{Filter, Movie},
    services::llm::Embedder,
};

/// A catalog movie with its similarity to the query
#[derive(Debug, Clone, Copy)]
pub struct ScoredMovie {
    pub movie: &'static Movie,
    pub score: f32,
}

/// In-memory similarity index over plot embeddings
///
/// Built once at startup; the catalog is small enough that a linear scan
/// beats any index structure.
pub struct VectorStore {
    movies: Vec<&'static Movie>,
    embeddings: Vec<Vec<f32>>,
}

impl VectorStore {
    /// Embeds every plot summary and builds the index
    pub async fn from_movies(
        movies: &'static [Movie],
        embedder: &dyn Embedder,
    ) -> AppResult<Self> {
        let plots: Vec<String> = movies.iter().map(|m| m.plot.to_string()).collect();
        let embeddings = embedder.embed(&plots).await?;

        if embeddings.len() != movies.len() {
            return Err(AppError::Internal(format!(
                "Embedded {} of {} plots",
                embeddings.len(),
                movies.len()
            )));
        }

        tracing::info!(documents = movies.len(), "Vector store initialized");

        Ok(Self {
            movies: movies.iter().collect(),
            embeddings,
        })
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    /// Top `k` movies passing `filter`, by descending cosine similarity
    ///
    /// Without a query vector the survivors keep catalog order.
    pub fn similarity_search(
        &self,
        query: Option<&[f32]>,
        filter: Option<&Filter>,
        k: usize,
    ) -> Vec<ScoredMovie> {
        let mut scored: Vec<ScoredMovie> = self
            .movies
            .iter()
            .zip(&self.embeddings)
            .filter(|(movie, _)| filter.map_or(true, |f| f.matches(movie)))
            .map(|(&movie, embedding)| ScoredMovie {
                movie,
                score: query.map_or(0.0, |q| cosine_similarity(q, embedding)),
            })
            .collect();

        if query.is_some() {
            scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        }
        scored.truncate(k);
        scored
    }
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
