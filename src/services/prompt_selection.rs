use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{find_by_title, Movie, CATALOG},
    services::{llm::ChatModel, Recommender},
};

/// Exact reply the model is told to give when nothing matches
pub const NO_MATCHES: &str = "No matches found.";

const SYSTEM_PROMPT: &str = "You are a movie recommendation assistant. \
You will be given a catalog of movies and a viewer's request. \
Pick every movie from the catalog that fits the request, judging by its year, director, genre, rating and plot. \
Reply with the exact titles of the chosen movies separated by commas and nothing else. \
If no movie fits, reply exactly: No matches found.";

/// Asks the model to choose titles straight from the serialized catalog
pub struct PromptRecommender {
    llm: Arc<dyn ChatModel>,
    catalog_listing: String,
}

impl PromptRecommender {
    pub fn new(llm: Arc<dyn ChatModel>) -> Self {
        tracing::info!(movies = CATALOG.len(), "Prompt selector initialized");
        Self {
            llm,
            catalog_listing: serialize_catalog(&CATALOG),
        }
    }
}

#[async_trait::async_trait]
impl Recommender for PromptRecommender {
    async fn recommend(&self, query: &str) -> AppResult<Vec<Movie>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::InvalidInput("Query cannot be empty".to_string()));
        }

        let prompt = format!(
            "Catalog:\n{}\nRequest: {}\n\nTitles:",
            self.catalog_listing, query
        );
        let reply = self.llm.complete(SYSTEM_PROMPT, &prompt).await?;
        let movies = parse_selection(&reply);

        tracing::info!(
            results = movies.len(),
            backend = self.name(),
            "Selection completed"
        );

        Ok(movies)
    }

    fn name(&self) -> &'static str {
        "prompt"
    }
}

/// One line per movie, every field labelled
pub fn serialize_catalog(movies: &[Movie]) -> String {
    movies
        .iter()
        .map(|m| {
            format!(
                "- Title: {} | Year: {} | Director: {} | Genre: {} | Rating: {}/10 | Plot: {}\n",
                m.title, m.year, m.director, m.genre, m.rating, m.plot
            )
        })
        .collect()
}

/// Maps a comma-separated model reply back onto catalog entries
///
/// Unknown titles are dropped, duplicates collapse, reply order is kept.
pub fn parse_selection(reply: &str) -> Vec<Movie> {
    let reply = reply.trim();
    if is_no_match(reply) {
        return Vec::new();
    }

    let mut selected: Vec<Movie> = Vec::new();
    for candidate in reply.split([',', '\n']) {
        let candidate = candidate.trim_matches(|c: char| {
            c.is_whitespace() || matches!(c, '"' | '\'' | '`' | '*' | '.')
        });
        if candidate.is_empty() {
            continue;
        }

        match find_by_title(candidate) {
            Some(movie) if !selected.iter().any(|m| m.title == movie.title) => {
                selected.push(*movie)
            }
            Some(_) => {}
            None => tracing::debug!(title = %candidate, "Dropping title not in catalog"),
        }
    }
    selected
}

fn is_no_match(reply: &str) -> bool {
    let sentinel = NO_MATCHES.trim_end_matches('.');
    reply.trim_end_matches('.').eq_ignore_ascii_case(sentinel)
}
