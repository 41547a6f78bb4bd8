//! Server-rendered search page
//!
//! One text input, a configuration aside, and a `<details>` panel per
//! recommended movie.

use std::fmt::Write;

use crate::{error::RETRY_HINT, models::Movie};

use super::state::ConfigSummary;

pub const NO_MATCH_MESSAGE: &str =
    "No movies found matching your criteria. Try adjusting your search!";

/// What happened to the submitted query, if there was one
#[derive(Debug)]
pub enum SearchOutcome {
    Results(Vec<Movie>),
    NoMatch,
    Failed(String),
}

impl SearchOutcome {
    pub fn from_movies(movies: Vec<Movie>) -> Self {
        if movies.is_empty() {
            SearchOutcome::NoMatch
        } else {
            SearchOutcome::Results(movies)
        }
    }
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn render_panel(out: &mut String, movie: &Movie) {
    let _ = write!(
        out,
        r#"<details class="movie">
  <summary>📽️ {title} ({director} - {year})</summary>
  <p><strong>Plot</strong>: {plot}</p>
  <p><strong>Genre</strong>: {genre}<br><strong>Rating</strong>: ⭐ {rating}/10</p>
</details>
"#,
        title = escape_html(movie.title),
        director = escape_html(movie.director),
        year = movie.year,
        plot = escape_html(movie.plot),
        genre = escape_html(movie.genre),
        rating = movie.rating,
    );
}

fn render_outcome(out: &mut String, outcome: &SearchOutcome) {
    match outcome {
        SearchOutcome::Results(movies) => {
            out.push_str("<h2>Here are your movie recommendations:</h2>\n");
            for movie in movies {
                render_panel(out, movie);
            }
        }
        SearchOutcome::NoMatch => {
            let _ = writeln!(out, r#"<p class="warning">{}</p>"#, NO_MATCH_MESSAGE);
        }
        SearchOutcome::Failed(message) => {
            let _ = writeln!(
                out,
                r#"<p class="error">An error occurred during search: {}</p>
<p class="info">{}</p>"#,
                escape_html(message),
                RETRY_HINT
            );
        }
    }
}

/// Full page; `query` pre-fills the input box
pub fn render_page(
    summary: &ConfigSummary,
    query: Option<&str>,
    outcome: Option<&SearchOutcome>,
) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Movie Recommendation System</title>
<style>
body {{ font-family: sans-serif; max-width: 60rem; margin: 2rem auto; }}
aside {{ float: right; width: 16rem; padding: 0.5rem; background: #f4f4f4; }}
details.movie {{ border: 1px solid #ddd; margin: 0.5rem 0; padding: 0.5rem; }}
.warning {{ color: #8a6d00; }}
.error {{ color: #b00020; }}
</style>
</head>
<body>
<aside>
<p>Configuration:</p>
<p>API Base: {api_base}</p>
<p>Model: {model}</p>
<p>Backend: {backend}</p>
</aside>
<h1>🎬 Movie Recommendation System</h1>
<p>This app helps you find movies based on your preferences. You can:</p>
<ul>
<li>Search by rating (e.g., "movies rated above 8")</li>
<li>Search by genre (e.g., "drama movies")</li>
<li>Search by director (e.g., "movies by Rajkumar Hirani")</li>
<li>Search by plot elements (e.g., "movies about college life")</li>
<li>Combine multiple criteria!</li>
</ul>
<form method="get" action="/">
<label for="q">What kind of movie are you looking for?</label>
<input id="q" name="q" type="text" value="{query}" placeholder="E.g., 'I want to watch a drama movie rated above 8'">
<button type="submit">Search</button>
</form>
"#,
        api_base = escape_html(&summary.api_base),
        model = escape_html(&summary.model),
        backend = summary.backend,
        query = escape_html(query.unwrap_or_default()),
    );

    if let Some(outcome) = outcome {
        render_outcome(&mut out, outcome);
    }

    out.push_str("<hr>\n<p>Made with ❤️ using Rust and a hosted language model</p>\n</body>\n</html>\n");
    out
}
