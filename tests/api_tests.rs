use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::json;

use movie_recs::{
    api::{create_router, AppState, ConfigSummary},
    config::BackendKind,
    error::{AppError, AppResult},
    models::{Movie, CATALOG},
    services::Recommender,
};

/// Answers from the catalog without touching the network
struct StubRecommender;

#[async_trait::async_trait]
impl Recommender for StubRecommender {
    async fn recommend(&self, query: &str) -> AppResult<Vec<Movie>> {
        let query = query.to_lowercase();
        if query.contains("explode") {
            return Err(AppError::ExternalApi("model unavailable".to_string()));
        }
        if query.contains("above 10") {
            return Ok(Vec::new());
        }
        Ok(CATALOG
            .iter()
            .filter(|m| query.contains(&m.director.to_lowercase()))
            .copied()
            .collect())
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

fn create_test_server() -> TestServer {
    let summary = ConfigSummary {
        api_base: "https://api.example.com/v1".to_string(),
        model: "gpt-4o-mini".to_string(),
        backend: BackendKind::SelfQuery,
    };
    let state = AppState::new(Arc::new(StubRecommender), summary);
    TestServer::new(create_router(state)).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["backend"], "stub");
}

#[tokio::test]
async fn test_list_movies_returns_catalog() {
    let server = create_test_server();
    let response = server.get("/api/v1/movies").await;
    response.assert_status_ok();

    let movies: Vec<serde_json::Value> = response.json();
    assert_eq!(movies.len(), 10);
    assert_eq!(movies[0]["title"], "Krrish");
}

#[tokio::test]
async fn test_recommend_by_director() {
    let server = create_test_server();
    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "query": "movies by Kabir Khan" }))
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["backend"], "self_query");
    let movies = body["movies"].as_array().unwrap();
    assert!(!movies.is_empty());
    assert!(movies.iter().all(|m| m["director"] == "Kabir Khan"));
}

#[tokio::test]
async fn test_recommend_impossible_constraint_is_empty() {
    let server = create_test_server();
    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "query": "movies rated above 10" }))
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["movies"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_recommend_rejects_blank_query() {
    let server = create_test_server();
    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "query": "   " }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_recommend_malformed_body_is_json_error() {
    let server = create_test_server();
    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "text": "war movies" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap().starts_with("Invalid input"));
    assert!(body["hint"].as_str().unwrap().contains("rephrasing"));
}

#[tokio::test]
async fn test_recommend_upstream_failure_is_bad_gateway() {
    let server = create_test_server();
    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "query": "make it explode" }))
        .await;
    response.assert_status(StatusCode::BAD_GATEWAY);

    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("model unavailable"));
    assert!(body["hint"].as_str().unwrap().contains("rephrasing"));
}

#[tokio::test]
async fn test_page_without_query_shows_form() {
    let server = create_test_server();
    let response = server.get("/").await;
    response.assert_status_ok();

    let page = response.text();
    assert!(page.contains("What kind of movie are you looking for?"));
    assert!(!page.contains("<details"));
}

#[tokio::test]
async fn test_page_renders_results() {
    let server = create_test_server();
    let response = server
        .get("/")
        .add_query_param("q", "anything by Rajkumar Hirani")
        .await;
    response.assert_status_ok();

    let page = response.text();
    assert!(page.contains("Here are your movie recommendations:"));
    assert!(page.contains("3 Idiots (Rajkumar Hirani - 2009)"));
    assert_eq!(page.matches("<details").count(), 1);
}

#[tokio::test]
async fn test_page_no_match_path() {
    let server = create_test_server();
    let response = server
        .get("/")
        .add_query_param("q", "rated above 10")
        .await;
    response.assert_status_ok();
    assert!(response.text().contains("No movies found matching your criteria"));
}

#[tokio::test]
async fn test_page_error_path_allows_resubmission() {
    let server = create_test_server();
    let response = server.get("/").add_query_param("q", "explode").await;
    response.assert_status_ok();

    let page = response.text();
    assert!(page.contains("An error occurred during search"));
    assert!(page.contains("Please try rephrasing your query"));
    assert!(page.contains(r#"<form method="get" action="/">"#));
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = create_test_server();
    let id = "6f1c2f8e-2b0a-4c55-9d8e-0c7e3b1d2a44";
    let response = server
        .get("/health")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static(id),
        )
        .await;

    assert_eq!(response.headers().get("x-request-id").unwrap(), id);
}
