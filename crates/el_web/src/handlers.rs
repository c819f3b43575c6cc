use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use el_core::{ArticleAnalysis, FeedReport};

use crate::page;
use crate::AppState;

/// JSON error body returned by the API routes.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<el_core::Error> for ApiError {
    fn from(error: el_core::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: error.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub feed_url: String,
}

#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub title: Option<String>,
    pub text: String,
}

pub async fn index() -> Html<String> {
    Html(page::render_page("", ""))
}

pub async fn clear() -> Redirect {
    Redirect::to("/")
}

pub async fn analyze_page(
    State(state): State<Arc<AppState>>,
    Form(form): Form<AnalyzeRequest>,
) -> Html<String> {
    let feed_url = form.feed_url.trim();
    if feed_url.is_empty() {
        return Html(page::render_page("", &page::render_error("Please enter a feed URL.")));
    }

    tracing::info!("🌐 Analysing feed from the page: {}", feed_url);
    let body = match state.manager.analyze_feed(feed_url).await {
        Ok(report) => page::render_report(&report),
        Err(e) => {
            tracing::error!("❌ Feed analysis failed: {}", e);
            page::render_error(&e.to_string())
        }
    };
    Html(page::render_page(feed_url, &body))
}

pub async fn api_analyze(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<FeedReport>, ApiError> {
    let feed_url = request.feed_url.trim();
    if feed_url.is_empty() {
        return Err(ApiError::bad_request("feed_url must not be empty"));
    }
    Ok(Json(state.manager.analyze_feed(feed_url).await?))
}

pub async fn api_text(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TextRequest>,
) -> Result<Json<ArticleAnalysis>, ApiError> {
    if request.text.trim().is_empty() {
        return Err(ApiError::bad_request("text must not be empty"));
    }
    let analysis = state
        .manager
        .analyze_text(request.title.as_deref(), &request.text)
        .await?;
    Ok(Json(analysis))
}

pub async fn health(State(state): State<Arc<AppState>>) -> Result<Json<serde_json::Value>, ApiError> {
    let registry = state.manager.registry();
    let embedder = registry.embedder().await?;
    let extractor = registry.extractor().await?;
    Ok(Json(json!({
        "status": "ok",
        "embedder": embedder.name(),
        "extractor": extractor.name(),
    })))
}
