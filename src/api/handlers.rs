use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::info;

use crate::gemini::{self, GeminiError, SynthesisApi};
use crate::langsearch::LangSearchError;
use crate::pipeline::{self, PipelineRequest};

use super::AppState;
use super::errors::{search_failure, summarize_failure};
use super::models::{HealthResponse, SearchBody, SummarizeBody, SummarizeResponse};

pub(super) async fn search(State(state): State<AppState>, Json(body): Json<SearchBody>) -> Response {
    if body.query.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "query must not be empty"})),
        )
            .into_response();
    }

    // Fail fast before any outbound call when the credential is missing.
    let Some(langsearch) = state.langsearch.as_ref() else {
        return search_failure(&LangSearchError::ApiKeyNotSet).into_response();
    };

    info!(query = %body.query, deep_search = body.deep_search, "POST /search");

    let request = PipelineRequest {
        query: body.query,
        count: body.count,
        freshness: body.freshness,
        want_summary: body.summary,
        deep_search: body.deep_search,
        extract: body.extract,
        reasoning_trace: body.reasoning,
    };

    match pipeline::run(langsearch, state.gemini.as_ref(), &request).await {
        Ok(aggregated) => Json(aggregated).into_response(),
        Err(e) => search_failure(&e).into_response(),
    }
}

pub(super) async fn summarize(
    State(state): State<AppState>,
    Json(body): Json<SummarizeBody>,
) -> Response {
    if body.query.trim().is_empty() || body.results.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Query and non-empty results are required"})),
        )
            .into_response();
    }

    let Some(synthesizer) = state.gemini.as_ref() else {
        return summarize_failure(&GeminiError::ApiKeyNotSet).into_response();
    };

    info!(query = %body.query, results = body.results.len(), "POST /summarize");

    match synthesizer
        .synthesize(&body.query, &body.results, body.reasoning_trace_requested)
        .await
    {
        Ok(summary) => {
            let formatted_text = gemini::format_extract(&summary);
            Json(SummarizeResponse {
                success: true,
                query: body.query,
                summary,
                formatted_text,
            })
            .into_response()
        }
        Err(e) => summarize_failure(&e).into_response(),
    }
}

pub(super) async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        search_configured: state.langsearch.is_some(),
        gemini_configured: state.gemini.is_some(),
    })
}
