//! Mapping of upstream-client errors onto HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use serde_json::{Value, json};

use crate::gemini::GeminiError;
use crate::langsearch::LangSearchError;
use crate::pipeline::StageErrors;

/// A search-stage failure aborts the pipeline: render it as the error
/// body for `/search`. Upstream statuses pass through; transport and
/// parse failures map onto gateway statuses. Raw diagnostic bodies ride
/// in `details`, separate from the human-readable `error` text.
pub(super) fn search_failure(e: &LangSearchError) -> (StatusCode, Json<Value>) {
    let status = match e {
        LangSearchError::ApiKeyNotSet => StatusCode::INTERNAL_SERVER_ERROR,
        LangSearchError::Upstream { status, .. } => {
            StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
        }
        LangSearchError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        LangSearchError::Network(_) | LangSearchError::Malformed(_) => StatusCode::BAD_GATEWAY,
    };
    let details = match e {
        LangSearchError::Upstream { body, .. } => Some(body.clone()),
        LangSearchError::Malformed(body) => Some(body.clone()),
        _ => None,
    };
    let errors = StageErrors {
        search: Some(e.to_string()),
        ..Default::default()
    };
    (
        status,
        Json(json!({
            "ok": false,
            "results": [],
            "raw": Value::Null,
            "error": e.to_string(),
            "details": details,
            "errors": errors,
        })),
    )
}

pub(super) fn summarize_failure(e: &GeminiError) -> (StatusCode, Json<Value>) {
    let status = match e {
        GeminiError::ApiKeyNotSet => StatusCode::INTERNAL_SERVER_ERROR,
        GeminiError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        GeminiError::Api { .. } | GeminiError::Network(_) | GeminiError::Malformed(_) => {
            StatusCode::BAD_GATEWAY
        }
    };
    let message = match e {
        GeminiError::ApiKeyNotSet => "Set GEMINI_API_KEY in the service environment.",
        _ => "Failed to generate summary",
    };
    (
        status,
        Json(json!({
            "success": false,
            "error": e.to_string(),
            "message": message,
        })),
    )
}
