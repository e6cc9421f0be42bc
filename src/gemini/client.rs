use std::env;
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use crate::langsearch::SearchResult;
use crate::text::excerpt;

use super::synthesis;
use super::types::{
    ApiError, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part,
    SummaryPayload,
};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";
/// Bound on the summarization upstream; the in-flight call is dropped on
/// expiry instead of hanging the request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(12);
const TEMPERATURE: f32 = 0.3;
const MAX_OUTPUT_TOKENS: u32 = 1200;
const BODY_EXCERPT_BYTES: usize = 200;

#[derive(Debug, thiserror::Error)]
pub enum GeminiError {
    #[error("GEMINI_API_KEY not set. Configure it in the service environment.")]
    ApiKeyNotSet,

    #[error("summary upstream returned HTTP {code}: {message}")]
    Api { code: u16, message: String },

    #[error("summary upstream timed out after {0}s")]
    Timeout(u64),

    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("unexpected upstream body: {0}")]
    Malformed(String),
}

fn transport_error(e: reqwest::Error) -> GeminiError {
    if e.is_timeout() {
        GeminiError::Timeout(REQUEST_TIMEOUT.as_secs())
    } else {
        GeminiError::Network(e)
    }
}

fn classify_api_error(err: &ApiError) -> GeminiError {
    GeminiError::Api {
        code: err.code.unwrap_or(0),
        message: err
            .message
            .clone()
            .unwrap_or_else(|| "Unknown error".to_string()),
    }
}

/// Structured summarization of a result set. Implemented by
/// `GeminiClient` for production; mock implementations used in tests.
pub trait SynthesisApi {
    async fn synthesize(
        &self,
        query: &str,
        results: &[SearchResult],
        reasoning_trace: bool,
    ) -> Result<SummaryPayload, GeminiError>;
}

#[derive(Clone)]
struct ApiKey(String);

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    api_key: ApiKey,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn from_env(http: Client) -> Result<Self, GeminiError> {
        let api_key = env::var("GEMINI_API_KEY").map_err(|_| GeminiError::ApiKeyNotSet)?;
        if api_key.trim().is_empty() {
            return Err(GeminiError::ApiKeyNotSet);
        }
        let model = env::var("GEMINI_MODEL")
            .ok()
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        Ok(Self {
            http,
            api_key: ApiKey(api_key.trim().to_string()),
            model,
            base_url: API_BASE.to_string(),
        })
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(http: Client, base_url: &str) -> Self {
        Self {
            http,
            api_key: ApiKey("test-key".to_string()),
            model: DEFAULT_MODEL.to_string(),
            base_url: base_url.to_string(),
        }
    }
}

impl SynthesisApi for GeminiClient {
    async fn synthesize(
        &self,
        query: &str,
        results: &[SearchResult],
        reasoning_trace: bool,
    ) -> Result<SummaryPayload, GeminiError> {
        let url = format!("{}/{}:generateContent", self.base_url, self.model);

        let text = format!(
            "{}\n\n{}",
            synthesis::build_prompt(reasoning_trace),
            synthesis::build_document(query, results)
        );
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text }],
                role: Some("user".to_string()),
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                max_output_tokens: MAX_OUTPUT_TOKENS,
                response_mime_type: "application/json",
                response_schema: synthesis::summary_schema(reasoning_trace),
            },
        };

        debug_assert!(
            url.starts_with("https://") || cfg!(test),
            "API key must only be sent over HTTPS"
        );

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key.0)
            .header("User-Agent", crate::USER_AGENT)
            .json(&request)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;
        if !status.is_success() {
            if let Ok(parsed) = serde_json::from_str::<GenerateContentResponse>(&body)
                && let Some(err) = &parsed.error
            {
                let classified = classify_api_error(err);
                warn!(error = %classified, "summary upstream error");
                return Err(classified);
            }
            warn!(status = %status, "summary upstream error (no structured body)");
            return Err(GeminiError::Api {
                code: status.as_u16(),
                message: format!("HTTP {status}: {}", excerpt(&body, BODY_EXCERPT_BYTES)),
            });
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|_| GeminiError::Malformed(excerpt(&body, BODY_EXCERPT_BYTES).to_string()))?;
        if let Some(err) = &parsed.error {
            return Err(classify_api_error(err));
        }

        debug!(model = %self.model, results = results.len(), "synthesis complete");
        Ok(synthesis::payload_from_response(&parsed, query, reasoning_trace))
    }
}
