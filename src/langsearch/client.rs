use std::env;
use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::text::excerpt;

use super::normalize;
use super::types::{RankedDoc, RerankRequest, RerankResponse, SearchOutcome, WebSearchRequest};

const DEFAULT_BASE_URL: &str = "https://api.langsearch.com";
const RERANK_MODEL: &str = "langsearch-reranker-v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(12);
/// Upper bound on raw upstream bodies carried inside error values.
const BODY_EXCERPT_BYTES: usize = 200;

#[derive(Debug, thiserror::Error)]
pub enum LangSearchError {
    #[error("LANGSEARCH_API_KEY not set. Configure it in the service environment.")]
    ApiKeyNotSet,

    #[error("search upstream returned HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("search upstream timed out after {0}s")]
    Timeout(u64),

    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("unexpected upstream body: {0}")]
    Malformed(String),
}

fn transport_error(e: reqwest::Error) -> LangSearchError {
    if e.is_timeout() {
        LangSearchError::Timeout(REQUEST_TIMEOUT.as_secs())
    } else {
        LangSearchError::Network(e)
    }
}

/// Primary web-search call. Implemented by `LangSearchClient` for
/// production; mock implementations used in orchestrator tests.
pub trait SearchApi {
    async fn web_search(&self, request: &WebSearchRequest) -> Result<SearchOutcome, LangSearchError>;
}

/// Semantic rerank call against the same upstream.
pub trait RerankApi {
    async fn rerank(&self, query: &str, documents: &[String])
    -> Result<Vec<RankedDoc>, LangSearchError>;
}

#[derive(Clone)]
struct ApiKey(String);

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

#[derive(Debug, Clone)]
pub struct LangSearchClient {
    http: Client,
    api_key: ApiKey,
    base_url: String,
}

impl LangSearchClient {
    pub fn from_env(http: Client) -> Result<Self, LangSearchError> {
        let api_key = env::var("LANGSEARCH_API_KEY").map_err(|_| LangSearchError::ApiKeyNotSet)?;
        if api_key.trim().is_empty() {
            return Err(LangSearchError::ApiKeyNotSet);
        }
        let base_url = env::var("LANGSEARCH_BASE_URL")
            .ok()
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Ok(Self {
            http,
            api_key: ApiKey(api_key.trim().to_string()),
            base_url,
        })
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(http: Client, base_url: &str) -> Self {
        Self {
            http,
            api_key: ApiKey("test-key".to_string()),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn post_json(&self, url: &str, body: &impl serde::Serialize) -> Result<String, LangSearchError> {
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.api_key.0)
            .header("User-Agent", crate::USER_AGENT)
            .json(body)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let text = response.text().await.map_err(transport_error)?;
        if !status.is_success() {
            warn!(status = %status, "search upstream error");
            return Err(LangSearchError::Upstream {
                status: status.as_u16(),
                body: excerpt(&text, BODY_EXCERPT_BYTES).to_string(),
            });
        }
        Ok(text)
    }
}

impl SearchApi for LangSearchClient {
    async fn web_search(&self, request: &WebSearchRequest) -> Result<SearchOutcome, LangSearchError> {
        let url = format!("{}/v1/web-search", self.base_url);
        let text = self.post_json(&url, request).await?;

        let raw: Value = serde_json::from_str(&text)
            .map_err(|_| LangSearchError::Malformed(excerpt(&text, BODY_EXCERPT_BYTES).to_string()))?;

        let outcome = normalize::normalize(raw);
        debug!(results = outcome.results.len(), "web search complete");
        Ok(outcome)
    }
}

impl RerankApi for LangSearchClient {
    async fn rerank(
        &self,
        query: &str,
        documents: &[String],
    ) -> Result<Vec<RankedDoc>, LangSearchError> {
        let url = format!("{}/v1/rerank", self.base_url);
        let request = RerankRequest {
            model: RERANK_MODEL,
            query: query.to_string(),
            documents: documents.to_vec(),
            top_n: documents.len(),
            return_documents: true,
        };
        let text = self.post_json(&url, &request).await?;

        let body: RerankResponse = serde_json::from_str(&text)
            .map_err(|_| LangSearchError::Malformed(excerpt(&text, BODY_EXCERPT_BYTES).to_string()))?;

        let ranked = body
            .results
            .ok_or_else(|| LangSearchError::Malformed("rerank response had no results array".into()))?;
        debug!(scored = ranked.len(), "rerank complete");
        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::langsearch::types::Freshness;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> WebSearchRequest {
        WebSearchRequest {
            query: "rust async".into(),
            count: 5,
            freshness: Freshness::NoLimit,
            summary: true,
        }
    }

    #[tokio::test]
    async fn web_search_normalizes_nested_shape() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/web-search"))
            .and(header("Authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {
                    "webPages": {
                        "value": [
                            {"name": "Async Book", "url": "https://rust-lang.github.io/async-book", "snippet": "Learn async"}
                        ]
                    },
                    "summary": "An answer"
                }
            })))
            .mount(&server)
            .await;

        let client = LangSearchClient::with_base_url(Client::new(), &server.uri());
        let outcome = client.web_search(&request()).await.unwrap();

        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.results[0].title, "Async Book");
        assert_eq!(outcome.summary.as_deref(), Some("An answer"));
    }

    #[tokio::test]
    async fn web_search_falls_back_to_flat_shape() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/web-search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [{"title": "Flat", "url": "https://a.com", "snippet": "s"}]
            })))
            .mount(&server)
            .await;

        let client = LangSearchClient::with_base_url(Client::new(), &server.uri());
        let outcome = client.web_search(&request()).await.unwrap();

        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.results[0].title, "Flat");
    }

    #[tokio::test]
    async fn web_search_forwards_request_fields() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/web-search"))
            .and(body_partial_json(serde_json::json!({
                "query": "rust async",
                "count": 5,
                "freshness": "noLimit",
                "summary": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"results": []})))
            .expect(1)
            .mount(&server)
            .await;

        let client = LangSearchClient::with_base_url(Client::new(), &server.uri());
        client.web_search(&request()).await.unwrap();
    }

    #[tokio::test]
    async fn web_search_non_2xx_carries_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/web-search"))
            .respond_with(ResponseTemplate::new(402).set_body_string("payment required"))
            .mount(&server)
            .await;

        let client = LangSearchClient::with_base_url(Client::new(), &server.uri());
        match client.web_search(&request()).await {
            Err(LangSearchError::Upstream { status: 402, body }) => {
                assert_eq!(body, "payment required");
            }
            other => panic!("expected Upstream(402), got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn web_search_upstream_body_is_truncated() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/web-search"))
            .respond_with(ResponseTemplate::new(500).set_body_string("e".repeat(5000)))
            .mount(&server)
            .await;

        let client = LangSearchClient::with_base_url(Client::new(), &server.uri());
        match client.web_search(&request()).await {
            Err(LangSearchError::Upstream { body, .. }) => assert_eq!(body.len(), 200),
            other => panic!("expected Upstream error, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn web_search_non_json_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/web-search"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
            .mount(&server)
            .await;

        let client = LangSearchClient::with_base_url(Client::new(), &server.uri());
        match client.web_search(&request()).await {
            Err(LangSearchError::Malformed(body)) => assert!(body.contains("not json")),
            other => panic!("expected Malformed error, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn rerank_returns_scored_indices() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/rerank"))
            .and(body_partial_json(serde_json::json!({
                "model": "langsearch-reranker-v1",
                "query": "q",
                "documents": ["a", "b"],
                "top_n": 2,
                "return_documents": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [
                    {"index": 1, "score": 0.9},
                    {"index": 0, "score": 0.4}
                ]
            })))
            .mount(&server)
            .await;

        let client = LangSearchClient::with_base_url(Client::new(), &server.uri());
        let ranked = client.rerank("q", &["a".into(), "b".into()]).await.unwrap();

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].index, 1);
        assert_eq!(ranked[0].score, 0.9);
    }

    #[tokio::test]
    async fn rerank_missing_results_array_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/rerank"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"model": "x"})))
            .mount(&server)
            .await;

        let client = LangSearchClient::with_base_url(Client::new(), &server.uri());
        let result = client.rerank("q", &["a".into()]).await;
        assert!(matches!(result, Err(LangSearchError::Malformed(_))));
    }
}
