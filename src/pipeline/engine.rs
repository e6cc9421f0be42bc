use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::gemini::{GeminiError, SummaryPayload, SynthesisApi};
use crate::langsearch::{
    Freshness, LangSearchError, RerankApi, SearchApi, SearchResult, WebSearchRequest,
};

use super::rerank::apply_ranking;

/// Deep search never requests fewer results than this.
const DEEP_SEARCH_MIN_COUNT: u32 = 15;

#[derive(Debug, Clone)]
pub struct PipelineRequest {
    pub query: String,
    pub count: u32,
    pub freshness: Freshness,
    /// Ask the search upstream for its own summary text.
    pub want_summary: bool,
    pub deep_search: bool,
    /// Run the LLM summarize stage on the final result list.
    pub extract: bool,
    pub reasoning_trace: bool,
}

/// Per-stage failures absorbed by the pipeline. `search` is only set when
/// the whole pipeline failed, since nothing downstream can run without a
/// base result set.
#[derive(Debug, Default, Serialize)]
pub struct StageErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rerank: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summarize: Option<String>,
}

impl StageErrors {
    pub fn is_empty(&self) -> bool {
        self.search.is_none() && self.rerank.is_none() && self.summarize.is_none()
    }
}

/// Unified response for one pipeline run. `results` always reflects the
/// search stage's output (reordered when rerank succeeded); downstream
/// stage failures land in `errors` and never discard it.
#[derive(Debug, Serialize)]
pub struct AggregatedResponse {
    pub ok: bool,
    pub results: Vec<SearchResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extract: Option<SummaryPayload>,
    pub raw: Value,
    #[serde(skip_serializing_if = "StageErrors::is_empty")]
    pub errors: StageErrors,
}

/// Run the pipeline: search, then optionally rerank, then optionally
/// summarize. Rerank and summarize failures degrade gracefully; a search
/// failure is escalated to the caller because no further stage can
/// produce meaningful output without results.
pub async fn run<S, G>(
    search: &S,
    synthesizer: Option<&G>,
    request: &PipelineRequest,
) -> Result<AggregatedResponse, LangSearchError>
where
    S: SearchApi + RerankApi,
    G: SynthesisApi,
{
    let upstream_request = effective_search_request(request);
    info!(
        query = %request.query,
        count = upstream_request.count,
        deep_search = request.deep_search,
        "pipeline: searching"
    );
    let outcome = search.web_search(&upstream_request).await?;

    let mut results = outcome.results;
    let mut errors = StageErrors::default();

    if request.deep_search && !results.is_empty() {
        info!(candidates = results.len(), "pipeline: reranking");
        let documents: Vec<String> = results.iter().map(SearchResult::document_text).collect();
        match search.rerank(&request.query, &documents).await {
            Ok(ranked) => results = apply_ranking(results, ranked),
            Err(e) => {
                warn!(error = %e, "rerank failed, keeping original order");
                errors.rerank = Some(e.to_string());
            }
        }
    }

    let mut extract = None;
    if request.extract && !results.is_empty() {
        info!(results = results.len(), "pipeline: summarizing");
        match synthesizer {
            Some(synth) => {
                match synth
                    .synthesize(&request.query, &results, request.reasoning_trace)
                    .await
                {
                    Ok(payload) => extract = Some(payload),
                    Err(e) => {
                        warn!(error = %e, "summarize failed, returning results without extract");
                        errors.summarize = Some(e.to_string());
                    }
                }
            }
            None => {
                warn!("summarize requested but no summarizer is configured");
                errors.summarize = Some(GeminiError::ApiKeyNotSet.to_string());
            }
        }
    }

    info!(results = results.len(), extract = extract.is_some(), "pipeline complete");
    Ok(AggregatedResponse {
        ok: true,
        results,
        summary: outcome.summary,
        extract,
        raw: outcome.raw,
        errors,
    })
}

/// Deep search widens the requested count and narrows freshness to the
/// one-week window. This is pipeline policy, not Search Client behavior.
fn effective_search_request(request: &PipelineRequest) -> WebSearchRequest {
    let (count, freshness) = if request.deep_search {
        (
            request.count.saturating_mul(2).max(DEEP_SEARCH_MIN_COUNT),
            Freshness::OneWeek,
        )
    } else {
        (request.count, request.freshness)
    };
    WebSearchRequest {
        query: request.query.clone(),
        count,
        freshness,
        summary: request.want_summary,
    }
}
