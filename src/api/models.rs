use serde::{Deserialize, Serialize};

use crate::gemini::SummaryPayload;
use crate::langsearch::{Freshness, SearchResult};

fn default_count() -> u32 {
    10
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchBody {
    #[serde(default)]
    pub query: String,
    #[serde(default = "default_count")]
    pub count: u32,
    #[serde(default)]
    pub freshness: Freshness,
    /// Ask the search upstream for its own summary text.
    #[serde(default = "default_true")]
    pub summary: bool,
    #[serde(default)]
    pub deep_search: bool,
    /// Run the LLM summarize stage as part of this request.
    #[serde(default)]
    pub extract: bool,
    #[serde(default)]
    pub reasoning: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeBody {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub results: Vec<SearchResult>,
    /// `thinkMode` is the spelling used by the chat widget.
    #[serde(default, alias = "thinkMode")]
    pub reasoning_trace_requested: bool,
}

#[derive(Debug, Serialize)]
pub struct SummarizeResponse {
    pub success: bool,
    pub query: String,
    pub summary: SummaryPayload,
    pub formatted_text: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub search_configured: bool,
    pub gemini_configured: bool,
}
