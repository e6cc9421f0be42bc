use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Canonical search result used everywhere downstream of normalization,
/// regardless of which upstream response shape produced it.
///
/// `url` is optional for display but serves as the identity key; `title`
/// falls back to "Untitled" during normalization when the upstream item
/// carries no usable name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

impl SearchResult {
    /// Document text submitted to the reranker: snippet, falling back to
    /// title, falling back to empty. Never omitted, since array positions
    /// are the join key back to the result list.
    pub fn document_text(&self) -> String {
        match self.snippet.as_deref() {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => self.title.clone(),
        }
    }
}

/// Freshness window accepted by the web-search upstream. The UI sends
/// `"7d"` for the one-week window, so that spelling is accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Freshness {
    #[default]
    NoLimit,
    OneDay,
    #[serde(alias = "7d")]
    OneWeek,
    OneMonth,
    OneYear,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebSearchRequest {
    pub query: String,
    pub count: u32,
    pub freshness: Freshness,
    pub summary: bool,
}

/// Output of the search stage: normalized results plus the upstream's own
/// summary text (when requested) and the raw body for diagnostics.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub results: Vec<SearchResult>,
    pub summary: Option<String>,
    pub raw: Value,
}

#[derive(Debug, Serialize)]
pub struct RerankRequest {
    pub model: &'static str,
    pub query: String,
    pub documents: Vec<String>,
    pub top_n: usize,
    pub return_documents: bool,
}

#[derive(Debug, Deserialize)]
pub struct RerankResponse {
    pub results: Option<Vec<RankedDoc>>,
}

/// One scored entry from the rerank upstream. `index` refers to the
/// position in the submitted document array; it is signed because the
/// upstream is not trusted to stay in range.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RankedDoc {
    pub index: i64,
    pub score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_text_prefers_snippet() {
        let r = SearchResult {
            title: "Title".into(),
            url: None,
            snippet: Some("Snippet".into()),
        };
        assert_eq!(r.document_text(), "Snippet");
    }

    #[test]
    fn document_text_falls_back_to_title() {
        let r = SearchResult {
            title: "Title".into(),
            url: None,
            snippet: Some(String::new()),
        };
        assert_eq!(r.document_text(), "Title");

        let r = SearchResult {
            title: "Title".into(),
            url: None,
            snippet: None,
        };
        assert_eq!(r.document_text(), "Title");
    }

    #[test]
    fn document_text_empty_when_nothing_available() {
        let r = SearchResult {
            title: String::new(),
            url: None,
            snippet: None,
        };
        assert_eq!(r.document_text(), "");
    }

    #[test]
    fn freshness_deserializes_from_json() {
        let f: Freshness = serde_json::from_str(r#""noLimit""#).unwrap();
        assert_eq!(f, Freshness::NoLimit);

        let f: Freshness = serde_json::from_str(r#""oneWeek""#).unwrap();
        assert_eq!(f, Freshness::OneWeek);

        // spelling used by the browser UI
        let f: Freshness = serde_json::from_str(r#""7d""#).unwrap();
        assert_eq!(f, Freshness::OneWeek);
    }

    #[test]
    fn search_result_omits_missing_fields() {
        let r = SearchResult {
            title: "T".into(),
            url: None,
            snippet: None,
        };
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json, serde_json::json!({"title": "T"}));
    }
}
