//! Normalization of heterogeneous web-search response bodies.
//!
//! The upstream returns one of two known shapes: a nested envelope with
//! results under `data.webPages.value`, or a flat envelope with a
//! top-level `results` array. Each shape is an extraction strategy; the
//! strategies run in a fixed order and the first one that yields any
//! items wins. The fallback order is load-bearing: callers rely on the
//! flat shape being tried whenever the nested path produces nothing.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::types::{SearchOutcome, SearchResult};

#[derive(Debug, Default, Deserialize)]
struct SearchEnvelope {
    data: Option<DataEnvelope>,
    results: Option<Vec<RawItem>>,
    summary: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DataEnvelope {
    web_pages: Option<WebPages>,
    summary: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WebPages {
    value: Option<Vec<RawItem>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawItem {
    name: Option<String>,
    title: Option<String>,
    url: Option<String>,
    snippet: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Nested,
    Flat,
}

type Strategy = fn(&SearchEnvelope) -> Option<SearchOutcome>;

/// Extraction strategies in fallback order.
const STRATEGIES: &[(Shape, Strategy)] = &[(Shape::Nested, extract_nested), (Shape::Flat, extract_flat)];

/// Normalize a raw upstream body into canonical results.
///
/// Never fails: an unrecognized body yields an empty result list (with
/// any top-level summary text still picked up), and the raw value is
/// carried through for diagnostics.
pub(crate) fn normalize(raw: Value) -> SearchOutcome {
    let envelope: SearchEnvelope = serde_json::from_value(raw.clone()).unwrap_or_default();

    for (shape, extract) in STRATEGIES {
        if let Some(mut outcome) = extract(&envelope) {
            debug!(?shape, results = outcome.results.len(), "normalized upstream response");
            outcome.raw = raw;
            return outcome;
        }
    }

    debug!("no extraction strategy matched upstream response");
    SearchOutcome {
        results: Vec::new(),
        summary: envelope
            .data
            .as_ref()
            .and_then(|d| d.summary.clone())
            .or(envelope.summary),
        raw,
    }
}

/// `data.webPages.value` shape; item names arrive as `name`.
fn extract_nested(envelope: &SearchEnvelope) -> Option<SearchOutcome> {
    let data = envelope.data.as_ref()?;
    let items = data.web_pages.as_ref()?.value.as_ref()?;
    if items.is_empty() {
        return None;
    }
    Some(SearchOutcome {
        results: items.iter().map(|item| canonical(item, Shape::Nested)).collect(),
        summary: data.summary.clone(),
        raw: Value::Null,
    })
}

/// Flat `results` shape; item names arrive as `title`.
fn extract_flat(envelope: &SearchEnvelope) -> Option<SearchOutcome> {
    let items = envelope.results.as_ref()?;
    if items.is_empty() {
        return None;
    }
    Some(SearchOutcome {
        results: items.iter().map(|item| canonical(item, Shape::Flat)).collect(),
        summary: envelope.summary.clone(),
        raw: Value::Null,
    })
}

fn canonical(item: &RawItem, shape: Shape) -> SearchResult {
    let title = match shape {
        Shape::Nested => item.name.as_ref().or(item.title.as_ref()),
        Shape::Flat => item.title.as_ref().or(item.name.as_ref()),
    };
    SearchResult {
        title: title.cloned().unwrap_or_else(|| "Untitled".to_string()),
        url: item.url.clone(),
        snippet: item.snippet.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_shape_extracts_results_and_summary() {
        let raw = json!({
            "data": {
                "webPages": {
                    "value": [
                        {"name": "First", "url": "https://a.com", "snippet": "sa"},
                        {"name": "Second", "url": "https://b.com", "snippet": "sb"}
                    ]
                },
                "summary": "upstream summary"
            }
        });

        let outcome = normalize(raw);
        assert_eq!(outcome.results.len(), 2);
        assert_eq!(outcome.results[0].title, "First");
        assert_eq!(outcome.results[1].url.as_deref(), Some("https://b.com"));
        assert_eq!(outcome.summary.as_deref(), Some("upstream summary"));
    }

    #[test]
    fn flat_shape_extracts_results_and_summary() {
        let raw = json!({
            "results": [
                {"title": "First", "url": "https://a.com", "snippet": "sa"}
            ],
            "summary": "flat summary"
        });

        let outcome = normalize(raw);
        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.results[0].title, "First");
        assert_eq!(outcome.summary.as_deref(), Some("flat summary"));
    }

    #[test]
    fn equivalent_data_normalizes_identically_across_shapes() {
        let nested = json!({
            "data": {"webPages": {"value": [
                {"name": "Page", "url": "https://p.com", "snippet": "text"}
            ]}}
        });
        let flat = json!({
            "results": [
                {"title": "Page", "url": "https://p.com", "snippet": "text"}
            ]
        });

        assert_eq!(normalize(nested).results, normalize(flat).results);
    }

    #[test]
    fn empty_nested_array_falls_back_to_flat() {
        let raw = json!({
            "data": {"webPages": {"value": []}},
            "results": [{"title": "Fallback", "url": "https://f.com"}]
        });

        let outcome = normalize(raw);
        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.results[0].title, "Fallback");
    }

    #[test]
    fn nested_shape_wins_when_both_present() {
        let raw = json!({
            "data": {"webPages": {"value": [{"name": "Nested"}]}},
            "results": [{"title": "Flat"}]
        });

        let outcome = normalize(raw);
        assert_eq!(outcome.results[0].title, "Nested");
    }

    #[test]
    fn missing_name_and_title_becomes_untitled() {
        let raw = json!({
            "results": [{"url": "https://a.com", "snippet": "only a snippet"}]
        });

        let outcome = normalize(raw);
        assert_eq!(outcome.results[0].title, "Untitled");
    }

    #[test]
    fn nested_prefers_name_over_title() {
        let raw = json!({
            "data": {"webPages": {"value": [{"name": "Name", "title": "Title"}]}}
        });
        assert_eq!(normalize(raw).results[0].title, "Name");
    }

    #[test]
    fn unrecognized_body_yields_empty_results() {
        let outcome = normalize(json!({"unexpected": true}));
        assert!(outcome.results.is_empty());
        assert!(outcome.summary.is_none());
    }

    #[test]
    fn non_object_body_yields_empty_results() {
        let outcome = normalize(json!("just a string"));
        assert!(outcome.results.is_empty());
    }

    #[test]
    fn raw_body_is_preserved() {
        let raw = json!({"results": [{"title": "T"}]});
        let outcome = normalize(raw.clone());
        assert_eq!(outcome.raw, raw);
    }
}
