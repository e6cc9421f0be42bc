//! Composition of the synthesis request and extraction of the structured
//! payload from the model response.

use serde_json::{Value, json};
use tracing::warn;

use crate::langsearch::SearchResult;

use super::types::{GenerateContentResponse, SummaryPayload};

const SYNTH_PROMPT: &str = "You are an expert synthesis engine. Read the provided search results and return a concise, accurate JSON per the schema.";
const TRACE_PROMPT: &str = "Additionally include a detailed thought_process field explaining step-by-step reasoning used to reach the summary.";
const FAILURE_TEXT: &str = "Summary generation failed";

pub(crate) fn build_prompt(reasoning_trace: bool) -> String {
    if reasoning_trace {
        format!("{SYNTH_PROMPT} {TRACE_PROMPT}")
    } else {
        SYNTH_PROMPT.to_string()
    }
}

/// Combined document handed to the model: the query followed by every
/// result enumerated with title, url, and snippet.
pub(crate) fn build_document(query: &str, results: &[SearchResult]) -> String {
    let mut doc = format!("Search Query: {query}\n\nSearch Results:");
    for (i, result) in results.iter().enumerate() {
        doc.push_str(&format!(
            "\n\nResult {}:\nTitle: {}\nURL: {}\nContent: {}",
            i + 1,
            result.title,
            result.url.as_deref().unwrap_or(""),
            result.snippet.as_deref().unwrap_or("")
        ));
    }
    doc
}

/// Response schema constraining the model output to `SummaryPayload`.
/// The `thought_process` property is offered only when a trace was
/// requested, so the field cannot appear uninvited.
pub(crate) fn summary_schema(reasoning_trace: bool) -> Value {
    let mut properties = json!({
        "main_topic": {"type": "string"},
        "key_points": {"type": "array", "items": {"type": "string"}},
        "comprehensive_summary": {"type": "string"},
        "key_entities": {"type": "array", "items": {"type": "string"}},
        "main_conclusion": {"type": "string"}
    });
    if reasoning_trace {
        properties["thought_process"] = json!({"type": "string"});
    }
    json!({
        "type": "object",
        "properties": properties,
        "required": [
            "main_topic",
            "key_points",
            "comprehensive_summary",
            "key_entities",
            "main_conclusion"
        ]
    })
}

/// Turn a model response into a `SummaryPayload`.
///
/// Output that does not parse as the structured payload degrades to a
/// minimal one built from the raw text, or a fixed failure message when
/// no text came back at all. The degraded path keeps the pipeline alive;
/// it never escalates.
pub(crate) fn payload_from_response(
    response: &GenerateContentResponse,
    query: &str,
    reasoning_trace: bool,
) -> SummaryPayload {
    let text = response
        .candidates
        .as_ref()
        .and_then(|c| c.first())
        .and_then(|c| c.content.as_ref())
        .and_then(|content| content.parts.first())
        .map(|part| part.text.as_str())
        .filter(|t| !t.is_empty());

    if text.is_none() {
        warn!("summarizer returned no text (safety filter or empty response)");
    }

    let mut payload = match text.and_then(|t| serde_json::from_str::<SummaryPayload>(t).ok()) {
        Some(parsed) => parsed,
        None => {
            if text.is_some() {
                warn!("summarizer output did not match the structured schema");
            }
            SummaryPayload {
                main_topic: query.to_string(),
                key_points: Vec::new(),
                comprehensive_summary: text.unwrap_or(FAILURE_TEXT).to_string(),
                key_entities: Vec::new(),
                main_conclusion: String::new(),
                thought_process: None,
            }
        }
    };

    if !reasoning_trace {
        payload.thought_process = None;
    }
    payload
}

/// Render a payload as the display text used by the chat UI.
pub fn format_extract(summary: &SummaryPayload) -> String {
    let mut lines = vec![
        format!("📌 **{}**", summary.main_topic),
        String::new(),
        "**Key Points:**".to_string(),
    ];
    lines.extend(summary.key_points.iter().map(|p| format!("• {p}")));
    lines.push(String::new());
    lines.push("**Summary:**".to_string());
    lines.push(summary.comprehensive_summary.clone());
    lines.push(String::new());
    let entities = if summary.key_entities.is_empty() {
        "None identified".to_string()
    } else {
        summary.key_entities.join(", ")
    };
    lines.push(format!("**Key Entities:** {entities}"));
    lines.push(String::new());
    lines.push(format!("**Conclusion:** {}", summary.main_conclusion));
    lines.join("\n")
}
