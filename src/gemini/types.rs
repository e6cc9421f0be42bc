use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Content {
    pub parts: Vec<Part>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub response_mime_type: &'static str,
    pub response_schema: Value,
}

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    pub candidates: Option<Vec<Candidate>>,
    pub error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    pub code: Option<u16>,
    pub message: Option<String>,
}

/// Structured synthesis of a result set.
///
/// `main_topic` and `comprehensive_summary` are required for a model
/// response to count as well-formed; the list fields tolerate omission.
/// `thought_process` exists only when a reasoning trace was requested;
/// otherwise it is stripped rather than left empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryPayload {
    pub main_topic: String,
    #[serde(default)]
    pub key_points: Vec<String>,
    pub comprehensive_summary: String,
    #[serde(default)]
    pub key_entities: Vec<String>,
    #[serde(default)]
    pub main_conclusion: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought_process: Option<String>,
}
