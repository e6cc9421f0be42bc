//! Client for the LLM summarization upstream: structured synthesis of a
//! search result set with an optional reasoning trace.

pub(crate) mod client;
pub(crate) mod synthesis;
pub(crate) mod types;

pub use client::{GeminiClient, GeminiError, SynthesisApi};
pub use synthesis::format_extract;
pub use types::SummaryPayload;
