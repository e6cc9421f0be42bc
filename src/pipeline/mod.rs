//! Orchestration of the search, rerank, and summarize stages into one
//! aggregated response with per-stage failure tolerance.

pub(crate) mod engine;
mod rerank;

pub use engine::{AggregatedResponse, PipelineRequest, StageErrors, run};
