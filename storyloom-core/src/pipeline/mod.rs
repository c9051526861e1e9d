//! The chapter generation pipeline.
//!
//! Brief Interpretation → Story-State Load → Scene Planning → Draft
//! Generation → Critique → Rewrite → Continuity Validation → Evaluation.
//! Strictly linear: each stage's prompt is built only from state produced
//! upstream. One artifact is appended per model-backed stage; the
//! evaluation gate runs locally and appends none.

pub mod contracts;
pub mod evaluator;
pub mod orchestrator;
pub mod prompts;

/// Version tag stamped on every artifact and telemetry envelope.
pub const PIPELINE_VERSION: &str = "storyloom/0.1.0";
