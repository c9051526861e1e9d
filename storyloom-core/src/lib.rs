//! Deterministic multi-stage chapter generation pipeline.
//!
//! This crate turns a high-level creative brief into a validated, scored
//! prose chapter:
//! - Seven model-backed stages with explicit typed contracts between them
//! - An append-only artifact log, the replayable record of each run
//! - A local, deterministic evaluation gate with enumerated failure reasons
//!
//! The surrounding application (storage, UI, export) stays outside: the
//! pipeline consumes a request, calls a caller-supplied completion
//! invoker, and returns a result.
//!
//! # Quick Start
//!
//! ```ignore
//! use completion::Claude;
//! use storyloom_core::{run_chapter_pipeline, ChapterPipelineRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let invoker = Claude::from_env()?;
//!     let request = ChapterPipelineRequest::new(
//!         "Second-chance romance aboard a night ferry",
//!         "Chapter 3: The Crossing",
//!         "Maren and Ilya are stuck on the last crossing of the season.",
//!     );
//!
//!     let result = run_chapter_pipeline(&invoker, &request, "claude-sonnet-4-20250514").await?;
//!     println!("passed: {}", result.scores.passed);
//!     Ok(())
//! }
//! ```

pub mod canon;
pub mod pipeline;
pub mod safety;
pub mod testing;

// Primary public API
pub use canon::{build_canon, Character, StoryBible, StyleGuide, TimelineEvent};
pub use pipeline::contracts::{
    BriefInterpretation, ChapterPipelineRequest, ChapterPipelineResult, ContinuityReport,
    CriticFinding, CriticReport, PipelineScores, RewriteInstruction, SceneBeat, ScenePlan,
    SpecificityBudget, StageArtifact, Telemetry, VoiceCard,
};
pub use pipeline::evaluator::{
    evaluate_draft, EvaluationConfig, DEFAULT_CLICHE_LEXICON, DEFAULT_SPECIFICITY_MARKERS,
};
pub use pipeline::orchestrator::{
    run_chapter_pipeline, ChapterPipeline, PipelineConfig, PipelineError, Stage,
};
pub use pipeline::PIPELINE_VERSION;
pub use safety::{build_style_safety_config, IntensityLevel, StyleSafetyConfig};
pub use testing::ScriptedInvoker;
