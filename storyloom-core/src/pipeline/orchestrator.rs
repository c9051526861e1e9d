//! Sequencing for the seven-stage chapter pipeline.
//!
//! The orchestrator holds no per-run state: each run threads its own
//! request and invoker through the stages strictly in order, appending
//! one artifact per stage. Any invoker or parse failure aborts the run
//! and discards the partial log; a failed evaluation does not.

use crate::canon::{build_canon, StoryBible};
use crate::pipeline::contracts::{
    BriefInterpretation, ChapterPipelineRequest, ChapterPipelineResult, ContinuityReport,
    CriticReport, ScenePlan, StageArtifact, Telemetry,
};
use crate::pipeline::evaluator::{evaluate_draft, EvaluationConfig};
use crate::pipeline::{prompts, PIPELINE_VERSION};
use crate::safety::build_style_safety_config;
use chrono::Utc;
use completion::{CompletionInvoker, CompletionRequest, Error as CompletionError};
use serde::de::DeserializeOwned;
use thiserror::Error;
use uuid::Uuid;

/// Stages of the chapter pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    BriefInterpreter,
    StoryStateLoader,
    ScenePlanner,
    DraftGenerator,
    CriticEditor,
    RewritePass,
    ContinuityValidator,
}

impl Stage {
    /// Execution order; the artifact log follows this exactly.
    pub const ALL: [Stage; 7] = [
        Stage::BriefInterpreter,
        Stage::StoryStateLoader,
        Stage::ScenePlanner,
        Stage::DraftGenerator,
        Stage::CriticEditor,
        Stage::RewritePass,
        Stage::ContinuityValidator,
    ];

    /// The stage's artifact name.
    pub fn name(self) -> &'static str {
        match self {
            Stage::BriefInterpreter => "brief-interpreter",
            Stage::StoryStateLoader => "story-state-loader",
            Stage::ScenePlanner => "scene-planner",
            Stage::DraftGenerator => "draft-generator",
            Stage::CriticEditor => "critic-editor",
            Stage::RewritePass => "rewrite-pass",
            Stage::ContinuityValidator => "continuity-validator",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors that abort a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The completion invoker failed; forwarded unchanged.
    #[error(transparent)]
    Invoker(#[from] CompletionError),

    /// A stage promising structured output returned text that does not
    /// parse into the stage's contract.
    #[error("malformed {stage} output: {source}")]
    MalformedStageOutput {
        stage: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Configuration for a pipeline instance.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Model identifier forwarded to the invoker and into telemetry.
    pub model: String,
    /// Lexicons and thresholds for the evaluation gate.
    pub evaluation: EvaluationConfig,
}

impl PipelineConfig {
    /// Configuration with the documented default evaluation gate.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            evaluation: EvaluationConfig::default(),
        }
    }

    pub fn with_evaluation(mut self, evaluation: EvaluationConfig) -> Self {
        self.evaluation = evaluation;
        self
    }
}

/// The chapter pipeline.
///
/// One instance can serve concurrent runs, provided each run supplies
/// its own request and invoker.
pub struct ChapterPipeline {
    config: PipelineConfig,
}

impl ChapterPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run all seven model-backed stages plus the local evaluation gate.
    ///
    /// A draft that fails evaluation still returns `Ok` with
    /// `scores.passed == false`; only invoker and parse failures abort.
    pub async fn run(
        &self,
        invoker: &dyn CompletionInvoker,
        request: &ChapterPipelineRequest,
    ) -> Result<ChapterPipelineResult, PipelineError> {
        let run_id = Uuid::new_v4();
        tracing::debug!(%run_id, model = %self.config.model, "chapter pipeline starting");

        let budget = request.specificity_budget.clone().unwrap_or_default();
        let safety = build_style_safety_config(request.style_safety.clone());
        let seed_canon = build_canon(request.story_bible.clone());

        let mut artifacts: Vec<StageArtifact> = Vec::new();

        let interpretation: BriefInterpretation = self
            .structured_stage(
                invoker,
                Stage::BriefInterpreter,
                prompts::brief_interpretation(&request.brief, &budget, &safety),
                &mut artifacts,
            )
            .await?;

        // The single point where the canon can change shape.
        let canon: StoryBible = self
            .structured_stage(
                invoker,
                Stage::StoryStateLoader,
                prompts::story_state_load(
                    &seed_canon,
                    &request.chapter_title,
                    &request.chapter_synopsis,
                    &request.series_arcs,
                ),
                &mut artifacts,
            )
            .await?;

        let plan: ScenePlan = self
            .structured_stage(
                invoker,
                Stage::ScenePlanner,
                prompts::scene_planning(&interpretation, &canon, &budget),
                &mut artifacts,
            )
            .await?;

        let draft = self
            .prose_stage(
                invoker,
                Stage::DraftGenerator,
                prompts::draft_generation(
                    &plan,
                    &canon,
                    &budget,
                    request.voice_card.as_ref(),
                    &safety,
                    interpretation.target_length,
                ),
                &mut artifacts,
            )
            .await?;

        let critique: CriticReport = self
            .structured_stage(
                invoker,
                Stage::CriticEditor,
                prompts::critique(&draft, &budget, &self.config.evaluation.cliche_lexicon),
                &mut artifacts,
            )
            .await?;

        let final_draft = self
            .prose_stage(
                invoker,
                Stage::RewritePass,
                prompts::rewrite(
                    &draft,
                    &critique.rewrite_plan,
                    request.voice_card.as_ref(),
                    &safety,
                ),
                &mut artifacts,
            )
            .await?;

        let continuity: ContinuityReport = self
            .structured_stage(
                invoker,
                Stage::ContinuityValidator,
                prompts::continuity_validation(&final_draft, &canon, &interpretation),
                &mut artifacts,
            )
            .await?;

        let scores = evaluate_draft(
            &final_draft,
            &plan,
            &continuity,
            &budget,
            &self.config.evaluation,
        );
        if !scores.passed {
            tracing::warn!(
                %run_id,
                failures = scores.failures.len(),
                "draft did not meet the evaluation bar"
            );
        }

        let telemetry = Telemetry {
            pipeline_version: PIPELINE_VERSION.to_string(),
            model: self.config.model.clone(),
            run_id,
            stages: artifacts.iter().map(|a| a.name.clone()).collect(),
            scores: scores.clone(),
            completed_at: Utc::now(),
        };

        Ok(ChapterPipelineResult {
            artifacts,
            story_bible: canon,
            scores,
            final_draft,
            telemetry,
        })
    }

    /// Run one structured stage: invoke, log the raw reply, parse it
    /// into the stage contract.
    async fn structured_stage<T: DeserializeOwned>(
        &self,
        invoker: &dyn CompletionInvoker,
        stage: Stage,
        prompt: CompletionRequest,
        artifacts: &mut Vec<StageArtifact>,
    ) -> Result<T, PipelineError> {
        let raw = self.invoke(invoker, stage, prompt).await?;
        let parsed = parse_stage_output(stage, &raw)?;
        artifacts.push(StageArtifact::new(stage.name(), raw));
        Ok(parsed)
    }

    /// Run one prose stage; the trimmed reply is the stage output.
    async fn prose_stage(
        &self,
        invoker: &dyn CompletionInvoker,
        stage: Stage,
        prompt: CompletionRequest,
        artifacts: &mut Vec<StageArtifact>,
    ) -> Result<String, PipelineError> {
        let raw = self.invoke(invoker, stage, prompt).await?;
        let text = raw.trim().to_string();
        artifacts.push(StageArtifact::new(stage.name(), raw));
        Ok(text)
    }

    async fn invoke(
        &self,
        invoker: &dyn CompletionInvoker,
        stage: Stage,
        prompt: CompletionRequest,
    ) -> Result<String, PipelineError> {
        tracing::debug!(stage = stage.name(), "invoking completion");
        Ok(invoker.complete(prompt.with_model(&self.config.model)).await?)
    }
}

/// Run the chapter pipeline with the default configuration.
pub async fn run_chapter_pipeline(
    invoker: &dyn CompletionInvoker,
    request: &ChapterPipelineRequest,
    model_id: &str,
) -> Result<ChapterPipelineResult, PipelineError> {
    ChapterPipeline::new(PipelineConfig::new(model_id))
        .run(invoker, request)
        .await
}

/// Parse a structured stage reply, tolerating a fenced code block around
/// the JSON object.
fn parse_stage_output<T: DeserializeOwned>(stage: Stage, raw: &str) -> Result<T, PipelineError> {
    serde_json::from_str(extract_json(raw)).map_err(|source| PipelineError::MalformedStageOutput {
        stage: stage.name(),
        source,
    })
}

fn extract_json(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order_and_names() {
        let names: Vec<&str> = Stage::ALL.iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            vec![
                "brief-interpreter",
                "story-state-loader",
                "scene-planner",
                "draft-generator",
                "critic-editor",
                "rewrite-pass",
                "continuity-validator",
            ]
        );
    }

    #[test]
    fn test_extract_json_handles_fences() {
        assert_eq!(extract_json("{\"a\": 1}"), "{\"a\": 1}");
        assert_eq!(extract_json("  {\"a\": 1}\n"), "{\"a\": 1}");
        assert_eq!(extract_json("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(extract_json("```\n{\"a\": 1}\n```"), "{\"a\": 1}");
    }

    #[test]
    fn test_parse_failure_names_the_stage() {
        let result: Result<ContinuityReport, PipelineError> =
            parse_stage_output(Stage::ContinuityValidator, "not json at all");

        match result {
            Err(PipelineError::MalformedStageOutput { stage, .. }) => {
                assert_eq!(stage, "continuity-validator");
            }
            other => panic!("expected malformed stage output, got {other:?}"),
        }
    }
}
