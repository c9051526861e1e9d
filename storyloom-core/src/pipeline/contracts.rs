//! Data contracts between pipeline stages.
//!
//! Every record here is a plain serde struct with camelCase wire names;
//! stage outputs are validated on parse, never trusted as loose JSON.
//! Ownership is linear: the caller owns the request, each stage owns the
//! record it produces, and the caller owns the result once returned.

use crate::canon::StoryBible;
use crate::pipeline::PIPELINE_VERSION;
use crate::safety::{IntensityLevel, StyleSafetyConfig};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Minimum counts of concrete detail a draft must contain to pass
/// evaluation. Used only as a scoring threshold, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecificityBudget {
    pub sensory_details: u32,
    pub personal_details: u32,
    pub location_details: u32,
    pub artifact_details: u32,
}

impl Default for SpecificityBudget {
    /// The documented default: 6 sensory, 2 personal, 2 location, 1 artifact.
    fn default() -> Self {
        Self {
            sensory_details: 6,
            personal_details: 2,
            location_details: 2,
            artifact_details: 1,
        }
    }
}

/// An optional style fingerprint threaded into draft and rewrite prompts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceCard {
    /// Short description of the narrating voice.
    pub persona: String,
    /// Diction preferences, e.g. "plain Anglo-Saxon verbs".
    #[serde(default)]
    pub diction: Vec<String>,
    /// Words and constructions to avoid.
    #[serde(default)]
    pub avoid: Vec<String>,
}

/// Caller-owned input for one chapter run. Immutable once passed in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterPipelineRequest {
    pub brief: String,
    pub chapter_title: String,
    pub chapter_synopsis: String,
    #[serde(default)]
    pub specificity_budget: Option<SpecificityBudget>,
    #[serde(default)]
    pub style_safety: Option<StyleSafetyConfig>,
    #[serde(default)]
    pub story_bible: Option<StoryBible>,
    #[serde(default)]
    pub series_arcs: Vec<String>,
    #[serde(default)]
    pub voice_card: Option<VoiceCard>,
}

impl ChapterPipelineRequest {
    pub fn new(
        brief: impl Into<String>,
        chapter_title: impl Into<String>,
        chapter_synopsis: impl Into<String>,
    ) -> Self {
        Self {
            brief: brief.into(),
            chapter_title: chapter_title.into(),
            chapter_synopsis: chapter_synopsis.into(),
            specificity_budget: None,
            style_safety: None,
            story_bible: None,
            series_arcs: Vec::new(),
            voice_card: None,
        }
    }

    pub fn with_specificity_budget(mut self, budget: SpecificityBudget) -> Self {
        self.specificity_budget = Some(budget);
        self
    }

    pub fn with_style_safety(mut self, safety: StyleSafetyConfig) -> Self {
        self.style_safety = Some(safety);
        self
    }

    pub fn with_story_bible(mut self, bible: StoryBible) -> Self {
        self.story_bible = Some(bible);
        self
    }

    pub fn with_series_arcs(mut self, arcs: Vec<String>) -> Self {
        self.series_arcs = arcs;
        self
    }

    pub fn with_voice_card(mut self, voice: VoiceCard) -> Self {
        self.voice_card = Some(voice);
        self
    }
}

/// The brief interpreter's reading of the creative brief.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BriefInterpretation {
    pub genre: String,
    #[serde(default)]
    pub tropes: Vec<String>,
    pub tone: String,
    pub heat_level: IntensityLevel,
    /// Chapter word-count target.
    pub target_length: usize,
}

/// One planned unit of scene action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneBeat {
    pub summary: String,
    /// Tension on a 0-10 scale.
    pub tension: u8,
    /// The open question or pull this beat leaves behind.
    #[serde(default)]
    pub hook: Option<String>,
}

/// The ordered beat list produced by the scene planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenePlan {
    pub beats: Vec<SceneBeat>,
}

/// A problem the critic found in the draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriticFinding {
    #[serde(default)]
    pub category: String,
    pub description: String,
    #[serde(default)]
    pub excerpt: Option<String>,
}

/// One surgical edit for the rewrite pass to apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteInstruction {
    /// Where in the draft the edit applies, quoted or described.
    pub location: String,
    pub instruction: String,
}

/// Critic output: findings plus the ordered rewrite plan the rewrite
/// stage consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriticReport {
    #[serde(default)]
    pub findings: Vec<CriticFinding>,
    #[serde(default)]
    pub rewrite_plan: Vec<RewriteInstruction>,
}

/// Post-rewrite consistency check against the canon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinuityReport {
    pub pov_consistent: bool,
    pub timeline_consistent: bool,
    pub names_consistent: bool,
}

impl ContinuityReport {
    /// True only when every check passed.
    pub fn is_consistent(self) -> bool {
        self.pov_consistent && self.timeline_consistent && self.names_consistent
    }
}

/// One named, timestamped, version-tagged record of a stage's output.
///
/// The artifact log is append-only: one artifact per executed stage, in
/// call order, and it is the replayable history of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageArtifact {
    pub name: String,
    /// The stage's raw output text, before any parsing.
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub prompt_version: String,
}

impl StageArtifact {
    pub(crate) fn new(name: &str, content: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            content: content.into(),
            timestamp: Utc::now(),
            prompt_version: PIPELINE_VERSION.to_string(),
        }
    }
}

/// Heuristic scores for a finished draft, with the soft verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineScores {
    pub cliche_score: usize,
    pub specificity_count: usize,
    pub continuity_pass: bool,
    pub dialogue_ratio: f64,
    pub readability: f64,
    pub passed: bool,
    /// Human-readable reason for every failed check, in check order.
    pub failures: Vec<String>,
}

/// Per-run envelope for persisting and diffing pipeline behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Telemetry {
    pub pipeline_version: String,
    pub model: String,
    pub run_id: Uuid,
    /// Stage names in execution order.
    pub stages: Vec<String>,
    pub scores: PipelineScores,
    pub completed_at: DateTime<Utc>,
}

/// Terminal output of a run. Owned by the caller once returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterPipelineResult {
    pub artifacts: Vec<StageArtifact>,
    /// The canon after the story-state stage, for persistence.
    pub story_bible: StoryBible,
    pub scores: PipelineScores,
    pub final_draft: String,
    pub telemetry: Telemetry,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_budget() {
        let budget = SpecificityBudget::default();
        assert_eq!(budget.sensory_details, 6);
        assert_eq!(budget.personal_details, 2);
        assert_eq!(budget.location_details, 2);
        assert_eq!(budget.artifact_details, 1);
    }

    #[test]
    fn test_request_builder() {
        let request = ChapterPipelineRequest::new("brief", "title", "synopsis")
            .with_series_arcs(vec!["slow burn across the trilogy".to_string()])
            .with_voice_card(VoiceCard {
                persona: "dry coastal narrator".to_string(),
                diction: Vec::new(),
                avoid: Vec::new(),
            });

        assert_eq!(request.brief, "brief");
        assert_eq!(request.series_arcs.len(), 1);
        assert!(request.voice_card.is_some());
        assert!(request.specificity_budget.is_none());
    }

    #[test]
    fn test_continuity_consistency() {
        let clean = ContinuityReport {
            pov_consistent: true,
            timeline_consistent: true,
            names_consistent: true,
        };
        assert!(clean.is_consistent());

        let drifted = ContinuityReport {
            pov_consistent: false,
            ..clean
        };
        assert!(!drifted.is_consistent());
    }

    #[test]
    fn test_interpretation_parses_camel_case() {
        let json = r#"{
            "genre": "contemporary romance",
            "tropes": ["second chance"],
            "tone": "wistful",
            "heatLevel": "low",
            "targetLength": 2400
        }"#;

        let interp: BriefInterpretation = serde_json::from_str(json).unwrap();
        assert_eq!(interp.heat_level, IntensityLevel::Low);
        assert_eq!(interp.target_length, 2400);
    }

    #[test]
    fn test_critic_report_tolerates_missing_lists() {
        let report: CriticReport = serde_json::from_str("{}").unwrap();
        assert!(report.findings.is_empty());
        assert!(report.rewrite_plan.is_empty());
    }
}
