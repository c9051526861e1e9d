//! Deterministic scoring gate for finished drafts.
//!
//! [`evaluate_draft`] is a pure function: identical inputs always yield
//! identical [`PipelineScores`], including the order of `failures`. A
//! failed evaluation is a normal result, not an error; the caller
//! decides whether to retry the whole pipeline or accept the draft.

use crate::pipeline::contracts::{ContinuityReport, PipelineScores, ScenePlan, SpecificityBudget};

/// Overused romance-prose phrases counted by the cliché check.
pub const DEFAULT_CLICHE_LEXICON: [&str; 10] = [
    "heart skipped a beat",
    "breath she didn't know she was holding",
    "breath he didn't know he was holding",
    "electricity coursed through",
    "butterflies in her stomach",
    "weak in the knees",
    "shivers down her spine",
    "lost in his eyes",
    "time stood still",
    "fire in her veins",
];

/// Concrete-detail nouns counted by the specificity check.
pub const DEFAULT_SPECIFICITY_MARKERS: [&str; 12] = [
    "scent",
    "texture",
    "temperature",
    "scar",
    "habit",
    "tattoo",
    "detail",
    "brand",
    "callus",
    "freckle",
    "fabric",
    "perfume",
];

/// Lexicons and thresholds for the evaluation gate.
///
/// The orchestrator supplies [`EvaluationConfig::default`] unless the
/// caller injects its own.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationConfig {
    pub cliche_lexicon: Vec<String>,
    pub specificity_markers: Vec<String>,
    /// Highest tolerated cliché occurrence sum.
    pub max_cliche_hits: usize,
    /// Fewest beats a scene plan may cover.
    pub min_beats: usize,
    /// Closed dialogue-ratio interval.
    pub dialogue_ratio_floor: f64,
    pub dialogue_ratio_ceiling: f64,
    /// Closed mean-sentence-length interval, in words.
    pub min_sentence_length: f64,
    pub max_sentence_length: f64,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            cliche_lexicon: DEFAULT_CLICHE_LEXICON
                .iter()
                .map(|p| p.to_string())
                .collect(),
            specificity_markers: DEFAULT_SPECIFICITY_MARKERS
                .iter()
                .map(|m| m.to_string())
                .collect(),
            max_cliche_hits: 2,
            min_beats: 8,
            dialogue_ratio_floor: 0.15,
            dialogue_ratio_ceiling: 0.55,
            min_sentence_length: 8.0,
            max_sentence_length: 28.0,
        }
    }
}

/// Score the final draft against the plan, continuity report, and budget.
pub fn evaluate_draft(
    final_text: &str,
    scene_plan: &ScenePlan,
    continuity: &ContinuityReport,
    budget: &SpecificityBudget,
    config: &EvaluationConfig,
) -> PipelineScores {
    let lowered = final_text.to_lowercase();

    let cliche_score: usize = config
        .cliche_lexicon
        .iter()
        .map(|phrase| lowered.matches(phrase.to_lowercase().as_str()).count())
        .sum();

    let specificity_count = count_marker_tokens(&lowered, &config.specificity_markers);
    let required_specificity = (budget.sensory_details + budget.personal_details) as usize;

    let sentences: Vec<&str> = final_text
        .split(['.', '!', '?'])
        .filter(|s| !s.trim().is_empty())
        .collect();
    let sentence_count = sentences.len();

    let quote_pairs = final_text.matches('"').count() / 2;
    let dialogue_ratio = if sentence_count == 0 {
        0.0
    } else {
        quote_pairs as f64 / sentence_count as f64
    };

    let readability = if sentence_count == 0 {
        0.0
    } else {
        let total_words: usize = sentences.iter().map(|s| s.split_whitespace().count()).sum();
        total_words as f64 / sentence_count as f64
    };

    let beat_count = scene_plan.beats.len();
    let continuity_pass = continuity.is_consistent();

    // Check order is fixed; `failures` must preserve it.
    let mut failures = Vec::new();

    if cliche_score > config.max_cliche_hits {
        failures.push(format!(
            "cliche score {cliche_score} exceeds limit {}",
            config.max_cliche_hits
        ));
    }

    if specificity_count < required_specificity {
        failures.push(format!(
            "specificity count {specificity_count} below required {required_specificity}"
        ));
    }

    if beat_count < config.min_beats {
        failures.push(format!(
            "scene plan covers {beat_count} beats, minimum is {}",
            config.min_beats
        ));
    }

    if !continuity_pass {
        let mut broken = Vec::new();
        if !continuity.pov_consistent {
            broken.push("pov");
        }
        if !continuity.timeline_consistent {
            broken.push("timeline");
        }
        if !continuity.names_consistent {
            broken.push("names");
        }
        failures.push(format!("continuity check failed: {}", broken.join(", ")));
    }

    if dialogue_ratio < config.dialogue_ratio_floor || dialogue_ratio > config.dialogue_ratio_ceiling
    {
        failures.push(format!(
            "dialogue ratio {dialogue_ratio:.2} outside {:.2}..{:.2}",
            config.dialogue_ratio_floor, config.dialogue_ratio_ceiling
        ));
    }

    if readability < config.min_sentence_length || readability > config.max_sentence_length {
        failures.push(format!(
            "average sentence length {readability:.1} outside {:.0}..{:.0}",
            config.min_sentence_length, config.max_sentence_length
        ));
    }

    let passed = failures.is_empty();

    PipelineScores {
        cliche_score,
        specificity_count,
        continuity_pass,
        dialogue_ratio,
        readability,
        passed,
        failures,
    }
}

/// Count words in the lowercased text matching any marker, singular or
/// plural.
fn count_marker_tokens(lowered: &str, markers: &[String]) -> usize {
    lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .filter(|word| {
            markers.iter().any(|marker| {
                let marker = marker.as_str();
                *word == marker || word.strip_suffix('s') == Some(marker)
            })
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::contracts::SceneBeat;
    use crate::testing::sample_passing_draft;

    fn plan_with_beats(count: usize) -> ScenePlan {
        ScenePlan {
            beats: (0..count)
                .map(|i| SceneBeat {
                    summary: format!("beat {i}"),
                    tension: 5,
                    hook: None,
                })
                .collect(),
        }
    }

    fn clean_report() -> ContinuityReport {
        ContinuityReport {
            pov_consistent: true,
            timeline_consistent: true,
            names_consistent: true,
        }
    }

    #[test]
    fn test_passing_draft_passes() {
        let scores = evaluate_draft(
            &sample_passing_draft(),
            &plan_with_beats(12),
            &clean_report(),
            &SpecificityBudget::default(),
            &EvaluationConfig::default(),
        );

        assert!(scores.passed, "unexpected failures: {:?}", scores.failures);
        assert!(scores.failures.is_empty());
        assert_eq!(scores.cliche_score, 0);
        assert!(scores.specificity_count >= 8);
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let text = sample_passing_draft();
        let plan = plan_with_beats(9);
        let report = clean_report();
        let budget = SpecificityBudget::default();
        let config = EvaluationConfig::default();

        let first = evaluate_draft(&text, &plan, &report, &budget, &config);
        let second = evaluate_draft(&text, &plan, &report, &budget, &config);
        assert_eq!(first, second);
    }

    #[test]
    fn test_three_cliche_hits_fail() {
        let mut text = sample_passing_draft();
        text.push_str(
            " Her heart skipped a beat. Again her Heart Skipped A Beat. \
             And once more her heart skipped a beat.",
        );

        let scores = evaluate_draft(
            &text,
            &plan_with_beats(12),
            &clean_report(),
            &SpecificityBudget::default(),
            &EvaluationConfig::default(),
        );

        assert_eq!(scores.cliche_score, 3);
        assert!(!scores.passed);
        assert!(scores.failures.iter().any(|f| f.contains("cliche")));
    }

    #[test]
    fn test_seven_beats_fail_coverage() {
        let scores = evaluate_draft(
            &sample_passing_draft(),
            &plan_with_beats(7),
            &clean_report(),
            &SpecificityBudget::default(),
            &EvaluationConfig::default(),
        );

        assert!(!scores.passed);
        assert!(scores.failures.iter().any(|f| f.contains("beats")));
    }

    #[test]
    fn test_single_continuity_flag_fails_run() {
        let report = ContinuityReport {
            pov_consistent: false,
            timeline_consistent: true,
            names_consistent: true,
        };

        let scores = evaluate_draft(
            &sample_passing_draft(),
            &plan_with_beats(12),
            &report,
            &SpecificityBudget::default(),
            &EvaluationConfig::default(),
        );

        assert!(!scores.continuity_pass);
        assert!(!scores.passed);
        assert!(scores
            .failures
            .iter()
            .any(|f| f.contains("continuity check failed: pov")));
    }

    #[test]
    fn test_zero_dialogue_fails() {
        let text = sample_passing_draft().replace('"', "");

        let scores = evaluate_draft(
            &text,
            &plan_with_beats(12),
            &clean_report(),
            &SpecificityBudget::default(),
            &EvaluationConfig::default(),
        );

        assert_eq!(scores.dialogue_ratio, 0.0);
        assert!(scores.failures.iter().any(|f| f.contains("dialogue ratio")));
    }

    #[test]
    fn test_dialogue_ratio_lower_bound_is_inclusive() {
        // 20 sentences, 3 quote pairs: ratio exactly 0.15.
        let mut text = String::new();
        for i in 0..20 {
            if i < 3 {
                text.push_str("\"We hold the line tonight,\" the captain said to the tired crew. ");
            } else {
                text.push_str("The crew worked the ropes in silence under a heavy winter sky. ");
            }
        }

        let scores = evaluate_draft(
            &text,
            &plan_with_beats(12),
            &clean_report(),
            &SpecificityBudget::default(),
            &EvaluationConfig::default(),
        );

        assert_eq!(scores.dialogue_ratio, 0.15);
        assert!(!scores.failures.iter().any(|f| f.contains("dialogue ratio")));
    }

    #[test]
    fn test_run_on_prose_fails_readability() {
        let long_sentence = "and the harbor ".repeat(15);
        let text = format!("She watched the water {long_sentence}until morning.");

        let scores = evaluate_draft(
            &text,
            &plan_with_beats(12),
            &clean_report(),
            &SpecificityBudget::default(),
            &EvaluationConfig::default(),
        );

        assert!(scores.readability > 28.0);
        assert!(scores
            .failures
            .iter()
            .any(|f| f.contains("average sentence length")));
    }

    #[test]
    fn test_sparse_draft_fails_specificity() {
        let text = "\"Hello there, old friend of mine,\" she said across the narrow table. \
                    He nodded at her slowly and poured two cups of black coffee. \
                    They sat together while the rain kept falling on the tin roof. \
                    Neither of them wanted to be the first one to speak plainly. \
                    The evening settled around them like a quiet unwelcome guest at dinner. \
                    \"Stay a while longer,\" he said at last across the table.";

        let scores = evaluate_draft(
            text,
            &plan_with_beats(12),
            &clean_report(),
            &SpecificityBudget::default(),
            &EvaluationConfig::default(),
        );

        assert!(scores.specificity_count < 8);
        assert!(scores.failures.iter().any(|f| f.contains("specificity")));
    }

    #[test]
    fn test_failures_preserve_check_order() {
        // A draft that trips every check at once.
        let text = "Her heart skipped a beat and her heart skipped a beat and \
                    her heart skipped a beat as the endless grey evening went on and on \
                    over the water without any pause or relief or punctuation to speak of \
                    while the town slept and nothing at all happened anywhere near her";

        let report = ContinuityReport {
            pov_consistent: false,
            timeline_consistent: false,
            names_consistent: true,
        };

        let scores = evaluate_draft(
            text,
            &plan_with_beats(3),
            &report,
            &SpecificityBudget::default(),
            &EvaluationConfig::default(),
        );

        assert!(!scores.passed);
        let order: Vec<&str> = scores
            .failures
            .iter()
            .map(|f| f.split_whitespace().next().unwrap())
            .collect();
        assert_eq!(
            order,
            vec![
                "cliche",
                "specificity",
                "scene",
                "continuity",
                "dialogue",
                "average"
            ]
        );
    }

    #[test]
    fn test_marker_plurals_count() {
        let lowered = "two scars and one scar and the scent of fabric";
        let markers: Vec<String> = vec!["scar".to_string(), "scent".to_string()];
        assert_eq!(count_marker_tokens(lowered, &markers), 3);
    }
}
