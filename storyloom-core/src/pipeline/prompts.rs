//! Stage prompt builders.
//!
//! One pure function per stage. Each builder takes only state produced
//! by earlier stages (or supplied in the original request) and returns a
//! fully configured [`CompletionRequest`]: messages, temperature, token
//! bound, and the structured-output flag, so decoding parameters live
//! next to the prompt they belong to.

use crate::canon::StoryBible;
use crate::pipeline::contracts::{
    BriefInterpretation, RewriteInstruction, ScenePlan, SpecificityBudget, VoiceCard,
};
use crate::safety::StyleSafetyConfig;
use completion::{CompletionRequest, Message};

/// Hard ceiling on draft output, in tokens.
const DRAFT_TOKEN_CEILING: usize = 6000;

/// Stage 1: reduce the creative brief to genre, tropes, tone, heat, and
/// a word-count target.
pub fn brief_interpretation(
    brief: &str,
    budget: &SpecificityBudget,
    safety: &StyleSafetyConfig,
) -> CompletionRequest {
    let mut system = String::new();
    system.push_str(
        "You are a development editor for serial fiction. Read the creative brief \
         and reduce it to a working interpretation for the chapter team.\n\n",
    );
    system.push_str("Respond with a single JSON object and nothing else:\n");
    system.push_str(
        "{\"genre\": \"...\", \"tropes\": [\"...\"], \"tone\": \"...\", \
         \"heatLevel\": \"none|low|medium|high\", \"targetLength\": 2400}\n",
    );
    system.push_str("targetLength is the chapter word count.\n\n");
    system.push_str(&render_budget(budget));
    system.push_str(&render_safety(safety));

    CompletionRequest::new(vec![Message::user(format!("Creative brief:\n{brief}"))])
        .with_system(system)
        .with_temperature(0.0)
        .structured()
}

/// Stage 2: load and update the story state for the upcoming chapter.
pub fn story_state_load(
    canon: &StoryBible,
    chapter_title: &str,
    chapter_synopsis: &str,
    series_arcs: &[String],
) -> CompletionRequest {
    let mut system = String::new();
    system.push_str(
        "You are the continuity keeper for an ongoing series. Given the story \
         bible so far and the chapter about to be written, return the updated \
         story bible: add any characters, world rules, or timeline entries this \
         chapter introduces or relies on. Return the complete bible, not a diff.\n\n",
    );
    system.push_str("Respond with a single JSON object and nothing else:\n");
    system.push_str(
        "{\"characters\": [{\"name\": \"...\", \"role\": \"...\", \"description\": \"...\", \
         \"traits\": [\"...\"]}], \"worldRules\": [\"...\"], \
         \"timeline\": [{\"when\": \"...\", \"event\": \"...\"}], \
         \"styleGuide\": {\"proseRules\": [\"...\"], \"tabooPhrases\": [\"...\"], \
         \"allowedMetaphors\": [\"...\"], \"pacingTargets\": [\"...\"]}}\n",
    );

    let mut context = render_canon(canon);
    context.push_str(&format!("\n## Upcoming Chapter\nTitle: {chapter_title}\n"));
    context.push_str(&format!("Synopsis: {chapter_synopsis}\n"));
    if !series_arcs.is_empty() {
        context.push_str("\n## Series Arcs\n");
        for arc in series_arcs {
            context.push_str(&format!("- {arc}\n"));
        }
    }

    CompletionRequest::new(vec![Message::user(context)])
        .with_system(system)
        .with_temperature(0.0)
        .structured()
}

/// Stage 3: plan the chapter as an ordered beat list.
pub fn scene_planning(
    interpretation: &BriefInterpretation,
    canon: &StoryBible,
    budget: &SpecificityBudget,
) -> CompletionRequest {
    let mut system = String::new();
    system.push_str(
        "You are a story architect. Plan the chapter as an ordered list of beats.\n\n",
    );
    system.push_str("Structural requirements:\n");
    system.push_str("- Between 10 and 20 beats.\n");
    system.push_str("- Each beat carries a tension value from 0 to 10; shape a rising curve.\n");
    system.push_str("- The second-to-last beat must end on an unresolved question.\n");
    system.push_str("- The final beat must end on an explicit decision.\n\n");
    system.push_str("Respond with a single JSON object and nothing else:\n");
    system.push_str(
        "{\"beats\": [{\"summary\": \"...\", \"tension\": 4, \"hook\": \"...\"}]}\n\n",
    );
    system.push_str(&render_budget(budget));

    let mut context = render_interpretation(interpretation);
    context.push_str(&render_canon(canon));

    CompletionRequest::new(vec![Message::user(context)])
        .with_system(system)
        .with_temperature(0.3)
        .structured()
}

/// Stage 4: draft the chapter prose from the scene plan.
pub fn draft_generation(
    plan: &ScenePlan,
    canon: &StoryBible,
    budget: &SpecificityBudget,
    voice: Option<&VoiceCard>,
    safety: &StyleSafetyConfig,
    target_length: usize,
) -> CompletionRequest {
    let mut system = String::new();
    system.push_str(
        "You are the drafting novelist. Write the chapter prose, following the \
         scene plan beat by beat. Output prose only: no headings, no beat \
         markers, no commentary.\n\n",
    );
    system.push_str(&format!("Target length: about {target_length} words.\n"));
    system.push_str(&render_budget(budget));
    system.push_str(&render_safety(safety));
    if let Some(voice) = voice {
        system.push_str(&render_voice(voice));
    }

    let mut context = render_plan(plan);
    context.push_str(&render_canon(canon));

    CompletionRequest::new(vec![Message::user(context)])
        .with_system(system)
        .with_temperature(0.65)
        .with_max_tokens(DRAFT_TOKEN_CEILING.min(target_length.saturating_mul(2)))
}

/// Stage 5: critique the draft and produce the surgical rewrite plan.
pub fn critique(
    draft: &str,
    budget: &SpecificityBudget,
    cliche_lexicon: &[String],
) -> CompletionRequest {
    let mut system = String::new();
    system.push_str(
        "You are a line editor. Identify concrete problems in the draft and turn \
         them into an ordered list of surgical edit instructions. Each \
         instruction names where it applies and exactly what to change.\n\n",
    );
    system.push_str("Respond with a single JSON object and nothing else:\n");
    system.push_str(
        "{\"findings\": [{\"category\": \"...\", \"description\": \"...\", \
         \"excerpt\": \"...\"}], \
         \"rewritePlan\": [{\"location\": \"...\", \"instruction\": \"...\"}]}\n\n",
    );
    system.push_str("Overused phrases to flag wherever they appear:\n");
    for phrase in cliche_lexicon {
        system.push_str(&format!("- {phrase}\n"));
    }
    system.push('\n');
    system.push_str(&render_budget(budget));

    CompletionRequest::new(vec![Message::user(format!("Draft:\n\n{draft}"))])
        .with_system(system)
        .with_temperature(0.2)
        .structured()
}

/// Stage 6: apply the critic's edits, and only those edits.
pub fn rewrite(
    draft: &str,
    plan: &[RewriteInstruction],
    voice: Option<&VoiceCard>,
    safety: &StyleSafetyConfig,
) -> CompletionRequest {
    let mut system = String::new();
    system.push_str(
        "You are performing a surgical edit. Apply only the numbered \
         instructions below to the draft. Do not regenerate, restructure, or \
         embellish anything the instructions do not touch. Return the full \
         revised chapter as prose only.\n\n",
    );
    system.push_str("Instructions:\n");
    for (i, instruction) in plan.iter().enumerate() {
        system.push_str(&format!(
            "{}. At {}: {}\n",
            i + 1,
            instruction.location,
            instruction.instruction
        ));
    }
    system.push('\n');
    system.push_str(&render_safety(safety));
    if let Some(voice) = voice {
        system.push_str(&render_voice(voice));
    }

    CompletionRequest::new(vec![Message::user(format!("Draft:\n\n{draft}"))])
        .with_system(system)
        .with_temperature(0.4)
        .with_max_tokens(DRAFT_TOKEN_CEILING)
}

/// Stage 7: check the rewritten draft against the canon.
pub fn continuity_validation(
    final_draft: &str,
    canon: &StoryBible,
    interpretation: &BriefInterpretation,
) -> CompletionRequest {
    let mut system = String::new();
    system.push_str(
        "You are a continuity checker. Verify the chapter against the story \
         bible: point of view stays consistent, events respect the timeline, \
         and every name matches the bible.\n\n",
    );
    system.push_str("Respond with a single JSON object and nothing else:\n");
    system.push_str(
        "{\"povConsistent\": true, \"timelineConsistent\": true, \"namesConsistent\": true}\n",
    );

    let mut context = render_interpretation(interpretation);
    context.push_str(&render_canon(canon));
    context.push_str(&format!("\n## Chapter\n\n{final_draft}\n"));

    CompletionRequest::new(vec![Message::user(context)])
        .with_system(system)
        .with_temperature(0.0)
        .structured()
}

// ============================================================================
// Context renderers
// ============================================================================

fn render_canon(canon: &StoryBible) -> String {
    let mut out = String::new();
    out.push_str("\n## Story Bible\n");

    if canon.characters.is_empty() {
        out.push_str("No established characters yet.\n");
    } else {
        out.push_str("### Characters\n");
        for character in &canon.characters {
            out.push_str(&format!("- {} ({})", character.name, character.role));
            if !character.description.is_empty() {
                out.push_str(&format!(": {}", character.description));
            }
            out.push('\n');
            if !character.traits.is_empty() {
                out.push_str(&format!("  traits: {}\n", character.traits.join(", ")));
            }
        }
    }

    if !canon.world_rules.is_empty() {
        out.push_str("### World Rules\n");
        for rule in &canon.world_rules {
            out.push_str(&format!("- {rule}\n"));
        }
    }

    if !canon.timeline.is_empty() {
        out.push_str("### Timeline\n");
        for event in &canon.timeline {
            out.push_str(&format!("- {}: {}\n", event.when, event.event));
        }
    }

    let guide = &canon.style_guide;
    if !guide.prose_rules.is_empty() {
        out.push_str("### Prose Rules\n");
        for rule in &guide.prose_rules {
            out.push_str(&format!("- {rule}\n"));
        }
    }
    if !guide.taboo_phrases.is_empty() {
        out.push_str("### Never Use These Phrases\n");
        for phrase in &guide.taboo_phrases {
            out.push_str(&format!("- {phrase}\n"));
        }
    }
    if !guide.allowed_metaphors.is_empty() {
        out.push_str(&format!(
            "Draw metaphors from: {}\n",
            guide.allowed_metaphors.join(", ")
        ));
    }
    if !guide.pacing_targets.is_empty() {
        out.push_str("### Pacing\n");
        for target in &guide.pacing_targets {
            out.push_str(&format!("- {target}\n"));
        }
    }

    out
}

fn render_budget(budget: &SpecificityBudget) -> String {
    format!(
        "Concrete-detail minimums: {} sensory, {} personal, {} location, {} artifact.\n",
        budget.sensory_details,
        budget.personal_details,
        budget.location_details,
        budget.artifact_details
    )
}

fn render_safety(safety: &StyleSafetyConfig) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Content limits: heat {}, violence {}, language {}.\n",
        safety.heat_level.as_str(),
        safety.violence_level.as_str(),
        safety.language_intensity.as_str()
    ));
    if !safety.forbidden_content.is_empty() {
        out.push_str(&format!(
            "Never include: {}.\n",
            safety.forbidden_content.join("; ")
        ));
    }
    if !safety.taboo_phrases.is_empty() {
        out.push_str(&format!(
            "Never use the phrases: {}.\n",
            safety.taboo_phrases.join("; ")
        ));
    }
    if !safety.allowed_metaphors.is_empty() {
        out.push_str(&format!(
            "Draw metaphors only from: {}.\n",
            safety.allowed_metaphors.join(", ")
        ));
    }
    out
}

fn render_voice(voice: &VoiceCard) -> String {
    let mut out = String::new();
    out.push_str(&format!("Voice: {}\n", voice.persona));
    if !voice.diction.is_empty() {
        out.push_str(&format!("Diction: {}\n", voice.diction.join("; ")));
    }
    if !voice.avoid.is_empty() {
        out.push_str(&format!("Avoid: {}\n", voice.avoid.join("; ")));
    }
    out
}

fn render_interpretation(interpretation: &BriefInterpretation) -> String {
    let mut out = String::new();
    out.push_str("## Interpreted Brief\n");
    out.push_str(&format!("Genre: {}\n", interpretation.genre));
    if !interpretation.tropes.is_empty() {
        out.push_str(&format!("Tropes: {}\n", interpretation.tropes.join(", ")));
    }
    out.push_str(&format!("Tone: {}\n", interpretation.tone));
    out.push_str(&format!("Heat: {}\n", interpretation.heat_level.as_str()));
    out.push_str(&format!(
        "Target length: {} words\n",
        interpretation.target_length
    ));
    out
}

fn render_plan(plan: &ScenePlan) -> String {
    let mut out = String::new();
    out.push_str("## Scene Plan\n");
    for (i, beat) in plan.beats.iter().enumerate() {
        out.push_str(&format!(
            "{}. (tension {}) {}",
            i + 1,
            beat.tension,
            beat.summary
        ));
        if let Some(ref hook) = beat.hook {
            out.push_str(&format!(" [hook: {hook}]"));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canon::build_canon;
    use crate::safety::{build_style_safety_config, IntensityLevel};

    fn sample_interpretation() -> BriefInterpretation {
        BriefInterpretation {
            genre: "contemporary romance".to_string(),
            tropes: vec!["second chance".to_string()],
            tone: "wistful".to_string(),
            heat_level: IntensityLevel::Low,
            target_length: 2000,
        }
    }

    #[test]
    fn test_brief_interpretation_is_deterministic_structured() {
        let request = brief_interpretation(
            "Second-chance romance on a night ferry",
            &SpecificityBudget::default(),
            &build_style_safety_config(None),
        );

        assert_eq!(request.temperature, Some(0.0));
        assert!(request.structured);
        assert!(request.messages[0].content.contains("night ferry"));
    }

    #[test]
    fn test_scene_planning_carries_structural_requirements() {
        let request = scene_planning(
            &sample_interpretation(),
            &build_canon(None),
            &SpecificityBudget::default(),
        );

        let system = request.system.unwrap();
        assert!(system.contains("Between 10 and 20 beats"));
        assert!(system.contains("unresolved question"));
        assert!(system.contains("explicit decision"));
        assert_eq!(request.temperature, Some(0.3));
    }

    #[test]
    fn test_draft_token_bound_tracks_target_length() {
        let plan = ScenePlan { beats: Vec::new() };
        let canon = build_canon(None);
        let budget = SpecificityBudget::default();
        let safety = build_style_safety_config(None);

        let short = draft_generation(&plan, &canon, &budget, None, &safety, 1000);
        assert_eq!(short.max_tokens, 2000);

        let long = draft_generation(&plan, &canon, &budget, None, &safety, 9000);
        assert_eq!(long.max_tokens, 6000);
    }

    #[test]
    fn test_critique_lists_lexicon() {
        let lexicon = vec!["time stood still".to_string()];
        let request = critique("draft text", &SpecificityBudget::default(), &lexicon);

        let system = request.system.unwrap();
        assert!(system.contains("time stood still"));
        assert_eq!(request.temperature, Some(0.2));
        assert!(request.structured);
    }

    #[test]
    fn test_rewrite_numbers_instructions() {
        let plan = vec![
            RewriteInstruction {
                location: "opening paragraph".to_string(),
                instruction: "cut the weather report".to_string(),
            },
            RewriteInstruction {
                location: "the kiss".to_string(),
                instruction: "slow the pacing".to_string(),
            },
        ];
        let request = rewrite("draft", &plan, None, &build_style_safety_config(None));

        let system = request.system.unwrap();
        assert!(system.contains("1. At opening paragraph: cut the weather report"));
        assert!(system.contains("2. At the kiss: slow the pacing"));
        assert!(!request.structured);
        assert_eq!(request.temperature, Some(0.4));
    }

    #[test]
    fn test_continuity_prompt_is_deterministic() {
        let request = continuity_validation("chapter", &build_canon(None), &sample_interpretation());
        assert_eq!(request.temperature, Some(0.0));
        assert!(request.structured);
        assert!(request.system.unwrap().contains("povConsistent"));
    }
}
