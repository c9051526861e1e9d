//! Story bible ("canon") data model.
//!
//! The canon is the cross-chapter source of truth: characters, world
//! rules, timeline, and the style guide every draft is written against.
//! The caller may supply one; otherwise [`build_canon`] provides the
//! default so every stage has a canonical state to reference.

use serde::{Deserialize, Serialize};

/// A character known to the canon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub name: String,
    /// Narrative role, e.g. "protagonist" or "love interest".
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub traits: Vec<String>,
}

/// One ordered entry in the canon timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEvent {
    /// When the event happened, in story terms ("three weeks ago").
    pub when: String,
    pub event: String,
}

/// Prose and pacing rules drafts must follow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleGuide {
    #[serde(default)]
    pub prose_rules: Vec<String>,
    #[serde(default)]
    pub taboo_phrases: Vec<String>,
    #[serde(default)]
    pub allowed_metaphors: Vec<String>,
    #[serde(default)]
    pub pacing_targets: Vec<String>,
}

/// The canonical story state threaded through every pipeline stage.
///
/// The story-state stage may replace this wholesale; the replacement
/// becomes the canon for all remaining stages and is returned to the
/// caller for persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryBible {
    #[serde(default)]
    pub characters: Vec<Character>,
    #[serde(default)]
    pub world_rules: Vec<String>,
    #[serde(default)]
    pub timeline: Vec<TimelineEvent>,
    #[serde(default)]
    pub style_guide: StyleGuide,
}

/// Return the caller's canon untouched, or the default story bible when
/// none was supplied. Caller-supplied canons are trusted verbatim.
pub fn build_canon(existing: Option<StoryBible>) -> StoryBible {
    existing.unwrap_or_else(default_canon)
}

fn default_canon() -> StoryBible {
    StoryBible {
        characters: Vec::new(),
        world_rules: Vec::new(),
        timeline: Vec::new(),
        style_guide: StyleGuide {
            prose_rules: vec![
                "favor concrete sensory detail over abstraction".to_string(),
                "vary sentence length; break up runs of long sentences".to_string(),
                "hold one point of view per scene".to_string(),
            ],
            taboo_phrases: Vec::new(),
            allowed_metaphors: Vec::new(),
            pacing_targets: vec![
                "hook inside the first 150 words".to_string(),
                "a scene turn every 600-900 words".to_string(),
            ],
        },
    }
}
