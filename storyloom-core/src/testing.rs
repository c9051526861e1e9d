//! Testing utilities for the chapter pipeline.
//!
//! This module provides:
//! - `ScriptedInvoker` for deterministic pipeline runs without API calls
//! - Canned stage payloads and a draft that clears the evaluation gate

use async_trait::async_trait;
use completion::{CompletionInvoker, CompletionRequest, Error};
use std::collections::VecDeque;
use std::sync::Mutex;

/// A completion invoker that replays scripted responses.
///
/// Responses are returned in queue order, one per `complete` call, and
/// every request received is recorded so tests can assert on per-stage
/// prompts and decoding options. When the queue runs dry it returns a
/// configuration error rather than inventing output.
pub struct ScriptedInvoker {
    responses: Mutex<VecDeque<Result<String, Error>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedInvoker {
    /// Create an invoker with an empty script.
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful response.
    pub fn respond(self, text: impl Into<String>) -> Self {
        self.responses
            .lock()
            .expect("scripted invoker poisoned")
            .push_back(Ok(text.into()));
        self
    }

    /// Queue a failure.
    pub fn fail(self, error: Error) -> Self {
        self.responses
            .lock()
            .expect("scripted invoker poisoned")
            .push_back(Err(error));
        self
    }

    /// Every request received so far, in call order.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .expect("scripted invoker poisoned")
            .clone()
    }

    /// Number of `complete` calls received so far.
    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .expect("scripted invoker poisoned")
            .len()
    }
}

impl Default for ScriptedInvoker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionInvoker for ScriptedInvoker {
    async fn complete(&self, request: CompletionRequest) -> Result<String, Error> {
        self.requests
            .lock()
            .expect("scripted invoker poisoned")
            .push(request);

        match self
            .responses
            .lock()
            .expect("scripted invoker poisoned")
            .pop_front()
        {
            Some(result) => result,
            None => Err(Error::Config(
                "scripted invoker has no queued responses left".to_string(),
            )),
        }
    }
}

// ============================================================================
// Canned stage payloads
// ============================================================================

/// A brief interpretation the pipeline can parse.
pub fn sample_interpretation_json() -> String {
    r#"{
        "genre": "contemporary romance",
        "tropes": ["second chance", "forced proximity"],
        "tone": "wistful",
        "heatLevel": "low",
        "targetLength": 2000
    }"#
    .to_string()
}

/// A story bible that introduces two characters and a timeline entry.
pub fn sample_bible_json() -> String {
    r#"{
        "characters": [
            {"name": "Maren", "role": "protagonist", "description": "harbor pilot", "traits": ["guarded"]},
            {"name": "Ilya", "role": "love interest", "description": "returned cartographer"}
        ],
        "worldRules": ["the ferry only runs at night"],
        "timeline": [{"when": "last spring", "event": "the broken engagement"}],
        "styleGuide": {
            "proseRules": ["close third person on Maren"],
            "tabooPhrases": [],
            "allowedMetaphors": ["tide", "weather"],
            "pacingTargets": ["hook inside the first 150 words"]
        }
    }"#
    .to_string()
}

/// A scene plan with the requested number of beats.
pub fn sample_plan_json(beat_count: usize) -> String {
    let beats: Vec<String> = (0..beat_count)
        .map(|i| {
            format!(
                "{{\"summary\": \"beat {}\", \"tension\": {}, \"hook\": \"what next\"}}",
                i + 1,
                (i % 10) + 1
            )
        })
        .collect();
    format!("{{\"beats\": [{}]}}", beats.join(", "))
}

/// A critic report with one finding and one rewrite instruction.
pub fn sample_critic_json() -> String {
    r#"{
        "findings": [
            {"category": "pacing", "description": "the reunion lands too fast", "excerpt": "You came back"}
        ],
        "rewritePlan": [
            {"location": "the reunion", "instruction": "add one beat of hesitation before Ilya speaks"}
        ]
    }"#
    .to_string()
}

/// A continuity report with the given flags.
pub fn sample_continuity_json(pov: bool, timeline: bool, names: bool) -> String {
    format!(
        "{{\"povConsistent\": {pov}, \"timelineConsistent\": {timeline}, \"namesConsistent\": {names}}}"
    )
}

/// A short chapter that clears every evaluation check against the
/// default budget: enough concrete detail, balanced dialogue, readable
/// sentences, no lexicon phrases.
pub fn sample_passing_draft() -> String {
    "Maren counted the scars on the railing while the ferry groaned beneath her boots. \
     The wind off the harbor carried a scent of diesel, salt, and cold iron. \
     \"You came back,\" Ilya said, weighing the words like contraband. \
     His coat had a texture like wet slate, and the temperature of the cabin dropped when he closed the door. \
     She noticed the habit he had of tapping the brass key twice before speaking. \
     A gull screamed somewhere above the fog line, and the deck lamps flickered once. \
     \"Three weeks,\" she answered, tracing the tattoo of a compass rose inside her wrist. \
     The fabric of her coat still smelled faintly of the perfume from the capital. \
     Every detail of the old arrangement mattered now, down to the chipped enamel mug. \
     He poured the coffee and waited for her to decide what they both already knew."
        .to_string()
}
