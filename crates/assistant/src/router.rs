//! Command interception.
//!
//! Before any model call, an utterance is checked against keyword rules.
//! Matching is case-insensitive substring search and the first rule that
//! matches wins:
//!
//! | Priority | Keywords | Decision |
//! |----------|----------|----------|
//! | 1 | `sos` (as a word), `call for help`, `send help`, `emergency alert` | [`RouteDecision::SosCommand`] |
//! | 2 | `play`, `music`, `song` | [`RouteDecision::MusicCommand`] |
//! | 3 | `light` | lights |
//! | 4 | `door`, `lock` | doors |
//! | 5 | `engine`, `ignition` | engine |
//! | - | anything else | [`RouteDecision::Forward`] |
//!
//! Keywords overlap ("off" is both lights-off and engine-stop); rule order
//! decides. SOS triggers are never taken from an informational question
//! ("what does SOS stand for?"), so those fall through to the later rules.

use serde::{Deserialize, Serialize};

/// One of the three remotely controlled devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subsystem {
    Lights,
    Doors,
    Engine,
}

impl std::fmt::Display for Subsystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Subsystem::Lights => write!(f, "lights"),
            Subsystem::Doors => write!(f, "doors"),
            Subsystem::Engine => write!(f, "engine"),
        }
    }
}

/// Where an utterance goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RouteDecision {
    /// Send to the language model.
    Forward,
    MusicCommand { query: String },
    /// `action` is the whole utterance, lowercased.
    VehicleCommand { subsystem: Subsystem, action: String },
    SosCommand,
}

impl RouteDecision {
    pub fn is_command(&self) -> bool {
        !matches!(self, RouteDecision::Forward)
    }
}

const SOS_PHRASES: &[&str] = &["call for help", "send help", "emergency alert"];
/// Leading words that make an utterance a question about SOS rather than a
/// request for one. Modal openers ("can", "could") stay requests.
const QUESTION_OPENERS: &[&str] = &[
    "what", "whats", "how", "why", "when", "where", "who", "which", "does", "do", "is", "are",
];
const MUSIC_KEYWORDS: &[&str] = &["play", "music", "song"];
const LIGHT_KEYWORDS: &[&str] = &["light"];
const DOOR_KEYWORDS: &[&str] = &["door", "lock"];
const ENGINE_KEYWORDS: &[&str] = &["engine", "ignition"];

/// Stateless keyword router.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandRouter;

impl CommandRouter {
    pub fn new() -> Self {
        Self
    }

    pub fn route(&self, utterance: &str) -> RouteDecision {
        // ASCII lowering keeps byte offsets aligned with `utterance`.
        let folded = utterance.to_ascii_lowercase();
        let contains_any = |keywords: &[&str]| keywords.iter().any(|k| folded.contains(k));

        if is_sos(&folded) {
            return RouteDecision::SosCommand;
        }
        if contains_any(MUSIC_KEYWORDS) {
            return RouteDecision::MusicCommand {
                query: music_query(utterance, &folded),
            };
        }

        let subsystem = if contains_any(LIGHT_KEYWORDS) {
            Subsystem::Lights
        } else if contains_any(DOOR_KEYWORDS) {
            Subsystem::Doors
        } else if contains_any(ENGINE_KEYWORDS) {
            Subsystem::Engine
        } else {
            return RouteDecision::Forward;
        };

        RouteDecision::VehicleCommand {
            subsystem,
            action: utterance.to_lowercase(),
        }
    }
}

fn is_sos(folded: &str) -> bool {
    let words: Vec<&str> = folded
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    let requested =
        SOS_PHRASES.iter().any(|p| folded.contains(p)) || words.contains(&"sos");
    let question = words
        .first()
        .is_some_and(|first| QUESTION_OPENERS.contains(first));
    requested && !question
}

/// Text after the first "play", or the whole utterance lowercased.
fn music_query(utterance: &str, folded: &str) -> String {
    match folded.find("play") {
        Some(idx) => utterance[idx + "play".len()..].trim().to_string(),
        None => utterance.to_lowercase(),
    }
}
