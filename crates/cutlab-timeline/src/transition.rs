//! Transitions between time-adjacent clips.
//!
//! The set of kinds is closed. A transition is keyed by its ordered
//! `(from_clip_id, to_clip_id)` pair; at most one exists per pair.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Kind of transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransitionKind {
    #[default]
    Cut,
    CrossDissolve,
    FadeIn,
    FadeOut,
    FadeInOut,
}

impl TransitionKind {
    pub const ALL: [TransitionKind; 5] = [
        TransitionKind::Cut,
        TransitionKind::CrossDissolve,
        TransitionKind::FadeIn,
        TransitionKind::FadeOut,
        TransitionKind::FadeInOut,
    ];

    /// Name as used in serialized projects.
    pub fn as_str(self) -> &'static str {
        match self {
            TransitionKind::Cut => "cut",
            TransitionKind::CrossDissolve => "cross-dissolve",
            TransitionKind::FadeIn => "fade-in",
            TransitionKind::FadeOut => "fade-out",
            TransitionKind::FadeInOut => "fade-in-out",
        }
    }

    /// A cut is instantaneous and carries no duration.
    pub fn is_instant(self) -> bool {
        self == TransitionKind::Cut
    }
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransitionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown transition type '{s}'"))
    }
}

/// A transition attached to the boundary between two clips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub from_clip_id: Uuid,
    pub to_clip_id: Uuid,
    #[serde(rename = "type")]
    pub kind: TransitionKind,
    /// Seconds; always 0.0 for a cut
    pub duration: f64,
}

impl Transition {
    /// Whether this transition is keyed by the given pair.
    pub fn joins(&self, from: Uuid, to: Uuid) -> bool {
        self.from_clip_id == from && self.to_clip_id == to
    }
}
