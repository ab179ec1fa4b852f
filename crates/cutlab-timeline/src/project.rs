//! Project and sequence types.

use cutlab_core::TimeRange;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::clip::Clip;
use crate::track::Track;
use crate::transition::Transition;

/// Global output settings of a sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceSettings {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub aspect_ratio: String,
}

impl Default for SequenceSettings {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            fps: 30.0,
            aspect_ratio: "16:9".to_string(),
        }
    }
}

/// Kind of source asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Video,
    Audio,
    Image,
}

/// Caller-provided facts about a source asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetMetadata {
    pub path: String,
    pub filename: String,
    /// Length of the media, seconds
    pub duration: f64,
    pub kind: AssetKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

/// A sequence (timeline): tracks, transitions, and known assets.
///
/// Tracks are shared between snapshots; an edit clones only the track it
/// touches. Cloning a `Sequence` is therefore cheap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sequence {
    /// Unique sequence ID
    pub sequence_id: Uuid,
    #[serde(default)]
    pub settings: SequenceSettings,
    /// Render order low to high
    pub tracks: Vec<Arc<Track>>,
    #[serde(default)]
    pub transitions: Vec<Transition>,
    /// Asset registry keyed by `source_id`
    #[serde(default)]
    pub assets: BTreeMap<String, AssetMetadata>,
}

impl Sequence {
    /// Create an empty sequence without tracks.
    pub fn empty(settings: SequenceSettings) -> Self {
        Self {
            sequence_id: Uuid::new_v4(),
            settings,
            tracks: Vec::new(),
            transitions: Vec::new(),
            assets: BTreeMap::new(),
        }
    }

    /// Create a sequence with one video and one audio track.
    pub fn new(settings: SequenceSettings) -> Self {
        let mut seq = Self::empty(settings);
        seq.tracks.push(Arc::new(Track::new_video("V1")));
        seq.tracks.push(Arc::new(Track::new_audio("A1")));
        seq
    }

    /// Latest clip end across all tracks, zero when empty.
    pub fn duration(&self) -> f64 {
        self.tracks
            .iter()
            .map(|t| t.duration())
            .fold(0.0, f64::max)
    }

    /// Get the time range of the sequence.
    pub fn time_range(&self) -> TimeRange {
        TimeRange::new(0.0, self.duration())
    }

    /// Find a track by ID.
    pub fn track(&self, track_id: Uuid) -> Option<&Track> {
        self.tracks
            .iter()
            .find(|t| t.track_id == track_id)
            .map(|t| t.as_ref())
    }

    /// Position of a track in render order.
    pub fn track_index(&self, track_id: Uuid) -> Option<usize> {
        self.tracks.iter().position(|t| t.track_id == track_id)
    }

    /// Locate a clip anywhere in the sequence. Returns (track index, &Clip).
    pub fn find_clip(&self, clip_id: Uuid) -> Option<(usize, &Clip)> {
        self.tracks.iter().enumerate().find_map(|(i, track)| {
            track.find_clip(clip_id).map(|(_, clip)| (i, clip))
        })
    }

    /// All clips across all tracks, in track order then time order.
    pub fn clips(&self) -> impl Iterator<Item = &Clip> {
        self.tracks.iter().flat_map(|t| t.clips.iter())
    }

    /// Total number of clips.
    pub fn clip_count(&self) -> usize {
        self.tracks.iter().map(|t| t.clip_count()).sum()
    }

    /// Transition keyed by the ordered pair, if any.
    pub fn transition_between(&self, from: Uuid, to: Uuid) -> Option<&Transition> {
        self.transitions.iter().find(|t| t.joins(from, to))
    }

    /// Transition that follows a clip, if any.
    pub fn transition_after(&self, clip_id: Uuid) -> Option<&Transition> {
        self.transitions.iter().find(|t| t.from_clip_id == clip_id)
    }

    /// Known duration of a source asset.
    pub fn asset_duration(&self, source_id: &str) -> Option<f64> {
        self.assets.get(source_id).map(|a| a.duration)
    }
}

impl Default for Sequence {
    fn default() -> Self {
        Self::new(SequenceSettings::default())
    }
}

/// A project: one sequence plus identity and revision bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Caller-chosen project identifier
    pub project_id: String,
    /// Project name
    pub name: String,
    /// Incremented by the store on every successful save
    #[serde(default)]
    pub revision: u64,
    /// Unix seconds
    #[serde(default)]
    pub created_at: u64,
    /// Unix seconds
    #[serde(default)]
    pub updated_at: u64,
    pub sequence: Sequence,
}

impl Project {
    /// Create a new project with a default sequence.
    pub fn new(project_id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = unix_now();
        Self {
            project_id: project_id.into(),
            name: name.into(),
            revision: 0,
            created_at: now,
            updated_at: now,
            sequence: Sequence::default(),
        }
    }

    /// Replace the sequence with an edited snapshot.
    pub fn with_sequence(mut self, sequence: Sequence) -> Self {
        self.sequence = sequence;
        self.updated_at = unix_now();
        self
    }
}

pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
