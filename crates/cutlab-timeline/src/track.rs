//! Track types for the timeline.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clip::Clip;

/// Kind of track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackKind {
    Video,
    Audio,
    Text,
    Overlay,
}

/// Visibility and edit-protection switches of a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackFlags {
    pub visible: bool,
    pub muted: bool,
    /// Locked tracks reject every edit
    pub locked: bool,
}

impl Default for TrackFlags {
    fn default() -> Self {
        Self {
            visible: true,
            muted: false,
            locked: false,
        }
    }
}

/// A lane of non-overlapping clips, kept sorted by start time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Unique track ID
    pub track_id: Uuid,
    /// Track kind
    pub kind: TrackKind,
    /// Track name
    pub label: String,
    #[serde(flatten)]
    pub flags: TrackFlags,
    /// Clips ordered by `timeline_start`
    pub clips: Vec<Clip>,
}

impl Track {
    /// Create a new empty track.
    pub fn new(kind: TrackKind, label: impl Into<String>) -> Self {
        Self {
            track_id: Uuid::new_v4(),
            kind,
            label: label.into(),
            flags: TrackFlags::default(),
            clips: Vec::new(),
        }
    }

    /// Create a new video track.
    pub fn new_video(label: impl Into<String>) -> Self {
        Self::new(TrackKind::Video, label)
    }

    /// Create a new audio track.
    pub fn new_audio(label: impl Into<String>) -> Self {
        Self::new(TrackKind::Audio, label)
    }

    /// End of the last clip on this track, zero when empty.
    pub fn duration(&self) -> f64 {
        self.clips
            .iter()
            .map(|c| c.timeline_end)
            .fold(0.0, f64::max)
    }

    /// Find a clip by ID. Returns (index, &Clip).
    pub fn find_clip(&self, clip_id: Uuid) -> Option<(usize, &Clip)> {
        self.clips
            .iter()
            .enumerate()
            .find(|(_, c)| c.clip_id == clip_id)
    }

    /// Whether a clip with this ID lives on the track.
    pub fn contains_clip(&self, clip_id: Uuid) -> bool {
        self.clips.iter().any(|c| c.clip_id == clip_id)
    }

    /// Clip covering the given timeline time, if any.
    pub fn clip_at_time(&self, time: f64) -> Option<&Clip> {
        self.clips
            .iter()
            .find(|c| c.timeline_range().contains(time))
    }

    /// Remove a clip by ID. Returns the removed clip.
    pub fn remove_clip(&mut self, clip_id: Uuid) -> Option<Clip> {
        let index = self.clips.iter().position(|c| c.clip_id == clip_id)?;
        Some(self.clips.remove(index))
    }

    /// Restore ordering by start time.
    pub fn sort_clips(&mut self) {
        self.clips
            .sort_by(|a, b| a.timeline_start.total_cmp(&b.timeline_start));
    }

    /// Consecutive clip pairs in time order.
    pub fn adjacent_pairs(&self) -> impl Iterator<Item = (&Clip, &Clip)> {
        self.clips.windows(2).map(|w| (&w[0], &w[1]))
    }

    /// Number of clips in this track.
    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }
}
