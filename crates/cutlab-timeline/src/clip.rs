//! Clip types for the timeline.

use cutlab_core::TimeRange;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Spatial composition properties.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    pub scale: f64,
    pub position_x: f64,
    pub position_y: f64,
    /// Degrees
    pub rotation: f64,
    pub opacity: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            position_x: 0.0,
            position_y: 0.0,
            rotation: 0.0,
            opacity: 1.0,
        }
    }
}

impl Transform {
    pub const MIN_SCALE: f64 = 0.01;
    pub const MAX_SCALE: f64 = 10.0;

    /// Clamp every field into its displayable range.
    pub fn clamped(self) -> Self {
        Self {
            scale: finite_or(self.scale, 1.0).clamp(Self::MIN_SCALE, Self::MAX_SCALE),
            position_x: finite_or(self.position_x, 0.0),
            position_y: finite_or(self.position_y, 0.0),
            rotation: finite_or(self.rotation, 0.0) % 360.0,
            opacity: finite_or(self.opacity, 1.0).clamp(0.0, 1.0),
        }
    }
}

/// Audio properties of a clip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioProps {
    pub volume: f64,
    pub fade_in: f64,
    pub fade_out: f64,
    pub muted: bool,
}

impl Default for AudioProps {
    fn default() -> Self {
        Self {
            volume: 1.0,
            fade_in: 0.0,
            fade_out: 0.0,
            muted: false,
        }
    }
}

impl AudioProps {
    pub const MAX_VOLUME: f64 = 2.0;

    /// Clamp volume into `[0, MAX_VOLUME]` and fades to non-negative.
    pub fn clamped(self) -> Self {
        Self {
            volume: finite_or(self.volume, 1.0).clamp(0.0, Self::MAX_VOLUME),
            fade_in: finite_or(self.fade_in, 0.0).max(0.0),
            fade_out: finite_or(self.fade_out, 0.0).max(0.0),
            muted: self.muted,
        }
    }
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

/// Caller-supplied description of a clip to place on a track.
///
/// The timeline end is derived from the source range and speed, so a spec
/// can never describe a clip whose two durations disagree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipSpec {
    pub source_id: String,
    #[serde(default = "default_label")]
    pub label: String,
    pub timeline_start: f64,
    pub source_in: f64,
    pub source_out: f64,
    #[serde(default = "default_speed")]
    pub speed: f64,
    #[serde(default)]
    pub transform: Transform,
    #[serde(default)]
    pub audio: AudioProps,
}

fn default_label() -> String {
    "Clip".to_string()
}

fn default_speed() -> f64 {
    1.0
}

impl ClipSpec {
    /// Describe a clip at normal speed.
    pub fn new(
        source_id: impl Into<String>,
        timeline_start: f64,
        source_in: f64,
        source_out: f64,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            label: default_label(),
            timeline_start,
            source_in,
            source_out,
            speed: 1.0,
            transform: Transform::default(),
            audio: AudioProps::default(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    /// Timeline end implied by the source range and speed.
    pub fn timeline_end(&self) -> f64 {
        self.timeline_start + (self.source_out - self.source_in) / self.speed
    }
}

/// A clip placed on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    /// Unique clip ID, never reused
    pub clip_id: Uuid,
    /// Reference to the source asset
    pub source_id: String,
    /// Clip name (displayed in UI)
    pub label: String,
    /// Placement on the timeline, seconds
    pub timeline_start: f64,
    pub timeline_end: f64,
    /// Portion of the source asset used, seconds
    pub source_in: f64,
    pub source_out: f64,
    /// Playback speed (1.0 = normal)
    pub speed: f64,
    #[serde(default)]
    pub transform: Transform,
    #[serde(default)]
    pub audio: AudioProps,
}

impl Clip {
    /// Build a clip from a spec with a fresh ID. Does not validate.
    pub fn from_spec(spec: ClipSpec) -> Self {
        let timeline_end = spec.timeline_end();
        Self {
            clip_id: Uuid::new_v4(),
            source_id: spec.source_id,
            label: spec.label,
            timeline_start: spec.timeline_start,
            timeline_end,
            source_in: spec.source_in,
            source_out: spec.source_out,
            speed: spec.speed,
            transform: spec.transform,
            audio: spec.audio,
        }
    }

    /// Duration on the timeline.
    #[inline]
    pub fn duration(&self) -> f64 {
        self.timeline_end - self.timeline_start
    }

    /// Duration of source media consumed.
    #[inline]
    pub fn source_duration(&self) -> f64 {
        self.source_out - self.source_in
    }

    /// Get the timeline range.
    pub fn timeline_range(&self) -> TimeRange {
        TimeRange::new(self.timeline_start, self.timeline_end)
    }

    /// Get the source range.
    pub fn source_range(&self) -> TimeRange {
        TimeRange::new(self.source_in, self.source_out)
    }

    /// Map a timeline time inside this clip to the source time it shows.
    pub fn source_time_at(&self, timeline_time: f64) -> f64 {
        self.source_in + (timeline_time - self.timeline_start) * self.speed
    }

    /// Whether timeline and source durations agree at the current speed.
    pub fn is_speed_consistent(&self, tolerance: f64) -> bool {
        (self.duration() - self.source_duration() / self.speed).abs() < tolerance
    }
}
