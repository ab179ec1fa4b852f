//! Time representation on the shared timeline clock.
//!
//! All positions are seconds as `f64`. Comparisons that decide whether two
//! ranges collide go through an explicit tolerance so that values produced
//! by speed scaling (`source / speed`) do not fail on round-off.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default tolerance (seconds) for overlap and adjacency comparisons.
pub const OVERLAP_EPSILON: f64 = 0.001;

/// A half-open time range `[start, end)` in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    /// Start time (inclusive)
    pub start: f64,
    /// End time (exclusive)
    pub end: f64,
}

impl TimeRange {
    /// Create a range from start and end times.
    #[inline]
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Length of the range.
    #[inline]
    pub fn duration(self) -> f64 {
        self.end - self.start
    }

    /// Check if a time is within this range.
    #[inline]
    pub fn contains(self, time: f64) -> bool {
        time >= self.start && time < self.end
    }

    /// Check whether `time` lies strictly inside the range (not on either edge).
    #[inline]
    pub fn contains_strictly(self, time: f64) -> bool {
        time > self.start && time < self.end
    }

    /// Check if two ranges share more than `epsilon` seconds.
    ///
    /// Touching endpoints never overlap: `max(s1, s2) < min(e1, e2) - epsilon`.
    pub fn overlaps_within(self, other: Self, epsilon: f64) -> bool {
        self.start.max(other.start) < self.end.min(other.end) - epsilon
    }

    /// Check if two ranges overlap using [`OVERLAP_EPSILON`].
    pub fn overlaps(self, other: Self) -> bool {
        self.overlaps_within(other, OVERLAP_EPSILON)
    }

    /// Whether `other` starts where this range ends, within `epsilon`.
    pub fn abuts(self, other: Self, epsilon: f64) -> bool {
        (self.end - other.start).abs() <= epsilon
    }

    /// Compute the intersection of two ranges, if any.
    pub fn intersection(self, other: Self) -> Option<Self> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start < end).then_some(Self { start, end })
    }

    /// Empty range starting at zero.
    pub const EMPTY: Self = Self {
        start: 0.0,
        end: 0.0,
    };
}

impl Default for TimeRange {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s - {:.3}s", self.start, self.end)
    }
}

/// Format seconds as `HH:MM:SS.mmm`.
pub fn format_precise(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let total_ms = (seconds * 1000.0).round() as u64;
    let ms = total_ms % 1000;
    let total_secs = total_ms / 1000;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let secs = total_secs % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}.{ms:03}")
}

/// Format seconds as a non-drop-frame timecode `HH:MM:SS:FF` at `fps`.
pub fn format_timecode(seconds: f64, fps: f64) -> String {
    let seconds = seconds.max(0.0);
    let whole = seconds.floor() as u64;
    let hours = whole / 3600;
    let minutes = (whole % 3600) / 60;
    let secs = whole % 60;
    let frames = if fps > 0.0 {
        (seconds.fract() * fps).floor() as u64
    } else {
        0
    };
    format!("{hours:02}:{minutes:02}:{secs:02}:{frames:02}")
}
