//! Bulk population of a track from candidate ranges.
//!
//! Scene detectors and beat analyzers hand over `(start, end)` ranges in
//! source time. Each range becomes one clip through the regular `add_clip`
//! path, so every invariant applies; ranges that fail are skipped and
//! reported rather than aborting the whole batch.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::clip::ClipSpec;
use crate::edit::TimelineEditor;
use crate::error::{EditError, EditResult};
use crate::project::Sequence;

/// A candidate range in source time, seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneRange {
    pub start: f64,
    pub end: f64,
}

impl SceneRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }
}

/// Where populated clips land on the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PopulateLayout {
    /// Butted end-to-end after the track's existing content.
    #[default]
    Sequential,
    /// At the same time on the timeline as in the source.
    SourceAligned,
}

/// A range that could not be placed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRange {
    pub range: SceneRange,
    pub reason: EditError,
}

/// What a population run did.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PopulateReport {
    /// New clip IDs, in input order
    pub added: Vec<Uuid>,
    pub skipped: Vec<SkippedRange>,
}

impl TimelineEditor {
    /// Add one clip per range onto `track_id`, labelled "Scene N".
    ///
    /// Fails as a whole only when the track is missing or locked.
    pub fn populate_from_ranges(
        &self,
        seq: &Sequence,
        track_id: Uuid,
        source_id: &str,
        ranges: &[SceneRange],
        layout: PopulateLayout,
    ) -> EditResult<(Sequence, PopulateReport)> {
        let track = seq
            .track(track_id)
            .ok_or_else(|| EditError::track_not_found(track_id))?;
        crate::validate::unlocked(track)?;

        let mut cursor = track.duration();
        let mut current = seq.clone();
        let mut report = PopulateReport::default();

        for (n, range) in ranges.iter().enumerate() {
            let timeline_start = match layout {
                PopulateLayout::Sequential => cursor,
                PopulateLayout::SourceAligned => range.start,
            };
            let spec = ClipSpec::new(source_id, timeline_start, range.start, range.end)
                .with_label(format!("Scene {}", n + 1));

            match self.add_clip(&current, track_id, spec) {
                Ok((next, clip_id)) => {
                    if let Some((_, clip)) = next.find_clip(clip_id) {
                        cursor = cursor.max(clip.timeline_end);
                    }
                    current = next;
                    report.added.push(clip_id);
                }
                Err(reason) => {
                    warn!(
                        start = range.start,
                        end = range.end,
                        kind = reason.kind(),
                        "Skipping range: {reason}"
                    );
                    report.skipped.push(SkippedRange {
                        range: *range,
                        reason,
                    });
                }
            }
        }

        info!(
            track = %track_id,
            source = source_id,
            added = report.added.len(),
            skipped = report.skipped.len(),
            "Populated track from ranges"
        );
        Ok((current, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranges(pairs: &[(f64, f64)]) -> Vec<SceneRange> {
        pairs.iter().map(|&(s, e)| SceneRange::new(s, e)).collect()
    }

    #[test]
    fn test_sequential_butts_clips() {
        let editor = TimelineEditor::default();
        let seq = Sequence::default();
        let track_id = seq.tracks[0].track_id;

        let (seq, report) = editor
            .populate_from_ranges(
                &seq,
                track_id,
                "cam",
                &ranges(&[(10.0, 14.0), (30.0, 32.0)]),
                PopulateLayout::Sequential,
            )
            .unwrap();

        assert_eq!(report.added.len(), 2);
        let clips = &seq.tracks[0].clips;
        assert_eq!((clips[0].timeline_start, clips[0].timeline_end), (0.0, 4.0));
        assert_eq!((clips[1].timeline_start, clips[1].timeline_end), (4.0, 6.0));
        assert_eq!(clips[1].label, "Scene 2");
    }

    #[test]
    fn test_short_and_overlapping_ranges_are_skipped() {
        let editor = TimelineEditor::default();
        let seq = Sequence::default();
        let track_id = seq.tracks[0].track_id;

        let (seq, report) = editor
            .populate_from_ranges(
                &seq,
                track_id,
                "cam",
                &ranges(&[(0.0, 5.0), (5.0, 5.2), (3.0, 8.0), (8.0, 9.0)]),
                PopulateLayout::SourceAligned,
            )
            .unwrap();

        assert_eq!(report.added.len(), 2);
        assert_eq!(report.skipped.len(), 2);
        assert_eq!(report.skipped[0].reason.kind(), "too_short");
        assert_eq!(report.skipped[1].reason.kind(), "overlap");
        assert_eq!(seq.tracks[0].clips[1].timeline_start, 8.0);
    }

    #[test]
    fn test_sequential_appends_after_existing_content() {
        let editor = TimelineEditor::default();
        let seq = Sequence::default();
        let track_id = seq.tracks[0].track_id;
        let (seq, _) = editor
            .add_clip(&seq, track_id, ClipSpec::new("intro", 0.0, 0.0, 3.0))
            .unwrap();

        let (seq, _) = editor
            .populate_from_ranges(
                &seq,
                track_id,
                "cam",
                &ranges(&[(1.0, 2.0)]),
                PopulateLayout::Sequential,
            )
            .unwrap();
        assert_eq!(seq.tracks[0].clips[1].timeline_start, 3.0);
    }

    #[test]
    fn test_missing_track_fails_whole_run() {
        let editor = TimelineEditor::default();
        let seq = Sequence::default();
        assert!(editor
            .populate_from_ranges(
                &seq,
                Uuid::new_v4(),
                "cam",
                &ranges(&[(0.0, 1.0)]),
                PopulateLayout::Sequential,
            )
            .is_err());
    }

    #[test]
    fn test_ranges_parse_from_json() {
        let parsed: Vec<SceneRange> =
            serde_json::from_str(r#"[{"start": 0.0, "end": 2.5}]"#).unwrap();
        assert_eq!(parsed, ranges(&[(0.0, 2.5)]));
    }
}
