//! Invariant checks run before an edit is committed.
//!
//! Every function here is pure: it inspects its arguments and either
//! returns `Ok` or a typed [`EditError`]. Nothing is mutated.

use cutlab_core::TimeRange;
use uuid::Uuid;

use crate::clip::Clip;
use crate::config::EditConfig;
use crate::error::{EditError, EditResult};
use crate::project::Sequence;
use crate::track::Track;

/// Round-off allowance when comparing a duration against the floor.
const DURATION_SLACK: f64 = 1e-9;

/// Fail if `[start, end)` intersects any clip on the track other than `excluding`.
pub fn no_overlap(
    track: &Track,
    excluding: Option<Uuid>,
    start: f64,
    end: f64,
    epsilon: f64,
) -> EditResult<()> {
    let candidate = TimeRange::new(start, end);
    let conflict = track
        .clips
        .iter()
        .filter(|c| Some(c.clip_id) != excluding)
        .find(|c| c.timeline_range().overlaps_within(candidate, epsilon));

    match conflict {
        Some(other) => Err(EditError::Overlap {
            track_id: track.track_id,
            clip_id: excluding,
            conflicting_clip_id: other.clip_id,
            start,
            end,
        }),
        None => Ok(()),
    }
}

/// Fail if `end - start` is below `floor`.
pub fn min_duration(start: f64, end: f64, floor: f64) -> EditResult<()> {
    let duration = end - start;
    if !duration.is_finite() || duration + DURATION_SLACK < floor {
        return Err(EditError::TooShort {
            track_id: None,
            clip_id: None,
            duration,
            min: floor,
        });
    }
    Ok(())
}

/// Fail on a negative in-point, an inverted range, or an out-point past the
/// known asset duration. Unknown assets skip the upper-bound check.
pub fn source_bounds(asset_duration: Option<f64>, source_in: f64, source_out: f64) -> EditResult<()> {
    if !source_in.is_finite() || !source_out.is_finite() {
        return Err(EditError::bounds(None, "source points must be finite"));
    }
    if source_in < 0.0 {
        return Err(EditError::bounds(
            None,
            format!("source in-point ({source_in:.3}s) cannot be negative"),
        ));
    }
    if source_out <= source_in {
        return Err(EditError::bounds(
            None,
            format!("source out-point ({source_out:.3}s) must be after in-point ({source_in:.3}s)"),
        ));
    }
    if let Some(limit) = asset_duration {
        if source_out > limit {
            return Err(EditError::bounds(
                None,
                format!("source out-point ({source_out:.3}s) exceeds media duration ({limit:.3}s)"),
            ));
        }
    }
    Ok(())
}

/// Fail if a timeline position is negative or not finite.
pub fn timeline_position(start: f64) -> EditResult<()> {
    if !start.is_finite() || start < 0.0 {
        return Err(EditError::bounds(
            None,
            format!("timeline start ({start}s) cannot be negative"),
        ));
    }
    Ok(())
}

/// Reject a speed outside `[config.min_speed, config.max_speed]`.
pub fn speed_range(speed: f64, config: &EditConfig) -> EditResult<f64> {
    if !speed.is_finite() || speed < config.min_speed || speed > config.max_speed {
        return Err(EditError::InvalidRange {
            field: "speed",
            value: speed,
            min: config.min_speed,
            max: config.max_speed,
        });
    }
    Ok(speed)
}

/// Clamp a speed into range. Only a non-finite value is rejected.
pub fn clamp_speed(speed: f64, config: &EditConfig) -> EditResult<f64> {
    if !speed.is_finite() {
        return Err(EditError::InvalidRange {
            field: "speed",
            value: speed,
            min: config.min_speed,
            max: config.max_speed,
        });
    }
    Ok(speed.clamp(config.min_speed, config.max_speed))
}

/// Fail if the track is locked.
pub fn unlocked(track: &Track) -> EditResult<()> {
    if track.flags.locked {
        return Err(EditError::TrackLocked {
            track_id: track.track_id,
        });
    }
    Ok(())
}

/// Fail unless `to` starts where `from` ends, within `epsilon`.
pub fn adjacency(from: &Clip, to: &Clip, epsilon: f64) -> EditResult<()> {
    if from.clip_id == to.clip_id {
        return Err(EditError::InvalidTransitionAdjacency {
            from_clip_id: from.clip_id,
            to_clip_id: to.clip_id,
            reason: "a clip cannot transition into itself".to_string(),
        });
    }
    if !from.timeline_range().abuts(to.timeline_range(), epsilon) {
        return Err(EditError::InvalidTransitionAdjacency {
            from_clip_id: from.clip_id,
            to_clip_id: to.clip_id,
            reason: format!(
                "first clip ends at {:.3}s but second starts at {:.3}s",
                from.timeline_end, to.timeline_start
            ),
        });
    }
    Ok(())
}

/// Check every invariant over a whole snapshot. Returns the first violation.
///
/// Edits keep these invariants by construction; this is for snapshots that
/// arrive from elsewhere (imports, hand-edited files) and for tests.
pub fn check_sequence(seq: &Sequence, config: &EditConfig) -> EditResult<()> {
    for track in &seq.tracks {
        for clip in &track.clips {
            let ctx = |e: EditError| e.in_context(track.track_id, Some(clip.clip_id));
            timeline_position(clip.timeline_start).map_err(ctx)?;
            min_duration(clip.timeline_start, clip.timeline_end, config.min_clip_duration)
                .map_err(ctx)?;
            source_bounds(
                seq.asset_duration(&clip.source_id),
                clip.source_in,
                clip.source_out,
            )
            .map_err(ctx)?;
            if !clip.is_speed_consistent(config.epsilon) {
                return Err(EditError::bounds(
                    Some(clip.clip_id),
                    format!(
                        "timeline duration {:.3}s disagrees with source duration {:.3}s at speed {}",
                        clip.duration(),
                        clip.source_duration(),
                        clip.speed
                    ),
                )
                .in_context(track.track_id, None));
            }
        }
        let mut ordered: Vec<&Clip> = track.clips.iter().collect();
        ordered.sort_by(|a, b| a.timeline_start.total_cmp(&b.timeline_start));
        for pair in ordered.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if a.timeline_range().overlaps_within(b.timeline_range(), config.epsilon) {
                return Err(EditError::Overlap {
                    track_id: track.track_id,
                    clip_id: Some(b.clip_id),
                    conflicting_clip_id: a.clip_id,
                    start: b.timeline_start,
                    end: b.timeline_end,
                });
            }
        }
    }

    for t in &seq.transitions {
        let (from_track, from) = seq
            .find_clip(t.from_clip_id)
            .ok_or_else(|| EditError::clip_not_found(t.from_clip_id))?;
        let (to_track, to) = seq
            .find_clip(t.to_clip_id)
            .ok_or_else(|| EditError::clip_not_found(t.to_clip_id))?;
        if from_track != to_track {
            return Err(EditError::InvalidTransitionAdjacency {
                from_clip_id: t.from_clip_id,
                to_clip_id: t.to_clip_id,
                reason: "clips are on different tracks".to_string(),
            });
        }
        adjacency(from, to, config.epsilon)?;
    }
    Ok(())
}
