//! Edit operations.
//!
//! Every operation takes the current [`Sequence`] by reference and returns a
//! new snapshot or an [`EditError`]. The input is never modified, so a
//! rejected edit leaves nothing half-applied. Validation runs against the
//! original snapshot; only the touched track is copied for the result.
//!
//! [`EditCommand`] mirrors each operation as data so a transport layer can
//! deserialize a request and hand it to [`TimelineEditor::apply`].

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::clip::{AudioProps, Clip, ClipSpec, Transform};
use crate::config::EditConfig;
use crate::error::{EditError, EditResult, Entity};
use crate::project::{AssetMetadata, Sequence};
use crate::track::{Track, TrackFlags, TrackKind};
use crate::transition::{Transition, TransitionKind};
use crate::validate;

// ── Commands ────────────────────────────────────────────────────

/// A single edit request, serializable for transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditCommand {
    AddClip {
        track_id: Uuid,
        clip: ClipSpec,
    },
    MoveClip {
        track_id: Uuid,
        clip_id: Uuid,
        new_start: f64,
    },
    TrimIn {
        track_id: Uuid,
        clip_id: Uuid,
        new_source_in: f64,
    },
    TrimOut {
        track_id: Uuid,
        clip_id: Uuid,
        new_source_out: f64,
    },
    SplitClip {
        track_id: Uuid,
        clip_id: Uuid,
        split_time: f64,
    },
    DeleteClip {
        track_id: Uuid,
        clip_id: Uuid,
    },
    SetSpeed {
        clip_id: Uuid,
        speed: f64,
    },
    SetTransition {
        from_clip_id: Uuid,
        to_clip_id: Uuid,
        #[serde(rename = "type")]
        kind: TransitionKind,
        #[serde(default)]
        duration: f64,
    },
    RemoveTransition {
        from_clip_id: Uuid,
        to_clip_id: Uuid,
    },
    AutoGenerateTransitions {
        #[serde(default)]
        default_type: TransitionKind,
    },
    SetClipLabel {
        clip_id: Uuid,
        label: String,
    },
    SetClipTransform {
        clip_id: Uuid,
        transform: Transform,
    },
    SetClipAudio {
        clip_id: Uuid,
        audio: AudioProps,
    },
    AddTrack {
        kind: TrackKind,
        label: String,
    },
    RemoveTrack {
        track_id: Uuid,
    },
    SetTrackFlags {
        track_id: Uuid,
        flags: TrackFlags,
    },
    RegisterAsset {
        source_id: String,
        asset: AssetMetadata,
    },
    ClearTimeline,
    /// Applied in order; the first failure rejects the whole batch.
    Batch {
        commands: Vec<EditCommand>,
    },
}

impl EditCommand {
    /// Short operation name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddClip { .. } => "add_clip",
            Self::MoveClip { .. } => "move_clip",
            Self::TrimIn { .. } => "trim_in",
            Self::TrimOut { .. } => "trim_out",
            Self::SplitClip { .. } => "split_clip",
            Self::DeleteClip { .. } => "delete_clip",
            Self::SetSpeed { .. } => "set_speed",
            Self::SetTransition { .. } => "set_transition",
            Self::RemoveTransition { .. } => "remove_transition",
            Self::AutoGenerateTransitions { .. } => "auto_generate_transitions",
            Self::SetClipLabel { .. } => "set_clip_label",
            Self::SetClipTransform { .. } => "set_clip_transform",
            Self::SetClipAudio { .. } => "set_clip_audio",
            Self::AddTrack { .. } => "add_track",
            Self::RemoveTrack { .. } => "remove_track",
            Self::SetTrackFlags { .. } => "set_track_flags",
            Self::RegisterAsset { .. } => "register_asset",
            Self::ClearTimeline => "clear_timeline",
            Self::Batch { .. } => "batch",
        }
    }
}

/// Result of applying an [`EditCommand`].
#[derive(Debug, Clone)]
pub struct EditOutcome {
    /// The new snapshot.
    pub sequence: Sequence,
    /// IDs created by the command (new clip, right half of a split, new track).
    pub created: Vec<Uuid>,
    /// Transitions inserted by auto-generation.
    pub transitions_added: Vec<Transition>,
}

impl EditOutcome {
    fn of(sequence: Sequence) -> Self {
        Self {
            sequence,
            created: Vec::new(),
            transitions_added: Vec::new(),
        }
    }
}

// ── Editor ──────────────────────────────────────────────────────

/// Executes edit operations under an [`EditConfig`].
#[derive(Debug, Clone, Default)]
pub struct TimelineEditor {
    config: EditConfig,
}

impl TimelineEditor {
    /// Create an editor with the given policy. Fails if the policy is
    /// inconsistent (inverted ranges, non-finite bounds).
    pub fn new(config: EditConfig) -> cutlab_core::Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EditConfig {
        &self.config
    }

    /// Apply one command.
    pub fn apply(&self, seq: &Sequence, command: &EditCommand) -> EditResult<EditOutcome> {
        let outcome = match command {
            EditCommand::AddClip { track_id, clip } => {
                let (sequence, id) = self.add_clip(seq, *track_id, clip.clone())?;
                EditOutcome {
                    created: vec![id],
                    ..EditOutcome::of(sequence)
                }
            }
            EditCommand::MoveClip {
                track_id,
                clip_id,
                new_start,
            } => EditOutcome::of(self.move_clip(seq, *track_id, *clip_id, *new_start)?),
            EditCommand::TrimIn {
                track_id,
                clip_id,
                new_source_in,
            } => EditOutcome::of(self.trim_in(seq, *track_id, *clip_id, *new_source_in)?),
            EditCommand::TrimOut {
                track_id,
                clip_id,
                new_source_out,
            } => EditOutcome::of(self.trim_out(seq, *track_id, *clip_id, *new_source_out)?),
            EditCommand::SplitClip {
                track_id,
                clip_id,
                split_time,
            } => {
                let (sequence, right) = self.split_clip(seq, *track_id, *clip_id, *split_time)?;
                EditOutcome {
                    created: vec![right],
                    ..EditOutcome::of(sequence)
                }
            }
            EditCommand::DeleteClip { track_id, clip_id } => {
                EditOutcome::of(self.delete_clip(seq, *track_id, *clip_id)?)
            }
            EditCommand::SetSpeed { clip_id, speed } => {
                EditOutcome::of(self.set_speed(seq, *clip_id, *speed)?)
            }
            EditCommand::SetTransition {
                from_clip_id,
                to_clip_id,
                kind,
                duration,
            } => EditOutcome::of(self.set_transition(
                seq,
                *from_clip_id,
                *to_clip_id,
                *kind,
                *duration,
            )?),
            EditCommand::RemoveTransition {
                from_clip_id,
                to_clip_id,
            } => EditOutcome::of(self.remove_transition(seq, *from_clip_id, *to_clip_id)?),
            EditCommand::AutoGenerateTransitions { default_type } => {
                let (sequence, added) = self.auto_generate_transitions(seq, *default_type)?;
                EditOutcome {
                    transitions_added: added,
                    ..EditOutcome::of(sequence)
                }
            }
            EditCommand::SetClipLabel { clip_id, label } => {
                EditOutcome::of(self.set_clip_label(seq, *clip_id, label.clone())?)
            }
            EditCommand::SetClipTransform { clip_id, transform } => {
                EditOutcome::of(self.set_clip_transform(seq, *clip_id, *transform)?)
            }
            EditCommand::SetClipAudio { clip_id, audio } => {
                EditOutcome::of(self.set_clip_audio(seq, *clip_id, *audio)?)
            }
            EditCommand::AddTrack { kind, label } => {
                let (sequence, id) = self.add_track(seq, *kind, label.clone());
                EditOutcome {
                    created: vec![id],
                    ..EditOutcome::of(sequence)
                }
            }
            EditCommand::RemoveTrack { track_id } => {
                EditOutcome::of(self.remove_track(seq, *track_id)?)
            }
            EditCommand::SetTrackFlags { track_id, flags } => {
                EditOutcome::of(self.set_track_flags(seq, *track_id, *flags)?)
            }
            EditCommand::RegisterAsset { source_id, asset } => {
                EditOutcome::of(self.register_asset(seq, source_id.clone(), asset.clone())?)
            }
            EditCommand::ClearTimeline => EditOutcome::of(self.clear_timeline(seq)?),
            EditCommand::Batch { commands } => {
                let mut outcome = EditOutcome::of(seq.clone());
                for cmd in commands {
                    let step = self.apply(&outcome.sequence, cmd)?;
                    outcome.sequence = step.sequence;
                    outcome.created.extend(step.created);
                    outcome.transitions_added.extend(step.transitions_added);
                }
                outcome
            }
        };
        Ok(outcome)
    }

    // ── Clip placement ──────────────────────────────────────────

    /// Place a new clip on a track. Returns the new snapshot and the clip ID.
    ///
    /// Construction rejects an out-of-range speed rather than clamping it.
    pub fn add_clip(
        &self,
        seq: &Sequence,
        track_id: Uuid,
        spec: ClipSpec,
    ) -> EditResult<(Sequence, Uuid)> {
        let track_idx = self.editable_track(seq, track_id)?;
        let track: &Track = &seq.tracks[track_idx];

        let ctx = |e: EditError| e.in_context(track_id, None);
        validate::speed_range(spec.speed, &self.config)?;
        validate::source_bounds(
            seq.asset_duration(&spec.source_id),
            spec.source_in,
            spec.source_out,
        )
        .map_err(ctx)?;
        validate::timeline_position(spec.timeline_start).map_err(ctx)?;
        let end = spec.timeline_end();
        validate::min_duration(spec.timeline_start, end, self.config.min_clip_duration)
            .map_err(ctx)?;
        validate::no_overlap(track, None, spec.timeline_start, end, self.config.epsilon)?;

        let mut clip = Clip::from_spec(spec);
        clip.transform = clip.transform.clamped();
        clip.audio = clip.audio.clamped();
        let clip_id = clip.clip_id;

        let mut next = seq.clone();
        let track = Arc::make_mut(&mut next.tracks[track_idx]);
        track.clips.push(clip);
        track.sort_clips();

        debug!(track = %track_id, clip = %clip_id, "Added clip");
        Ok((next, clip_id))
    }

    /// Move a clip to a new start time, preserving its duration.
    pub fn move_clip(
        &self,
        seq: &Sequence,
        track_id: Uuid,
        clip_id: Uuid,
        new_start: f64,
    ) -> EditResult<Sequence> {
        let next = self.replace_clip(seq, track_id, clip_id, |track, clip| {
            validate::timeline_position(new_start)?;
            let new_end = new_start + clip.duration();
            validate::no_overlap(track, Some(clip_id), new_start, new_end, self.config.epsilon)?;

            let mut moved = clip.clone();
            moved.timeline_start = new_start;
            moved.timeline_end = new_end;
            Ok(moved)
        })?;
        debug!(track = %track_id, clip = %clip_id, new_start, "Moved clip");
        Ok(next)
    }

    /// Change the source in-point. The timeline end stays fixed; the clip
    /// grows or shrinks from its left edge.
    pub fn trim_in(
        &self,
        seq: &Sequence,
        track_id: Uuid,
        clip_id: Uuid,
        new_source_in: f64,
    ) -> EditResult<Sequence> {
        let asset_duration = self.asset_duration_of(seq, track_id, clip_id);
        let next = self.replace_clip(seq, track_id, clip_id, |track, clip| {
            if new_source_in >= clip.source_out {
                return Err(EditError::bounds(
                    Some(clip_id),
                    format!(
                        "new in-point ({new_source_in:.3}s) must be before out-point ({:.3}s)",
                        clip.source_out
                    ),
                ));
            }
            validate::source_bounds(asset_duration, new_source_in, clip.source_out)?;
            let new_start = clip.timeline_end - (clip.source_out - new_source_in) / clip.speed;
            validate::timeline_position(new_start)?;
            validate::min_duration(new_start, clip.timeline_end, self.config.min_clip_duration)?;
            validate::no_overlap(
                track,
                Some(clip_id),
                new_start,
                clip.timeline_end,
                self.config.epsilon,
            )?;

            let mut trimmed = clip.clone();
            trimmed.source_in = new_source_in;
            trimmed.timeline_start = new_start;
            Ok(trimmed)
        })?;
        debug!(track = %track_id, clip = %clip_id, new_source_in, "Trimmed clip in-point");
        Ok(next)
    }

    /// Change the source out-point. The timeline start stays fixed.
    pub fn trim_out(
        &self,
        seq: &Sequence,
        track_id: Uuid,
        clip_id: Uuid,
        new_source_out: f64,
    ) -> EditResult<Sequence> {
        let asset_duration = self.asset_duration_of(seq, track_id, clip_id);
        let next = self.replace_clip(seq, track_id, clip_id, |track, clip| {
            if new_source_out <= clip.source_in {
                return Err(EditError::bounds(
                    Some(clip_id),
                    format!(
                        "new out-point ({new_source_out:.3}s) must be after in-point ({:.3}s)",
                        clip.source_in
                    ),
                ));
            }
            validate::source_bounds(asset_duration, clip.source_in, new_source_out)?;
            let new_end = clip.timeline_start + (new_source_out - clip.source_in) / clip.speed;
            validate::min_duration(clip.timeline_start, new_end, self.config.min_clip_duration)?;
            validate::no_overlap(
                track,
                Some(clip_id),
                clip.timeline_start,
                new_end,
                self.config.epsilon,
            )?;

            let mut trimmed = clip.clone();
            trimmed.source_out = new_source_out;
            trimmed.timeline_end = new_end;
            Ok(trimmed)
        })?;
        debug!(track = %track_id, clip = %clip_id, new_source_out, "Trimmed clip out-point");
        Ok(next)
    }

    /// Split a clip at a timeline time. The left half keeps the original ID;
    /// the right half gets a fresh one, which is returned. A transition that
    /// followed the original clip now follows the right half.
    pub fn split_clip(
        &self,
        seq: &Sequence,
        track_id: Uuid,
        clip_id: Uuid,
        split_time: f64,
    ) -> EditResult<(Sequence, Uuid)> {
        let track_idx = self.editable_track(seq, track_id)?;
        let (clip_idx, clip) = seq.tracks[track_idx]
            .find_clip(clip_id)
            .ok_or_else(|| EditError::clip_not_found(clip_id))?;

        let ctx = |e: EditError| e.in_context(track_id, Some(clip_id));
        if !clip.timeline_range().contains_strictly(split_time) {
            return Err(ctx(EditError::bounds(
                Some(clip_id),
                format!(
                    "split time {split_time:.3}s is not inside clip ({})",
                    clip.timeline_range()
                ),
            )));
        }
        validate::min_duration(clip.timeline_start, split_time, self.config.min_clip_duration)
            .map_err(ctx)?;
        validate::min_duration(split_time, clip.timeline_end, self.config.min_clip_duration)
            .map_err(ctx)?;

        let split_source = clip.source_time_at(split_time);

        let mut left = clip.clone();
        left.source_out = split_source;
        left.timeline_end = split_time;

        let mut right = clip.clone();
        right.clip_id = Uuid::new_v4();
        right.source_in = split_source;
        right.timeline_start = split_time;
        let right_id = right.clip_id;

        let mut next = seq.clone();
        let track = Arc::make_mut(&mut next.tracks[track_idx]);
        track.clips[clip_idx] = left;
        track.clips.insert(clip_idx + 1, right);
        track.sort_clips();

        for t in next.transitions.iter_mut() {
            if t.from_clip_id == clip_id {
                t.from_clip_id = right_id;
            }
        }

        debug!(track = %track_id, clip = %clip_id, right = %right_id, split_time, "Split clip");
        Ok((next, right_id))
    }

    /// Remove a clip. Neighbours are not shifted; a gap remains.
    pub fn delete_clip(&self, seq: &Sequence, track_id: Uuid, clip_id: Uuid) -> EditResult<Sequence> {
        let track_idx = self.editable_track(seq, track_id)?;
        if !seq.tracks[track_idx].contains_clip(clip_id) {
            return Err(EditError::clip_not_found(clip_id));
        }

        let mut next = seq.clone();
        Arc::make_mut(&mut next.tracks[track_idx]).remove_clip(clip_id);
        self.prune_transitions(&mut next);

        debug!(track = %track_id, clip = %clip_id, "Deleted clip");
        Ok(next)
    }

    /// Change playback speed. Out-of-range speeds are clamped; the timeline
    /// end is recomputed from the source duration and must still fit.
    pub fn set_speed(&self, seq: &Sequence, clip_id: Uuid, speed: f64) -> EditResult<Sequence> {
        let track_id = self.track_of(seq, clip_id)?;
        let speed = validate::clamp_speed(speed, &self.config)?;
        let next = self.replace_clip(seq, track_id, clip_id, |track, clip| {
            let new_end = clip.timeline_start + clip.source_duration() / speed;
            validate::min_duration(clip.timeline_start, new_end, self.config.min_clip_duration)?;
            validate::no_overlap(
                track,
                Some(clip_id),
                clip.timeline_start,
                new_end,
                self.config.epsilon,
            )?;

            let mut updated = clip.clone();
            updated.speed = speed;
            updated.timeline_end = new_end;
            Ok(updated)
        })?;
        debug!(clip = %clip_id, speed, "Set clip speed");
        Ok(next)
    }

    // ── Clip attributes ─────────────────────────────────────────

    pub fn set_clip_label(
        &self,
        seq: &Sequence,
        clip_id: Uuid,
        label: String,
    ) -> EditResult<Sequence> {
        let track_id = self.track_of(seq, clip_id)?;
        self.replace_clip(seq, track_id, clip_id, |_, clip| {
            Ok(Clip {
                label,
                ..clip.clone()
            })
        })
    }

    /// Replace the clip transform, clamping each field.
    pub fn set_clip_transform(
        &self,
        seq: &Sequence,
        clip_id: Uuid,
        transform: Transform,
    ) -> EditResult<Sequence> {
        let track_id = self.track_of(seq, clip_id)?;
        self.replace_clip(seq, track_id, clip_id, |_, clip| {
            Ok(Clip {
                transform: transform.clamped(),
                ..clip.clone()
            })
        })
    }

    /// Replace the clip audio properties, clamping each field.
    pub fn set_clip_audio(
        &self,
        seq: &Sequence,
        clip_id: Uuid,
        audio: AudioProps,
    ) -> EditResult<Sequence> {
        let track_id = self.track_of(seq, clip_id)?;
        self.replace_clip(seq, track_id, clip_id, |_, clip| {
            Ok(Clip {
                audio: audio.clamped(),
                ..clip.clone()
            })
        })
    }

    // ── Transitions ─────────────────────────────────────────────

    /// Attach or update the transition between two time-adjacent clips on
    /// the same track. Durations are clamped; a cut always has duration 0.
    pub fn set_transition(
        &self,
        seq: &Sequence,
        from_clip_id: Uuid,
        to_clip_id: Uuid,
        kind: TransitionKind,
        duration: f64,
    ) -> EditResult<Sequence> {
        let (from_track, from) = seq
            .find_clip(from_clip_id)
            .ok_or_else(|| EditError::clip_not_found(from_clip_id))?;
        let (to_track, to) = seq
            .find_clip(to_clip_id)
            .ok_or_else(|| EditError::clip_not_found(to_clip_id))?;
        if from_track != to_track {
            return Err(EditError::InvalidTransitionAdjacency {
                from_clip_id,
                to_clip_id,
                reason: "clips are on different tracks".to_string(),
            });
        }
        validate::unlocked(&seq.tracks[from_track])?;
        validate::adjacency(from, to, self.config.epsilon)?;

        let duration = self.transition_duration(kind, duration)?;
        let mut next = seq.clone();
        match next
            .transitions
            .iter_mut()
            .find(|t| t.joins(from_clip_id, to_clip_id))
        {
            Some(existing) => {
                existing.kind = kind;
                existing.duration = duration;
            }
            None => next.transitions.push(Transition {
                from_clip_id,
                to_clip_id,
                kind,
                duration,
            }),
        }

        debug!(from = %from_clip_id, to = %to_clip_id, kind = %kind, duration, "Set transition");
        Ok(next)
    }

    /// Remove the transition keyed by the ordered pair.
    pub fn remove_transition(
        &self,
        seq: &Sequence,
        from_clip_id: Uuid,
        to_clip_id: Uuid,
    ) -> EditResult<Sequence> {
        let index = seq
            .transitions
            .iter()
            .position(|t| t.joins(from_clip_id, to_clip_id))
            .ok_or(EditError::NotFound(Entity::Transition {
                from_clip_id,
                to_clip_id,
            }))?;
        if let Some((track_idx, _)) = seq.find_clip(from_clip_id) {
            validate::unlocked(&seq.tracks[track_idx])?;
        }

        let mut next = seq.clone();
        next.transitions.remove(index);
        debug!(from = %from_clip_id, to = %to_clip_id, "Removed transition");
        Ok(next)
    }

    /// Insert `default_type` between every time-adjacent clip pair that has
    /// no transition yet. Existing transitions and locked tracks are left
    /// untouched. Returns the new snapshot and the transitions added.
    pub fn auto_generate_transitions(
        &self,
        seq: &Sequence,
        default_type: TransitionKind,
    ) -> EditResult<(Sequence, Vec<Transition>)> {
        let duration = if default_type.is_instant() {
            0.0
        } else {
            self.config.default_transition
        };

        let mut added = Vec::new();
        for track in seq.tracks.iter().filter(|t| !t.flags.locked) {
            for (from, to) in track.adjacent_pairs() {
                if !from.timeline_range().abuts(to.timeline_range(), self.config.epsilon) {
                    continue;
                }
                if seq.transition_between(from.clip_id, to.clip_id).is_some() {
                    continue;
                }
                added.push(Transition {
                    from_clip_id: from.clip_id,
                    to_clip_id: to.clip_id,
                    kind: default_type,
                    duration,
                });
            }
        }

        let mut next = seq.clone();
        next.transitions.extend(added.iter().cloned());
        debug!(count = added.len(), kind = %default_type, "Auto-generated transitions");
        Ok((next, added))
    }

    // ── Tracks, assets, whole timeline ──────────────────────────

    /// Append a new empty track. Returns the snapshot and the track ID.
    pub fn add_track(&self, seq: &Sequence, kind: TrackKind, label: String) -> (Sequence, Uuid) {
        let track = Track::new(kind, label);
        let track_id = track.track_id;
        let mut next = seq.clone();
        next.tracks.push(Arc::new(track));
        debug!(track = %track_id, ?kind, "Added track");
        (next, track_id)
    }

    /// Remove a track with its clips and their transitions.
    pub fn remove_track(&self, seq: &Sequence, track_id: Uuid) -> EditResult<Sequence> {
        let track_idx = self.editable_track(seq, track_id)?;
        let mut next = seq.clone();
        next.tracks.remove(track_idx);
        self.prune_transitions(&mut next);
        debug!(track = %track_id, "Removed track");
        Ok(next)
    }

    /// Set visibility, mute and lock. Allowed on locked tracks so they can
    /// be unlocked.
    pub fn set_track_flags(
        &self,
        seq: &Sequence,
        track_id: Uuid,
        flags: TrackFlags,
    ) -> EditResult<Sequence> {
        let track_idx = seq
            .track_index(track_id)
            .ok_or_else(|| EditError::track_not_found(track_id))?;
        let mut next = seq.clone();
        Arc::make_mut(&mut next.tracks[track_idx]).flags = flags;
        Ok(next)
    }

    /// Record the duration of a source asset. Rejected if clips already use
    /// media past the new duration.
    pub fn register_asset(
        &self,
        seq: &Sequence,
        source_id: String,
        asset: AssetMetadata,
    ) -> EditResult<Sequence> {
        if !(asset.duration.is_finite() && asset.duration > 0.0) {
            return Err(EditError::InvalidRange {
                field: "asset duration",
                value: asset.duration,
                min: 0.0,
                max: f64::INFINITY,
            });
        }
        for track in &seq.tracks {
            for clip in track.clips.iter().filter(|c| c.source_id == source_id) {
                validate::source_bounds(Some(asset.duration), clip.source_in, clip.source_out)
                    .map_err(|e| e.in_context(track.track_id, Some(clip.clip_id)))?;
            }
        }

        let mut next = seq.clone();
        next.assets.insert(source_id, asset);
        Ok(next)
    }

    /// Remove every clip and transition, keeping tracks, settings and assets.
    pub fn clear_timeline(&self, seq: &Sequence) -> EditResult<Sequence> {
        if let Some(locked) = seq
            .tracks
            .iter()
            .find(|t| t.flags.locked && !t.clips.is_empty())
        {
            return Err(EditError::TrackLocked {
                track_id: locked.track_id,
            });
        }

        let mut next = seq.clone();
        for track in next.tracks.iter_mut().filter(|t| !t.clips.is_empty()) {
            Arc::make_mut(track).clips.clear();
        }
        next.transitions.clear();
        debug!("Cleared timeline");
        Ok(next)
    }

    // ── Helpers ─────────────────────────────────────────────────

    /// Index of an existing, unlocked track.
    fn editable_track(&self, seq: &Sequence, track_id: Uuid) -> EditResult<usize> {
        let idx = seq
            .track_index(track_id)
            .ok_or_else(|| EditError::track_not_found(track_id))?;
        validate::unlocked(&seq.tracks[idx])?;
        Ok(idx)
    }

    /// Track holding a clip.
    fn track_of(&self, seq: &Sequence, clip_id: Uuid) -> EditResult<Uuid> {
        seq.find_clip(clip_id)
            .map(|(idx, _)| seq.tracks[idx].track_id)
            .ok_or_else(|| EditError::clip_not_found(clip_id))
    }

    fn asset_duration_of(&self, seq: &Sequence, track_id: Uuid, clip_id: Uuid) -> Option<f64> {
        seq.track(track_id)
            .and_then(|t| t.find_clip(clip_id))
            .and_then(|(_, clip)| seq.asset_duration(&clip.source_id))
    }

    /// Validate and compute a replacement for one clip against the original
    /// track, then produce a snapshot with the replacement in place.
    fn replace_clip<F>(
        &self,
        seq: &Sequence,
        track_id: Uuid,
        clip_id: Uuid,
        edit: F,
    ) -> EditResult<Sequence>
    where
        F: FnOnce(&Track, &Clip) -> EditResult<Clip>,
    {
        let track_idx = self.editable_track(seq, track_id)?;
        let track: &Track = &seq.tracks[track_idx];
        let (clip_idx, clip) = track
            .find_clip(clip_id)
            .ok_or_else(|| EditError::clip_not_found(clip_id))?;

        let updated = edit(track, clip).map_err(|e| e.in_context(track_id, Some(clip_id)))?;
        let retimed = updated.timeline_range() != clip.timeline_range();

        let mut next = seq.clone();
        let track = Arc::make_mut(&mut next.tracks[track_idx]);
        track.clips[clip_idx] = updated;
        if retimed {
            track.sort_clips();
            self.prune_transitions(&mut next);
        }
        Ok(next)
    }

    fn transition_duration(&self, kind: TransitionKind, duration: f64) -> EditResult<f64> {
        if kind.is_instant() {
            return Ok(0.0);
        }
        if !duration.is_finite() {
            return Err(EditError::InvalidRange {
                field: "transition duration",
                value: duration,
                min: self.config.min_transition,
                max: self.config.max_transition,
            });
        }
        Ok(duration.clamp(self.config.min_transition, self.config.max_transition))
    }

    /// Drop transitions whose clips are gone, on different tracks, or no
    /// longer time-adjacent.
    fn prune_transitions(&self, seq: &mut Sequence) {
        let epsilon = self.config.epsilon;
        let before = seq.transitions.len();
        let valid: Vec<bool> = seq
            .transitions
            .iter()
            .map(|t| match (seq.find_clip(t.from_clip_id), seq.find_clip(t.to_clip_id)) {
                (Some((ft, from)), Some((tt, to))) => {
                    ft == tt && from.timeline_range().abuts(to.timeline_range(), epsilon)
                }
                _ => false,
            })
            .collect();
        let mut keep = valid.into_iter();
        seq.transitions.retain(|_| keep.next().unwrap_or(false));

        let dropped = before - seq.transitions.len();
        if dropped > 0 {
            debug!(dropped, "Pruned transitions no longer between adjacent clips");
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────
