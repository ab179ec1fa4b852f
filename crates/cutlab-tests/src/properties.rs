//! Property-based tests for the edit engine.
//!
//! Random operation sequences are applied to a track; rejected operations
//! are skipped. Every snapshot that an operation returns must satisfy the
//! full invariant check.

use cutlab_timeline::validate::check_sequence;
use cutlab_timeline::{ClipSpec, EditConfig, Sequence, TimelineEditor, TransitionKind};
use proptest::prelude::*;
use uuid::Uuid;

#[derive(Debug, Clone)]
enum Op {
    Add { start: f64, len: f64, speed: f64 },
    Move { pick: usize, start: f64 },
    TrimIn { pick: usize, delta: f64 },
    TrimOut { pick: usize, delta: f64 },
    Split { pick: usize, frac: f64 },
    Delete { pick: usize },
    Speed { pick: usize, speed: f64 },
    Transitions,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0.0..60.0f64, 0.1..12.0f64, 0.25..4.0f64)
            .prop_map(|(start, len, speed)| Op::Add { start, len, speed }),
        2 => (any::<usize>(), 0.0..60.0f64).prop_map(|(pick, start)| Op::Move { pick, start }),
        1 => (any::<usize>(), -5.0..5.0f64).prop_map(|(pick, delta)| Op::TrimIn { pick, delta }),
        1 => (any::<usize>(), -5.0..5.0f64).prop_map(|(pick, delta)| Op::TrimOut { pick, delta }),
        2 => (any::<usize>(), 0.0..1.0f64).prop_map(|(pick, frac)| Op::Split { pick, frac }),
        1 => any::<usize>().prop_map(|pick| Op::Delete { pick }),
        1 => (any::<usize>(), 0.0..6.0f64).prop_map(|(pick, speed)| Op::Speed { pick, speed }),
        1 => Just(Op::Transitions),
    ]
}

/// Apply one op to V1. `None` when the op picks nothing or is rejected.
fn apply(editor: &TimelineEditor, seq: &Sequence, op: &Op) -> Option<Sequence> {
    let track = &seq.tracks[0];
    let track_id = track.track_id;
    let picked = |pick: usize| {
        (!track.clips.is_empty()).then(|| track.clips[pick % track.clips.len()].clone())
    };

    match *op {
        Op::Add { start, len, speed } => {
            let spec = ClipSpec::new("src", start, 10.0, 10.0 + len).with_speed(speed);
            editor.add_clip(seq, track_id, spec).ok().map(|(s, _)| s)
        }
        Op::Move { pick, start } => {
            let clip = picked(pick)?;
            editor.move_clip(seq, track_id, clip.clip_id, start).ok()
        }
        Op::TrimIn { pick, delta } => {
            let clip = picked(pick)?;
            editor
                .trim_in(seq, track_id, clip.clip_id, clip.source_in + delta)
                .ok()
        }
        Op::TrimOut { pick, delta } => {
            let clip = picked(pick)?;
            editor
                .trim_out(seq, track_id, clip.clip_id, clip.source_out + delta)
                .ok()
        }
        Op::Split { pick, frac } => {
            let clip = picked(pick)?;
            let t = clip.timeline_start + clip.duration() * frac;
            editor
                .split_clip(seq, track_id, clip.clip_id, t)
                .ok()
                .map(|(s, _)| s)
        }
        Op::Delete { pick } => {
            let clip = picked(pick)?;
            editor.delete_clip(seq, track_id, clip.clip_id).ok()
        }
        Op::Speed { pick, speed } => {
            let clip = picked(pick)?;
            editor.set_speed(seq, clip.clip_id, speed).ok()
        }
        Op::Transitions => editor
            .auto_generate_transitions(seq, TransitionKind::CrossDissolve)
            .ok()
            .map(|(s, _)| s),
    }
}

/// A track with one clip `[start, start + len)` at `speed`.
fn single_clip(
    editor: &TimelineEditor,
    start: f64,
    len: f64,
    speed: f64,
) -> (Sequence, Uuid, Uuid) {
    let seq = Sequence::default();
    let track_id = seq.tracks[0].track_id;
    let spec = ClipSpec::new("src", start, 0.0, len * speed).with_speed(speed);
    let (seq, clip_id) = editor.add_clip(&seq, track_id, spec).unwrap();
    (seq, track_id, clip_id)
}

proptest! {
    /// No overlap, duration floor, speed consistency and transition adjacency
    /// hold after any sequence of operations.
    #[test]
    fn invariants_hold_after_random_edits(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let editor = TimelineEditor::default();
        let config = EditConfig::default();
        let mut seq = Sequence::default();

        for op in &ops {
            if let Some(next) = apply(&editor, &seq, op) {
                let audit = check_sequence(&next, &config);
                prop_assert!(audit.is_ok(), "after {:?}: {:?}", op, audit);
                for clip in next.clips() {
                    prop_assert!(clip.duration() >= 0.5 - 1e-9);
                    prop_assert!((clip.duration() - clip.source_duration() / clip.speed).abs() < 1e-3);
                }
                seq = next;
            }
        }
    }

    /// A split partitions the clip: durations add up and source ranges meet.
    #[test]
    fn split_is_a_partition(len in 1.0..30.0f64, speed in 0.25..4.0f64, frac in 0.0..1.0f64) {
        let editor = TimelineEditor::default();
        let (seq, track_id, clip_id) = single_clip(&editor, 3.0, len, speed);
        let original = seq.find_clip(clip_id).unwrap().1.clone();
        let t = original.timeline_start + original.duration() * frac;

        if let Ok((next, right_id)) = editor.split_clip(&seq, track_id, clip_id, t) {
            let left = next.find_clip(clip_id).unwrap().1;
            let right = next.find_clip(right_id).unwrap().1;
            prop_assert!((left.duration() + right.duration() - original.duration()).abs() < 1e-9);
            prop_assert_eq!(left.source_out, right.source_in);
            prop_assert_eq!(left.source_in, original.source_in);
            prop_assert_eq!(right.source_out, original.source_out);
            prop_assert_eq!(left.timeline_end, right.timeline_start);
        } else {
            // Only rejected when one half would fall below the floor.
            prop_assert!(t - original.timeline_start < 0.5 || original.timeline_end - t < 0.5);
        }
    }

    /// Moving never changes a clip's timeline duration.
    #[test]
    fn move_preserves_duration(len in 0.5..20.0f64, speed in 0.25..4.0f64, to in 0.0..500.0f64) {
        let editor = TimelineEditor::default();
        let (seq, track_id, clip_id) = single_clip(&editor, 0.0, len, speed);
        let before = seq.find_clip(clip_id).unwrap().1.duration();

        let next = editor.move_clip(&seq, track_id, clip_id, to).unwrap();
        let after = next.find_clip(clip_id).unwrap().1;
        prop_assert_eq!(after.timeline_start, to);
        prop_assert!((after.duration() - before).abs() < 1e-9);
    }

    /// Setting the same speed twice yields the same snapshot as once.
    #[test]
    fn set_speed_is_idempotent(len in 1.0..20.0f64, speed in 0.0..8.0f64) {
        let editor = TimelineEditor::default();
        let (seq, _, clip_id) = single_clip(&editor, 0.0, len, 1.0);

        if let Ok(once) = editor.set_speed(&seq, clip_id, speed) {
            let twice = editor.set_speed(&once, clip_id, speed).unwrap();
            prop_assert_eq!(once, twice);
        }
    }
}
