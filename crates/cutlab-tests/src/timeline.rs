//! Integration tests for the edit engine.
//!
//! Drives whole editing sessions through `TimelineEditor`, `EditCommand`
//! and `History` and checks the snapshots against the invariant checker.

use cutlab_core::TimeRange;
use cutlab_timeline::validate::check_sequence;
use cutlab_timeline::{
    ClipSpec, EditCommand, EditConfig, EditError, History, PopulateLayout, SceneRange, Sequence,
    TimelineEditor, TrackKind, TransitionKind,
};
use uuid::Uuid;

// ── Helpers ────────────────────────────────────────────────────

struct Fixture {
    editor: TimelineEditor,
    seq: Sequence,
    track: Uuid,
    a: Uuid,
    b: Uuid,
}

/// `[Clip A: 0-10][gap][Clip B: 15-20]` on V1.
fn two_clip_track() -> Fixture {
    let editor = TimelineEditor::default();
    let seq = Sequence::default();
    let track = seq.tracks[0].track_id;
    let (seq, a) = editor
        .add_clip(&seq, track, ClipSpec::new("cam", 0.0, 0.0, 10.0).with_label("A"))
        .unwrap();
    let (seq, b) = editor
        .add_clip(&seq, track, ClipSpec::new("cam", 15.0, 30.0, 35.0).with_label("B"))
        .unwrap();
    Fixture {
        editor,
        seq,
        track,
        a,
        b,
    }
}

fn range_of(seq: &Sequence, clip_id: Uuid) -> TimeRange {
    seq.find_clip(clip_id).unwrap().1.timeline_range()
}

fn assert_valid(seq: &Sequence) {
    check_sequence(seq, &EditConfig::default()).unwrap();
}

// ── Scenarios ──────────────────────────────────────────────────

#[test]
fn move_into_gap_succeeds() {
    let f = two_clip_track();
    let seq = f.editor.move_clip(&f.seq, f.track, f.b, 12.0).unwrap();
    assert_eq!(range_of(&seq, f.b), TimeRange::new(12.0, 17.0));
    assert_valid(&seq);
}

#[test]
fn move_onto_neighbour_fails_with_overlap() {
    let f = two_clip_track();
    let err = f.editor.move_clip(&f.seq, f.track, f.b, 5.0).unwrap_err();
    assert_eq!(err.kind(), "overlap");
    assert!(matches!(err, EditError::Overlap { conflicting_clip_id, .. } if conflicting_clip_id == f.a));
}

#[test]
fn split_yields_contiguous_halves() {
    let f = two_clip_track();
    let (seq, right) = f.editor.split_clip(&f.seq, f.track, f.a, 5.0).unwrap();

    let (_, left) = seq.find_clip(f.a).unwrap();
    let (_, r) = seq.find_clip(right).unwrap();
    assert_eq!(left.timeline_range(), TimeRange::new(0.0, 5.0));
    assert_eq!(left.source_range(), TimeRange::new(0.0, 5.0));
    assert_eq!(r.timeline_range(), TimeRange::new(5.0, 10.0));
    assert_eq!(r.source_range(), TimeRange::new(5.0, 10.0));
    assert_ne!(right, f.a);
    assert_valid(&seq);
}

#[test]
fn delete_leaves_a_gap() {
    let f = two_clip_track();
    let seq = f.editor.delete_clip(&f.seq, f.track, f.b).unwrap();
    assert!(seq.find_clip(f.b).is_none());
    assert_eq!(range_of(&seq, f.a), TimeRange::new(0.0, 10.0));
    assert_eq!(seq.duration(), 10.0);
}

#[test]
fn transition_requires_touching_clips() {
    let f = two_clip_track();
    let (seq, right) = f.editor.split_clip(&f.seq, f.track, f.a, 5.0).unwrap();

    let seq = f
        .editor
        .set_transition(&seq, f.a, right, TransitionKind::CrossDissolve, 0.5)
        .unwrap();
    let t = seq.transition_between(f.a, right).unwrap();
    assert_eq!(t.kind, TransitionKind::CrossDissolve);
    assert_eq!(t.duration, 0.5);

    // A gap opens: move the right half away, then try again.
    let gapped = f.editor.move_clip(&seq, f.track, right, 11.0).unwrap();
    assert!(gapped.transitions.is_empty());
    let err = f
        .editor
        .set_transition(&gapped, f.a, right, TransitionKind::CrossDissolve, 0.5)
        .unwrap_err();
    assert_eq!(err.kind(), "invalid_transition_adjacency");
}

// ── Sessions ───────────────────────────────────────────────────

#[test]
fn rejected_edit_leaves_snapshot_untouched() {
    let f = two_clip_track();
    let before = f.seq.clone();
    assert!(f.editor.trim_out(&f.seq, f.track, f.a, 20.0).is_err());
    assert_eq!(f.seq, before);
}

#[test]
fn command_session_with_undo() {
    let f = two_clip_track();
    let mut history = History::default();
    let mut current = f.seq.clone();

    let commands = [
        EditCommand::MoveClip {
            track_id: f.track,
            clip_id: f.b,
            new_start: 10.0,
        },
        EditCommand::AutoGenerateTransitions {
            default_type: TransitionKind::FadeInOut,
        },
        EditCommand::SetSpeed {
            clip_id: f.a,
            speed: 2.0,
        },
    ];
    for cmd in &commands {
        let outcome = f.editor.apply(&current, cmd).unwrap();
        history.record(std::mem::replace(&mut current, outcome.sequence));
        assert_valid(&current);
    }

    // Speeding A up to 2x pulls its end back to 5s and breaks adjacency.
    assert_eq!(range_of(&current, f.a), TimeRange::new(0.0, 5.0));
    assert!(current.transitions.is_empty());

    let current = history.undo(current).unwrap();
    assert_eq!(current.transitions.len(), 1);
    assert_eq!(current.transitions[0].kind, TransitionKind::FadeInOut);
}

#[test]
fn commands_roundtrip_through_json() {
    let f = two_clip_track();
    let cmd = EditCommand::SplitClip {
        track_id: f.track,
        clip_id: f.a,
        split_time: 2.5,
    };
    let json = serde_json::to_string(&cmd).unwrap();
    assert!(json.contains(r#""op":"split_clip""#));

    let parsed: EditCommand = serde_json::from_str(&json).unwrap();
    let outcome = f.editor.apply(&f.seq, &parsed).unwrap();
    assert_eq!(outcome.created.len(), 1);
    assert_eq!(outcome.sequence.clip_count(), 3);
}

#[test]
fn populated_track_gets_cut_transitions() {
    let editor = TimelineEditor::default();
    let seq = Sequence::default();
    let track = seq.tracks[0].track_id;
    let ranges = [
        SceneRange::new(0.0, 4.2),
        SceneRange::new(4.2, 4.4),
        SceneRange::new(4.4, 9.0),
        SceneRange::new(12.0, 15.5),
    ];

    let (seq, report) = editor
        .populate_from_ranges(&seq, track, "interview", &ranges, PopulateLayout::Sequential)
        .unwrap();
    assert_eq!(report.added.len(), 3);
    assert_eq!(report.skipped.len(), 1);

    let (seq, added) = editor
        .auto_generate_transitions(&seq, TransitionKind::Cut)
        .unwrap();
    assert_eq!(added.len(), 2);
    assert!(added.iter().all(|t| t.duration == 0.0));
    assert_valid(&seq);
}

#[test]
fn tracks_are_independent_lanes() {
    let f = two_clip_track();
    let (seq, overlay) = f.editor.add_track(&f.seq, TrackKind::Overlay, "Logo".into());
    // Same time range as A, different track: allowed.
    let (seq, _) = f
        .editor
        .add_clip(&seq, overlay, ClipSpec::new("logo", 0.0, 0.0, 10.0))
        .unwrap();
    assert_eq!(seq.tracks.len(), 3);
    assert_valid(&seq);

    // Transitions never span tracks.
    let logo = seq.track(overlay).unwrap().clips[0].clip_id;
    let err = f
        .editor
        .set_transition(&seq, f.a, logo, TransitionKind::Cut, 0.0)
        .unwrap_err();
    assert!(matches!(err, EditError::InvalidTransitionAdjacency { .. }));
}
