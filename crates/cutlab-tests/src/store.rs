//! Integration tests for persistence: file store, revisions, legacy files.

use cutlab_core::CutlabError;
use cutlab_timeline::{
    commit, ClipSpec, JsonFileStore, MemoryStore, Project, TimelineEditor, TimelineStore,
    TransitionKind,
};

fn seeded(store: &dyn TimelineStore) -> uuid::Uuid {
    let project = Project::new("show", "Show");
    let track = project.sequence.tracks[0].track_id;
    store.save(&project).unwrap();
    track
}

#[test]
fn edits_survive_a_reload() {
    let dir = tempfile::tempdir().unwrap();
    let editor = TimelineEditor::default();
    let track = {
        let store = JsonFileStore::new(dir.path());
        let track = seeded(&store);
        commit(&store, "show", |seq| {
            let (seq, a) = editor.add_clip(seq, track, ClipSpec::new("cam", 0.0, 0.0, 6.0))?;
            let (seq, b) = editor.add_clip(&seq, track, ClipSpec::new("cam", 6.0, 8.0, 12.0))?;
            let seq = editor.set_transition(&seq, a, b, TransitionKind::FadeOut, 0.8)?;
            Ok((seq, ()))
        })
        .unwrap();
        track
    };

    let store = JsonFileStore::new(dir.path());
    let project = store.load("show").unwrap();
    assert_eq!(project.revision, 2);
    let clips = &project.sequence.track(track).unwrap().clips;
    assert_eq!(clips.len(), 2);
    assert_eq!(project.sequence.transitions[0].duration, 0.8);
}

#[test]
fn concurrent_writers_conflict() {
    let store = MemoryStore::new();
    let editor = TimelineEditor::default();
    let track = seeded(&store);

    let first = store.load("show").unwrap();
    let second = store.load("show").unwrap();

    let (seq, _) = editor
        .add_clip(&first.sequence, track, ClipSpec::new("cam", 0.0, 0.0, 2.0))
        .unwrap();
    store.save(&first.with_sequence(seq)).unwrap();

    let err = store.save(&second).unwrap_err();
    assert!(matches!(
        err,
        CutlabError::Conflict {
            expected: 1,
            found: 2,
            ..
        }
    ));
}

#[test]
fn threads_serialize_on_the_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path());
    let editor = TimelineEditor::default();
    let track = seeded(&store);

    std::thread::scope(|s| {
        for i in 0..4 {
            let store = &store;
            let editor = &editor;
            s.spawn(move || {
                // Retry on conflict until this thread's clip lands.
                loop {
                    let start = i as f64 * 5.0;
                    let result = commit(store, "show", |seq| {
                        editor.add_clip(seq, track, ClipSpec::new("cam", start, 0.0, 4.0))
                    });
                    match result {
                        Ok(_) => break,
                        Err(CutlabError::Conflict { .. }) => continue,
                        Err(e) => panic!("unexpected error: {e}"),
                    }
                }
            });
        }
    });

    let project = store.load("show").unwrap();
    assert_eq!(project.sequence.clip_count(), 4);
    assert_eq!(project.revision, 5);
}

#[test]
fn legacy_manager_file_loads_through_store() {
    let dir = tempfile::tempdir().unwrap();
    let legacy = r#"{
        "project_id": "old",
        "created_at": "2024-03-01T10:00:00",
        "updated_at": "2024-03-01T10:05:00",
        "clips": [
            { "clip_id": "clip_1_1709287200", "source_video": "abc", "source_filename": "a.mp4",
              "start_seconds": 12.0, "end_seconds": 18.0, "speed": 1.0, "label": "Clip 1", "position": 0 },
            { "clip_id": "clip_2_1709287201", "source_video": "abc", "source_filename": "a.mp4",
              "start_seconds": 40.0, "end_seconds": 43.0, "speed": 1.0, "label": "Clip 2", "position": 1 }
        ],
        "transitions": [
            { "from_clip_id": "clip_1_1709287200", "to_clip_id": "clip_2_1709287201",
              "type": "cut", "duration": 0.5 }
        ],
        "duration": 9.0,
        "settings": { "fps": 30.0, "width": 1920, "height": 1080 }
    }"#;
    std::fs::write(dir.path().join("old_timeline.json"), legacy).unwrap();

    let store = JsonFileStore::new(dir.path());
    let project = store.load("old").unwrap();
    assert_eq!(project.sequence.duration(), 9.0);
    assert_eq!(project.sequence.transitions.len(), 1);
    assert_eq!(project.sequence.transitions[0].duration, 0.0);

    // Saving writes the current format with a fresh revision.
    assert_eq!(store.save(&project).unwrap(), 1);
    let raw = std::fs::read_to_string(store.path_for("old")).unwrap();
    assert!(raw.contains("\"version\": 1"));
}

#[test]
fn hand_edited_overlap_is_refused_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path());
    let editor = TimelineEditor::default();
    let track = seeded(&store);
    commit(&store, "show", |seq| {
        let (seq, a) = editor.add_clip(seq, track, ClipSpec::new("cam", 0.0, 0.0, 10.0))?;
        let (seq, b) = editor.add_clip(&seq, track, ClipSpec::new("cam", 10.0, 20.0, 30.0))?;
        let seq = editor.set_transition(&seq, a, b, TransitionKind::Cut, 0.0)?;
        Ok((seq, ()))
    })
    .unwrap();

    // Drag B back over A by hand: [5, 15) now collides with [0, 10).
    let path = store.path_for("show");
    let mut value: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    let b = &mut value["project"]["sequence"]["tracks"][0]["clips"][1];
    b["timeline_start"] = serde_json::json!(5.0);
    b["timeline_end"] = serde_json::json!(15.0);
    std::fs::write(&path, serde_json::to_vec_pretty(&value).unwrap()).unwrap();

    assert!(matches!(
        store.load("show"),
        Err(CutlabError::Serialization(_))
    ));
    // Nothing can be edited on top of it either.
    let result = commit(&store, "show", |seq| {
        editor.auto_generate_transitions(seq, TransitionKind::Cut)
    });
    assert!(matches!(result, Err(CutlabError::Serialization(_))));
}
