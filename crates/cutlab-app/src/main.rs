//! CutLab - command-line timeline editor
//!
//! Entry point. Each invocation performs one load → edit → save cycle
//! against the project store.

use anyhow::{bail, Context, Result};
use cutlab_core::{format_precise, format_timecode};
use cutlab_timeline::{
    commit, EditCommand, EditConfig, JsonFileStore, PopulateLayout, Project, SceneRange,
    Sequence, TimelineEditor, TimelineStore, TrackKind, TransitionKind,
};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const DEFAULT_STORE_DIR: &str = "storage/timelines";

const USAGE: &str = "\
Usage: cutlab <command> [args]

Commands:
  init <project_id> [name]                             Create an empty project
  populate <project_id> <source_id> <ranges.json> [--aligned]
                                                       Add clips from detected ranges
  apply <project_id> <command.json>                    Apply one edit command
  show <project_id>                                    Print the timeline

Environment:
  CUTLAB_STORE_DIR   project directory (default: storage/timelines)
  CUTLAB_CONFIG      optional edit policy JSON file
  RUST_LOG           log filter (default: info)";

fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        println!("{USAGE}");
        return Ok(());
    };

    let config = load_config()?;
    let store = JsonFileStore::new(
        std::env::var_os("CUTLAB_STORE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_DIR)),
    )
    .with_config(config.clone());
    let editor = TimelineEditor::new(config)?;

    match (command.as_str(), &args[1..]) {
        ("init", [project_id]) => init(&store, project_id, project_id),
        ("init", [project_id, name]) => init(&store, project_id, name),
        ("populate", [project_id, source_id, ranges]) => populate(
            &store,
            &editor,
            project_id,
            source_id,
            Path::new(ranges),
            PopulateLayout::Sequential,
        ),
        ("populate", [project_id, source_id, ranges, flag]) if flag == "--aligned" => populate(
            &store,
            &editor,
            project_id,
            source_id,
            Path::new(ranges),
            PopulateLayout::SourceAligned,
        ),
        ("apply", [project_id, command_file]) => {
            apply(&store, &editor, project_id, Path::new(command_file))
        }
        ("show", [project_id]) => show(&store, project_id),
        _ => bail!("unrecognised arguments\n\n{USAGE}"),
    }
}

/// Read the edit policy from `CUTLAB_CONFIG`, or use the defaults.
fn load_config() -> Result<EditConfig> {
    let Some(path) = std::env::var_os("CUTLAB_CONFIG") else {
        return Ok(EditConfig::default());
    };
    let data = std::fs::read(&path)
        .with_context(|| format!("reading config {}", Path::new(&path).display()))?;
    let config = EditConfig::from_json(&data)?;
    info!(path = %Path::new(&path).display(), "Loaded edit config");
    Ok(config)
}

fn init(store: &JsonFileStore, project_id: &str, name: &str) -> Result<()> {
    if store.exists(project_id) {
        bail!("project '{project_id}' already exists");
    }
    let project = Project::new(project_id, name);
    store.save(&project)?;
    println!(
        "Created project {project_id} at {}",
        store.path_for(project_id).display()
    );
    Ok(())
}

fn populate(
    store: &JsonFileStore,
    editor: &TimelineEditor,
    project_id: &str,
    source_id: &str,
    ranges_file: &Path,
    layout: PopulateLayout,
) -> Result<()> {
    let data = std::fs::read(ranges_file)
        .with_context(|| format!("reading ranges {}", ranges_file.display()))?;
    let ranges: Vec<SceneRange> = serde_json::from_slice(&data)
        .with_context(|| format!("parsing ranges {}", ranges_file.display()))?;

    let (project, (report, transitions)) = commit(store, project_id, |seq| {
        let (seq, track_id) = first_video_track(editor, seq);
        let (seq, report) =
            editor.populate_from_ranges(&seq, track_id, source_id, &ranges, layout)?;
        let (seq, added) = editor.auto_generate_transitions(&seq, TransitionKind::Cut)?;
        Ok((seq, (report, added.len())))
    })?;

    println!(
        "Added {} clip(s), skipped {}, {} transition(s); revision {}",
        report.added.len(),
        report.skipped.len(),
        transitions,
        project.revision
    );
    for skipped in &report.skipped {
        println!(
            "  skipped {} - {}: {}",
            format_precise(skipped.range.start),
            format_precise(skipped.range.end),
            skipped.reason
        );
    }
    Ok(())
}

/// The first video track, adding one if the sequence has none.
fn first_video_track(editor: &TimelineEditor, seq: &Sequence) -> (Sequence, uuid::Uuid) {
    match seq.tracks.iter().find(|t| t.kind == TrackKind::Video) {
        Some(track) => (seq.clone(), track.track_id),
        None => editor.add_track(seq, TrackKind::Video, "V1".to_string()),
    }
}

fn apply(
    store: &JsonFileStore,
    editor: &TimelineEditor,
    project_id: &str,
    command_file: &Path,
) -> Result<()> {
    let data = std::fs::read(command_file)
        .with_context(|| format!("reading command {}", command_file.display()))?;
    let command: EditCommand = serde_json::from_slice(&data)
        .with_context(|| format!("parsing command {}", command_file.display()))?;

    let (project, outcome) = commit(store, project_id, |seq| {
        let outcome = editor.apply(seq, &command)?;
        Ok((outcome.sequence.clone(), outcome))
    })?;

    println!("Applied {} (revision {})", command.name(), project.revision);
    for id in &outcome.created {
        println!("  created {id}");
    }
    for t in &outcome.transitions_added {
        println!("  transition {} -> {} ({})", t.from_clip_id, t.to_clip_id, t.kind);
    }
    Ok(())
}

fn show(store: &JsonFileStore, project_id: &str) -> Result<()> {
    let project = store.load(project_id)?;
    let seq = &project.sequence;
    let fps = seq.settings.fps;

    println!(
        "{} ({}) revision {} | {}x{} @ {} fps | duration {}",
        project.name,
        project.project_id,
        project.revision,
        seq.settings.width,
        seq.settings.height,
        fps,
        format_precise(seq.duration())
    );
    for track in &seq.tracks {
        let mut flags = Vec::new();
        if !track.flags.visible {
            flags.push("hidden");
        }
        if track.flags.muted {
            flags.push("muted");
        }
        if track.flags.locked {
            flags.push("locked");
        }
        println!(
            "{} [{:?}] {} {}",
            track.label,
            track.kind,
            track.track_id,
            flags.join(",")
        );
        for clip in &track.clips {
            println!(
                "  {} - {}  {:<16} {} {}-{} x{}  {}",
                format_timecode(clip.timeline_start, fps),
                format_timecode(clip.timeline_end, fps),
                clip.label,
                clip.source_id,
                format_precise(clip.source_in),
                format_precise(clip.source_out),
                clip.speed,
                clip.clip_id
            );
            if let Some(t) = seq.transition_after(clip.clip_id) {
                println!("      -> {} {:.2}s", t.kind, t.duration);
            }
        }
    }
    Ok(())
}
