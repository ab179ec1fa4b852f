//! Project serialization with versioning and migration.
//!
//! Uses JSON with a schema version field for forward-compatible persistence.
//! Version 0 is the flat timeline-manager layout (a single ordered clip list
//! addressed by `position`); it is rebuilt into a one-track sequence.

use cutlab_core::{CutlabError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::clip::ClipSpec;
use crate::config::EditConfig;
use crate::edit::TimelineEditor;
use crate::project::{Project, Sequence, SequenceSettings};
use crate::transition::TransitionKind;
use crate::validate::check_sequence;

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Versioned project file wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectFile {
    /// Schema version for migration.
    pub version: u32,
    /// The project data.
    pub project: Project,
    /// Application version that wrote this file.
    pub app_version: String,
}

impl ProjectFile {
    /// Create a new project file from a project.
    pub fn new(project: Project) -> Self {
        Self {
            version: CURRENT_VERSION,
            project,
            app_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Serialize to JSON bytes.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
            .map_err(|e| CutlabError::Serialization(format!("Failed to serialize project: {e}")))
    }

    /// Deserialize from JSON bytes, applying migrations if needed, and check
    /// the timeline against the default policy.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        Self::from_json_with(data, &EditConfig::default())
    }

    /// Like [`ProjectFile::from_json`], checking against `config`.
    ///
    /// Clips are re-sorted by start time; any remaining invariant violation
    /// (overlap, short clip, dangling or non-adjacent transition) rejects
    /// the file.
    pub fn from_json_with(data: &[u8], config: &EditConfig) -> Result<Self> {
        let raw: serde_json::Value = serde_json::from_slice(data)
            .map_err(|e| CutlabError::Serialization(format!("Invalid JSON: {e}")))?;

        let version = raw
            .get("version")
            .and_then(|v| v.as_u64())
            .map(|v| u32::try_from(v).unwrap_or(u32::MAX))
            .unwrap_or(0);

        if version > CURRENT_VERSION {
            return Err(CutlabError::Serialization(format!(
                "Project file version {version} is newer than supported version {CURRENT_VERSION}"
            )));
        }

        let migrated = migrate(raw, version)?;

        let mut file: Self = serde_json::from_value(migrated)
            .map_err(|e| CutlabError::Serialization(format!("Failed to parse project: {e}")))?;
        for track in &mut file.project.sequence.tracks {
            Arc::make_mut(track).sort_clips();
        }
        check_sequence(&file.project.sequence, config).map_err(|e| {
            CutlabError::Serialization(format!(
                "Project '{}' is inconsistent: {e}",
                file.project.project_id
            ))
        })?;
        Ok(file)
    }

    /// Load project from a file path.
    pub fn load_from_file(path: &Path, config: &EditConfig) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_json_with(&data, config)
    }
}

/// Apply sequential migrations from `from_version` to CURRENT_VERSION.
fn migrate(mut data: serde_json::Value, from_version: u32) -> Result<serde_json::Value> {
    let mut version = from_version;

    while version < CURRENT_VERSION {
        match version {
            0 => {
                let project = if data.get("clips").is_some() {
                    let legacy: LegacyTimeline = serde_json::from_value(data).map_err(|e| {
                        CutlabError::Serialization(format!("Invalid legacy timeline: {e}"))
                    })?;
                    let project = legacy.into_project();
                    serde_json::to_value(project).map_err(|e| {
                        CutlabError::Serialization(format!("Failed to migrate project: {e}"))
                    })?
                } else {
                    // A bare project without the wrapper
                    data
                };
                data = serde_json::json!({
                    "version": 1,
                    "project": project,
                    "app_version": "0.0.0",
                });
                version = 1;
            }
            _ => {
                return Err(CutlabError::Serialization(format!(
                    "No migration path from version {version}"
                )));
            }
        }
    }

    Ok(data)
}

// ── Legacy layout (version 0) ───────────────────────────────────

#[derive(Debug, Deserialize)]
struct LegacyTimeline {
    project_id: String,
    #[serde(default)]
    clips: Vec<LegacyClip>,
    #[serde(default)]
    transitions: Vec<LegacyTransition>,
    #[serde(default)]
    settings: LegacySettings,
}

#[derive(Debug, Deserialize)]
struct LegacyClip {
    clip_id: String,
    #[serde(default)]
    source_video: String,
    #[serde(default)]
    start_seconds: f64,
    #[serde(default)]
    end_seconds: f64,
    #[serde(default = "unit_speed")]
    speed: f64,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    position: usize,
}

fn unit_speed() -> f64 {
    1.0
}

#[derive(Debug, Deserialize)]
struct LegacyTransition {
    from_clip_id: String,
    to_clip_id: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    duration: f64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct LegacySettings {
    fps: f64,
    width: u32,
    height: u32,
}

impl Default for LegacySettings {
    fn default() -> Self {
        Self {
            fps: 30.0,
            width: 1920,
            height: 1080,
        }
    }
}

impl LegacyTimeline {
    /// Lay the clips end-to-end on one video track in `position` order.
    /// Clips and transitions the engine would reject are dropped with a warning.
    fn into_project(mut self) -> Project {
        let editor = TimelineEditor::default();
        let settings = SequenceSettings {
            fps: self.settings.fps,
            width: self.settings.width,
            height: self.settings.height,
            ..SequenceSettings::default()
        };
        let mut seq = Sequence::new(settings);
        let track_id = seq.tracks[0].track_id;

        self.clips.sort_by_key(|c| c.position);

        let mut ids: HashMap<String, Uuid> = HashMap::new();
        let mut cursor = 0.0;
        for clip in &self.clips {
            let speed = clip
                .speed
                .clamp(editor.config().min_speed, editor.config().max_speed);
            let mut spec = ClipSpec::new(
                clip.source_video.as_str(),
                cursor,
                clip.start_seconds,
                clip.end_seconds,
            )
            .with_speed(speed);
            if let Some(label) = &clip.label {
                spec = spec.with_label(label.as_str());
            }

            match editor.add_clip(&seq, track_id, spec) {
                Ok((next, id)) => {
                    if let Some((_, placed)) = next.find_clip(id) {
                        cursor = placed.timeline_end;
                    }
                    seq = next;
                    ids.insert(clip.clip_id.clone(), id);
                }
                Err(e) => warn!(clip = %clip.clip_id, "Dropping legacy clip: {e}"),
            }
        }

        for t in &self.transitions {
            let (Some(&from), Some(&to)) = (ids.get(&t.from_clip_id), ids.get(&t.to_clip_id))
            else {
                warn!(from = %t.from_clip_id, to = %t.to_clip_id, "Dropping transition to unknown clip");
                continue;
            };
            let kind = match t.kind.parse::<TransitionKind>() {
                Ok(kind) => kind,
                Err(e) => {
                    warn!(from = %t.from_clip_id, to = %t.to_clip_id, "Dropping transition: {e}");
                    continue;
                }
            };
            match editor.set_transition(&seq, from, to, kind, t.duration) {
                Ok(next) => seq = next,
                Err(e) => warn!(from = %t.from_clip_id, to = %t.to_clip_id, "Dropping transition: {e}"),
            }
        }

        debug!(
            project = %self.project_id,
            clips = seq.clip_count(),
            transitions = seq.transitions.len(),
            "Migrated legacy timeline"
        );
        let name = self.project_id.clone();
        Project::new(self.project_id, name).with_sequence(seq)
    }
}
