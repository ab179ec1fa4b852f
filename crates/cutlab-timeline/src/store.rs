//! Persistence adapter: load and save whole projects by ID.
//!
//! Saves are guarded by an optimistic revision check. A caller saves the
//! project it loaded; if someone else saved in between, the stored revision
//! has moved on and the save fails with [`CutlabError::Conflict`].
//!
//! File layout of [`JsonFileStore`]:
//! ```text
//! storage/timelines/
//!   {project_id}_timeline.json
//! ```

use cutlab_core::{CutlabError, Result};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::EditConfig;
use crate::error::EditResult;
use crate::project::{unix_now, Project, Sequence};
use crate::serialization::ProjectFile;

/// Load/save contract for projects.
pub trait TimelineStore: Send + Sync {
    /// Load a project. `NotFound` if it was never saved.
    fn load(&self, project_id: &str) -> Result<Project>;

    /// Persist a project and return its new revision.
    ///
    /// `project.revision` must equal the stored revision (0 when the project
    /// does not exist yet).
    fn save(&self, project: &Project) -> Result<u64>;

    /// Whether a project with this ID has been saved.
    fn exists(&self, project_id: &str) -> bool;
}

/// One load → edit → save cycle. The edit returns the new sequence plus any
/// value the caller wants back; the saved project carries its new revision.
pub fn commit<S, T, F>(store: &S, project_id: &str, edit: F) -> Result<(Project, T)>
where
    S: TimelineStore + ?Sized,
    F: FnOnce(&Sequence) -> EditResult<(Sequence, T)>,
{
    let project = store.load(project_id)?;
    let (sequence, value) = edit(&project.sequence)?;
    let mut project = project.with_sequence(sequence);
    project.revision = store.save(&project)?;
    Ok((project, value))
}

fn check_revision(project: &Project, stored: u64) -> Result<()> {
    if project.revision != stored {
        return Err(CutlabError::Conflict {
            project: project.project_id.clone(),
            expected: project.revision,
            found: stored,
        });
    }
    Ok(())
}

// ── In-memory store ─────────────────────────────────────────────

/// Store backed by a map, for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    projects: RwLock<HashMap<String, Project>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored projects.
    pub fn len(&self) -> usize {
        self.projects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.read().is_empty()
    }
}

impl TimelineStore for MemoryStore {
    fn load(&self, project_id: &str) -> Result<Project> {
        self.projects
            .read()
            .get(project_id)
            .cloned()
            .ok_or_else(|| CutlabError::NotFound(format!("project {project_id}")))
    }

    fn save(&self, project: &Project) -> Result<u64> {
        let mut projects = self.projects.write();
        let stored = projects
            .get(&project.project_id)
            .map_or(0, |p| p.revision);
        check_revision(project, stored)?;

        let mut saved = project.clone();
        saved.revision = stored + 1;
        saved.updated_at = unix_now();
        projects.insert(saved.project_id.clone(), saved);
        Ok(stored + 1)
    }

    fn exists(&self, project_id: &str) -> bool {
        self.projects.read().contains_key(project_id)
    }
}

// ── JSON file store ─────────────────────────────────────────────

/// One versioned JSON file per project in a directory.
///
/// Writes go to a temporary file that is renamed over the target, so a
/// crash never leaves a half-written project behind. Saves and loads of
/// the same project are serialized by a per-project lock. Loaded files are
/// checked against the store's [`EditConfig`] before they are handed out.
#[derive(Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
    config: EditConfig,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl JsonFileStore {
    /// Create a store rooted at `dir`. The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            config: EditConfig::default(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Check loaded projects against `config` instead of the default policy.
    pub fn with_config(mut self, config: EditConfig) -> Self {
        self.config = config;
        self
    }

    /// Path of the file holding a project.
    pub fn path_for(&self, project_id: &str) -> PathBuf {
        self.dir.join(format!("{project_id}_timeline.json"))
    }

    /// Run `f` holding the project's lock. The map entry is dropped again
    /// once no other caller holds or waits on it.
    fn locked<T>(&self, project_id: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let lock = self
            .locks
            .lock()
            .entry(project_id.to_string())
            .or_default()
            .clone();
        let result = {
            let _guard = lock.lock();
            f()
        };

        let mut locks = self.locks.lock();
        drop(lock);
        if locks
            .get(project_id)
            .is_some_and(|l| Arc::strong_count(l) == 1)
        {
            locks.remove(project_id);
        }
        result
    }

    fn read(&self, project_id: &str) -> Result<Option<Project>> {
        let path = self.path_for(project_id);
        if !path.exists() {
            return Ok(None);
        }
        let file = ProjectFile::load_from_file(&path, &self.config)?;
        if file.project.project_id != project_id {
            return Err(CutlabError::Serialization(format!(
                "{} holds project '{}'",
                path.display(),
                file.project.project_id
            )));
        }
        Ok(Some(file.project))
    }
}

/// Write `data` next to `path` and rename it into place. The temporary file
/// is removed if either step fails.
fn write_atomically(path: &Path, data: &[u8]) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    if let Err(e) = std::fs::write(&tmp, data).and_then(|()| std::fs::rename(&tmp, path)) {
        if let Err(cleanup) = std::fs::remove_file(&tmp) {
            if cleanup.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %tmp.display(), "Failed to remove temporary file: {cleanup}");
            }
        }
        return Err(e.into());
    }
    Ok(())
}

/// Project IDs become file names; keep them to a safe alphabet.
fn validate_project_id(project_id: &str) -> Result<()> {
    let valid = !project_id.is_empty()
        && project_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return Err(CutlabError::InvalidParameter(format!(
            "Invalid project id '{project_id}': use letters, digits, '-' and '_'"
        )));
    }
    Ok(())
}

impl TimelineStore for JsonFileStore {
    fn load(&self, project_id: &str) -> Result<Project> {
        validate_project_id(project_id)?;
        let project = self.locked(project_id, || {
            self.read(project_id)?
                .ok_or_else(|| CutlabError::NotFound(format!("project {project_id}")))
        })?;
        info!(
            project = project_id,
            revision = project.revision,
            clips = project.sequence.clip_count(),
            "Loaded project"
        );
        Ok(project)
    }

    fn save(&self, project: &Project) -> Result<u64> {
        validate_project_id(&project.project_id)?;
        let path = self.path_for(&project.project_id);
        let revision = self.locked(&project.project_id, || {
            let stored = self
                .read(&project.project_id)?
                .map_or(0, |p| p.revision);
            check_revision(project, stored)?;

            let mut saved = project.clone();
            saved.revision = stored + 1;
            saved.updated_at = unix_now();
            let data = ProjectFile::new(saved).to_json()?;

            std::fs::create_dir_all(&self.dir)?;
            write_atomically(&path, &data)?;
            Ok(stored + 1)
        })?;

        info!(
            project = %project.project_id,
            revision,
            path = %path.display(),
            "Saved project"
        );
        Ok(revision)
    }

    fn exists(&self, project_id: &str) -> bool {
        validate_project_id(project_id).is_ok() && self.path_for(project_id).exists()
    }
}
