//! CutLab Timeline - Timeline data model and edit engine
//!
//! Implements the non-destructive timeline behind the editor:
//! - Sequences containing typed tracks of clips
//! - Invariant validation (overlap, duration floor, source bounds, speed)
//! - Pure edit operations returning new snapshots
//! - Transitions between time-adjacent clips
//! - Versioned persistence behind a load/save store contract

pub mod clip;
pub mod config;
pub mod edit;
pub mod error;
pub mod history;
pub mod populate;
pub mod project;
pub mod serialization;
pub mod store;
pub mod track;
pub mod transition;
pub mod validate;

pub use clip::{AudioProps, Clip, ClipSpec, Transform};
pub use config::EditConfig;
pub use edit::{EditCommand, EditOutcome, TimelineEditor};
pub use error::{EditError, EditResult, Entity};
pub use history::History;
pub use populate::{PopulateLayout, PopulateReport, SceneRange, SkippedRange};
pub use project::{AssetKind, AssetMetadata, Project, Sequence, SequenceSettings};
pub use serialization::ProjectFile;
pub use store::{commit, JsonFileStore, MemoryStore, TimelineStore};
pub use track::{Track, TrackFlags, TrackKind};
pub use transition::{Transition, TransitionKind};
