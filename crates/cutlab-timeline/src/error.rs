//! Error types for edit operations.

use cutlab_core::CutlabError;
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Something an operation looked up and could not find.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "entity", rename_all = "snake_case")]
pub enum Entity {
    Track { track_id: Uuid },
    Clip { clip_id: Uuid },
    Transition { from_clip_id: Uuid, to_clip_id: Uuid },
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Track { track_id } => write!(f, "track {track_id}"),
            Entity::Clip { clip_id } => write!(f, "clip {clip_id}"),
            Entity::Transition {
                from_clip_id,
                to_clip_id,
            } => write!(f, "transition {from_clip_id} -> {to_clip_id}"),
        }
    }
}

/// Rejection returned by an edit operation. The input snapshot is never
/// modified when one of these is returned.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EditError {
    /// Two clips would share time on a track.
    #[error("Overlap on track {track_id}: range {start:.3}s - {end:.3}s collides with clip {conflicting_clip_id}")]
    Overlap {
        track_id: Uuid,
        clip_id: Option<Uuid>,
        conflicting_clip_id: Uuid,
        start: f64,
        end: f64,
    },

    /// Negative time, inverted source range, or a source point past the asset end.
    #[error("Bounds violation: {reason}")]
    BoundsViolation {
        track_id: Option<Uuid>,
        clip_id: Option<Uuid>,
        reason: String,
    },

    /// The resulting clip would be shorter than the duration floor.
    #[error("Clip duration {duration:.3}s is too short (minimum {min:.3}s)")]
    TooShort {
        track_id: Option<Uuid>,
        clip_id: Option<Uuid>,
        duration: f64,
        min: f64,
    },

    #[error("Not found: {0}")]
    NotFound(Entity),

    /// A numeric argument outside its allowed range (or not finite).
    #[error("{field} = {value} is outside [{min}, {max}]")]
    InvalidRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Clips {from_clip_id} and {to_clip_id} are not adjacent: {reason}")]
    InvalidTransitionAdjacency {
        from_clip_id: Uuid,
        to_clip_id: Uuid,
        reason: String,
    },

    #[error("Track {track_id} is locked")]
    TrackLocked { track_id: Uuid },
}

impl EditError {
    /// Stable tag for this error, as used in the serialized form.
    pub fn kind(&self) -> &'static str {
        match self {
            EditError::Overlap { .. } => "overlap",
            EditError::BoundsViolation { .. } => "bounds_violation",
            EditError::TooShort { .. } => "too_short",
            EditError::NotFound(_) => "not_found",
            EditError::InvalidRange { .. } => "invalid_range",
            EditError::InvalidTransitionAdjacency { .. } => "invalid_transition_adjacency",
            EditError::TrackLocked { .. } => "track_locked",
        }
    }

    pub(crate) fn track_not_found(track_id: Uuid) -> Self {
        EditError::NotFound(Entity::Track { track_id })
    }

    pub(crate) fn clip_not_found(clip_id: Uuid) -> Self {
        EditError::NotFound(Entity::Clip { clip_id })
    }

    pub(crate) fn bounds(clip_id: Option<Uuid>, reason: impl Into<String>) -> Self {
        EditError::BoundsViolation {
            track_id: None,
            clip_id,
            reason: reason.into(),
        }
    }

    /// Attach track/clip context to errors raised by context-free validators.
    pub(crate) fn in_context(mut self, track: Uuid, clip: Option<Uuid>) -> Self {
        match &mut self {
            EditError::BoundsViolation {
                track_id, clip_id, ..
            }
            | EditError::TooShort {
                track_id, clip_id, ..
            } => {
                *track_id = Some(track);
                if clip_id.is_none() {
                    *clip_id = clip;
                }
            }
            EditError::Overlap { clip_id, .. } => {
                if clip_id.is_none() {
                    *clip_id = clip;
                }
            }
            _ => {}
        }
        self
    }
}

impl From<EditError> for CutlabError {
    fn from(err: EditError) -> Self {
        match err {
            EditError::NotFound(entity) => CutlabError::NotFound(entity.to_string()),
            other => CutlabError::InvalidParameter(other.to_string()),
        }
    }
}

/// Result type alias for edit operations.
pub type EditResult<T> = std::result::Result<T, EditError>;
