//! Undo/redo over sequence snapshots.
//!
//! Edits never mutate a snapshot, so undo is just a matter of keeping the
//! previous ones around. Unchanged tracks are shared between entries.

use crate::project::Sequence;

/// Undo/redo history of sequence snapshots.
#[derive(Debug, Clone)]
pub struct History {
    /// Snapshots before each recorded edit (most recent last).
    undo: Vec<Sequence>,
    /// Snapshots that have been undone (most recent last).
    redo: Vec<Sequence>,
    /// Maximum history depth.
    max_depth: usize,
}

impl History {
    /// Create a history with the given maximum depth.
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
            max_depth: max_depth.max(1),
        }
    }

    /// Record the snapshot that an edit replaced.
    /// Clears the redo stack (a new edit invalidates redo history).
    pub fn record(&mut self, previous: Sequence) {
        self.redo.clear();
        self.undo.push(previous);
        if self.undo.len() > self.max_depth {
            self.undo.remove(0);
        }
    }

    /// Step back. Takes the current snapshot and returns the one to restore.
    pub fn undo(&mut self, current: Sequence) -> Option<Sequence> {
        let previous = self.undo.pop()?;
        self.redo.push(current);
        Some(previous)
    }

    /// Step forward again after an undo.
    pub fn redo(&mut self, current: Sequence) -> Option<Sequence> {
        let next = self.redo.pop()?;
        self.undo.push(current);
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Number of undoable steps.
    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    /// Drop all history.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(200)
    }
}
