//! Bounded undo/redo history of serialized scene snapshots.

use std::collections::VecDeque;

use crate::{CanvasResult, Scene};

/// Maximum number of snapshots kept.
pub const HISTORY_CAP: usize = 50;

/// Ordered snapshots plus a cursor at the entry currently shown.
///
/// Entries are never edited in place. Recording after an undo discards every
/// entry past the cursor.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<String>,
    cursor: usize,
    cap: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    /// Create an empty history with the default cap.
    #[must_use]
    pub fn new() -> Self {
        Self::with_cap(HISTORY_CAP)
    }

    /// Create an empty history holding at most `cap` entries (minimum 1).
    #[must_use]
    pub fn with_cap(cap: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            cursor: 0,
            cap: cap.max(1),
        }
    }

    /// Record the current scene.
    ///
    /// # Errors
    ///
    /// Returns an error if the scene cannot be serialized; history is unchanged.
    pub fn snapshot(&mut self, scene: &Scene) -> CanvasResult<()> {
        let json = scene.to_json()?;
        self.push(json);
        Ok(())
    }

    fn push(&mut self, json: String) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push_back(json);
        self.cursor = self.entries.len() - 1;

        if self.entries.len() > self.cap {
            self.entries.pop_front();
            self.cursor -= 1;
        }
        tracing::trace!(len = self.entries.len(), cursor = self.cursor, "history snapshot");
    }

    /// Step back one entry and return the scene to restore.
    ///
    /// Returns `Ok(None)` at the earliest entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored snapshot cannot be deserialized.
    pub fn undo(&mut self) -> CanvasResult<Option<Scene>> {
        if !self.can_undo() {
            return Ok(None);
        }
        self.cursor -= 1;
        self.current().transpose()
    }

    /// Step forward one entry and return the scene to restore.
    ///
    /// Returns `Ok(None)` at the latest entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored snapshot cannot be deserialized.
    pub fn redo(&mut self) -> CanvasResult<Option<Scene>> {
        if !self.can_redo() {
            return Ok(None);
        }
        self.cursor += 1;
        self.current().transpose()
    }

    fn current(&self) -> Option<CanvasResult<Scene>> {
        self.entries.get(self.cursor).map(|json| Scene::from_json(json))
    }

    /// Whether an undo would change anything.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Whether a redo would change anything.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the entry currently shown.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Maximum number of entries.
    #[must_use]
    pub fn cap(&self) -> usize {
        self.cap
    }
}
