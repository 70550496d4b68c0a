//! Linear undo/redo over [`SaveIt`] snapshots.
//!
//! The history is a flat list of snapshots and a cursor pointing at the
//! active one. Undo and redo only move the cursor; [`VersionedSaveIt::commit`]
//! is the single way a new snapshot enters, and it drops everything after the
//! cursor first, so an undo followed by a commit permanently loses the redo
//! tail.
//!
//! Invariant: `0 <= cursor < states.len()`, and `states` is never empty.

use crate::collection::SaveIt;
use crate::error::HistoryError;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedSaveIt {
    states: Vec<SaveIt>,
    cursor: usize,
}

impl VersionedSaveIt {
    /// Start a history whose only snapshot is `initial`.
    #[must_use]
    pub fn new(initial: SaveIt) -> Self {
        Self {
            states: vec![initial],
            cursor: 0,
        }
    }

    /// The active snapshot.
    #[must_use]
    pub fn current(&self) -> &SaveIt {
        &self.states[self.cursor]
    }

    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of snapshots kept, including any undone ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Always `false`: a history holds at least its initial snapshot.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Record `state` as the newest snapshot and make it active.
    pub fn commit(&mut self, state: SaveIt) {
        let discarded = self.states.len() - (self.cursor + 1);
        self.states.truncate(self.cursor + 1);
        self.states.push(state);
        self.cursor = self.states.len() - 1;
        debug!(
            cursor = self.cursor,
            discarded_redo = discarded,
            issues = self.current().len(),
            "committed snapshot"
        );
    }

    /// Commit `state` as a full replacement of the data, e.g. after `clear`.
    pub fn reset(&mut self, state: SaveIt) {
        self.commit(state);
    }

    #[must_use]
    pub const fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.states.len()
    }

    /// Step back to the previous snapshot.
    ///
    /// # Errors
    ///
    /// [`HistoryError::NoMoreToUndo`] at the oldest snapshot.
    pub fn undo(&mut self) -> Result<&SaveIt, HistoryError> {
        if !self.can_undo() {
            return Err(HistoryError::NoMoreToUndo);
        }
        self.cursor -= 1;
        debug!(cursor = self.cursor, "undo");
        Ok(self.current())
    }

    /// Step forward to the next snapshot.
    ///
    /// # Errors
    ///
    /// [`HistoryError::NoMoreToRedo`] at the newest snapshot.
    pub fn redo(&mut self) -> Result<&SaveIt, HistoryError> {
        if !self.can_redo() {
            return Err(HistoryError::NoMoreToRedo);
        }
        self.cursor += 1;
        debug!(cursor = self.cursor, "redo");
        Ok(self.current())
    }
}

impl Default for VersionedSaveIt {
    fn default() -> Self {
        Self::new(SaveIt::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Issue, Statement};

    fn with(statements: &[&str]) -> SaveIt {
        SaveIt::from_issues(statements.iter().map(|s| {
            Issue::new(Statement::new(*s).expect("valid"), "", vec![], []).expect("valid")
        }))
        .expect("unique")
    }

    #[test]
    fn fresh_history_cannot_move() {
        let mut history = VersionedSaveIt::default();
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.undo(), Err(HistoryError::NoMoreToUndo));
        assert_eq!(history.redo(), Err(HistoryError::NoMoreToRedo));
        assert_eq!(history.cursor(), 0);
    }

    #[test]
    fn undo_reverts_last_commit_and_redo_restores_it() {
        let mut history = VersionedSaveIt::default();
        history.commit(with(&["algorithm"]));
        history.commit(with(&["algorithm", "network"]));

        assert_eq!(history.undo().expect("can undo"), &with(&["algorithm"]));
        assert_eq!(
            history.redo().expect("can redo"),
            &with(&["algorithm", "network"])
        );
    }

    #[test]
    fn commit_after_undo_drops_redo_tail() {
        let mut history = VersionedSaveIt::default();
        history.commit(with(&["a"]));
        history.commit(with(&["a", "b"]));
        history.undo().expect("can undo");
        history.commit(with(&["a", "c"]));

        assert_eq!(history.len(), 3);
        assert!(!history.can_redo());
        assert_eq!(history.current(), &with(&["a", "c"]));
        history.undo().expect("can undo");
        assert_eq!(history.current(), &with(&["a"]));
    }

    #[test]
    fn undo_stops_at_initial_snapshot() {
        let mut history = VersionedSaveIt::new(with(&["loaded"]));
        history.commit(with(&[]));
        history.undo().expect("one step back");
        assert_eq!(history.undo(), Err(HistoryError::NoMoreToUndo));
        assert_eq!(history.current(), &with(&["loaded"]));
    }
}
