//! In-memory model of one session.
//!
//! [`ModelManager`] owns the snapshot history, the working collection that
//! commands mutate, the derived view, the session frequency counters and the
//! selected directory. Mutations replace the working collection; nothing
//! reaches history until the command calls [`ModelManager::commit`].

use crate::collection::SaveIt;
use crate::error::{HistoryError, SaveItError};
use crate::history::VersionedSaveIt;
use crate::model::{Index, Issue, Solution, Tag};
use crate::view::{FrequencyTable, IssueFilter, IssueSort, IssueView, ordered_solutions};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Which issue the session is looking at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Directory {
    /// The issue list.
    #[default]
    Root,
    /// Inside one issue, identified by its statement key.
    Issue(String),
}

#[derive(Debug, Clone)]
pub struct ModelManager {
    history: VersionedSaveIt,
    working: SaveIt,
    view: IssueView,
    frequencies: FrequencyTable,
    directory: Directory,
    changed: bool,
}

impl ModelManager {
    #[must_use]
    pub fn new(initial: SaveIt, sort: IssueSort) -> Self {
        debug!(issues = initial.len(), %sort, "initializing model");
        let mut manager = Self {
            history: VersionedSaveIt::new(initial.clone()),
            working: initial,
            view: IssueView::new(sort),
            frequencies: FrequencyTable::default(),
            directory: Directory::Root,
            changed: false,
        };
        manager.refresh_view();
        manager
    }

    /// The working collection (equal to the active snapshot between commands).
    #[must_use]
    pub const fn save_it(&self) -> &SaveIt {
        &self.working
    }

    #[must_use]
    pub const fn history(&self) -> &VersionedSaveIt {
        &self.history
    }

    #[must_use]
    pub const fn directory(&self) -> &Directory {
        &self.directory
    }

    #[must_use]
    pub const fn frequencies(&self) -> &FrequencyTable {
        &self.frequencies
    }

    /// Whether state changed since the last call; clears the flag.
    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }

    // ── Reads ───────────────────────────────────────────────────────────────

    /// The list shown to the user: filtered, then sorted.
    #[must_use]
    pub fn sorted_issues(&self) -> Vec<&Issue> {
        self.view.sorted(&self.working)
    }

    /// Resolve a displayed index to the issue and its snapshot position.
    ///
    /// # Errors
    ///
    /// [`SaveItError::IndexOutOfRange`] when nothing is displayed at `displayed`.
    pub fn displayed_issue(&self, displayed: Index) -> Result<(Index, &Issue), SaveItError> {
        self.view
            .position_of(displayed)
            .and_then(|position| self.working.get(position).map(|issue| (position, issue)))
            .ok_or(SaveItError::IndexOutOfRange {
                index: displayed.one_based(),
                len: self.view.len(),
            })
    }

    /// The selected issue and its snapshot position.
    #[must_use]
    pub fn selected_issue(&self) -> Option<(Index, &Issue)> {
        match &self.directory {
            Directory::Root => None,
            Directory::Issue(key) => {
                let position = self.working.position_of_key(key)?;
                self.working.get(position).map(|issue| (position, issue))
            }
        }
    }

    /// Solutions of the selected issue, primary first.
    #[must_use]
    pub fn selected_solutions(&self) -> Option<Vec<(Index, &Solution)>> {
        self.selected_issue()
            .map(|(_, issue)| ordered_solutions(issue))
    }

    #[must_use]
    pub fn current_tag_set(&self) -> BTreeSet<Tag> {
        self.working.tag_names()
    }

    /// Every statement, sorted case-insensitively.
    #[must_use]
    pub fn current_statements(&self) -> Vec<&str> {
        self.working.statements()
    }

    // ── Mutations of the working collection ────────────────────────────────

    /// # Errors
    ///
    /// [`SaveItError::DuplicateIssue`] when a same issue exists.
    pub fn add_issue(&mut self, issue: Issue) -> Result<(), SaveItError> {
        let next = self.working.add(issue)?;
        self.view.set_filter(IssueFilter::All);
        self.replace_working(next);
        Ok(())
    }

    /// # Errors
    ///
    /// [`SaveItError::IssueNotFound`] when `target` is absent.
    pub fn delete_issue(&mut self, target: &Issue) -> Result<(), SaveItError> {
        let next = self.working.remove(target)?;
        self.frequencies.forget(target);
        self.replace_working(next);
        Ok(())
    }

    /// Replace `target` in place, keeping the selection on it.
    ///
    /// # Errors
    ///
    /// See [`SaveIt::replace`].
    pub fn update_issue(&mut self, target: &Issue, edited: Issue) -> Result<(), SaveItError> {
        let next = self.working.replace(target, edited.clone())?;
        self.frequencies.rename(target, &edited);
        if self.directory == Directory::Issue(target.key()) {
            self.directory = Directory::Issue(edited.key());
        }
        self.replace_working(next);
        Ok(())
    }

    /// # Errors
    ///
    /// See [`SaveIt::add_solution`].
    pub fn add_solution(
        &mut self,
        position: Index,
        solution: Solution,
    ) -> Result<Issue, SaveItError> {
        let (next, updated) = self.working.add_solution(position, solution)?;
        self.replace_working(next);
        Ok(updated)
    }

    /// # Errors
    ///
    /// [`SaveItError::IndexOutOfRange`] when `position` is past the end.
    pub fn add_tag(&mut self, position: Index, tags: &BTreeSet<Tag>) -> Result<(), SaveItError> {
        let next = self.working.add_tag(position, tags)?;
        self.replace_working(next);
        Ok(())
    }

    /// # Errors
    ///
    /// [`SaveItError::IndexOutOfRange`] when either index is out of bounds.
    pub fn set_primary_solution(
        &mut self,
        position: Index,
        solution: Index,
    ) -> Result<(), SaveItError> {
        let next = self.working.set_primary_solution(position, solution)?;
        self.replace_working(next);
        Ok(())
    }

    /// Rename (or drop) a tag everywhere. Returns whether any issue changed;
    /// the working collection is left alone when none did.
    pub fn refactor_tag(&mut self, old: &Tag, new: Option<&Tag>) -> bool {
        let (next, changed) = self.working.refactor_tag(old, new);
        if changed {
            info!(old = %old, new = ?new.map(Tag::name), "refactored tag");
            self.replace_working(next);
        }
        changed
    }

    /// Replace all data and record it as a new snapshot, e.g. for `clear`.
    /// Access counters start over.
    pub fn reset_data(&mut self, data: SaveIt) {
        info!(issues = data.len(), "resetting data");
        self.directory = Directory::Root;
        self.frequencies = FrequencyTable::default();
        self.history.reset(data.clone());
        self.replace_working(data);
    }

    // ── Views ──────────────────────────────────────────────────────────────

    /// Swap the filter without touching frequency counters.
    pub fn update_filter(&mut self, filter: IssueFilter) {
        self.view.set_filter(filter);
        self.directory = Directory::Root;
        self.refresh_view();
    }

    /// Apply a search filter; every issue that survives it counts as accessed.
    pub fn filter_issues(&mut self, filter: IssueFilter) {
        self.view.set_filter(filter);
        self.directory = Directory::Root;
        self.refresh_view();
        for issue in self.view.filtered(&self.working) {
            self.frequencies.bump(issue);
        }
        // Counters feed the frequency sort.
        self.refresh_view();
    }

    pub fn sort_issues(&mut self, sort: IssueSort) {
        self.view.set_sort(sort);
        self.refresh_view();
    }

    // ── Directory ──────────────────────────────────────────────────────────

    /// Enter the issue shown at `displayed`.
    ///
    /// # Errors
    ///
    /// [`SaveItError::IndexOutOfRange`] when nothing is displayed there.
    pub fn select(&mut self, displayed: Index) -> Result<&Issue, SaveItError> {
        let (position, key) = self
            .displayed_issue(displayed)
            .map(|(position, issue)| (position, issue.key()))?;
        self.directory = Directory::Issue(key);
        self.working
            .get(position)
            .ok_or(SaveItError::IndexOutOfRange {
                index: displayed.one_based(),
                len: self.view.len(),
            })
    }

    pub fn go_home(&mut self) {
        self.directory = Directory::Root;
    }

    // ── History ────────────────────────────────────────────────────────────

    /// Record the working collection as a new snapshot.
    pub fn commit(&mut self) {
        self.history.commit(self.working.clone());
    }

    /// # Errors
    ///
    /// [`HistoryError::NoMoreToUndo`] at the oldest snapshot.
    pub fn undo(&mut self) -> Result<(), HistoryError> {
        let restored = self.history.undo()?.clone();
        self.restore(restored);
        Ok(())
    }

    /// # Errors
    ///
    /// [`HistoryError::NoMoreToRedo`] at the newest snapshot.
    pub fn redo(&mut self) -> Result<(), HistoryError> {
        let restored = self.history.redo()?.clone();
        self.restore(restored);
        Ok(())
    }

    fn restore(&mut self, snapshot: SaveIt) {
        self.directory = Directory::Root;
        self.view.set_filter(IssueFilter::All);
        self.replace_working(snapshot);
    }

    fn replace_working(&mut self, next: SaveIt) {
        self.working = next;
        if self.selected_issue().is_none() {
            self.directory = Directory::Root;
        }
        self.changed = true;
        self.refresh_view();
    }

    fn refresh_view(&mut self) {
        self.view.refresh(&self.working, &self.frequencies);
    }
}

impl Default for ModelManager {
    fn default() -> Self {
        Self::new(SaveIt::new(), IssueSort::default())
    }
}
