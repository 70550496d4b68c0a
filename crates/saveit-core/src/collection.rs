//! The full set of issues at one point in time.
//!
//! A [`SaveIt`] is a value: every mutation returns a new collection and leaves
//! the receiver untouched, so snapshots kept by
//! [`crate::history::VersionedSaveIt`] never change underneath it. Every
//! operation validates first and only then builds the new state.

use crate::error::SaveItError;
use crate::model::{Index, Issue, Solution, Tag};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Ordered issues with no two sharing a statement key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SaveItRecord")]
pub struct SaveIt {
    issues: Vec<Issue>,
}

#[derive(Deserialize)]
struct SaveItRecord {
    #[serde(default)]
    issues: Vec<Issue>,
}

impl TryFrom<SaveItRecord> for SaveIt {
    type Error = SaveItError;

    fn try_from(record: SaveItRecord) -> Result<Self, Self::Error> {
        Self::from_issues(record.issues)
    }
}

impl SaveIt {
    #[must_use]
    pub const fn new() -> Self {
        Self { issues: Vec::new() }
    }

    /// Build a collection from loaded issues, keeping their order.
    ///
    /// # Errors
    ///
    /// [`SaveItError::DuplicateIssue`] on the first statement collision.
    pub fn from_issues(issues: impl IntoIterator<Item = Issue>) -> Result<Self, SaveItError> {
        issues
            .into_iter()
            .try_fold(Self::new(), |acc, issue| acc.add(issue))
    }

    #[must_use]
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: Index) -> Option<&Issue> {
        self.issues.get(index.zero_based())
    }

    /// Position of the issue with the same statement key, if any.
    #[must_use]
    pub fn position(&self, issue: &Issue) -> Option<Index> {
        self.issues
            .iter()
            .position(|existing| existing.is_same_issue(issue))
            .map(Index::from_zero_based)
    }

    #[must_use]
    pub fn position_of_key(&self, key: &str) -> Option<Index> {
        self.issues
            .iter()
            .position(|existing| existing.key() == key)
            .map(Index::from_zero_based)
    }

    #[must_use]
    pub fn contains(&self, issue: &Issue) -> bool {
        self.position(issue).is_some()
    }

    /// Every tag in use, sorted and unique ignoring case.
    #[must_use]
    pub fn tag_names(&self) -> BTreeSet<Tag> {
        self.issues
            .iter()
            .flat_map(|issue| issue.tags().iter().cloned())
            .collect()
    }

    /// Every statement, sorted case-insensitively.
    #[must_use]
    pub fn statements(&self) -> Vec<&str> {
        let mut statements: Vec<&str> = self
            .issues
            .iter()
            .map(|issue| issue.statement().as_str())
            .collect();
        statements.sort_by_key(|s| s.to_lowercase());
        statements
    }

    /// Append `issue`.
    ///
    /// # Errors
    ///
    /// [`SaveItError::DuplicateIssue`] when a same issue already exists.
    pub fn add(&self, issue: Issue) -> Result<Self, SaveItError> {
        if self.contains(&issue) {
            return Err(SaveItError::DuplicateIssue {
                statement: issue.statement().to_string(),
            });
        }
        let mut issues = self.issues.clone();
        issues.push(issue);
        Ok(Self { issues })
    }

    /// Remove the first issue that is the same issue as `issue`.
    ///
    /// # Errors
    ///
    /// [`SaveItError::IssueNotFound`] when no such issue exists.
    pub fn remove(&self, issue: &Issue) -> Result<Self, SaveItError> {
        let position = self.require_position(issue)?;
        let mut issues = self.issues.clone();
        issues.remove(position.zero_based());
        Ok(Self { issues })
    }

    /// Replace `target` with `replacement` at the same position.
    ///
    /// # Errors
    ///
    /// - [`SaveItError::IssueNotFound`] when `target` is absent.
    /// - [`SaveItError::DuplicateIssue`] when `replacement` collides with an
    ///   issue other than `target`.
    pub fn replace(&self, target: &Issue, replacement: Issue) -> Result<Self, SaveItError> {
        let position = self.require_position(target)?;
        if let Some(clash) = self.position(&replacement) {
            if clash != position {
                return Err(SaveItError::DuplicateIssue {
                    statement: replacement.statement().to_string(),
                });
            }
        }
        Ok(self.with_issue_at(position, replacement))
    }

    /// Append `solution` to the issue at `index`.
    ///
    /// Returns the new collection and the updated issue.
    ///
    /// # Errors
    ///
    /// - [`SaveItError::IndexOutOfRange`] when `index` is past the end.
    /// - [`SaveItError::MultiplePrimarySolutions`] when `solution` is primary
    ///   and the issue already has one.
    pub fn add_solution(
        &self,
        index: Index,
        solution: Solution,
    ) -> Result<(Self, Issue), SaveItError> {
        let updated = self.require(index)?.with_solution(solution)?;
        Ok((self.with_issue_at(index, updated.clone()), updated))
    }

    /// Merge `tags` into the issue at `index`.
    ///
    /// # Errors
    ///
    /// [`SaveItError::IndexOutOfRange`] when `index` is past the end.
    pub fn add_tag(&self, index: Index, tags: &BTreeSet<Tag>) -> Result<Self, SaveItError> {
        let updated = self.require(index)?.with_tags(tags);
        Ok(self.with_issue_at(index, updated))
    }

    /// Toggle the primary flag of solution `solution` on the issue at `index`.
    ///
    /// # Errors
    ///
    /// [`SaveItError::IndexOutOfRange`] when either index is out of bounds.
    pub fn set_primary_solution(&self, index: Index, solution: Index) -> Result<Self, SaveItError> {
        let updated = self.require(index)?.with_primary_toggled(solution)?;
        Ok(self.with_issue_at(index, updated))
    }

    /// Rename `old` to `new` on every issue holding it, or drop it when `new`
    /// is `None`.
    ///
    /// The flag is `false` when no issue held `old`; the returned collection
    /// then equals `self`.
    #[must_use]
    pub fn refactor_tag(&self, old: &Tag, new: Option<&Tag>) -> (Self, bool) {
        let mut changed = false;
        let issues = self
            .issues
            .iter()
            .map(|issue| match issue.with_tag_replaced(old, new) {
                Some(updated) => {
                    changed = true;
                    updated
                }
                None => issue.clone(),
            })
            .collect();
        (Self { issues }, changed)
    }

    fn require(&self, index: Index) -> Result<&Issue, SaveItError> {
        self.get(index).ok_or(SaveItError::IndexOutOfRange {
            index: index.one_based(),
            len: self.issues.len(),
        })
    }

    fn require_position(&self, issue: &Issue) -> Result<Index, SaveItError> {
        self.position(issue).ok_or_else(|| SaveItError::IssueNotFound {
            statement: issue.statement().to_string(),
        })
    }

    fn with_issue_at(&self, index: Index, issue: Issue) -> Self {
        let mut issues = self.issues.clone();
        issues[index.zero_based()] = issue;
        Self { issues }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Statement;

    fn tag(name: &str) -> Tag {
        Tag::new(name).expect("valid tag")
    }

    fn issue(statement: &str, tags: &[&str]) -> Issue {
        Issue::new(
            Statement::new(statement).expect("valid statement"),
            "description",
            vec![],
            tags.iter().map(|t| tag(t)),
        )
        .expect("valid issue")
    }

    fn first() -> Index {
        Index::from_zero_based(0)
    }

    #[test]
    fn add_rejects_same_statement() {
        let base = SaveIt::new().add(issue("Segmentation Fault", &[])).expect("add");
        let err = base
            .add(issue("segmentation fault", &[]))
            .expect_err("duplicate");
        assert!(matches!(err, SaveItError::DuplicateIssue { .. }));
        assert_eq!(base.len(), 1);
    }

    #[test]
    fn mutations_leave_original_untouched() {
        let base = SaveIt::new().add(issue("a", &[])).expect("add");
        let grown = base.add(issue("b", &[])).expect("add");
        assert_eq!(base.len(), 1);
        assert_eq!(grown.len(), 2);

        let shrunk = grown.remove(&issue("A", &[])).expect("remove");
        assert_eq!(shrunk.statements(), vec!["b"]);
        assert_eq!(grown.len(), 2);
    }

    #[test]
    fn remove_missing_issue_fails() {
        let err = SaveIt::new().remove(&issue("a", &[])).expect_err("missing");
        assert!(matches!(err, SaveItError::IssueNotFound { .. }));
    }

    #[test]
    fn replace_keeps_position() {
        let base = SaveIt::from_issues([issue("a", &[]), issue("b", &[]), issue("c", &[])])
            .expect("unique");
        let replaced = base.replace(&issue("b", &[]), issue("z", &[])).expect("replace");
        let statements: Vec<&str> = replaced
            .issues()
            .iter()
            .map(|i| i.statement().as_str())
            .collect();
        assert_eq!(statements, vec!["a", "z", "c"]);
    }

    #[test]
    fn replace_with_own_statement_is_allowed() {
        let base = SaveIt::from_issues([issue("a", &[]), issue("b", &[])]).expect("unique");
        let replaced = base
            .replace(&issue("a", &[]), issue("A", &["x"]))
            .expect("same issue");
        assert_eq!(replaced.issues()[0].statement().as_str(), "A");

        let err = base
            .replace(&issue("a", &[]), issue("B", &[]))
            .expect_err("collides with b");
        assert!(matches!(err, SaveItError::DuplicateIssue { .. }));
    }

    #[test]
    fn add_solution_checks_bounds() {
        let base = SaveIt::new().add(issue("a", &[])).expect("add");
        let solution = Solution::new("https://a", "remark").expect("valid");
        let (next, updated) = base.add_solution(first(), solution.clone()).expect("in range");
        assert_eq!(updated.solutions(), &[solution.clone()]);
        assert_eq!(next.issues()[0], updated);

        let err = base
            .add_solution(Index::from_zero_based(1), solution)
            .expect_err("out of range");
        assert_eq!(err, SaveItError::IndexOutOfRange { index: 2, len: 1 });
    }

    #[test]
    fn add_tag_merges_case_insensitively() {
        let base = SaveIt::new().add(issue("a", &["Java"])).expect("add");
        let tags: BTreeSet<Tag> = [tag("java"), tag("gc")].into_iter().collect();
        let next = base.add_tag(first(), &tags).expect("in range");
        assert_eq!(next.issues()[0].tags().len(), 2);
    }

    #[test]
    fn refactor_rewrites_every_holder() {
        let base = SaveIt::from_issues([
            issue("a", &["java"]),
            issue("b", &["java", "jvm"]),
            issue("c", &["JAVA"]),
            issue("d", &["rust"]),
        ])
        .expect("unique");

        let (next, changed) = base.refactor_tag(&tag("java"), Some(&tag("jvm")));
        assert!(changed);
        let jvm = next.issues().iter().filter(|i| i.has_tag(&tag("jvm"))).count();
        let java = next.issues().iter().filter(|i| i.has_tag(&tag("java"))).count();
        assert_eq!((jvm, java), (3, 0));
        assert_eq!(next.issues()[1].tags().len(), 1);
    }

    #[test]
    fn refactor_without_holders_reports_no_change() {
        let base = SaveIt::new().add(issue("a", &["rust"])).expect("add");
        let (next, changed) = base.refactor_tag(&tag("java"), None);
        assert!(!changed);
        assert_eq!(next, base);

        let (removed, changed) = base.refactor_tag(&tag("rust"), None);
        assert!(changed);
        assert!(removed.issues()[0].tags().is_empty());
    }

    #[test]
    fn from_issues_rejects_duplicates() {
        let err = SaveIt::from_issues([issue("a", &[]), issue(" A ", &[])]).expect_err("dup");
        assert!(matches!(err, SaveItError::DuplicateIssue { .. }));
    }

    #[test]
    fn tag_names_are_unique() {
        let base =
            SaveIt::from_issues([issue("a", &["Java", "x"]), issue("b", &["java"])]).expect("ok");
        let names: Vec<String> = base.tag_names().iter().map(ToString::to_string).collect();
        assert_eq!(names, vec!["Java", "x"]);
    }
}
