//! Derived, read-only projections over the active snapshot.
//!
//! A view is a pure function of (snapshot, filter, sort, frequencies). The
//! [`IssueView`] caches the result as positions into the snapshot and must be
//! [`IssueView::refresh`]ed whenever any input changes; readers get shared
//! borrows only.

use crate::collection::SaveIt;
use crate::model::{Index, Issue, Solution, Tag};
use std::cmp::{Ordering, Reverse};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Predicate selecting which issues are visible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum IssueFilter {
    #[default]
    All,
    /// Any keyword equals a whole word of the statement or description,
    /// ignoring case.
    Keywords(Vec<String>),
    /// The issue holds any of the tags.
    Tags(Vec<Tag>),
}

impl IssueFilter {
    #[must_use]
    pub fn matches(&self, issue: &Issue) -> bool {
        match self {
            Self::All => true,
            Self::Keywords(keywords) => keywords.iter().any(|keyword| {
                contains_word_ignore_case(issue.statement().as_str(), keyword)
                    || contains_word_ignore_case(issue.description(), keyword)
            }),
            Self::Tags(tags) => tags.iter().any(|tag| issue.has_tag(tag)),
        }
    }
}

fn contains_word_ignore_case(sentence: &str, word: &str) -> bool {
    let word = word.trim().to_lowercase();
    if word.is_empty() {
        return false;
    }
    sentence
        .split_whitespace()
        .any(|candidate| candidate.to_lowercase() == word)
}

/// Ordering applied on top of the filtered issues.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IssueSort {
    /// Keep insertion order.
    #[default]
    Chronological,
    /// Alphabetical by statement, ignoring case.
    Statement,
    /// Most tags first.
    TagCount,
    /// Most frequently found first.
    Frequency,
}

impl IssueSort {
    pub const ALL: [Self; 4] = [
        Self::Chronological,
        Self::Statement,
        Self::TagCount,
        Self::Frequency,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Chronological => "chrono",
            Self::Statement => "statement",
            Self::TagCount => "tag",
            Self::Frequency => "freq",
        }
    }

    /// Total comparator; combined with a stable sort it keeps filtered
    /// order among equal keys.
    fn compare(self, a: &Issue, b: &Issue, frequencies: &FrequencyTable) -> Ordering {
        match self {
            Self::Chronological => Ordering::Equal,
            Self::Statement => a
                .statement()
                .as_str()
                .to_lowercase()
                .cmp(&b.statement().as_str().to_lowercase()),
            Self::TagCount => Reverse(a.tags().len()).cmp(&Reverse(b.tags().len())),
            Self::Frequency => {
                Reverse(frequencies.get(a)).cmp(&Reverse(frequencies.get(b)))
            }
        }
    }
}

impl fmt::Display for IssueSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a sort type from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid sort type: '{got}' (expected one of chrono, statement, tag, freq)")]
pub struct ParseSortError {
    pub got: String,
}

impl FromStr for IssueSort {
    type Err = ParseSortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chrono" | "chronological" => Ok(Self::Chronological),
            "statement" => Ok(Self::Statement),
            "tag" | "tags" => Ok(Self::TagCount),
            "freq" | "frequency" => Ok(Self::Frequency),
            _ => Err(ParseSortError { got: s.to_string() }),
        }
    }
}

/// How often each issue surfaced through a filter during this session.
///
/// Keyed by statement key so it survives edits and the snapshot churn of
/// undo/redo. Counters are not versioned: deleting an issue drops its
/// counter for good, and undoing an edit leaves it under the edited key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: HashMap<String, u64>,
}

impl FrequencyTable {
    #[must_use]
    pub fn get(&self, issue: &Issue) -> u64 {
        self.counts.get(&issue.key()).copied().unwrap_or(0)
    }

    pub fn bump(&mut self, issue: &Issue) {
        *self.counts.entry(issue.key()).or_insert(0) += 1;
    }

    /// Drop the counter of a deleted issue so a later issue with the same
    /// statement starts from zero.
    pub fn forget(&mut self, issue: &Issue) {
        self.counts.remove(&issue.key());
    }

    /// Carry a counter over when an edit changes the statement key.
    pub fn rename(&mut self, from: &Issue, to: &Issue) {
        if from.key() == to.key() {
            return;
        }
        if let Some(count) = self.counts.remove(&from.key()) {
            self.counts.insert(to.key(), count);
        }
    }
}

/// Cached filtered and sorted projection of one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueView {
    filter: IssueFilter,
    sort: IssueSort,
    filtered: Vec<usize>,
    sorted: Vec<usize>,
}

impl IssueView {
    #[must_use]
    pub fn new(sort: IssueSort) -> Self {
        Self {
            sort,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn filter(&self) -> &IssueFilter {
        &self.filter
    }

    #[must_use]
    pub const fn sort(&self) -> IssueSort {
        self.sort
    }

    pub fn set_filter(&mut self, filter: IssueFilter) {
        self.filter = filter;
    }

    pub fn set_sort(&mut self, sort: IssueSort) {
        self.sort = sort;
    }

    /// Recompute both projections against `snapshot`.
    pub fn refresh(&mut self, snapshot: &SaveIt, frequencies: &FrequencyTable) {
        let issues = snapshot.issues();
        self.filtered = issues
            .iter()
            .enumerate()
            .filter(|(_, issue)| self.filter.matches(issue))
            .map(|(position, _)| position)
            .collect();

        let mut sorted = self.filtered.clone();
        let sort = self.sort;
        sorted.sort_by(|&a, &b| sort.compare(&issues[a], &issues[b], frequencies));
        self.sorted = sorted;
    }

    /// Issues passing the filter, in snapshot order.
    #[must_use]
    pub fn filtered<'a>(&self, snapshot: &'a SaveIt) -> Vec<&'a Issue> {
        resolve(&self.filtered, snapshot)
    }

    /// Issues passing the filter, in display order.
    #[must_use]
    pub fn sorted<'a>(&self, snapshot: &'a SaveIt) -> Vec<&'a Issue> {
        resolve(&self.sorted, snapshot)
    }

    /// Snapshot position of the issue shown at `displayed`.
    #[must_use]
    pub fn position_of(&self, displayed: Index) -> Option<Index> {
        self.sorted
            .get(displayed.zero_based())
            .copied()
            .map(Index::from_zero_based)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }
}

fn resolve<'a>(positions: &[usize], snapshot: &'a SaveIt) -> Vec<&'a Issue> {
    positions
        .iter()
        .filter_map(|&position| snapshot.issues().get(position))
        .collect()
}

/// Solutions of one issue for display: primary first, then insertion order.
///
/// Each entry keeps the solution's position inside [`Issue::solutions`].
#[must_use]
pub fn ordered_solutions(issue: &Issue) -> Vec<(Index, &Solution)> {
    let mut ordered: Vec<(Index, &Solution)> = issue
        .solutions()
        .iter()
        .enumerate()
        .map(|(position, solution)| (Index::from_zero_based(position), solution))
        .collect();
    ordered.sort_by_key(|(_, solution)| !solution.is_primary());
    ordered
}
