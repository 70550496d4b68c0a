use super::{Index, Solution, Tag};
use crate::error::SaveItError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// The one-line summary of an issue; the issue's identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Statement(String);

impl Statement {
    /// # Errors
    ///
    /// [`SaveItError::InvalidValue`] when the statement is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, SaveItError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(SaveItError::InvalidValue {
                field: "statement",
                reason: "must not be empty",
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// De-duplication key: lowercase with every whitespace character removed.
    #[must_use]
    pub fn key(&self) -> String {
        self.0
            .chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect()
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Statement {
    type Error = SaveItError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Statement> for String {
    fn from(statement: Statement) -> Self {
        statement.0
    }
}

/// A problem worth remembering, with the solutions found for it.
///
/// `==` compares every field. Use [`Issue::is_same_issue`] for identity,
/// which is what collections de-duplicate on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "IssueRecord")]
pub struct Issue {
    statement: Statement,
    description: String,
    solutions: Vec<Solution>,
    tags: BTreeSet<Tag>,
}

/// Unvalidated wire shape of [`Issue`].
#[derive(Deserialize)]
struct IssueRecord {
    statement: Statement,
    #[serde(default)]
    description: String,
    #[serde(default)]
    solutions: Vec<Solution>,
    #[serde(default)]
    tags: BTreeSet<Tag>,
}

impl TryFrom<IssueRecord> for Issue {
    type Error = SaveItError;

    fn try_from(record: IssueRecord) -> Result<Self, Self::Error> {
        Self::new(
            record.statement,
            record.description,
            record.solutions,
            record.tags,
        )
    }
}

impl Issue {
    /// # Errors
    ///
    /// [`SaveItError::MultiplePrimarySolutions`] when more than one solution
    /// is marked primary.
    pub fn new(
        statement: Statement,
        description: impl Into<String>,
        solutions: Vec<Solution>,
        tags: impl IntoIterator<Item = Tag>,
    ) -> Result<Self, SaveItError> {
        if solutions.iter().filter(|s| s.is_primary()).count() > 1 {
            return Err(SaveItError::MultiplePrimarySolutions {
                statement: statement.to_string(),
            });
        }
        Ok(Self {
            statement,
            description: description.into().trim().to_string(),
            solutions,
            tags: tags.into_iter().collect(),
        })
    }

    #[must_use]
    pub const fn statement(&self) -> &Statement {
        &self.statement
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Solutions in insertion order.
    #[must_use]
    pub fn solutions(&self) -> &[Solution] {
        &self.solutions
    }

    #[must_use]
    pub const fn tags(&self) -> &BTreeSet<Tag> {
        &self.tags
    }

    #[must_use]
    pub fn has_tag(&self, tag: &Tag) -> bool {
        self.tags.contains(tag)
    }

    #[must_use]
    pub fn key(&self) -> String {
        self.statement.key()
    }

    /// Identity check: statements equal ignoring case and whitespace.
    #[must_use]
    pub fn is_same_issue(&self, other: &Self) -> bool {
        self.key() == other.key()
    }

    /// Copy with a different statement and/or description.
    #[must_use]
    pub fn edited(&self, statement: Option<Statement>, description: Option<String>) -> Self {
        Self {
            statement: statement.unwrap_or_else(|| self.statement.clone()),
            description: description.map_or_else(
                || self.description.clone(),
                |d| d.trim().to_string(),
            ),
            solutions: self.solutions.clone(),
            tags: self.tags.clone(),
        }
    }

    /// Copy with `solution` appended.
    ///
    /// # Errors
    ///
    /// [`SaveItError::MultiplePrimarySolutions`] when `solution` is primary
    /// and the issue already has a primary solution.
    pub fn with_solution(&self, solution: Solution) -> Result<Self, SaveItError> {
        let mut solutions = self.solutions.clone();
        solutions.push(solution);
        Self::new(
            self.statement.clone(),
            self.description.clone(),
            solutions,
            self.tags.iter().cloned(),
        )
    }

    /// Copy with `tags` merged in.
    #[must_use]
    pub fn with_tags<'a>(&self, tags: impl IntoIterator<Item = &'a Tag>) -> Self {
        let mut merged = self.tags.clone();
        merged.extend(tags.into_iter().cloned());
        Self {
            tags: merged,
            ..self.clone()
        }
    }

    /// Copy with `old` replaced by `new` (or dropped when `new` is `None`).
    ///
    /// Returns `None` when the issue does not hold `old`.
    #[must_use]
    pub fn with_tag_replaced(&self, old: &Tag, new: Option<&Tag>) -> Option<Self> {
        if !self.has_tag(old) {
            return None;
        }
        let mut tags = self.tags.clone();
        tags.remove(old);
        if let Some(new) = new {
            tags.insert(new.clone());
        }
        Some(Self {
            tags,
            ..self.clone()
        })
    }

    /// Copy with the primary flag of one solution toggled.
    ///
    /// Marking a solution primary clears the flag on every other solution, so
    /// the at-most-one-primary rule holds after every toggle.
    ///
    /// # Errors
    ///
    /// [`SaveItError::IndexOutOfRange`] when `solution` is not a position in
    /// [`Issue::solutions`].
    pub fn with_primary_toggled(&self, solution: Index) -> Result<Self, SaveItError> {
        let target = solution.zero_based();
        let Some(current) = self.solutions.get(target) else {
            return Err(SaveItError::IndexOutOfRange {
                index: solution.one_based(),
                len: self.solutions.len(),
            });
        };
        let make_primary = !current.is_primary();
        let solutions = self
            .solutions
            .iter()
            .enumerate()
            .map(|(i, s)| s.clone().with_primary(i == target && make_primary))
            .collect();
        Ok(Self {
            solutions,
            ..self.clone()
        })
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.statement)?;
        if !self.description.is_empty() {
            write!(f, " Description: {}", self.description)?;
        }
        if !self.tags.is_empty() {
            let tags: Vec<&str> = self.tags.iter().map(Tag::name).collect();
            write!(f, " Tags: [{}]", tags.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(name: &str) -> Tag {
        Tag::new(name).expect("valid tag")
    }

    fn solution(link: &str) -> Solution {
        Solution::new(link, "").expect("valid solution")
    }

    fn issue(statement: &str) -> Issue {
        Issue::new(
            Statement::new(statement).expect("valid statement"),
            "",
            vec![],
            [],
        )
        .expect("valid issue")
    }

    #[test]
    fn statement_key_ignores_case_and_whitespace() {
        let a = Statement::new("Null Pointer  Exception").expect("valid");
        let b = Statement::new("nullpointer\texception").expect("valid");
        assert_eq!(a.key(), b.key());
        assert_ne!(a, b);
        assert!(Statement::new(" \n ").is_err());
    }

    #[test]
    fn same_issue_differs_from_structural_equality() {
        let plain = issue("Algorithm");
        let tagged = issue("algorithm").with_tags([&tag("java")]);
        assert!(plain.is_same_issue(&tagged));
        assert_ne!(plain, tagged);
    }

    #[test]
    fn rejects_two_primary_solutions() {
        let err = Issue::new(
            Statement::new("x").expect("valid"),
            "",
            vec![
                solution("a").with_primary(true),
                solution("b").with_primary(true),
            ],
            [],
        )
        .expect_err("two primaries");
        assert!(matches!(err, SaveItError::MultiplePrimarySolutions { .. }));
    }

    #[test]
    fn toggling_moves_primary_flag() {
        let base = issue("x")
            .with_solution(solution("a").with_primary(true))
            .and_then(|i| i.with_solution(solution("b")))
            .expect("solutions");

        let toggled = base
            .with_primary_toggled(Index::from_zero_based(1))
            .expect("in range");
        let flags: Vec<bool> = toggled.solutions().iter().map(Solution::is_primary).collect();
        assert_eq!(flags, vec![false, true]);

        let cleared = toggled
            .with_primary_toggled(Index::from_zero_based(1))
            .expect("in range");
        assert!(cleared.solutions().iter().all(|s| !s.is_primary()));

        assert!(matches!(
            base.with_primary_toggled(Index::from_zero_based(2)),
            Err(SaveItError::IndexOutOfRange { index: 3, len: 2 })
        ));
    }

    #[test]
    fn tag_replacement_deduplicates() {
        let base = issue("x").with_tags([&tag("java"), &tag("JVM")]);
        let replaced = base
            .with_tag_replaced(&tag("java"), Some(&tag("jvm")))
            .expect("holds java");
        assert_eq!(replaced.tags().len(), 1);
        assert!(replaced.has_tag(&tag("jvm")));
        assert!(issue("y").with_tag_replaced(&tag("java"), None).is_none());
    }

    #[test]
    fn deserialize_validates_primaries() {
        let json = r#"{
            "statement": "x",
            "solutions": [
                {"link": "a", "remark": "", "is_primary": true},
                {"link": "b", "remark": "", "is_primary": true}
            ]
        }"#;
        assert!(serde_json::from_str::<Issue>(json).is_err());

        let ok: Issue = serde_json::from_str(r#"{"statement":"x","tags":["a","A"]}"#)
            .expect("valid issue json");
        assert_eq!(ok.tags().len(), 1);
    }
}
