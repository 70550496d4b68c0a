use crate::error::SaveItError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A link that solved (or helped with) an issue, plus a remark about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    link: String,
    remark: String,
    #[serde(default)]
    is_primary: bool,
}

impl Solution {
    /// Build a non-primary solution.
    ///
    /// # Errors
    ///
    /// [`SaveItError::InvalidValue`] when the link is blank.
    pub fn new(link: impl Into<String>, remark: impl Into<String>) -> Result<Self, SaveItError> {
        let link = link.into();
        if link.trim().is_empty() {
            return Err(SaveItError::InvalidValue {
                field: "solution link",
                reason: "must not be empty",
            });
        }
        Ok(Self {
            link: link.trim().to_string(),
            remark: remark.into().trim().to_string(),
            is_primary: false,
        })
    }

    #[must_use]
    pub fn link(&self) -> &str {
        &self.link
    }

    #[must_use]
    pub fn remark(&self) -> &str {
        &self.remark
    }

    #[must_use]
    pub const fn is_primary(&self) -> bool {
        self.is_primary
    }

    #[must_use]
    pub fn with_primary(mut self, is_primary: bool) -> Self {
        self.is_primary = is_primary;
        self
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_primary {
            write!(f, "* ")?;
        }
        write!(f, "{}", self.link)?;
        if !self.remark.is_empty() {
            write!(f, " ({})", self.remark)?;
        }
        Ok(())
    }
}
