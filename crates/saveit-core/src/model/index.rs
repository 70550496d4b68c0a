use std::fmt;

/// Position in a list, created from the one-based number a user types.
///
/// Stored zero-based so it can index slices directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Index(usize);

impl Index {
    #[must_use]
    pub const fn from_zero_based(zero_based: usize) -> Self {
        Self(zero_based)
    }

    /// Returns `None` for `0`, which has no one-based meaning.
    #[must_use]
    pub const fn from_one_based(one_based: usize) -> Option<Self> {
        match one_based.checked_sub(1) {
            Some(zero_based) => Some(Self(zero_based)),
            None => None,
        }
    }

    #[must_use]
    pub const fn zero_based(self) -> usize {
        self.0
    }

    #[must_use]
    pub const fn one_based(self) -> usize {
        self.0 + 1
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.one_based())
    }
}
