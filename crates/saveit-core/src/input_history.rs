use std::collections::VecDeque;

/// Default number of raw inputs kept by [`InputHistory`].
pub const DEFAULT_INPUT_HISTORY_LIMIT: usize = 1000;

/// Rolling log of raw user inputs in chronological order.
///
/// Once `limit` entries are stored the oldest is dropped for each new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputHistory {
    entries: VecDeque<String>,
    limit: usize,
}

impl InputHistory {
    /// A `limit` of zero is treated as one.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            limit: limit.max(1),
        }
    }

    pub fn add(&mut self, input: impl Into<String>) {
        if self.entries.len() == self.limit {
            self.entries.pop_front();
        }
        self.entries.push_back(input.into());
    }

    /// Oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Newest first.
    #[must_use]
    pub fn recent_first(&self) -> Vec<&str> {
        self.iter().rev().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for InputHistory {
    fn default() -> Self {
        Self::with_limit(DEFAULT_INPUT_HISTORY_LIMIT)
    }
}
