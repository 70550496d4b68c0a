//! Value types of the knowledge base.

mod index;
mod issue;
mod solution;
mod tag;

pub use index::Index;
pub use issue::{Issue, Statement};
pub use solution::Solution;
pub use tag::Tag;
