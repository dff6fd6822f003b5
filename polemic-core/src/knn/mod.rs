//! K-nearest-neighbor controversy scoring
//!
//! Pipeline stages, each a separate seam:
//! - [`QueryConstructor`]: text → [`WeightedQuery`]
//! - [`EntrySearcher`]: query → entries with QL similarity (backed by an [`EntryIndex`])
//! - [`ControversyDatabase`]: entries → controversy scores (backed by a [`ScoreStore`])
//! - [`Aggregation`]: similarities + scores → estimate
//!
//! [`KnnScorer`] composes them. Every stage may record into an optional
//! [`ScoreInfo`].

mod aggregation;
mod db;
mod entry;
mod info;
pub mod ql;
mod query;
mod scorer;
mod search;

#[cfg(test)]
mod tests;

pub use aggregation::Aggregation;
pub use db::{ControversyDatabase, ScoreStore};
pub use entry::{EntryValue, normalize_entry_key};
pub use info::{ScoreInfo, Timings};
pub use query::{QueryConstructor, TopWordsQuery, WeightedQuery};
pub use scorer::KnnScorer;
pub use search::{EntryIndex, EntrySearcher, IndexHit, QlSearcher};
