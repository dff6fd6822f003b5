//! Entry index implementations
//!
//! [`MemoryIndex`] keeps postings and collection statistics for a Wikipedia
//! entry dump in memory and answers weighted QL queries through
//! [`crate::EntryIndex`].

mod collector;
mod memory;

pub use collector::{ScoredDoc, TopKCollector};
pub use memory::{EntryRecord, MemoryIndex, MemoryIndexBuilder};
