//! Controversy score stores

mod memory;

pub use memory::MemoryScoreStore;
