//! Polemic - KNN controversy scoring for free text
//!
//! Estimates how controversial a piece of text is by looking at its
//! nearest Wikipedia neighbors:
//! - Builds a short weighted query from the text's own unigram model
//! - Retrieves the most similar entries with Dirichlet-smoothed query likelihood
//! - Looks up each entry's annotated controversy score (unjudged entries get the mean)
//! - Aggregates similarity and controversy into a single estimate
//!
//! The search index and the score store are injected collaborators
//! ([`EntryIndex`], [`ScoreStore`]); [`MemoryIndex`] and [`MemoryScoreStore`]
//! are small in-memory implementations of both.

pub mod config;
pub mod error;
pub mod index;
pub mod knn;
pub mod lm;
pub mod store;
pub mod tokenizer;

// Re-exports from knn
pub use knn::{
    Aggregation, ControversyDatabase, EntryIndex, EntrySearcher, EntryValue, IndexHit, KnnScorer,
    QlSearcher, QueryConstructor, ScoreInfo, ScoreStore, Timings, TopWordsQuery, WeightedQuery,
    normalize_entry_key,
};

// Re-exports from lm
pub use lm::{EstimatedModel, Estimator, MixtureModel, SortedModel, UnigramModel, UnigramSample};

// Re-exports from tokenizer
pub use tokenizer::{
    AlphaTokenizer, Analyzer, AnalyzerRegistry, Language, LowercaseTokenizer, StemmingTokenizer,
    StopWordTokenizer, TextAnalyzer, Token, Tokenizer,
};

// Re-exports from other modules
pub use config::{IndexSettings, ScorerConfig};
pub use error::{Error, Result};
pub use index::{EntryRecord, MemoryIndex, MemoryIndexBuilder};
pub use store::MemoryScoreStore;

/// Position of an entry in index order
pub type DocId = u32;
pub type TermFreq = u32;
