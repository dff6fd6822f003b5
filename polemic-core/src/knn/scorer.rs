//! KNN controversy scorer

use std::sync::Arc;
use std::time::Instant;

use super::{
    Aggregation, ControversyDatabase, EntryIndex, EntrySearcher, QlSearcher, QueryConstructor,
    ScoreInfo, ScoreStore, TopWordsQuery,
};
use crate::config::ScorerConfig;
use crate::tokenizer::AnalyzerRegistry;
use crate::{Error, Result};

/// Text → query → nearest entries → controversy scores → aggregate.
///
/// Holds no per-call state; one scorer can serve concurrent callers as long
/// as its collaborators allow concurrent reads.
pub struct KnnScorer {
    query: Box<dyn QueryConstructor>,
    searcher: Box<dyn EntrySearcher>,
    database: ControversyDatabase,
    aggregation: Aggregation,
}

impl KnnScorer {
    pub fn new(
        query: impl QueryConstructor + 'static,
        searcher: impl EntrySearcher + 'static,
        database: ControversyDatabase,
        aggregation: Aggregation,
    ) -> Self {
        Self {
            query: Box::new(query),
            searcher: Box::new(searcher),
            database,
            aggregation,
        }
    }

    /// Standard pipeline: top-words query, QL searcher, unjudged-mean database.
    ///
    /// The query analyzer is looked up by name in `registry`.
    pub fn from_config(
        config: &ScorerConfig,
        registry: &AnalyzerRegistry,
        index: Arc<dyn EntryIndex>,
        store: Arc<dyn ScoreStore>,
    ) -> Result<Self> {
        config.validate()?;
        let analyzer = registry.get(&config.index.analyzer).ok_or_else(|| {
            Error::Config(format!("unknown analyzer: {}", config.index.analyzer))
        })?;
        Ok(Self::new(
            TopWordsQuery::new(analyzer, config.index.field.clone()),
            QlSearcher::new(index),
            ControversyDatabase::new(store),
            config.aggregation.clone(),
        ))
    }

    /// Controversy estimate of `text`
    pub fn score(&self, text: &str, topwords: usize, topentries: usize) -> f64 {
        self.run(text, topwords, topentries, None)
    }

    /// Controversy estimate of `text` plus the diagnostics of every phase
    pub fn score_with_info(
        &self,
        text: &str,
        topwords: usize,
        topentries: usize,
    ) -> (f64, ScoreInfo) {
        let mut info = ScoreInfo::default();
        let score = self.run(text, topwords, topentries, Some(&mut info));
        (score, info)
    }

    fn run(
        &self,
        text: &str,
        topwords: usize,
        topentries: usize,
        mut info: Option<&mut ScoreInfo>,
    ) -> f64 {
        let start = Instant::now();

        let query = self
            .query
            .construct_query(text, topwords, info.as_deref_mut());
        let entries = self
            .searcher
            .search(&query, topentries, info.as_deref_mut());
        let scores = self.database.get_scores(&entries, info.as_deref_mut());
        let similarities: Vec<_> = entries.into_iter().map(Some).collect();
        let score = self
            .aggregation
            .aggregate(&similarities, &scores, info.as_deref_mut());

        let score = if score.is_finite() { score } else { 0.0 };
        log::debug!(
            "scored text ({} bytes, {} query terms, {} neighbors) as {:.4} in {:.4}s",
            text.len(),
            query.len(),
            similarities.len(),
            score,
            start.elapsed().as_secs_f64()
        );
        score
    }

    pub fn aggregation(&self) -> &Aggregation {
        &self.aggregation
    }

    pub fn database(&self) -> &ControversyDatabase {
        &self.database
    }

    /// Close the index and the score store
    pub fn close(&self) -> Result<()> {
        self.searcher.close()?;
        self.database.close()
    }
}

impl std::fmt::Debug for KnnScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnnScorer")
            .field("database", &self.database)
            .field("aggregation", &self.aggregation)
            .finish_non_exhaustive()
    }
}
