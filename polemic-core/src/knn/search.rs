//! Similarity search over the entry collection

use std::sync::Arc;
use std::time::Instant;

use super::ql::{rescale_score, score_normalizer};
use super::{EntryValue, ScoreInfo, WeightedQuery};
use crate::Result;

/// One hit returned by an [`EntryIndex`]
#[derive(Debug, Clone, PartialEq)]
pub struct IndexHit {
    /// Normalized entry key
    pub key: String,
    /// Display title
    pub title: String,
    /// Partial QL score computed by the engine (no query-only normalizer)
    pub score: f64,
}

/// Full-text index over Wikipedia entries.
///
/// Implementations must support concurrent read-only calls.
pub trait EntryIndex: Send + Sync {
    /// Top `limit` entries for `query`, ranked by descending engine score
    fn search(&self, query: &WeightedQuery, limit: usize) -> Result<Vec<IndexHit>>;

    /// Collection-wide unigram probability of `term` in `field`
    fn corpus_term_probability(&self, field: &str, term: &str) -> Result<f64>;

    fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// Retrieves the nearest entries of a query together with their similarity
pub trait EntrySearcher: Send + Sync {
    /// At most `topentries` `(entry, similarity)` pairs, best first.
    ///
    /// Never fails: collaborator errors are logged and yield an empty list.
    fn search(
        &self,
        query: &WeightedQuery,
        topentries: usize,
        info: Option<&mut ScoreInfo>,
    ) -> Vec<EntryValue>;

    fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// Searcher returning standard Dirichlet QL log-likelihoods.
///
/// Adds the query-only normalizer to every engine score so similarities of
/// different queries live on the same scale.
#[derive(Clone)]
pub struct QlSearcher {
    index: Arc<dyn EntryIndex>,
}

impl QlSearcher {
    pub fn new(index: Arc<dyn EntryIndex>) -> Self {
        Self { index }
    }

    /// `sum_i w_i * ln P(t_i|C)` for `query`
    pub fn normalizer(&self, query: &WeightedQuery) -> Result<f64> {
        let mut terms = Vec::with_capacity(query.len());
        for (term, weight) in query.iter() {
            let p_c = self.index.corpus_term_probability(query.field(), term)?;
            terms.push((weight, p_c));
        }
        Ok(score_normalizer(terms))
    }

    fn try_search(
        &self,
        query: &WeightedQuery,
        topentries: usize,
    ) -> Result<(Vec<EntryValue>, Vec<EntryValue>)> {
        let hits = self.index.search(query, topentries)?;
        if hits.is_empty() {
            return Ok((Vec::new(), Vec::new()));
        }
        let norm = self.normalizer(query)?;

        let mut entries = Vec::with_capacity(hits.len());
        let mut titles = Vec::with_capacity(hits.len());
        for hit in hits.into_iter().take(topentries) {
            let score = rescale_score(hit.score, norm);
            if !score.is_finite() {
                log::warn!("dropping entry {:?} with non-finite score {}", hit.key, hit.score);
                continue;
            }
            entries.push(EntryValue::new(hit.key, score));
            titles.push(EntryValue::new(hit.title, score));
        }
        Ok((entries, titles))
    }
}

impl EntrySearcher for QlSearcher {
    fn search(
        &self,
        query: &WeightedQuery,
        topentries: usize,
        info: Option<&mut ScoreInfo>,
    ) -> Vec<EntryValue> {
        let start = Instant::now();

        let (entries, titles) = if query.is_empty() || topentries == 0 {
            (Vec::new(), Vec::new())
        } else {
            match self.try_search(query, topentries) {
                Ok(found) => found,
                Err(e) => {
                    log::warn!("entry search failed, continuing with no neighbors: {}", e);
                    (Vec::new(), Vec::new())
                }
            }
        };

        let elapsed = start.elapsed().as_secs_f64();
        log::debug!("retrieved {} entries in {:.4}s", entries.len(), elapsed);
        if let Some(info) = info {
            info.top_entries = Some(topentries);
            info.entries_ql = entries.clone();
            info.entries_ql_title = titles;
            info.timings.search_entries = Some(elapsed);
        }
        entries
    }

    fn close(&self) -> Result<()> {
        self.index.close()
    }
}

impl std::fmt::Debug for QlSearcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QlSearcher").finish_non_exhaustive()
    }
}
