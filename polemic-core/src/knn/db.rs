//! Controversy scores of Wikipedia entries

use std::sync::Arc;
use std::time::Instant;

use super::{EntryValue, ScoreInfo, normalize_entry_key};
use crate::Result;

/// Key-value store of annotated controversy scores.
///
/// Keys are normalized entry titles (see [`normalize_entry_key`]).
/// Implementations must support concurrent read-only calls.
pub trait ScoreStore: Send + Sync {
    /// Annotated score of `entry`, `None` if it was never judged
    fn lookup(&self, entry: &str) -> Result<Option<f64>>;

    /// Mean of all annotated scores
    fn mean_score(&self) -> Result<f64>;

    fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// Resolves entries to controversy scores, falling back to the unjudged score.
///
/// The unjudged score (the mean of all annotations) is computed once at
/// construction; unannotated entries are assumed typical.
#[derive(Clone)]
pub struct ControversyDatabase {
    store: Arc<dyn ScoreStore>,
    unjudged: f64,
}

impl ControversyDatabase {
    pub fn new(store: Arc<dyn ScoreStore>) -> Self {
        let unjudged = match store.mean_score() {
            Ok(mean) if mean.is_finite() => mean,
            Ok(mean) => {
                log::warn!("score store mean is {}, using 0 for unjudged entries", mean);
                0.0
            }
            Err(e) => {
                log::error!("failed to compute unjudged score, using 0: {}", e);
                0.0
            }
        };
        log::info!("controversy database ready, unjudged score {:.4}", unjudged);
        Self { store, unjudged }
    }

    /// Score assigned to entries without an annotation
    pub fn unjudged_score(&self) -> f64 {
        self.unjudged
    }

    /// Controversy score of `entry`.
    ///
    /// `None` only if the store failed; unannotated entries get the unjudged score.
    pub fn get_score(&self, entry: &str) -> Option<EntryValue> {
        match self.store.lookup(&normalize_entry_key(entry)) {
            Ok(Some(score)) => Some(EntryValue::new(entry, score)),
            Ok(None) => Some(EntryValue::new(entry, self.unjudged)),
            Err(e) => {
                log::warn!("score lookup failed for {:?}: {}", entry, e);
                None
            }
        }
    }

    /// Scores for `entries`, same order and same length
    pub fn get_scores(
        &self,
        entries: &[EntryValue],
        info: Option<&mut ScoreInfo>,
    ) -> Vec<Option<EntryValue>> {
        let start = Instant::now();
        let scores: Vec<Option<EntryValue>> = entries
            .iter()
            .map(|entry| self.get_score(entry.entry()))
            .collect();

        let elapsed = start.elapsed().as_secs_f64();
        log::debug!("looked up {} controversy scores in {:.4}s", scores.len(), elapsed);
        if let Some(info) = info {
            info.entries_controversy = scores.clone();
            info.timings.lookup_scores = Some(elapsed);
        }
        scores
    }

    pub fn close(&self) -> Result<()> {
        self.store.close()
    }
}

impl std::fmt::Debug for ControversyDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControversyDatabase")
            .field("unjudged", &self.unjudged)
            .finish_non_exhaustive()
    }
}
