//! Per-call diagnostics
//!
//! A [`ScoreInfo`] is filled in by every pipeline stage when the caller asks
//! for it. It is observability only: the returned estimate never depends on
//! whether one was passed.

use serde::Serialize;

use super::EntryValue;

/// Diagnostics recorded during one scoring call
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScoreInfo {
    /// Requested number of query terms
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_topwords: Option<usize>,
    /// Query terms with their weights, in query order
    pub query_term_weights: Vec<EntryValue>,
    /// Requested number of neighbor entries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_entries: Option<usize>,
    /// Retrieved entry keys with their QL log-likelihood
    pub entries_ql: Vec<EntryValue>,
    /// Same as `entries_ql`, keyed by display title
    pub entries_ql_title: Vec<EntryValue>,
    /// Controversy score per retrieved entry (`None` if the lookup failed)
    pub entries_controversy: Vec<Option<EntryValue>>,
    /// Aggregate before a cutoff was applied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cutoff: Option<f64>,
    pub timings: Timings,
}

/// Elapsed seconds per pipeline phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Timings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub construct_query: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_entries: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lookup_scores: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregate: Option<f64>,
}

impl Timings {
    /// Sum of all recorded phases
    pub fn total(&self) -> f64 {
        [
            self.construct_query,
            self.search_entries,
            self.lookup_scores,
            self.aggregate,
        ]
        .into_iter()
        .flatten()
        .sum()
    }
}
