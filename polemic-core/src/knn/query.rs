//! Query construction from raw text

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use super::{EntryValue, ScoreInfo};
use crate::lm::{EstimatedModel, SortedModel, UnigramSample};
use crate::tokenizer::Analyzer;

/// Weighted term query against one index field.
///
/// Weights are absolute probabilities from the source text's model; they are
/// not renormalized after truncation and need not sum to 1.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WeightedQuery {
    field: String,
    terms: Vec<EntryValue>,
}

impl WeightedQuery {
    pub fn new(field: impl Into<String>, terms: Vec<EntryValue>) -> Self {
        Self {
            field: field.into(),
            terms,
        }
    }

    /// Query with no terms; searching it yields nothing
    pub fn empty(field: impl Into<String>) -> Self {
        Self::new(field, Vec::new())
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn terms(&self) -> &[EntryValue] {
        &self.terms
    }

    /// `(term, weight)` pairs in query order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.terms.iter().map(|t| (t.entry(), t.value()))
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Builds a query from a chunk of text
pub trait QueryConstructor: Send + Sync {
    /// Construct a query of at most `topwords` terms for `text`.
    ///
    /// `info` is optional; when present the constructor records the query and
    /// its elapsed time there.
    fn construct_query(
        &self,
        text: &str,
        topwords: usize,
        info: Option<&mut ScoreInfo>,
    ) -> WeightedQuery;
}

/// The `topwords` most probable terms of the text's own MLE unigram model.
///
/// Terms are ranked by descending probability, ties by natural term order,
/// so a shorter query is always a prefix of a longer one.
#[derive(Clone)]
pub struct TopWordsQuery {
    analyzer: Arc<dyn Analyzer>,
    field: String,
}

impl TopWordsQuery {
    pub fn new(analyzer: Arc<dyn Analyzer>, field: impl Into<String>) -> Self {
        Self {
            analyzer,
            field: field.into(),
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }
}

impl QueryConstructor for TopWordsQuery {
    fn construct_query(
        &self,
        text: &str,
        topwords: usize,
        info: Option<&mut ScoreInfo>,
    ) -> WeightedQuery {
        let start = Instant::now();

        let sample = UnigramSample::from_counts(self.analyzer.analyze(text));
        let model = SortedModel::new(EstimatedModel::mle(&sample));
        let terms: Vec<EntryValue> = model
            .top(topwords)
            .map(|(term, prob)| EntryValue::new(term, prob))
            .collect();
        let query = WeightedQuery::new(self.field.clone(), terms);

        let elapsed = start.elapsed().as_secs_f64();
        log::debug!(
            "constructed {}-term query from {} distinct terms in {:.4}s",
            query.len(),
            sample.vocabulary_size(),
            elapsed
        );
        if let Some(info) = info {
            info.query_topwords = Some(topwords);
            info.query_term_weights = query.terms().to_vec();
            info.timings.construct_query = Some(elapsed);
        }
        query
    }
}

impl std::fmt::Debug for TopWordsQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TopWordsQuery")
            .field("field", &self.field)
            .finish_non_exhaustive()
    }
}
