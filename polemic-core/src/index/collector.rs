//! Top-k collection of scored entries

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::DocId;

/// Entry position with its engine score
#[derive(Debug, Clone, Copy)]
pub struct ScoredDoc {
    pub doc_id: DocId,
    pub score: f64,
}

impl PartialEq for ScoredDoc {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScoredDoc {}

impl PartialOrd for ScoredDoc {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Reversed so the heap top is the weakest kept result: lowest score, then
/// highest doc id.
impl Ord for ScoredDoc {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| self.doc_id.cmp(&other.doc_id))
    }
}

/// Collector for top-k results
///
/// Fed in ascending doc order, a later document only displaces a kept one
/// with a strictly higher score, so ties keep index order. `k` is only an
/// upper bound; the heap grows with the documents actually collected.
pub struct TopKCollector {
    heap: BinaryHeap<ScoredDoc>,
    k: usize,
    total_seen: u32,
}

impl TopKCollector {
    pub fn new(k: usize) -> Self {
        Self {
            heap: BinaryHeap::new(),
            k,
            total_seen: 0,
        }
    }

    pub fn collect(&mut self, doc_id: DocId, score: f64) {
        self.total_seen += 1;
        if self.k == 0 {
            return;
        }
        if self.heap.len() < self.k {
            self.heap.push(ScoredDoc { doc_id, score });
        } else if let Some(min) = self.heap.peek()
            && score > min.score
        {
            self.heap.pop();
            self.heap.push(ScoredDoc { doc_id, score });
        }
    }

    /// Number of documents offered to this collector
    pub fn total_seen(&self) -> u32 {
        self.total_seen
    }

    /// Results by descending score, ascending doc id on ties
    pub fn into_sorted_results(self) -> Vec<ScoredDoc> {
        let mut results = self.heap.into_vec();
        results.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.doc_id.cmp(&b.doc_id))
        });
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(results: &[ScoredDoc]) -> Vec<DocId> {
        results.iter().map(|r| r.doc_id).collect()
    }

    #[test]
    fn test_keeps_best_k() {
        let mut collector = TopKCollector::new(2);
        for (doc, score) in [(0, 1.0), (1, 5.0), (2, 3.0), (3, 4.0)] {
            collector.collect(doc, score);
        }
        assert_eq!(collector.total_seen(), 4);
        assert_eq!(ids(&collector.into_sorted_results()), vec![1, 3]);
    }

    #[test]
    fn test_ties_keep_index_order() {
        let mut collector = TopKCollector::new(2);
        for doc in 0..5 {
            collector.collect(doc, 1.0);
        }
        assert_eq!(ids(&collector.into_sorted_results()), vec![0, 1]);
    }

    #[test]
    fn test_unbounded_k_keeps_everything() {
        for k in [usize::MAX, usize::MAX / 2] {
            let mut collector = TopKCollector::new(k);
            for (doc, score) in [(0, 2.0), (1, 3.0), (2, 1.0)] {
                collector.collect(doc, score);
            }
            assert_eq!(ids(&collector.into_sorted_results()), vec![1, 0, 2]);
        }
    }

    #[test]
    fn test_zero_k_collects_nothing() {
        let mut collector = TopKCollector::new(0);
        collector.collect(0, 1.0);
        assert!(collector.into_sorted_results().is_empty());
    }
}
