//! Aggregation of neighbor similarities and controversy scores

use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::{EntryValue, ScoreInfo};

/// Strategy combining `(similarity, controversy)` pairs into one estimate.
///
/// Absent similarities or scores contribute nothing; aggregation never fails.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Aggregation {
    /// Likelihood-weighted mean of controversy scores.
    ///
    /// `P(c|D) = sum_i P(c|W_i) P(W_i|D)` with `P(W_i|D)` proportional to
    /// `exp(QL_i)`. Yields 0 when the total weight is 0.
    #[default]
    Generative,
    /// 1 if the inner aggregate is strictly above `cutoff`, else 0
    Cutoff {
        #[serde(default)]
        inner: Box<Aggregation>,
        cutoff: f64,
    },
}

impl Aggregation {
    pub fn cutoff(inner: Aggregation, cutoff: f64) -> Self {
        Aggregation::Cutoff {
            inner: Box::new(inner),
            cutoff,
        }
    }

    /// Aggregate similarity-scored entries with their controversy scores.
    ///
    /// Position `i` of `similarities` pairs with position `i` of `scores`;
    /// when the lengths differ the shorter side counts as absent.
    pub fn aggregate(
        &self,
        similarities: &[Option<EntryValue>],
        scores: &[Option<EntryValue>],
        info: Option<&mut ScoreInfo>,
    ) -> f64 {
        match self {
            Aggregation::Generative => {
                let start = Instant::now();
                let score = generative(similarities, scores);
                if let Some(info) = info {
                    info.timings.aggregate = Some(start.elapsed().as_secs_f64());
                }
                score
            }
            Aggregation::Cutoff { inner, cutoff } => {
                let mut info = info;
                let raw = inner.aggregate(similarities, scores, info.as_deref_mut());
                if let Some(info) = info {
                    info.raw_score = Some(raw);
                    info.cutoff = Some(*cutoff);
                }
                if raw > *cutoff { 1.0 } else { 0.0 }
            }
        }
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

fn generative(similarities: &[Option<EntryValue>], scores: &[Option<EntryValue>]) -> f64 {
    let n = similarities.len().max(scores.len());
    let mut sum = 0.0;
    let mut norm = 0.0;
    for ix in 0..n {
        let sim = similarities
            .get(ix)
            .and_then(Option::as_ref)
            .map_or(0.0, |s| finite_or_zero(s.value().exp()));
        let c = scores
            .get(ix)
            .and_then(Option::as_ref)
            .map_or(0.0, |c| finite_or_zero(c.value()));
        sum += sim * c;
        norm += sim;
    }
    if norm > 0.0 {
        finite_or_zero(sum / norm)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(entry: &str, value: f64) -> Option<EntryValue> {
        Some(EntryValue::new(entry, value))
    }

    #[test]
    fn test_generative_empty_and_null() {
        let g = Aggregation::Generative;
        assert_eq!(g.aggregate(&[], &[], None), 0.0);
        assert_eq!(g.aggregate(&[None], &[None], None), 0.0);
    }

    #[test]
    fn test_generative_weighting() {
        let sims = [some("a", 2f64.ln()), some("b", 1f64.ln())];
        let scores = [some("a", 1.0), some("b", 0.0)];
        let v = Aggregation::Generative.aggregate(&sims, &scores, None);
        assert!((v - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_generative_missing_score_counts_as_zero() {
        let sims = [some("a", 0.0), some("b", 0.0)];
        let scores = [some("a", 1.0), None];
        let v = Aggregation::Generative.aggregate(&sims, &scores, None);
        assert!((v - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_generative_mismatched_lengths() {
        let sims = [some("a", 0.0)];
        let scores = [some("a", 0.4), some("b", 1.0)];
        let v = Aggregation::Generative.aggregate(&sims, &scores, None);
        assert!((v - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_generative_underflow_is_zero_not_nan() {
        let sims = [some("a", -1.0e6)];
        let scores = [some("a", 1.0)];
        assert_eq!(Aggregation::Generative.aggregate(&sims, &scores, None), 0.0);
    }

    #[test]
    fn test_cutoff_is_strict() {
        // inner value: (1*0.6 + 1*0.2) / 2 = 0.4
        let sims = [some("a", 0.0), some("b", 0.0)];
        let scores = [some("a", 0.6), some("b", 0.2)];
        let at = Aggregation::cutoff(Aggregation::Generative, 0.4);
        let below = Aggregation::cutoff(Aggregation::Generative, 0.39);
        let above = Aggregation::cutoff(Aggregation::Generative, 0.41);
        assert_eq!(at.aggregate(&sims, &scores, None), 0.0);
        assert_eq!(below.aggregate(&sims, &scores, None), 1.0);
        assert_eq!(above.aggregate(&sims, &scores, None), 0.0);
    }

    #[test]
    fn test_cutoff_on_empty_input() {
        let c = Aggregation::cutoff(Aggregation::Generative, -0.5);
        assert_eq!(c.aggregate(&[], &[], None), 1.0);
        let c = Aggregation::cutoff(Aggregation::Generative, 0.0);
        assert_eq!(c.aggregate(&[], &[], None), 0.0);
    }

    #[test]
    fn test_cutoff_records_raw_score() {
        let mut info = ScoreInfo::default();
        let sims = [some("a", 0.0)];
        let scores = [some("a", 0.7)];
        let v = Aggregation::cutoff(Aggregation::Generative, 0.5).aggregate(
            &sims,
            &scores,
            Some(&mut info),
        );
        assert_eq!(v, 1.0);
        assert_eq!(info.raw_score, Some(0.7));
        assert_eq!(info.cutoff, Some(0.5));
        assert!(info.timings.aggregate.is_some());
    }

    #[test]
    fn test_deserialize_from_config() {
        let g: Aggregation = serde_json::from_str(r#"{"type":"generative"}"#).unwrap();
        assert_eq!(g, Aggregation::Generative);

        let c: Aggregation = serde_json::from_str(r#"{"type":"cutoff","cutoff":0.35}"#).unwrap();
        assert_eq!(c, Aggregation::cutoff(Aggregation::Generative, 0.35));
    }
}
