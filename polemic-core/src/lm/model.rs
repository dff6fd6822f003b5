//! Unigram model abstraction and its variants

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use super::UnigramSample;
use crate::{Error, Result};

/// A probability distribution over vocabulary terms
pub trait UnigramModel {
    /// Probability of `term`, in [0, 1]
    fn probability(&self, term: &str) -> f64;

    /// Vocabulary in this model's iteration order
    fn terms(&self) -> Box<dyn Iterator<Item = &str> + '_>;

    fn vocabulary_size(&self) -> usize;
}

impl<M: UnigramModel + ?Sized> UnigramModel for &M {
    fn probability(&self, term: &str) -> f64 {
        (**self).probability(term)
    }

    fn terms(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        (**self).terms()
    }

    fn vocabulary_size(&self) -> usize {
        (**self).vocabulary_size()
    }
}

/// How an [`EstimatedModel`] turns sample frequencies into probabilities
#[derive(Clone, Copy)]
pub enum Estimator<'a> {
    /// `tf / len`
    MaximumLikelihood,
    /// `(tf + mu * P_bg) / (len + mu)`; `mu == 0` ignores the background
    Dirichlet {
        background: &'a dyn UnigramModel,
        mu: f64,
    },
    /// `(1 - lambda) * tf / len + lambda * P_bg`
    JelinekMercer {
        background: &'a dyn UnigramModel,
        lambda: f64,
    },
}

impl Estimator<'_> {
    pub fn probability(&self, sample: &UnigramSample, term: &str) -> f64 {
        let tf = sample.frequency(term);
        let len = sample.length();
        match *self {
            Estimator::MaximumLikelihood => {
                if len > 0.0 {
                    tf / len
                } else {
                    0.0
                }
            }
            Estimator::Dirichlet { background, mu } => {
                let p_bg = if mu == 0.0 {
                    0.0
                } else {
                    background.probability(term)
                };
                let len_smoothed = len + mu;
                if len_smoothed > 0.0 {
                    (tf + mu * p_bg) / len_smoothed
                } else {
                    0.0
                }
            }
            Estimator::JelinekMercer { background, lambda } => {
                let p_ml = if len > 0.0 { tf / len } else { 0.0 };
                p_ml * (1.0 - lambda) + background.probability(term) * lambda
            }
        }
    }
}

impl fmt::Debug for Estimator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Estimator::MaximumLikelihood => f.write_str("MaximumLikelihood"),
            Estimator::Dirichlet { mu, .. } => f.debug_struct("Dirichlet").field("mu", mu).finish(),
            Estimator::JelinekMercer { lambda, .. } => f
                .debug_struct("JelinekMercer")
                .field("lambda", lambda)
                .finish(),
        }
    }
}

/// Model estimated on the fly from a borrowed sample
#[derive(Debug, Clone, Copy)]
pub struct EstimatedModel<'a> {
    sample: &'a UnigramSample,
    estimator: Estimator<'a>,
}

impl<'a> EstimatedModel<'a> {
    pub fn new(sample: &'a UnigramSample, estimator: Estimator<'a>) -> Self {
        Self { sample, estimator }
    }

    /// Maximum likelihood estimate: `P(t) = tf(t) / len`
    pub fn mle(sample: &'a UnigramSample) -> Self {
        Self::new(sample, Estimator::MaximumLikelihood)
    }

    pub fn dirichlet(sample: &'a UnigramSample, background: &'a dyn UnigramModel, mu: f64) -> Self {
        Self::new(sample, Estimator::Dirichlet { background, mu })
    }

    pub fn jelinek_mercer(
        sample: &'a UnigramSample,
        background: &'a dyn UnigramModel,
        lambda: f64,
    ) -> Self {
        Self::new(sample, Estimator::JelinekMercer { background, lambda })
    }

    pub fn sample(&self) -> &'a UnigramSample {
        self.sample
    }
}

impl UnigramModel for EstimatedModel<'_> {
    fn probability(&self, term: &str) -> f64 {
        self.estimator.probability(self.sample, term)
    }

    fn terms(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        Box::new(self.sample.terms())
    }

    fn vocabulary_size(&self) -> usize {
        self.sample.vocabulary_size()
    }
}

/// Wraps a model and iterates its vocabulary in a fixed sorted order.
///
/// The default order is descending probability, ties broken by the term's
/// natural order. Probabilities are still answered by the wrapped model.
#[derive(Debug, Clone)]
pub struct SortedModel<M> {
    model: M,
    sorted: Vec<(String, f64)>,
}

impl<M: UnigramModel> SortedModel<M> {
    pub fn new(model: M) -> Self {
        Self::with_order(model, |a, b| {
            b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0))
        })
    }

    /// Sort with a custom comparator over `(term, probability)`.
    ///
    /// The sort is stable with respect to the wrapped model's iteration order.
    pub fn with_order<F>(model: M, mut compare: F) -> Self
    where
        F: FnMut(&(String, f64), &(String, f64)) -> Ordering,
    {
        let mut sorted: Vec<(String, f64)> = model
            .terms()
            .map(|term| (term.to_string(), model.probability(term)))
            .collect();
        sorted.sort_by(|a, b| compare(a, b));
        Self { model, sorted }
    }

    /// First `n` terms with their probabilities (fewer if the vocabulary is smaller)
    pub fn top(&self, n: usize) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.sorted
            .iter()
            .take(n)
            .map(|(term, prob)| (term.as_str(), *prob))
    }

    pub fn inner(&self) -> &M {
        &self.model
    }
}

impl<M: UnigramModel> UnigramModel for SortedModel<M> {
    fn probability(&self, term: &str) -> f64 {
        self.model.probability(term)
    }

    fn terms(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        Box::new(self.sorted.iter().map(|(term, _)| term.as_str()))
    }

    fn vocabulary_size(&self) -> usize {
        self.sorted.len()
    }
}

/// One `term<TAB>probability` line per term, in sorted order
impl<M: UnigramModel> fmt::Display for SortedModel<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (term, prob) in &self.sorted {
            writeln!(f, "{term}\t{prob}")?;
        }
        Ok(())
    }
}

/// Linear combination of unigram models.
///
/// `P(t) = sum_i w_i * P_i(t)`; component probabilities that are NaN or
/// infinite count as 0. The vocabulary is the union of all components in
/// natural order.
pub struct MixtureModel<'a> {
    components: Vec<&'a dyn UnigramModel>,
    weights: Vec<f64>,
    vocabulary: BTreeSet<String>,
}

impl<'a> MixtureModel<'a> {
    /// Mixture whose weights are rescaled to sum to 1
    pub fn new(components: Vec<&'a dyn UnigramModel>, weights: Vec<f64>) -> Result<Self> {
        let norm: f64 = weights.iter().sum();
        if !norm.is_finite() || norm <= 0.0 {
            return Err(Error::Model(format!(
                "mixture weights must have a positive finite sum, got {norm}"
            )));
        }
        let weights = weights.into_iter().map(|w| w / norm).collect();
        Self::unnormalized(components, weights)
    }

    /// Mixture that uses `weights` exactly as given
    pub fn unnormalized(components: Vec<&'a dyn UnigramModel>, weights: Vec<f64>) -> Result<Self> {
        if components.len() != weights.len() {
            return Err(Error::Model(format!(
                "{} mixture components but {} weights",
                components.len(),
                weights.len()
            )));
        }
        let vocabulary = components
            .iter()
            .flat_map(|model| model.terms().map(str::to_string))
            .collect();
        Ok(Self {
            components,
            weights,
            vocabulary,
        })
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }
}

impl UnigramModel for MixtureModel<'_> {
    fn probability(&self, term: &str) -> f64 {
        self.components
            .iter()
            .zip(&self.weights)
            .map(|(model, weight)| {
                let prob = model.probability(term);
                if prob.is_finite() { prob * weight } else { 0.0 }
            })
            .sum()
    }

    fn terms(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        Box::new(self.vocabulary.iter().map(String::as_str))
    }

    fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }
}

impl fmt::Debug for MixtureModel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MixtureModel")
            .field("components", &self.components.len())
            .field("weights", &self.weights)
            .field("vocabulary", &self.vocabulary.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    fn sample(counts: &[(&str, u32)]) -> UnigramSample {
        UnigramSample::from_counts(counts.iter().copied())
    }

    #[test]
    fn test_mle_probabilities() {
        let s = sample(&[("gun", 3), ("control", 1)]);
        let m = EstimatedModel::mle(&s);
        assert!((m.probability("gun") - 0.75).abs() < EPS);
        assert!((m.probability("control") - 0.25).abs() < EPS);
        assert_eq!(m.probability("unseen"), 0.0);
    }

    #[test]
    fn test_mle_on_empty_sample_is_zero_not_nan() {
        let s = UnigramSample::new();
        let m = EstimatedModel::mle(&s);
        assert_eq!(m.probability("anything"), 0.0);
    }

    #[test]
    fn test_sorted_model_descending_with_lexicographic_ties() {
        let s = sample(&[
            ("delta", 1),
            ("alpha", 2),
            ("charlie", 1),
            ("bravo", 2),
            ("echo", 5),
        ]);
        let sorted = SortedModel::new(EstimatedModel::mle(&s));
        let order: Vec<&str> = sorted.terms().collect();
        assert_eq!(order, vec!["echo", "alpha", "bravo", "charlie", "delta"]);
        assert_eq!(sorted.vocabulary_size(), 5);
    }

    #[test]
    fn test_sorted_model_top_truncates() {
        let s = sample(&[("a", 3), ("b", 2), ("c", 1)]);
        let sorted = SortedModel::new(EstimatedModel::mle(&s));
        let top: Vec<&str> = sorted.top(2).map(|(t, _)| t).collect();
        assert_eq!(top, vec!["a", "b"]);
        assert_eq!(sorted.top(10).count(), 3);
    }

    #[test]
    fn test_sorted_model_custom_order() {
        let s = sample(&[("a", 3), ("b", 2), ("c", 1)]);
        let ascending =
            SortedModel::with_order(EstimatedModel::mle(&s), |x, y| x.1.total_cmp(&y.1));
        let order: Vec<&str> = ascending.terms().collect();
        assert_eq!(order, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_sorted_model_display() {
        let s = sample(&[("a", 1), ("b", 3)]);
        let sorted = SortedModel::new(EstimatedModel::mle(&s));
        assert_eq!(sorted.to_string(), "b\t0.75\na\t0.25\n");
    }

    #[test]
    fn test_mixture_normalizes_weights() {
        let s1 = sample(&[("x", 1)]);
        let s2 = sample(&[("y", 1)]);
        let m1 = EstimatedModel::mle(&s1);
        let m2 = EstimatedModel::mle(&s2);
        let mix = MixtureModel::new(vec![&m1, &m2], vec![3.0, 1.0]).unwrap();
        assert!((mix.weights()[0] - 0.75).abs() < EPS);
        assert!((mix.probability("x") - 0.75).abs() < EPS);
        assert!((mix.probability("y") - 0.25).abs() < EPS);
        let vocab: Vec<&str> = mix.terms().collect();
        assert_eq!(vocab, vec!["x", "y"]);
    }

    #[test]
    fn test_mixture_rejects_bad_weights() {
        let s = sample(&[("x", 1)]);
        let m = EstimatedModel::mle(&s);
        assert!(MixtureModel::new(vec![&m], vec![0.0]).is_err());
        let unnormalized = MixtureModel::unnormalized(vec![&m], vec![0.5, 0.5]);
        assert!(unnormalized.is_err());
    }

    #[test]
    fn test_dirichlet_smoothing() {
        let bg_sample = sample(&[("x", 1), ("y", 1)]);
        let bg = EstimatedModel::mle(&bg_sample);
        let doc = sample(&[("x", 2)]);
        let m = EstimatedModel::dirichlet(&doc, &bg, 2.0);
        // (2 + 2 * 0.5) / (2 + 2)
        assert!((m.probability("x") - 0.75).abs() < EPS);
        // (0 + 2 * 0.5) / 4
        assert!((m.probability("y") - 0.25).abs() < EPS);

        let unsmoothed = EstimatedModel::dirichlet(&doc, &bg, 0.0);
        assert!((unsmoothed.probability("x") - 1.0).abs() < EPS);
        assert_eq!(unsmoothed.probability("y"), 0.0);
    }

    #[test]
    fn test_jelinek_mercer_smoothing() {
        let bg_sample = sample(&[("x", 1), ("y", 1)]);
        let bg = EstimatedModel::mle(&bg_sample);
        let doc = sample(&[("x", 1)]);
        let m = EstimatedModel::jelinek_mercer(&doc, &bg, 0.2);
        assert!((m.probability("x") - (0.8 + 0.1)).abs() < EPS);
        assert!((m.probability("y") - 0.1).abs() < EPS);
    }
}
