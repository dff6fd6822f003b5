//! Query likelihood with Dirichlet smoothing
//!
//! A weighted query `{(t_i, w_i)}` scores an entry D as
//!
//! ```text
//! QL(D) = sum_i w_i * ln( (tf(t_i, D) + mu * P(t_i|C)) / (len(D) + mu) )
//! ```
//!
//! Search engines compute the rank-equivalent partial score
//! `sum_i w_i * max(0, ln(p_s(t_i|D) / P(t_i|C)))`, which drops the
//! query-only term `sum_i w_i * ln P(t_i|C)`. [`score_normalizer`] computes
//! that term and [`rescale_score`] adds it back, making scores of different
//! queries comparable.
//!
//! Per-term log ratios below zero are clamped to 0 in the partial score, so
//! the rescaled score is effectively `sum_i w_i * ln max(p_s, P(t_i|C))`.
//! Cutoffs and mu were tuned against this behavior.

/// Smoothing parameter used when nothing else is configured
pub const DEFAULT_MU: f64 = 1500.0;

/// Dirichlet-smoothed probability of a term in a document.
///
/// Returns 0 when the smoothed length is not positive.
#[inline]
pub fn dirichlet_probability(tf: f64, doc_len: f64, p_collection: f64, mu: f64) -> f64 {
    let len_smoothed = doc_len + mu;
    if len_smoothed > 0.0 {
        (tf + mu * p_collection) / len_smoothed
    } else {
        0.0
    }
}

/// Contribution of one query term to the partial engine score.
///
/// `weight * max(0, ln(p_s / p_c))`; a term whose smoothed or collection
/// probability is not positive (or not finite) contributes 0.
#[inline]
pub fn term_score(weight: f64, tf: f64, doc_len: f64, p_collection: f64, mu: f64) -> f64 {
    let p_c = if p_collection.is_finite() {
        p_collection
    } else {
        0.0
    };
    let p_d = dirichlet_probability(tf, doc_len, p_c, mu);
    if p_d > 0.0 && p_c > 0.0 {
        weight * (p_d / p_c).ln().max(0.0)
    } else {
        0.0
    }
}

/// Query-only normalizer `sum_i w_i * ln P(t_i|C)`.
///
/// Takes `(weight, collection probability)` pairs; terms with a zero (or
/// non-finite) collection probability are skipped.
pub fn score_normalizer<I>(terms: I) -> f64
where
    I: IntoIterator<Item = (f64, f64)>,
{
    terms
        .into_iter()
        .filter(|&(_, p_c)| p_c > 0.0 && p_c.is_finite())
        .map(|(weight, p_c)| weight * p_c.ln())
        .sum()
}

/// Turn a partial engine score into the standard QL log-likelihood
#[inline]
pub fn rescale_score(engine_score: f64, normalizer: f64) -> f64 {
    engine_score + normalizer
}
