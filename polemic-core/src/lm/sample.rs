//! Term frequency samples

use std::collections::BTreeMap;

/// Raw term frequencies plus a sample length.
///
/// Terms are kept in natural (lexicographic) order so every model derived
/// from a sample iterates deterministically. After [`UnigramSample::set_length`]
/// (or [`UnigramSample::from_counts`]) the length equals the sum of all stored
/// frequencies. Samples built with [`UnigramSample::with_length`] hold partial
/// statistics and keep the caller-provided length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnigramSample {
    stats: BTreeMap<String, f64>,
    length: f64,
}

impl UnigramSample {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty sample whose length is managed by the caller
    pub fn with_length(length: f64) -> Self {
        Self {
            stats: BTreeMap::new(),
            length,
        }
    }

    /// Build a finalized sample from `(term, count)` pairs; repeated terms accumulate
    pub fn from_counts<I, S>(counts: I) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: AsRef<str>,
    {
        let mut sample = Self::new();
        for (term, count) in counts {
            sample.update(term.as_ref(), f64::from(count));
        }
        sample.set_length();
        sample
    }

    /// Add `freq` to the stored frequency of `term`.
    ///
    /// Does not touch the sample length.
    pub fn update(&mut self, term: &str, freq: f64) {
        if let Some(stored) = self.stats.get_mut(term) {
            *stored += freq;
        } else {
            self.stats.insert(term.to_string(), freq);
        }
    }

    /// Set the sample length to the sum of all stored frequencies
    pub fn set_length(&mut self) {
        self.length = self.stats.values().sum();
    }

    /// Stored frequency of `term` (0 for unseen terms)
    pub fn frequency(&self, term: &str) -> f64 {
        self.stats.get(term).copied().unwrap_or(0.0)
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn vocabulary_size(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    /// Terms in natural order
    pub fn terms(&self) -> impl Iterator<Item = &str> + '_ {
        self.stats.keys().map(String::as_str)
    }

    /// `(term, frequency)` pairs in natural term order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.stats.iter().map(|(term, &freq)| (term.as_str(), freq))
    }
}
