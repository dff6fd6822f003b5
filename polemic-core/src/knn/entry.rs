use serde::{Deserialize, Serialize};

/// An entry identifier with an associated value.
///
/// Used for similarity scores, controversy scores and query term weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryValue {
    entry: String,
    value: f64,
}

impl EntryValue {
    pub fn new(entry: impl Into<String>, value: f64) -> Self {
        Self {
            entry: entry.into(),
            value,
        }
    }

    pub fn entry(&self) -> &str {
        &self.entry
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

/// Canonical form of a Wikipedia entry title used as a lookup key.
///
/// Trims, maps `_` to a space, collapses whitespace runs and lowercases, so
/// "Climate_change" and " climate  Change" share a key.
pub fn normalize_entry_key(title: &str) -> String {
    let mut key = String::with_capacity(title.len());
    for word in title.split(|c: char| c == '_' || c.is_whitespace()) {
        if word.is_empty() {
            continue;
        }
        if !key.is_empty() {
            key.push(' ');
        }
        key.extend(word.chars().flat_map(char::to_lowercase));
    }
    key
}
