//! Analyzers: text to `(term, count)` bags

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use super::{
    AlphaTokenizer, Language, LowercaseTokenizer, StemmingTokenizer, StopWordTokenizer, Tokenizer,
};

/// Turns text into a bag of normalized terms.
///
/// Implementations must be safe to share between threads; the scorer calls
/// them concurrently from every request.
pub trait Analyzer: Send + Sync {
    /// `(term, count)` pairs, terms in first-occurrence order
    fn analyze(&self, text: &str) -> Vec<(String, u32)>;
}

/// Analyzer backed by a tokenizer chain
pub struct TextAnalyzer {
    tokenizer: Box<dyn Tokenizer>,
}

impl TextAnalyzer {
    pub fn new<T: Tokenizer + 'static>(tokenizer: T) -> Self {
        Self {
            tokenizer: Box::new(tokenizer),
        }
    }
}

impl Analyzer for TextAnalyzer {
    fn analyze(&self, text: &str) -> Vec<(String, u32)> {
        let mut slots: FxHashMap<String, usize> = FxHashMap::default();
        let mut counts: Vec<(String, u32)> = Vec::new();
        for token in self.tokenizer.tokenize(text) {
            match slots.get(&token.text) {
                Some(&slot) => counts[slot].1 += 1,
                None => {
                    slots.insert(token.text.clone(), counts.len());
                    counts.push((token.text, 1));
                }
            }
        }
        counts
    }
}

impl std::fmt::Debug for TextAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextAnalyzer").finish_non_exhaustive()
    }
}

/// Registry for named analyzers
///
/// Configuration refers to analyzers by name. Pre-registers:
/// "default"/"lowercase", "alpha", "en_stem", "en_stop", "en_stop_stem".
#[derive(Clone)]
pub struct AnalyzerRegistry {
    analyzers: Arc<RwLock<HashMap<String, Arc<dyn Analyzer>>>>,
}

impl AnalyzerRegistry {
    /// Create a new registry with the default analyzers registered
    pub fn new() -> Self {
        let registry = Self {
            analyzers: Arc::new(RwLock::new(HashMap::new())),
        };
        registry.register_defaults();
        registry
    }

    fn register_defaults(&self) {
        self.register("default", TextAnalyzer::new(LowercaseTokenizer));
        self.register("lowercase", TextAnalyzer::new(LowercaseTokenizer));
        self.register("alpha", TextAnalyzer::new(AlphaTokenizer));
        self.register(
            "en_stem",
            TextAnalyzer::new(StemmingTokenizer::english(AlphaTokenizer)),
        );
        self.register(
            "en_stop",
            TextAnalyzer::new(StopWordTokenizer::english(AlphaTokenizer)),
        );
        // Stop words are matched before stemming
        self.register(
            "en_stop_stem",
            TextAnalyzer::new(StemmingTokenizer::new(
                StopWordTokenizer::new(AlphaTokenizer, Language::English),
                Language::English,
            )),
        );
    }

    /// Register an analyzer with a name (replaces any previous one)
    pub fn register<A: Analyzer + 'static>(&self, name: &str, analyzer: A) {
        self.analyzers
            .write()
            .insert(name.to_string(), Arc::new(analyzer));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Analyzer>> {
        self.analyzers.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.analyzers.read().contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.analyzers.read().keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for AnalyzerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
