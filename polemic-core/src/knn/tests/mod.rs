//! End-to-end scoring tests over the in-memory index and score store

mod concurrency;

use std::sync::Arc;

use crate::config::{IndexSettings, ScorerConfig};
use crate::index::MemoryIndex;
use crate::knn::{Aggregation, KnnScorer};
use crate::store::MemoryScoreStore;
use crate::tokenizer::AnalyzerRegistry;

const ENTRIES: &[(&str, &str)] = &[
    ("Abortion", "abortion rights debate abortion law protest"),
    ("Gun_control", "gun control law debate rights protest"),
    ("Tennis", "tennis racket ball court serve"),
    ("Chess", "chess board pieces opening endgame"),
];

/// Chess is left unjudged
const SCORES: &[(&str, f64)] = &[("Abortion", 0.9), ("Gun control", 0.7), ("Tennis", 0.1)];

fn unjudged_mean() -> f64 {
    (0.9 + 0.7 + 0.1) / 3.0
}

fn test_config(aggregation: Aggregation) -> ScorerConfig {
    ScorerConfig {
        index: IndexSettings {
            mu: 10.0,
            analyzer: "alpha".to_string(),
            ..IndexSettings::default()
        },
        aggregation,
        ..ScorerConfig::default()
    }
}

fn build_index(config: &ScorerConfig, registry: &AnalyzerRegistry) -> Arc<MemoryIndex> {
    let analyzer = registry.get(&config.index.analyzer).unwrap();
    let mut builder = MemoryIndex::builder(analyzer, config.index.clone());
    for (title, text) in ENTRIES {
        builder.add(*title, *text).unwrap();
    }
    Arc::new(builder.build())
}

fn build_scorer(aggregation: Aggregation) -> KnnScorer {
    let config = test_config(aggregation);
    let registry = AnalyzerRegistry::new();
    let index = build_index(&config, &registry);
    let store = Arc::new(MemoryScoreStore::from_entries(SCORES.iter().copied()).unwrap());
    KnnScorer::from_config(&config, &registry, index, store).unwrap()
}
