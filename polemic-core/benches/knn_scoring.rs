//! KNN scoring benchmarks
//!
//! Run with: cargo bench -p polemic-core --bench knn_scoring

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use polemic_core::{
    Aggregation, AnalyzerRegistry, KnnScorer, MemoryIndex, MemoryScoreStore, ScorerConfig,
};

const VOCABULARY: &[&str] = &[
    "abortion", "rights", "debate", "law", "protest", "election", "climate", "warming",
    "evolution", "species", "religion", "court", "tennis", "chess", "music", "river",
    "mountain", "history", "science", "policy", "war", "peace", "economy", "tax",
];

/// Deterministic pseudo-text: word `i` is picked with a fixed LCG
fn generate_text(seed: u64, len: usize) -> String {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
    let mut words = Vec::with_capacity(len);
    for _ in 0..len {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        words.push(VOCABULARY[(state >> 33) as usize % VOCABULARY.len()]);
    }
    words.join(" ")
}

fn build_scorer(num_entries: usize) -> KnnScorer {
    let config = ScorerConfig::default();
    let registry = AnalyzerRegistry::new();
    let analyzer = registry.get(&config.index.analyzer).unwrap();

    let mut builder = MemoryIndex::builder(analyzer, config.index.clone());
    let mut scores = Vec::with_capacity(num_entries);
    for i in 0..num_entries {
        let title = format!("Entry_{i}");
        builder.add(title.clone(), generate_text(i as u64, 300)).unwrap();
        if i % 3 == 0 {
            scores.push((title, (i % 10) as f64 / 10.0));
        }
    }
    let store = MemoryScoreStore::from_entries(scores).unwrap();

    KnnScorer::from_config(
        &config,
        &registry,
        Arc::new(builder.build()),
        Arc::new(store),
    )
    .unwrap()
}

fn bench_scoring(c: &mut Criterion) {
    let scorer = build_scorer(2_000);
    let text = generate_text(u64::MAX, 500);

    let mut group = c.benchmark_group("knn_score");
    for (topwords, topentries) in [(10, 10), (20, 20), (50, 100)] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{topwords}w_{topentries}e")),
            &(topwords, topentries),
            |b, &(tw, te)| b.iter(|| scorer.score(black_box(&text), tw, te)),
        );
    }
    group.finish();

    let cutoff = {
        let config = ScorerConfig {
            aggregation: Aggregation::cutoff(Aggregation::Generative, 0.5),
            ..ScorerConfig::default()
        };
        let registry = AnalyzerRegistry::new();
        let analyzer = registry.get(&config.index.analyzer).unwrap();
        let mut builder = MemoryIndex::builder(analyzer, config.index.clone());
        for i in 0..500 {
            builder.add(format!("Entry_{i}"), generate_text(i as u64, 300)).unwrap();
        }
        KnnScorer::from_config(
            &config,
            &registry,
            Arc::new(builder.build()),
            Arc::new(MemoryScoreStore::default()),
        )
        .unwrap()
    };
    c.bench_function("knn_score_cutoff", |b| {
        b.iter(|| cutoff.score(black_box(&text), 20, 20))
    });
}

fn bench_index_build(c: &mut Criterion) {
    let registry = AnalyzerRegistry::new();
    let config = ScorerConfig::default();
    let docs: Vec<String> = (0..500).map(|i| generate_text(i, 300)).collect();

    c.bench_function("memory_index_build_500", |b| {
        b.iter(|| {
            let analyzer = registry.get(&config.index.analyzer).unwrap();
            let mut builder = MemoryIndex::builder(analyzer, config.index.clone());
            for (i, doc) in docs.iter().enumerate() {
                builder.add(format!("Entry_{i}"), doc.as_str()).unwrap();
            }
            black_box(builder.build())
        })
    });
}

criterion_group!(benches, bench_scoring, bench_index_build);
criterion_main!(benches);
