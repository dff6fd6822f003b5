use std::sync::Arc;
use std::thread;

use super::*;

const TEXTS: &[&str] = &[
    "abortion protest debate",
    "tennis racket serve",
    "chess opening endgame",
    "gun control law",
    "",
    "rights rights law debate tennis",
];

#[test]
fn test_concurrent_scoring_matches_sequential() {
    let scorer = Arc::new(build_scorer(Aggregation::Generative));
    let expected: Vec<u64> = TEXTS
        .iter()
        .map(|text| scorer.score(text, 20, 20).to_bits())
        .collect();

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let scorer = Arc::clone(&scorer);
            thread::spawn(move || {
                let mut results = Vec::new();
                for round in 0..25 {
                    let ix = (worker + round) % TEXTS.len();
                    let (score, info) = scorer.score_with_info(TEXTS[ix], 20, 20);
                    results.push((ix, score.to_bits(), info.entries_ql.len()));
                }
                results
            })
        })
        .collect();

    for handle in handles {
        for (ix, bits, neighbors) in handle.join().unwrap() {
            assert_eq!(bits, expected[ix], "text {ix} scored differently");
            assert!(neighbors <= 20);
        }
    }
}

#[test]
fn test_scorer_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<KnnScorer>();
    assert_send_sync::<MemoryIndex>();
    assert_send_sync::<MemoryScoreStore>();
}
