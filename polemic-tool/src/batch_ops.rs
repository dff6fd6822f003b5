//! Batch scoring over a grid of (topwords, topentries) combinations

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Deserialize;
use tracing::info;

use polemic_core::KnnScorer;

/// One input document; `id` and `label` are echoed into the output as-is
#[derive(Deserialize)]
struct BatchDocument {
    id: serde_json::Value,
    text: String,
    #[serde(default)]
    label: Option<serde_json::Value>,
}

fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

fn load_documents(path: &Path) -> Result<Vec<BatchDocument>> {
    let file = File::open(path).with_context(|| format!("Failed to open input: {:?}", path))?;
    let mut docs = Vec::new();
    for (ix, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let doc: BatchDocument = serde_json::from_str(&line)
            .with_context(|| format!("Invalid document at line {}", ix + 1))?;
        docs.push(doc);
    }
    Ok(docs)
}

pub fn run_batch(
    scorer: &KnnScorer,
    input: &Path,
    output_dir: &Path,
    topwords: &[usize],
    topentries: &[usize],
    threads: Option<usize>,
) -> Result<()> {
    let docs = load_documents(input)?;
    info!("Loaded {} documents from {:?}", docs.len(), input);

    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", output_dir))?;

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(threads) = threads {
        builder = builder.num_threads(threads);
    }
    let pool = builder.build().context("Failed to build thread pool")?;
    info!("Scoring with {} threads", pool.current_num_threads());

    for &tw in topwords {
        for &te in topentries {
            let start = Instant::now();
            let results: Vec<(f64, f64)> = pool.install(|| {
                docs.par_iter()
                    .map(|doc| {
                        let doc_start = Instant::now();
                        let score = scorer.score(&doc.text, tw, te);
                        (score, doc_start.elapsed().as_secs_f64())
                    })
                    .collect()
            });

            let path = output_dir.join(format!("{}_{}", tw, te));
            let mut writer = BufWriter::new(
                File::create(&path).with_context(|| format!("Failed to create {:?}", path))?,
            );
            for (doc, (score, _)) in docs.iter().zip(&results) {
                let label = doc
                    .label
                    .as_ref()
                    .map_or_else(|| "-".to_string(), display_value);
                writeln!(writer, "{}\t{}\t{}", display_value(&doc.id), label, score)?;
            }
            writer.flush()?;

            let per_doc = if results.is_empty() {
                0.0
            } else {
                results.iter().map(|(_, secs)| secs).sum::<f64>() / results.len() as f64
            };
            info!(
                "topwords={} topentries={}: {} documents in {:.2}s, {:.6}s per document -> {:?}",
                tw,
                te,
                docs.len(),
                start.elapsed().as_secs_f64(),
                per_doc,
                path
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&serde_json::json!("doc-1")), "doc-1");
        assert_eq!(display_value(&serde_json::json!(42)), "42");
        assert_eq!(display_value(&serde_json::Value::Null), "-");
    }

    #[test]
    fn test_load_documents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docs.jsonl");
        let data = concat!(
            "{\"id\": 1, \"text\": \"a b\", \"label\": \"yes\"}\n",
            "\n",
            "{\"id\": \"x\", \"text\": \"c\"}\n",
        );
        fs::write(&path, data).unwrap();
        let docs = load_documents(&path).unwrap();
        assert_eq!(docs.len(), 2);
        assert!(docs[1].label.is_none());
        assert!(load_documents(&dir.path().join("missing.jsonl")).is_err());
    }
}
