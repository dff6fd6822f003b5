//! In-memory score store

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::knn::{ScoreStore, normalize_entry_key};
use crate::{Error, Result};

#[derive(Debug, Deserialize)]
struct ScoreRecord {
    title: String,
    score: f64,
}

/// Annotated controversy scores keyed by normalized entry title.
///
/// Scores must lie in `[0, 1]`. When a title appears twice the later score
/// wins. The mean is fixed at load time; an empty store has mean 0.
#[derive(Debug, Clone, Default)]
pub struct MemoryScoreStore {
    scores: FxHashMap<String, f64>,
    mean: f64,
}

impl MemoryScoreStore {
    pub fn from_entries<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let mut scores = FxHashMap::default();
        for (ix, (title, score)) in entries.into_iter().enumerate() {
            check_score(ix + 1, title.as_ref(), score)?;
            scores.insert(normalize_entry_key(title.as_ref()), score);
        }
        Ok(Self::with_scores(scores))
    }

    fn with_scores(scores: FxHashMap<String, f64>) -> Self {
        let mean = if scores.is_empty() {
            0.0
        } else {
            scores.values().sum::<f64>() / scores.len() as f64
        };
        log::info!(
            "loaded {} annotated entries, mean score {:.4}",
            scores.len(),
            mean
        );
        Self { scores, mean }
    }

    /// Parse `title<TAB>score` lines; blank lines and `#` comments are skipped
    pub fn from_tsv<R: BufRead>(reader: R) -> Result<Self> {
        let mut scores = FxHashMap::default();
        for (ix, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = ix + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let Some((title, score)) = trimmed.rsplit_once('\t') else {
                return Err(Error::parse(line_no, "expected title<TAB>score"));
            };
            let score: f64 = score
                .trim()
                .parse()
                .map_err(|e| Error::parse(line_no, format!("bad score {score:?}: {e}")))?;
            check_score(line_no, title, score)?;
            scores.insert(normalize_entry_key(title), score);
        }
        Ok(Self::with_scores(scores))
    }

    /// Parse one `{"title": ..., "score": ...}` object per line
    pub fn from_jsonl<R: BufRead>(reader: R) -> Result<Self> {
        let mut scores = FxHashMap::default();
        for (ix, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = ix + 1;
            if line.trim().is_empty() {
                continue;
            }
            let record: ScoreRecord =
                serde_json::from_str(&line).map_err(|e| Error::parse(line_no, e.to_string()))?;
            check_score(line_no, &record.title, record.score)?;
            scores.insert(normalize_entry_key(&record.title), record.score);
        }
        Ok(Self::with_scores(scores))
    }

    /// Load from a file; `.jsonl`/`.json` are read as JSONL, anything else as TSV
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        log::info!("loading controversy scores from {}", path.display());
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("jsonl") | Some("json") => Self::from_jsonl(reader),
            _ => Self::from_tsv(reader),
        }
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

/// `line` is the 1-based source line, or the position for in-memory entries
fn check_score(line: usize, title: &str, score: f64) -> Result<()> {
    if score.is_finite() && (0.0..=1.0).contains(&score) {
        Ok(())
    } else {
        Err(Error::parse(
            line,
            format!("score of {title:?} must be in [0, 1], got {score}"),
        ))
    }
}

impl ScoreStore for MemoryScoreStore {
    fn lookup(&self, entry: &str) -> Result<Option<f64>> {
        Ok(self.scores.get(entry).copied())
    }

    fn mean_score(&self) -> Result<f64> {
        Ok(self.mean)
    }
}
