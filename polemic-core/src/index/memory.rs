//! In-memory entry index

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::Deserialize;

use super::collector::TopKCollector;
use crate::config::IndexSettings;
use crate::knn::ql::term_score;
use crate::knn::{EntryIndex, IndexHit, WeightedQuery, normalize_entry_key};
use crate::tokenizer::Analyzer;
use crate::{DocId, Error, Result, TermFreq};

/// One Wikipedia entry as read from a JSONL dump
#[derive(Debug, Clone, Deserialize)]
pub struct EntryRecord {
    /// Lookup key; derived from the title when absent
    #[serde(default)]
    pub key: Option<String>,
    pub title: String,
    #[serde(default)]
    pub text: String,
}

fn next_doc_id(num_entries: usize) -> Result<DocId> {
    DocId::try_from(num_entries)
        .map_err(|_| Error::Capacity(format!("index full at {num_entries}")))
}

/// Accumulates entries and freezes them into a [`MemoryIndex`]
pub struct MemoryIndexBuilder {
    analyzer: Arc<dyn Analyzer>,
    settings: IndexSettings,
    keys: Vec<String>,
    titles: Vec<String>,
    doc_lens: Vec<u64>,
    postings: FxHashMap<String, Vec<(DocId, TermFreq)>>,
    collection_freqs: FxHashMap<String, u64>,
    total_len: u64,
}

impl MemoryIndexBuilder {
    pub fn new(analyzer: Arc<dyn Analyzer>, settings: IndexSettings) -> Self {
        Self {
            analyzer,
            settings,
            keys: Vec::new(),
            titles: Vec::new(),
            doc_lens: Vec::new(),
            postings: FxHashMap::default(),
            collection_freqs: FxHashMap::default(),
            total_len: 0,
        }
    }

    /// Analyze and append one entry; returns its doc id
    pub fn add_entry(&mut self, record: EntryRecord) -> Result<DocId> {
        let doc_id = next_doc_id(self.keys.len())?;
        let key = match &record.key {
            Some(key) => normalize_entry_key(key),
            None => normalize_entry_key(&record.title),
        };

        let mut doc_len = 0u64;
        for (term, tf) in self.analyzer.analyze(&record.text) {
            doc_len += u64::from(tf);
            *self.collection_freqs.entry(term.clone()).or_insert(0) += u64::from(tf);
            self.postings.entry(term).or_default().push((doc_id, tf));
        }
        self.total_len += doc_len;

        self.keys.push(key);
        self.titles.push(record.title);
        self.doc_lens.push(doc_len);
        Ok(doc_id)
    }

    pub fn add(&mut self, title: impl Into<String>, text: impl Into<String>) -> Result<DocId> {
        self.add_entry(EntryRecord {
            key: None,
            title: title.into(),
            text: text.into(),
        })
    }

    pub fn num_entries(&self) -> usize {
        self.keys.len()
    }

    pub fn build(self) -> MemoryIndex {
        log::info!(
            "built entry index: {} entries, {} terms, {} tokens, mu={}",
            self.keys.len(),
            self.postings.len(),
            self.total_len,
            self.settings.mu
        );
        MemoryIndex {
            settings: self.settings,
            keys: self.keys,
            titles: self.titles,
            doc_lens: self.doc_lens,
            postings: self.postings,
            collection_freqs: self.collection_freqs,
            total_len: self.total_len,
        }
    }
}

/// Immutable inverted index over entries, scored with Dirichlet QL.
///
/// Engine scores are the partial QL scores of [`crate::knn::ql`]; only
/// entries containing at least one query term are candidates. Read-only after
/// [`MemoryIndexBuilder::build`], so it can be shared across threads freely.
pub struct MemoryIndex {
    settings: IndexSettings,
    keys: Vec<String>,
    titles: Vec<String>,
    doc_lens: Vec<u64>,
    postings: FxHashMap<String, Vec<(DocId, TermFreq)>>,
    collection_freqs: FxHashMap<String, u64>,
    total_len: u64,
}

impl MemoryIndex {
    pub fn builder(analyzer: Arc<dyn Analyzer>, settings: IndexSettings) -> MemoryIndexBuilder {
        MemoryIndexBuilder::new(analyzer, settings)
    }

    /// Build from JSONL, one [`EntryRecord`] per line; blank lines are skipped
    pub fn from_jsonl<R: BufRead>(
        reader: R,
        analyzer: Arc<dyn Analyzer>,
        settings: IndexSettings,
    ) -> Result<Self> {
        let mut builder = MemoryIndexBuilder::new(analyzer, settings);
        for (ix, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: EntryRecord =
                serde_json::from_str(&line).map_err(|e| Error::parse(ix + 1, e.to_string()))?;
            builder.add_entry(record)?;
        }
        Ok(builder.build())
    }

    pub fn open(
        path: impl AsRef<Path>,
        analyzer: Arc<dyn Analyzer>,
        settings: IndexSettings,
    ) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        log::info!("loading entries from {}", path.as_ref().display());
        Self::from_jsonl(BufReader::new(file), analyzer, settings)
    }

    pub fn num_entries(&self) -> usize {
        self.keys.len()
    }

    pub fn num_terms(&self) -> usize {
        self.postings.len()
    }

    pub fn total_len(&self) -> u64 {
        self.total_len
    }

    pub fn settings(&self) -> &IndexSettings {
        &self.settings
    }

    fn check_field(&self, field: &str) -> Result<()> {
        if field == self.settings.field {
            Ok(())
        } else {
            Err(Error::FieldNotFound(field.to_string()))
        }
    }

    fn collection_probability(&self, term: &str) -> f64 {
        if self.total_len == 0 {
            return 0.0;
        }
        let ctf = self.collection_freqs.get(term).copied().unwrap_or(0);
        ctf as f64 / self.total_len as f64
    }
}

impl EntryIndex for MemoryIndex {
    fn search(&self, query: &WeightedQuery, limit: usize) -> Result<Vec<IndexHit>> {
        self.check_field(query.field())?;
        if query.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }
        if let Some((term, weight)) = query.iter().find(|(_, w)| !w.is_finite()) {
            return Err(Error::Query(format!("weight of {term:?} is {weight}")));
        }

        let mu = self.settings.mu;
        let mut scores: BTreeMap<DocId, f64> = BTreeMap::new();
        for (term, weight) in query.iter() {
            let Some(postings) = self.postings.get(term) else {
                continue;
            };
            let p_c = self.collection_probability(term);
            for &(doc_id, tf) in postings {
                let doc_len = self.doc_lens[doc_id as usize] as f64;
                *scores.entry(doc_id).or_insert(0.0) +=
                    term_score(weight, f64::from(tf), doc_len, p_c, mu);
            }
        }

        let mut collector = TopKCollector::new(limit.min(scores.len()));
        for (doc_id, score) in scores {
            collector.collect(doc_id, score);
        }
        log::trace!(
            "{} candidate entries for {} query terms",
            collector.total_seen(),
            query.len()
        );

        Ok(collector
            .into_sorted_results()
            .into_iter()
            .map(|doc| IndexHit {
                key: self.keys[doc.doc_id as usize].clone(),
                title: self.titles[doc.doc_id as usize].clone(),
                score: doc.score,
            })
            .collect())
    }

    fn corpus_term_probability(&self, field: &str, term: &str) -> Result<f64> {
        self.check_field(field)?;
        Ok(self.collection_probability(term))
    }
}

impl std::fmt::Debug for MemoryIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryIndex")
            .field("settings", &self.settings)
            .field("entries", &self.keys.len())
            .field("terms", &self.postings.len())
            .field("total_len", &self.total_len)
            .finish()
    }
}
