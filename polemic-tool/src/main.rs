//! Polemic Tool - CLI for scoring text controversy
//!
//! # Commands
//!
//! - `score` - Score one text and print a JSON reply
//! - `batch` - Score a JSONL collection over a grid of parameters
//! - `inspect` - Show the weighted query built from a text
//!
//! # Examples
//!
//! ## Score a text from stdin
//! ```bash
//! echo "abortion rights protest" | polemic-tool score -e entries.jsonl -s scores.tsv
//! ```
//!
//! ## Evaluate a labeled collection
//! ```bash
//! polemic-tool batch -e entries.jsonl -s scores.tsv -i docs.jsonl -o results \
//!     --topwords 10,20 --topentries 10,15,20
//! ```

mod batch_ops;

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use polemic_core::{
    Aggregation, AnalyzerRegistry, KnnScorer, MemoryIndex, MemoryScoreStore, QueryConstructor,
    ScoreInfo, ScorerConfig, TopWordsQuery,
};

#[derive(Parser)]
#[command(name = "polemic-tool")]
#[command(version, about = "KNN controversy scoring against Wikipedia entries")]
#[command(after_help = "Use 'polemic-tool <command> --help' for details.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Collaborator sources shared by the scoring commands
#[derive(clap::Args)]
struct Sources {
    /// JSONL file of entries ({"title", "text", "key"?})
    #[arg(short, long)]
    entries: PathBuf,

    /// Controversy scores (title<TAB>score, or .jsonl of {"title", "score"})
    #[arg(short, long)]
    scores: PathBuf,

    /// Scorer configuration (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Replace the configured aggregation with a cutoff at this value
    #[arg(long)]
    cutoff: Option<f64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a single text
    Score {
        #[command(flatten)]
        sources: Sources,

        /// Number of query terms (default: from config)
        #[arg(short = 'w', long)]
        topwords: Option<usize>,

        /// Number of neighbor entries (default: from config)
        #[arg(short = 'n', long)]
        topentries: Option<usize>,

        /// Text to score
        #[arg(short, long, conflicts_with = "file")]
        text: Option<String>,

        /// Read the text from a file (omit both --text and --file to use stdin)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Include per-phase diagnostics in the reply
        #[arg(long, default_value = "false")]
        debug: bool,
    },

    /// Score every document of a JSONL file for each parameter combination
    Batch {
        #[command(flatten)]
        sources: Sources,

        /// JSONL documents ({"id", "text", "label"?})
        #[arg(short, long)]
        input: PathBuf,

        /// Directory receiving one result file per combination
        #[arg(short, long)]
        output_dir: PathBuf,

        /// Query sizes to evaluate
        #[arg(short = 'w', long, value_delimiter = ',', default_value = "10")]
        topwords: Vec<usize>,

        /// Neighbor counts to evaluate
        #[arg(short = 'n', long, value_delimiter = ',', default_value = "10")]
        topentries: Vec<usize>,

        /// Scoring threads (default: number of CPUs)
        #[arg(short = 'j', long)]
        threads: Option<usize>,
    },

    /// Print the weighted query constructed from a text
    Inspect {
        /// Scorer configuration (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of query terms (default: from config)
        #[arg(short = 'w', long)]
        topwords: Option<usize>,

        /// Text to inspect (stdin if omitted)
        #[arg(short, long)]
        text: Option<String>,
    },
}

/// Reply printed by `score`
#[derive(Serialize)]
struct ScoreReply {
    success: bool,
    controversy: f64,
    errmsg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    info: Option<ScoreInfo>,
}

fn load_config(path: Option<&Path>, cutoff: Option<f64>) -> Result<ScorerConfig> {
    let mut config = match path {
        Some(path) => ScorerConfig::load(path)
            .with_context(|| format!("Failed to load config: {:?}", path))?,
        None => ScorerConfig::default(),
    };
    if let Some(cutoff) = cutoff {
        let inner = match config.aggregation {
            Aggregation::Cutoff { inner, .. } => *inner,
            other => other,
        };
        config.aggregation = Aggregation::cutoff(inner, cutoff);
        config.validate()?;
    }
    Ok(config)
}

/// Open the entry index and score store once and wire up a scorer
fn open_scorer(sources: &Sources) -> Result<(KnnScorer, ScorerConfig)> {
    let config = load_config(sources.config.as_deref(), sources.cutoff)?;
    let registry = AnalyzerRegistry::new();
    let analyzer = registry
        .get(&config.index.analyzer)
        .with_context(|| format!("Unknown analyzer: {}", config.index.analyzer))?;

    let index = MemoryIndex::open(&sources.entries, analyzer, config.index.clone())
        .with_context(|| format!("Failed to load entries: {:?}", sources.entries))?;
    info!(
        "Loaded {} entries ({} terms)",
        index.num_entries(),
        index.num_terms()
    );

    let store = MemoryScoreStore::open(&sources.scores)
        .with_context(|| format!("Failed to load scores: {:?}", sources.scores))?;
    info!("Loaded {} controversy scores", store.len());

    let scorer = KnnScorer::from_config(&config, &registry, Arc::new(index), Arc::new(store))?;
    Ok((scorer, config))
}

fn read_text(text: Option<String>, file: Option<&Path>) -> Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }
    if let Some(path) = file {
        return fs::read_to_string(path)
            .with_context(|| format!("Failed to read text file: {:?}", path));
    }
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .context("Failed to read text from stdin")?;
    Ok(buf)
}

fn run_score(
    sources: Sources,
    topwords: Option<usize>,
    topentries: Option<usize>,
    text: Option<String>,
    file: Option<PathBuf>,
    debug: bool,
) -> Result<()> {
    let (scorer, config) = open_scorer(&sources)?;
    let topwords = topwords.unwrap_or(config.topwords);
    let topentries = topentries.unwrap_or(config.topentries);

    let reply = match read_text(text, file.as_deref()) {
        Ok(text) => {
            let (controversy, score_info) = scorer.score_with_info(&text, topwords, topentries);
            info!(
                "Scored {} bytes in {:.4}s",
                text.len(),
                score_info.timings.total()
            );
            ScoreReply {
                success: true,
                controversy,
                errmsg: String::new(),
                info: debug.then_some(score_info),
            }
        }
        Err(e) => {
            tracing::warn!("{:#}", e);
            ScoreReply {
                success: false,
                controversy: 0.0,
                errmsg: format!("{:#}", e),
                info: None,
            }
        }
    };

    println!("{}", serde_json::to_string_pretty(&reply)?);
    scorer.close()?;
    Ok(())
}

fn run_inspect(
    config: Option<PathBuf>,
    topwords: Option<usize>,
    text: Option<String>,
) -> Result<()> {
    let config = load_config(config.as_deref(), None)?;
    let registry = AnalyzerRegistry::new();
    let analyzer = registry
        .get(&config.index.analyzer)
        .with_context(|| format!("Unknown analyzer: {}", config.index.analyzer))?;
    let text = read_text(text, None)?;

    let constructor = TopWordsQuery::new(analyzer, config.index.field.clone());
    let query = constructor.construct_query(&text, topwords.unwrap_or(config.topwords), None);

    println!("field: {}", query.field());
    for (rank, (term, weight)) in query.iter().enumerate() {
        println!("{:>4}  {:<24} {:.6}", rank + 1, term, weight);
    }
    let mass: f64 = query.iter().map(|(_, w)| w).sum();
    println!("{} terms, total weight {:.6}", query.len(), mass);
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("polemic_tool=info".parse()?)
                .add_directive("polemic_core=info".parse()?),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Score {
            sources,
            topwords,
            topentries,
            text,
            file,
            debug,
        } => {
            run_score(sources, topwords, topentries, text, file, debug)?;
        }
        Commands::Batch {
            sources,
            input,
            output_dir,
            topwords,
            topentries,
            threads,
        } => {
            let (scorer, _) = open_scorer(&sources)?;
            batch_ops::run_batch(
                &scorer,
                &input,
                &output_dir,
                &topwords,
                &topentries,
                threads,
            )
            .context("Batch scoring failed")?;
            scorer.close()?;
        }
        Commands::Inspect {
            config,
            topwords,
            text,
        } => {
            run_inspect(config, topwords, text)?;
        }
    }

    Ok(())
}
