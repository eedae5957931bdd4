use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use termx_embed::{build_embedder, EmbedderConfig, ProviderKind};
use termx_index::{export, ingest_json, retrieve};
use termx_storage::TermStore;

/// A local terminology index for imaging study/series metadata
#[derive(Parser, Debug)]
#[command(name = "termx")]
#[command(about = "A local terminology index for imaging metadata", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log level
    #[arg(long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Args, Debug)]
struct EmbedderArgs {
    /// Embedding provider: hash or ollama
    #[arg(long, default_value = "hash")]
    provider: ProviderKind,

    /// Vector dimensionality for the hash provider
    #[arg(long, default_value_t = termx_embed::DEFAULT_DIM)]
    dim: usize,

    /// Model name for the ollama provider
    #[arg(long)]
    model: Option<String>,

    /// Base URL for the ollama provider
    #[arg(long)]
    base_url: Option<String>,

    /// Remote request timeout in seconds
    #[arg(long, default_value_t = termx_embed::DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,
}

impl EmbedderArgs {
    fn config(&self) -> EmbedderConfig {
        EmbedderConfig {
            provider: self.provider,
            dim: self.dim,
            model: self.model.clone(),
            base_url: self.base_url.clone(),
            timeout_secs: self.timeout_secs,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ingest raw observations from a JSON file
    Ingest {
        /// Path to the index file
        #[arg(long)]
        index: PathBuf,

        /// JSON file with an array of raw attribute dictionaries
        #[arg(long)]
        input: PathBuf,

        #[command(flatten)]
        embedder: EmbedderArgs,
    },

    /// Retrieve the stored terms nearest to a query
    Retrieve {
        /// Path to the index file
        #[arg(long)]
        index: PathBuf,

        /// Query text
        #[arg(long)]
        query: String,

        /// Maximum number of results
        #[arg(long, default_value_t = 10)]
        top_k: usize,

        /// Minimum cosine similarity to report
        #[arg(long, default_value_t = 0.2)]
        min_score: f32,

        #[command(flatten)]
        embedder: EmbedderArgs,
    },

    /// Export frequent terms to a lexicon YAML for review
    ExportLexicon {
        /// Path to the index file
        #[arg(long)]
        index: PathBuf,

        /// Output YAML path
        #[arg(long)]
        output: PathBuf,

        /// Minimum observation count for a term to qualify
        #[arg(long, default_value_t = 2)]
        min_count: u64,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Command::Ingest {
            index,
            input,
            embedder,
        } => {
            let store = TermStore::open(&index)?;
            let provider = build_embedder(&embedder.config())?;
            let report = ingest_json(&store, provider.as_ref(), &input)?;
            info!(
                accepted = report.accepted,
                phi_rejected = report.phi_rejected,
                skipped = report.skipped,
                provider_failures = report.provider_failures,
                "ingestion complete"
            );
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Command::Retrieve {
            index,
            query,
            top_k,
            min_score,
            embedder,
        } => {
            let store = TermStore::open(&index)?;
            let provider = build_embedder(&embedder.config())?;
            let results = retrieve(&store, provider.as_ref(), &query, top_k, min_score)?;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }

        Command::ExportLexicon {
            index,
            output,
            min_count,
        } => {
            let store = TermStore::open(&index)?;
            let lexicon = export(&store, min_count)?;
            std::fs::write(&output, serde_yaml::to_string(&lexicon)?)?;
            info!(
                synonyms = lexicon.synonyms.len(),
                ngrams = lexicon.ngrams.len(),
                clusters = lexicon.clusters.len(),
                output = %output.display(),
                "lexicon exported"
            );
        }
    }

    Ok(())
}
