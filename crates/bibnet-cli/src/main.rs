//! Bibnet CLI - Command-line interface for Bibnet
//!
//! This is the main entry point for users interacting with Bibnet.
//! It provides commands for importing a corpus and running citation and
//! collaboration analyses over it.

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "bibnet")]
#[command(author = "Bibnet Contributors")]
#[command(version)]
#[command(about = "Citation and collaboration network analytics", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output as JSON instead of formatted text
    #[arg(long, global = true)]
    json: bool,

    /// Analyze a corpus JSON file directly instead of the store
    #[arg(long, global = true)]
    corpus: Option<PathBuf>,

    /// Corpus store directory
    #[arg(long, global = true, default_value = ".bibnet/store")]
    store: PathBuf,

    /// Analysis config file (defaults to .bibnet/config.json, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Run expensive metrics regardless of graph size
    #[arg(long, global = true)]
    allow_expensive: bool,

    /// Wall-clock limit per analysis, in milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum TimelineKind {
    Citations,
    Collaboration,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum GraphKind {
    Citation,
    Collaboration,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize Bibnet in the current directory
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Import a corpus JSON file into the store
    Import {
        /// File of the form {"documents": [...], "citations": [...]}
        corpus_file: PathBuf,

        /// Clear the store before importing
        #[arg(long)]
        replace: bool,
    },

    /// Show corpus statistics
    Stats,

    /// Citation network overview
    Citations {
        /// Ranking length (overrides top_k)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Author centrality overview
    Authors {
        /// Ranking length (overrides author_top_k)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Research communities in the co-authorship network
    Communities,

    /// Clusters of heavily interlinked papers
    Clusters,

    /// Activity per publication year
    Timeline {
        #[arg(value_enum)]
        kind: TimelineKind,
    },

    /// Profile of one author (exact name or case-insensitive substring)
    Profile { name: String },

    /// Papers cited most often inside the corpus
    MostCited {
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Papers making the most citations
    MostCiting {
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Authors with the most unique collaborators
    MostCollaborative {
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Author pairs with the most shared papers
    Strongest {
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Citation and author overviews side by side
    Report,

    /// Export a graph to JSON
    Export {
        #[arg(value_enum)]
        kind: GraphKind,

        /// Output file
        #[arg(short, long, default_value = "bibnet-graph.json")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let result = run(cli).await;

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> commands::Result<()> {
    if let Commands::Init { path } = &cli.command {
        return commands::init(path);
    }

    let mut config = commands::load_config(cli.config.as_deref())?;
    if cli.allow_expensive {
        config.allow_expensive = true;
    }
    if cli.timeout_ms.is_some() {
        config.timeout_ms = cli.timeout_ms;
    }

    let ctx = commands::Context {
        json: cli.json,
        corpus: cli.corpus,
        store: cli.store,
        config,
    };

    match cli.command {
        Commands::Init { .. } => Ok(()),
        Commands::Import {
            corpus_file,
            replace,
        } => commands::import(&ctx, &corpus_file, replace),
        Commands::Stats => commands::stats(&ctx),
        Commands::Citations { limit } => commands::citations(&ctx, limit),
        Commands::Authors { limit } => commands::authors(&ctx, limit),
        Commands::Communities => commands::communities(&ctx),
        Commands::Clusters => commands::clusters(&ctx),
        Commands::Timeline { kind } => commands::timeline(&ctx, kind),
        Commands::Profile { name } => commands::profile(&ctx, &name),
        Commands::MostCited { limit } => commands::most_cited(&ctx, limit),
        Commands::MostCiting { limit } => commands::most_citing(&ctx, limit),
        Commands::MostCollaborative { limit } => commands::most_collaborative(&ctx, limit),
        Commands::Strongest { limit } => commands::strongest(&ctx, limit),
        Commands::Report => commands::report(&ctx).await,
        Commands::Export { kind, output } => commands::export(&ctx, kind, &output),
    }
}
