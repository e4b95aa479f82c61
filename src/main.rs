//! Codemap CLI entry point

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "codemap")]
#[command(about = "Code knowledge graph with hybrid retrieval", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Repository root path (defaults to current directory)
    #[arg(short, long, default_value = ".")]
    root: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Build or refresh the knowledge graph
    Index {
        /// Rebuild from scratch even when the graph looks current
        #[arg(short, long)]
        force: bool,
    },
    /// Search the graph for relevant symbols
    Search {
        query: String,

        /// hybrid, vector or graph
        #[arg(short, long, default_value = "hybrid")]
        mode: String,

        #[arg(short, long, default_value = "10")]
        limit: usize,

        /// Attach callers, callees and a source snippet to each hit
        #[arg(short, long)]
        expand: bool,
    },
    /// Shortest path between two symbols
    Path {
        from: String,
        to: String,

        #[arg(short, long, default_value = "10")]
        max_depth: usize,
    },
    /// Functions that (transitively) call a symbol
    Callers {
        name: String,

        #[arg(short, long, default_value = "1")]
        depth: usize,
    },
    /// Functions a symbol (transitively) calls
    Callees {
        name: String,

        #[arg(short, long, default_value = "1")]
        depth: usize,
    },
    /// Ask the configured LLM to explain a symbol
    Explain {
        name: String,

        /// Skip the response cache
        #[arg(long)]
        no_cache: bool,
    },
    /// Ask the configured LLM to summarize a module (directory)
    Summarize {
        module: String,
    },
    /// Compute embeddings for graph symbols
    Embed {
        /// Re-embed nodes that already have vectors
        #[arg(short, long)]
        force: bool,

        #[arg(short, long, default_value = "10")]
        batch_size: usize,

        /// Include a source snippet in the embedded text
        #[arg(long)]
        with_source: bool,
    },
    /// Show graph statistics
    Stats,
    /// Remove the .codemap directory
    Clear,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!(
            "codemap={log_level},codemap_core={log_level},codemap_scanner={log_level},codemap_ai={log_level},codemap_vector={log_level}"
        )))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let result = match cli.command {
        Commands::Index { force } => commands::index(&cli.root, force),
        Commands::Search {
            query,
            mode,
            limit,
            expand,
        } => commands::search(&cli.root, &query, &mode, limit, expand).await,
        Commands::Path {
            from,
            to,
            max_depth,
        } => commands::path(&cli.root, &from, &to, max_depth),
        Commands::Callers { name, depth } => commands::neighbors(&cli.root, &name, depth, true),
        Commands::Callees { name, depth } => commands::neighbors(&cli.root, &name, depth, false),
        Commands::Explain { name, no_cache } => {
            commands::explain(&cli.root, &name, no_cache).await
        }
        Commands::Summarize { module } => commands::summarize(&cli.root, &module).await,
        Commands::Embed {
            force,
            batch_size,
            with_source,
        } => commands::embed(&cli.root, force, batch_size, with_source).await,
        Commands::Stats => commands::stats(&cli.root),
        Commands::Clear => commands::clear(&cli.root),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
    Ok(())
}
