use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod catalog;
mod config;
mod search;
mod sources;
mod table;

use catalog::PaperCatalog;
use config::Config;
use sources::PaperRecord;
use table::PaperTable;

#[derive(Parser, Debug)]
#[command(name = "research-scraper")]
#[command(version, about = "Search academic papers across arXiv, Semantic Scholar, and Google Scholar")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search all configured sources and print the merged, deduplicated results
    Search {
        /// Free-text search query
        query: String,

        /// Per-source result cap
        #[arg(long)]
        max_results: Option<u32>,

        /// Comma-separated subset of sources to query (arxiv, semantic_scholar, scholar)
        #[arg(long, value_delimiter = ',')]
        sources: Option<Vec<String>>,

        /// Export results as CSV; with no path a timestamped file lands in the export dir
        #[arg(long, num_args = 0..=1, default_missing_value = "")]
        export: Option<PathBuf>,

        /// Keep only papers whose title or abstract contains one of these keywords
        #[arg(long, value_delimiter = ',')]
        filter: Option<Vec<String>>,

        /// Print a readable per-paper summary instead of the compact listing
        #[arg(long)]
        summary: bool,
    },
    /// List known sources and their configuration status
    Sources,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();
    let cfg = Config::from_env();

    match cli.command {
        Commands::Search {
            query,
            max_results,
            sources,
            export,
            filter,
            summary,
        } => {
            let enabled = cfg.build_sources(sources.as_deref());
            let per_source_max = max_results.unwrap_or(cfg.max_results);
            let mut catalog =
                PaperCatalog::new(enabled, cfg.export_dir.clone(), per_source_max);

            catalog.search(&query).await;

            let shown: Vec<PaperRecord> = match &filter {
                Some(keywords) => catalog.filter(keywords).into_iter().cloned().collect(),
                None => catalog.papers().to_vec(),
            };

            if summary {
                println!("{}", catalog.summary(10));
            } else {
                let table = PaperTable::project(&shown);
                println!("{}", table.render(50));
            }

            if let Some(path) = export {
                let explicit = if path.as_os_str().is_empty() {
                    None
                } else {
                    Some(path)
                };
                match catalog.export_csv(explicit.as_deref()) {
                    Ok(written) => println!("Exported to {}", written.display()),
                    Err(e) => {
                        catalog.close().await;
                        anyhow::bail!("Export failed: {}", e);
                    }
                }
            }

            catalog.close().await;
        }
        Commands::Sources => {
            for status in cfg.source_status() {
                let state = if status.enabled { "enabled" } else { "disabled" };
                println!("{:<18} {:<9} {}", status.name, state, status.note);
            }
        }
    }

    Ok(())
}
