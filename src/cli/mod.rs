//! CLI commands implementation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use console::style;

use crate::config::Config;
use crate::models::{EditionStatus, JobStatusDoc};
use crate::repository::{FallbackStore, RestStore, SqliteStore, Store};
use crate::services::{EditionService, ExtractionPipeline};

#[derive(Parser)]
#[command(name = "hemeroteca")]
#[command(about = "Newspaper PDF digitization pipeline")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Import a local PDF as a new edition
    Import {
        /// Path to the edition PDF
        file: PathBuf,
        /// Run extraction immediately after importing
        #[arg(short, long)]
        process: bool,
    },

    /// Run the extraction pipeline for an imported edition
    Process {
        /// Edition ID to process
        edition_id: i64,
    },

    /// Show the latest extraction job for an edition as JSON
    Status {
        /// Edition ID to inspect
        edition_id: i64,
    },

    /// Show corpus totals
    Stats,
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env();

    match cli.command {
        Commands::Import { file, process } => cmd_import(&config, &file, process).await,
        Commands::Process { edition_id } => cmd_process(&config, edition_id).await,
        Commands::Status { edition_id } => cmd_status(&config, edition_id).await,
        Commands::Stats => cmd_stats(&config).await,
    }
}

/// Local SQLite as primary, PostgREST as fallback when configured.
fn build_store(config: &Config) -> anyhow::Result<Arc<dyn Store>> {
    let sqlite: Arc<dyn Store> = Arc::new(SqliteStore::new(&config.database_path)?);
    let rest: Option<Arc<dyn Store>> = match (&config.supabase_url, &config.supabase_service_key)
    {
        (Some(url), Some(key)) => Some(Arc::new(RestStore::new(url, key))),
        _ => None,
    };
    Ok(Arc::new(FallbackStore::new(sqlite, rest)))
}

async fn cmd_import(config: &Config, file: &Path, process: bool) -> anyhow::Result<()> {
    let store = build_store(config)?;
    let service = EditionService::new(store.clone(), config.clone());

    let outcome = service.import_local_file(file).await?;
    if outcome.already_imported {
        println!(
            "{} Already imported as edition #{} ({})",
            style("!").yellow(),
            outcome.edition.id,
            outcome.edition.filename
        );
    } else {
        println!(
            "{} Imported edition #{} ({}, {})",
            style("✓").green(),
            outcome.edition.id,
            outcome.edition.filename,
            outcome.edition.publication_date
        );
    }

    if process {
        run_pipeline(store, config, outcome.edition.id).await?;
    }
    Ok(())
}

async fn cmd_process(config: &Config, edition_id: i64) -> anyhow::Result<()> {
    let store = build_store(config)?;
    run_pipeline(store, config, edition_id).await
}

async fn run_pipeline(
    store: Arc<dyn Store>,
    config: &Config,
    edition_id: i64,
) -> anyhow::Result<()> {
    if !config.ai_available() {
        println!(
            "{} ANTHROPIC_API_KEY not set, using heuristic segmentation",
            style("!").yellow()
        );
    }

    let pipeline = ExtractionPipeline::new(store, config.clone());
    let summary = pipeline.run(edition_id).await?;

    println!(
        "{} Extraction completed ({} mode)",
        style("✓").green(),
        summary.extraction_mode
    );
    println!("{:<20} {}", "Pages:", summary.pages_extracted);
    println!("{:<20} {}", "Articles found:", summary.articles_found);
    println!("{:<20} {}", "Articles saved:", summary.articles_saved);
    if !summary.errors.is_empty() {
        println!(
            "{:<20} {}",
            style("Errors:").yellow(),
            summary.errors.len()
        );
        for error in &summary.errors {
            match error.page {
                Some(page) => println!("  page {}: {}", page, error.error),
                None => println!("  {}", error.error),
            }
        }
    }
    Ok(())
}

async fn cmd_status(config: &Config, edition_id: i64) -> anyhow::Result<()> {
    let store = build_store(config)?;
    let edition = store.get_edition(edition_id).await?;

    println!(
        "Edition #{} ({}) is {}",
        edition.id,
        edition.filename,
        style(edition.status.as_str()).bold()
    );

    match store.latest_job_for_edition(edition_id).await? {
        Some(job) => {
            let doc = JobStatusDoc::from(&job);
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
        None => println!("{} No extraction job recorded yet", style("!").yellow()),
    }
    Ok(())
}

async fn cmd_stats(config: &Config) -> anyhow::Result<()> {
    let store = build_store(config)?;

    println!("\n{}", style("Corpus Status").bold());
    println!("{}", "-".repeat(40));
    println!("{:<20} {}", "Editions:", store.count_editions().await?);
    for status in [
        EditionStatus::Pending,
        EditionStatus::Processing,
        EditionStatus::Completed,
        EditionStatus::Error,
    ] {
        let count = store.count_editions_with_status(status).await?;
        if count > 0 {
            println!("{:<20} {}", format!("  {}:", status.as_str()), count);
        }
    }
    println!("{:<20} {}", "Articles:", store.count_articles().await?);
    println!("{:<20} {}", "Tags:", store.count_tags().await?);
    Ok(())
}
