//! Hemeroteca - newspaper PDF digitization and article extraction.
//!
//! A tool for importing print newspaper editions (PDF files) and
//! extracting their individual articles into a searchable archive.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hemeroteca::cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    // Initialize logging based on verbosity
    let default_filter = if cli::is_verbose() {
        "hemeroteca=info"
    } else {
        "hemeroteca=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Run CLI
    cli::run().await
}
