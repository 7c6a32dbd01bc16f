//! Content sync batch job, run in CI before the site build:
//! read the whole `copy` table, nest each `(locale, page)` group into a
//! document, and write one JSON file per group under the content
//! directory. Any read failure aborts the run before anything is written.

mod config;
mod materialize;

use copydesk_core::store::{ContentStore, CopyStore};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (dev convenience)
    let _ = dotenvy::dotenv();

    let config = config::SyncConfig::from_env()
        .map_err(|e| anyhow::anyhow!("Failed to load config: {e}. Is DATABASE_URL set?"))?;

    // Batch-job output is read by humans in CI logs; plain fmt, no JSON.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    tracing::info!("Starting content sync");

    let pool = PgPoolOptions::new()
        .max_connections(4)
        .connect(&config.database_url)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to database: {e}"))?;

    let store = CopyStore::new(pool);

    // One full-table read, ordered by (page, key); all reads complete
    // before the first write so a transport error leaves nothing behind.
    let records = store.fetch_all().await?;

    if records.is_empty() {
        tracing::warn!("No content found in database; nothing to write");
        return Ok(());
    }

    tracing::info!(count = records.len(), "Fetched content records");

    let written =
        materialize::write_documents(&records, &config.content_dir, config.download_assets)?;

    tracing::info!(written, "Content sync completed successfully");
    Ok(())
}
