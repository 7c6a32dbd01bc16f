use std::env;
use std::path::PathBuf;

/// Batch-job configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// PostgreSQL connection URL (carries the privileged credential).
    /// Required; the job exits non-zero without it.
    pub database_url: String,
    /// Directory the per-page JSON files are written under.
    pub content_dir: PathBuf,
    /// Whether to pull image assets down locally. True only for the
    /// literal string "true".
    pub download_assets: bool,
    /// Log level (e.g., "info", "debug", "trace").
    pub log_level: String,
}

impl SyncConfig {
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")?,
            content_dir: env::var("CONTENT_DIR")
                .unwrap_or_else(|_| "content".to_string())
                .into(),
            download_assets: env::var("DOWNLOAD_ASSETS").as_deref() == Ok("true"),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }
}
