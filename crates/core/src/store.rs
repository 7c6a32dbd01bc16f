//! The `copy` table: reads filtered by page/locale and atomic per-page
//! upserts keyed on `(page, key, locale)`.

use chrono::Utc;
use sqlx::{PgPool, Row};
use thiserror::Error;

use crate::record::{ContentKind, ContentRecord};

#[derive(Debug, Error)]
pub enum StoreError {
    /// Network or database failure; never retried automatically.
    #[error("content store transport error: {0}")]
    Transport(#[from] sqlx::Error),
}

/// Seam between the editing session and the backing table. The session is
/// exercised in tests against an in-memory implementation.
#[allow(async_fn_in_trait)]
pub trait ContentStore {
    /// All records for one page in one locale, ordered by key. Zero rows
    /// is an empty Vec, not an error.
    async fn fetch_page(&self, page: &str, locale: &str)
        -> Result<Vec<ContentRecord>, StoreError>;

    /// Full table snapshot ordered by `(page, key)` — the materializer's
    /// defined retrieval order, which keeps output stable across runs.
    async fn fetch_all(&self) -> Result<Vec<ContentRecord>, StoreError>;

    /// Upsert a page's records, stamping `owner` and `updated_at` on every
    /// written row at write time. All-or-nothing: either every record
    /// lands or none do.
    async fn save_page(&self, records: &[ContentRecord], owner: &str) -> Result<(), StoreError>;
}

/// Postgres-backed store over the `copy` table.
///
/// Saves never delete: a field removed from a document leaves its old row
/// (and its `type` classification) behind. Stale rows are pruned by hand
/// in the backing store for now.
#[derive(Debug, Clone)]
pub struct CopyStore {
    pool: PgPool,
}

impl CopyStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Round-trip to the database; used by the health endpoint.
    pub async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

const SELECT_PAGE: &str = r#"
SELECT page, locale, key, value, type AS kind, owner, updated_at
FROM copy
WHERE page = $1 AND locale = $2
ORDER BY key
"#;

const SELECT_ALL: &str = r#"
SELECT page, locale, key, value, type AS kind, owner, updated_at
FROM copy
ORDER BY page, key
"#;

const UPSERT: &str = r#"
INSERT INTO copy (page, locale, key, value, type, owner, updated_at)
VALUES ($1, $2, $3, $4, $5, $6, $7)
ON CONFLICT (page, key, locale) DO UPDATE SET
    value = EXCLUDED.value,
    type = EXCLUDED.type,
    owner = EXCLUDED.owner,
    updated_at = EXCLUDED.updated_at
"#;

impl ContentStore for CopyStore {
    async fn fetch_page(
        &self,
        page: &str,
        locale: &str,
    ) -> Result<Vec<ContentRecord>, StoreError> {
        let rows = sqlx::query(SELECT_PAGE)
            .bind(page)
            .bind(locale)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(record_from_row).collect()
    }

    async fn fetch_all(&self) -> Result<Vec<ContentRecord>, StoreError> {
        let rows = sqlx::query(SELECT_ALL).fetch_all(&self.pool).await?;
        rows.iter().map(record_from_row).collect()
    }

    async fn save_page(&self, records: &[ContentRecord], owner: &str) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();
        for record in records {
            sqlx::query(UPSERT)
                .bind(&record.page)
                .bind(&record.locale)
                .bind(&record.key)
                .bind(&record.value)
                .bind(record.kind.as_str())
                .bind(owner)
                .bind(now)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        tracing::debug!(count = records.len(), owner, "page save committed");
        Ok(())
    }
}

fn record_from_row(row: &sqlx::postgres::PgRow) -> Result<ContentRecord, StoreError> {
    let kind: String = row.try_get("kind")?;
    Ok(ContentRecord {
        page: row.try_get("page")?,
        locale: row.try_get("locale")?,
        key: row.try_get("key")?,
        value: row.try_get("value")?,
        kind: ContentKind::from_column(&kind),
        owner: row.try_get("owner")?,
        updated_at: row.try_get("updated_at")?,
    })
}
