// merchforge/src/store.rs

//! Local record of published titles, backed by a single-connection SQLite pool.
//!
//! The title is the primary key and doubles as the idempotency token. Writes
//! are upserts committed before the call returns. The store is meant for one
//! orchestrator process at a time; concurrent writers sharing the file are not
//! coordinated.

use crate::models::PublishedRecord;
use chrono::NaiveDateTime;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info, instrument};

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS published_products (
  product_title TEXT PRIMARY KEY,
  fake_product_id TEXT,
  mockup_url TEXT,
  caption TEXT,
  tags TEXT,
  published_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)
"#;

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("Database error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Could not encode tags for '{title}': {source}")]
  EncodeTags {
    title: String,
    #[source]
    source: serde_json::Error,
  },

  #[error("Stored tags for '{title}' are not a JSON list: {source}")]
  DecodeTags {
    title: String,
    #[source]
    source: serde_json::Error,
  },
}

#[derive(Debug, FromRow)]
struct PublishedRow {
  product_title: String,
  fake_product_id: Option<String>,
  mockup_url: Option<String>,
  caption: Option<String>,
  tags: Option<String>,
  published_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct RecordStore {
  pool: SqlitePool,
  /// Base the read-time rewrite puts in front of `/output/<file>`.
  mockup_public_url: String,
}

impl RecordStore {
  /// Opens (creating if needed) the database at `database_url`.
  pub async fn connect(database_url: &str, mockup_public_url: impl Into<String>) -> Result<Self, StoreError> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    // One long-lived connection: it serialises writes and keeps `sqlite::memory:` alive.
    let pool = SqlitePoolOptions::new()
      .max_connections(1)
      .idle_timeout(None)
      .max_lifetime(None)
      .connect_with(options)
      .await?;
    info!(%database_url, "Record store opened.");
    Self::from_pool(pool, mockup_public_url).await
  }

  /// Wraps an existing pool and makes sure the table exists.
  pub async fn from_pool(pool: SqlitePool, mockup_public_url: impl Into<String>) -> Result<Self, StoreError> {
    sqlx::query(CREATE_TABLE).execute(&pool).await?;
    Ok(Self {
      pool,
      mockup_public_url: mockup_public_url.into().trim_end_matches('/').to_string(),
    })
  }

  pub fn pool(&self) -> &SqlitePool {
    &self.pool
  }

  /// Exact-match lookup on the title.
  #[instrument(skip(self))]
  pub async fn is_published(&self, title: &str) -> Result<bool, StoreError> {
    let found = sqlx::query_scalar::<_, i64>("SELECT 1 FROM published_products WHERE product_title = ?")
      .bind(title)
      .fetch_optional(&self.pool)
      .await?;
    Ok(found.is_some())
  }

  /// Inserts or replaces the row for `title`; `published_at` is reset to now.
  #[instrument(skip(self, caption, tags), fields(tag_count = tags.len()))]
  pub async fn save_record(
    &self,
    title: &str,
    external_id: &str,
    mockup_url: &str,
    caption: &str,
    tags: &[String],
  ) -> Result<(), StoreError> {
    let tags_json = serde_json::to_string(tags).map_err(|source| StoreError::EncodeTags {
      title: title.to_string(),
      source,
    })?;

    sqlx::query(
      "INSERT OR REPLACE INTO published_products (product_title, fake_product_id, mockup_url, caption, tags) \
       VALUES (?, ?, ?, ?, ?)",
    )
    .bind(title)
    .bind(external_id)
    .bind(mockup_url)
    .bind(caption)
    .bind(tags_json)
    .execute(&self.pool)
    .await?;

    debug!("Record saved.");
    Ok(())
  }

  /// All records in storage order, with local mockup paths turned into URLs.
  #[instrument(skip(self))]
  pub async fn list_records(&self) -> Result<Vec<PublishedRecord>, StoreError> {
    let rows: Vec<PublishedRow> = sqlx::query_as(
      "SELECT product_title, fake_product_id, mockup_url, caption, tags, published_at \
       FROM published_products ORDER BY rowid",
    )
    .fetch_all(&self.pool)
    .await?;

    rows.into_iter().map(|row| self.to_record(row)).collect()
  }

  fn to_record(&self, row: PublishedRow) -> Result<PublishedRecord, StoreError> {
    let tags = match row.tags.as_deref() {
      None | Some("") => Vec::new(),
      Some(raw) => serde_json::from_str(raw).map_err(|source| StoreError::DecodeTags {
        title: row.product_title.clone(),
        source,
      })?,
    };
    let mockup_url = self.servable_mockup_url(row.mockup_url.as_deref().unwrap_or_default());

    Ok(PublishedRecord {
      title: row.product_title,
      external_id: row.fake_product_id.unwrap_or_default(),
      mockup_url,
      caption: row.caption.unwrap_or_default(),
      tags,
      published_at: row.published_at,
    })
  }

  /// `/abs/dir/output/x.png` becomes `<mockup_public_url>/output/x.png`;
  /// anything that is not an absolute path is returned unchanged.
  pub fn servable_mockup_url(&self, stored: &str) -> String {
    let path = Path::new(stored);
    match (path.is_absolute(), path.file_name()) {
      (true, Some(file_name)) => format!("{}/output/{}", self.mockup_public_url, file_name.to_string_lossy()),
      _ => stored.to_string(),
    }
  }
}
