// merchforge/src/models/record.rs

use chrono::NaiveDateTime;
use serde::Serialize;

/// One published listing as read back from the record store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublishedRecord {
  pub title: String,
  /// Identifier handed out by the demo publish sink.
  pub external_id: String,
  /// Servable URL; stored local paths are rewritten when read.
  pub mockup_url: String,
  pub caption: String,
  pub tags: Vec<String>,
  /// UTC, set by the store on every write.
  pub published_at: NaiveDateTime,
}
