// merchforge/src/models/publish.rs

use crate::models::draft::ProductDraft;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A draft plus everything the run produced for it; the body sent to both publishers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedProduct {
  #[serde(flatten)]
  pub draft: ProductDraft,
  /// Absolute path of the generated artwork.
  pub image_path: PathBuf,
  /// Absolute path of the rendered mockup. Sent as `mockup_url` on the wire.
  #[serde(rename = "mockup_url")]
  pub mockup_path: PathBuf,
  pub caption: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommerceStatus {
  Success,
  Error,
}

/// Result of pushing a listing to the commerce platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommerceReceipt {
  pub status: CommerceStatus,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub shopify_product_id: Option<u64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
}

impl CommerceReceipt {
  pub fn success(product_id: u64) -> Self {
    Self {
      status: CommerceStatus::Success,
      shopify_product_id: Some(product_id),
      message: None,
    }
  }

  pub fn error(message: impl Into<String>) -> Self {
    Self {
      status: CommerceStatus::Error,
      shopify_product_id: None,
      message: Some(message.into()),
    }
  }

  pub fn is_success(&self) -> bool {
    self.status == CommerceStatus::Success
  }
}
