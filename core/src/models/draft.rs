// merchforge/src/models/draft.rs

use crate::models::publish::EnrichedProduct;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Product types the listing prompt asks for. The parser does not enforce them.
pub const KNOWN_PRODUCT_TYPES: [&str; 3] = ["t-shirt", "cup", "cap"];

/// Structured listing extracted from one generation response.
///
/// Built once per run by [`crate::parse_draft`]; every field has a default so a
/// draft always exists, even for garbage input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductDraft {
  pub title: String,
  pub description: String,
  pub tags: Vec<String>,
  pub price: f64,
  pub product_type: String,
  pub image_prompt: String,
}

impl ProductDraft {
  /// The title is the idempotency key; an empty one cannot be checked.
  pub fn has_title(&self) -> bool {
    !self.title.trim().is_empty()
  }

  pub fn is_known_product_type(&self) -> bool {
    KNOWN_PRODUCT_TYPES.contains(&self.product_type.as_str())
  }

  /// Product type as the mockup renderer names its templates: `t-shirt` → `tshirt`.
  pub fn mockup_product_type(&self) -> String {
    self.product_type.to_lowercase().replace('-', "")
  }

  /// Attaches the artefacts produced later in the run.
  pub fn enrich(&self, image_path: PathBuf, mockup_path: PathBuf, caption: impl Into<String>) -> EnrichedProduct {
    EnrichedProduct {
      draft: self.clone(),
      image_path,
      mockup_path,
      caption: caption.into(),
    }
  }
}
