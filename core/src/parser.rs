// merchforge/src/parser.rs

//! Best-effort extraction of a [`ProductDraft`] from free-form model output.
//!
//! The model is asked for `Label: value` lines but rarely follows the format
//! exactly, so matching is loose: a line belongs to a field when its lower-cased
//! text *contains* the field label anywhere, and the value is whatever follows
//! the first colon. A sentence that merely mentions "price" will therefore be
//! read as the price line. Nothing here ever fails; every field has a default.

use crate::models::ProductDraft;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
  Title,
  Description,
  Tags,
  Price,
  ProductType,
  ImagePrompt,
}

/// Checked in order; the first label contained in a line wins.
const LABELS: [(&str, Field); 7] = [
  ("product title", Field::Title),
  ("product description", Field::Description),
  ("tags", Field::Tags),
  ("price", Field::Price),
  ("product type", Field::ProductType),
  ("image prompt", Field::ImagePrompt),
  ("image generation prompt", Field::ImagePrompt),
];

fn classify(line: &str) -> Option<Field> {
  let lowered = line.trim().to_lowercase();
  LABELS
    .iter()
    .find(|(label, _)| lowered.contains(label))
    .map(|(_, field)| *field)
}

/// Everything after the first colon, trimmed. `None` when the line has no colon.
fn value_of(line: &str) -> Option<&str> {
  line.split_once(':').map(|(_, value)| value.trim())
}

/// Comma-separated tags, trimmed, with empty entries dropped.
///
/// `a,,b` yields `["a", "b"]` rather than keeping an empty tag: the store and
/// the commerce payload re-join tags with `", "`, and a blank entry there
/// shows up as a dangling separator.
pub fn split_tags(value: &str) -> Vec<String> {
  value
    .split(',')
    .map(str::trim)
    .filter(|tag| !tag.is_empty())
    .map(str::to_string)
    .collect()
}

/// Parses a price, falling back to `0.0` for anything that is not a finite number.
pub fn parse_price(value: &str) -> f64 {
  value
    .trim()
    .parse::<f64>()
    .ok()
    .filter(|p| p.is_finite())
    .unwrap_or(0.0)
}

/// Image prompt used when the response did not provide one.
pub fn fallback_image_prompt(title: &str) -> String {
  format!("An artistic image for the product titled '{}'", title)
}

/// Builds a draft from `raw`, one line at a time.
///
/// Later lines for the same field overwrite earlier ones. A labelled line
/// without a colon leaves text fields untouched but resets the price to `0.0`
/// and the product type to empty.
pub fn parse_draft(raw: &str) -> ProductDraft {
  let mut draft = ProductDraft::default();

  for line in raw.lines() {
    let Some(field) = classify(line) else { continue };
    let value = value_of(line);

    match (field, value) {
      (Field::Title, Some(v)) => draft.title = v.to_string(),
      (Field::Description, Some(v)) => draft.description = v.to_string(),
      (Field::Tags, Some(v)) => draft.tags = split_tags(v),
      (Field::Price, v) => draft.price = v.map(parse_price).unwrap_or(0.0),
      (Field::ProductType, v) => draft.product_type = v.map(str::to_lowercase).unwrap_or_default(),
      (Field::ImagePrompt, Some(v)) => draft.image_prompt = v.to_string(),
      (Field::Title | Field::Description | Field::Tags | Field::ImagePrompt, None) => {}
    }
  }

  if draft.image_prompt.is_empty() {
    draft.image_prompt = fallback_image_prompt(&draft.title);
  }

  tracing::debug!(
    title = %draft.title,
    tags = draft.tags.len(),
    price = draft.price,
    product_type = %draft.product_type,
    "Parsed product draft."
  );
  draft
}
