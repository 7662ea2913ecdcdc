// merchforge/src/adapters/text.rs

use crate::adapters::error::AdapterError;
use crate::adapters::{http, TextGenerator};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{instrument, warn};

const SERVICE: &str = "text generation service";

pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash-preview-05-20";

/// Returned instead of calling out when no API key is configured.
pub const DEMO_LISTING: &str = "Product Title: Galactic Cat Tee\n\
Product Description: A cosmic-themed t-shirt featuring a cute astronaut cat floating in space. Perfect for cat lovers and stargazers!\n\
Tags: cat, space, t-shirt, astronomy\n\
Price: 25.0\n\
Product Type: t-shirt\n\
Image Prompt: A photorealistic astronaut cat floating in a vibrant space background, perfect for printing on a t-shirt.";

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
  #[serde(default)]
  candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
  content: Content,
}

#[derive(Debug, Deserialize)]
struct Content {
  #[serde(default)]
  parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
  #[serde(default)]
  text: Option<String>,
}

/// Google Gemini `generateContent` over REST.
pub struct GeminiTextGenerator {
  client: reqwest::Client,
  api_base: String,
  model: String,
  api_key: Option<String>,
}

impl GeminiTextGenerator {
  pub fn new(client: reqwest::Client, api_base: impl Into<String>, model: impl Into<String>, api_key: Option<String>) -> Self {
    Self {
      client,
      api_base: api_base.into().trim_end_matches('/').to_string(),
      model: model.into(),
      api_key: api_key.filter(|k| !k.is_empty()),
    }
  }
}

#[async_trait]
impl TextGenerator for GeminiTextGenerator {
  #[instrument(name = "GeminiTextGenerator::generate", skip_all, fields(model = %self.model))]
  async fn generate(&self, prompt: &str) -> Result<String, AdapterError> {
    let Some(api_key) = self.api_key.as_deref() else {
      warn!("No Gemini API key configured; using the demo listing.");
      return Ok(DEMO_LISTING.to_string());
    };

    let body = json!({ "contents": [{ "parts": [{ "text": prompt }] }] });
    let request = self
      .client
      .post(format!("{}/models/{}:generateContent", self.api_base, self.model))
      .query(&[("key", api_key)])
      .json(&body);

    let response: GenerateContentResponse = http::send_json(SERVICE, request).await?;
    response
      .candidates
      .into_iter()
      .next()
      .and_then(|c| c.content.parts.into_iter().next())
      .and_then(|p| p.text)
      .ok_or_else(|| AdapterError::InvalidResponse {
        service: SERVICE,
        message: "response carried no candidate text".to_string(),
      })
  }
}
