// merchforge/src/adapters/caption.rs

use crate::adapters::error::AdapterError;
use crate::adapters::{http, Captioner};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use tracing::{debug, instrument};

const SERVICE: &str = "captioning service";

#[derive(Debug, Deserialize)]
struct GeneratedText {
  generated_text: String,
}

/// Hosted image-to-text endpoints answer in one of these shapes.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CaptionResponse {
  Batch(Vec<GeneratedText>),
  Single(GeneratedText),
  Caption { caption: String },
}

impl CaptionResponse {
  fn into_caption(self) -> Option<String> {
    match self {
      CaptionResponse::Batch(items) => items.into_iter().next().map(|g| g.generated_text),
      CaptionResponse::Single(g) => Some(g.generated_text),
      CaptionResponse::Caption { caption } => Some(caption),
    }
  }
}

/// Posts raw image bytes to an image-captioning endpoint.
pub struct HttpCaptioner {
  client: reqwest::Client,
  endpoint: String,
  api_token: Option<String>,
}

impl HttpCaptioner {
  pub fn new(client: reqwest::Client, endpoint: impl Into<String>, api_token: Option<String>) -> Self {
    Self {
      client,
      endpoint: endpoint.into(),
      api_token: api_token.filter(|t| !t.is_empty()),
    }
  }

  async fn load_image(&self, image: &str) -> Result<Vec<u8>, AdapterError> {
    if image.starts_with("http") {
      http::send_bytes(SERVICE, self.client.get(image)).await
    } else {
      tokio::fs::read(image).await.map_err(|e| AdapterError::local_file(image, e))
    }
  }
}

#[async_trait]
impl Captioner for HttpCaptioner {
  #[instrument(name = "HttpCaptioner::caption", skip(self))]
  async fn caption(&self, image: &str) -> Result<String, AdapterError> {
    let bytes = self.load_image(image).await?;
    debug!(bytes = bytes.len(), "Image loaded for captioning.");

    let mut request = self
      .client
      .post(&self.endpoint)
      .header(CONTENT_TYPE, "application/octet-stream")
      .body(bytes);
    if let Some(token) = &self.api_token {
      request = request.bearer_auth(token);
    }

    let response: CaptionResponse = http::send_json(SERVICE, request).await?;
    response
      .into_caption()
      .map(|c| c.trim().to_string())
      .ok_or_else(|| AdapterError::InvalidResponse {
        service: SERVICE,
        message: "empty caption list".to_string(),
      })
  }
}

/// Used when no captioning endpoint is configured: every caption is empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledCaptioner;

#[async_trait]
impl Captioner for DisabledCaptioner {
  async fn caption(&self, _image: &str) -> Result<String, AdapterError> {
    Ok(String::new())
  }
}
