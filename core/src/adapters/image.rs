// merchforge/src/adapters/image.rs

use crate::adapters::error::AdapterError;
use crate::adapters::{http, ImageGenerator};
use async_trait::async_trait;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

const SERVICE: &str = "image generation service";

pub const DEFAULT_CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";
const MODEL: &str = "@cf/stabilityai/stable-diffusion-xl-base-1.0";
const NEGATIVE_PROMPT: &str = "blurry, ugly, bad quality, low-res";

#[derive(Debug, Clone)]
pub struct CloudflareCredentials {
  pub account_id: String,
  pub api_token: String,
}

/// Stable Diffusion on Cloudflare Workers AI.
///
/// Artwork is optional for a demo run: without credentials, or when the call
/// fails, the configured sample image is returned instead of an error.
pub struct CloudflareImageGenerator {
  client: reqwest::Client,
  api_base: String,
  credentials: Option<CloudflareCredentials>,
  output_dir: PathBuf,
  fallback_image: PathBuf,
}

impl CloudflareImageGenerator {
  pub fn new(
    client: reqwest::Client,
    api_base: impl Into<String>,
    credentials: Option<CloudflareCredentials>,
    output_dir: impl Into<PathBuf>,
    fallback_image: impl Into<PathBuf>,
  ) -> Self {
    Self {
      client,
      api_base: api_base.into().trim_end_matches('/').to_string(),
      credentials,
      output_dir: output_dir.into(),
      fallback_image: fallback_image.into(),
    }
  }

  fn fallback(&self) -> String {
    self.fallback_image.to_string_lossy().into_owned()
  }

  async fn render(&self, credentials: &CloudflareCredentials, description: &str) -> Result<PathBuf, AdapterError> {
    let request = self
      .client
      .post(format!("{}/accounts/{}/ai/run/{}", self.api_base, credentials.account_id, MODEL))
      .bearer_auth(&credentials.api_token)
      .json(&json!({ "prompt": description, "negative_prompt": NEGATIVE_PROMPT }));
    let bytes = http::send_bytes(SERVICE, request).await?;

    tokio::fs::create_dir_all(&self.output_dir)
      .await
      .map_err(|e| AdapterError::local_file(&self.output_dir, e))?;
    let path = generated_image_path(&self.output_dir, chrono::Utc::now().timestamp());
    tokio::fs::write(&path, &bytes)
      .await
      .map_err(|e| AdapterError::local_file(&path, e))?;
    Ok(path)
  }
}

pub fn generated_image_path(output_dir: &Path, unix_seconds: i64) -> PathBuf {
  output_dir.join(format!("generated_image_{}.png", unix_seconds))
}

#[async_trait]
impl ImageGenerator for CloudflareImageGenerator {
  #[instrument(name = "CloudflareImageGenerator::generate", skip_all)]
  async fn generate(&self, description: &str) -> Result<String, AdapterError> {
    let Some(credentials) = &self.credentials else {
      warn!(fallback = %self.fallback_image.display(), "Cloudflare credentials missing; using the sample image.");
      return Ok(self.fallback());
    };

    match self.render(credentials, description).await {
      Ok(path) => {
        info!(path = %path.display(), "Generated image saved.");
        Ok(path.to_string_lossy().into_owned())
      }
      Err(e) => {
        warn!(error = %e, diagnostic = %e.diagnostic(), "Image generation failed; using the sample image.");
        Ok(self.fallback())
      }
    }
  }
}
