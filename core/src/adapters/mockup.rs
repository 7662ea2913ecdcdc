// merchforge/src/adapters/mockup.rs

use crate::adapters::error::AdapterError;
use crate::adapters::{http, MockupRenderer};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

const SERVICE: &str = "mockup service";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MockupRequest {
  /// Absolute local path of the artwork.
  pub image_url: String,
  /// Template name, e.g. `tshirt`.
  pub product_type: String,
  pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MockupResponse {
  pub mockup_url: String,
  #[serde(default)]
  pub mockup_id: Option<String>,
}

pub struct MockupClient {
  client: reqwest::Client,
  base_url: String,
}

impl MockupClient {
  pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
    Self {
      client,
      base_url: base_url.into().trim_end_matches('/').to_string(),
    }
  }
}

#[async_trait]
impl MockupRenderer for MockupClient {
  #[instrument(name = "MockupClient::render", skip_all, fields(product_type = %request.product_type))]
  async fn render(&self, request: &MockupRequest) -> Result<MockupResponse, AdapterError> {
    let builder = self.client.post(format!("{}/mockup", self.base_url)).json(request);
    http::send_json(SERVICE, builder).await
  }
}
