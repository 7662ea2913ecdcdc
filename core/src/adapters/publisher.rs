// merchforge/src/adapters/publisher.rs

use crate::adapters::error::AdapterError;
use crate::adapters::{http, DemoPublisher};
use crate::models::EnrichedProduct;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, instrument};

const SERVICE: &str = "publisher";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DemoPublishResponse {
  pub fake_product_id: String,
  /// `success`, or `duplicate` when the sink had already seen the title.
  #[serde(default)]
  pub status: Option<String>,
  #[serde(default)]
  pub message: Option<String>,
}

pub struct DemoSinkClient {
  client: reqwest::Client,
  url: String,
}

impl DemoSinkClient {
  pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
    Self { client, url: url.into() }
  }
}

#[async_trait]
impl DemoPublisher for DemoSinkClient {
  #[instrument(name = "DemoSinkClient::publish", skip_all, fields(title = %product.draft.title))]
  async fn publish(&self, product: &EnrichedProduct) -> Result<DemoPublishResponse, AdapterError> {
    let response: DemoPublishResponse = http::send_json(SERVICE, self.client.post(&self.url).json(product)).await?;
    if response.status.as_deref() == Some("duplicate") {
      info!(fake_product_id = %response.fake_product_id, "Publisher already knew this title; reusing its id.");
    }
    Ok(response)
  }
}
