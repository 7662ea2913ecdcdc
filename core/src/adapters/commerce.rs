// merchforge/src/adapters/commerce.rs

//! Shopify Admin REST client.
//!
//! Publishing is two-phase: the product is created without images, then the
//! mockup and the original artwork are attached one request each. A failed
//! attachment fails the whole publish; the product already created on the
//! platform is left in place.

use crate::adapters::error::AdapterError;
use crate::adapters::{http, CommercePublisher};
use crate::models::{CommerceReceipt, EnrichedProduct};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::Path;
use tracing::{debug, info, instrument, warn};

const SERVICE: &str = "commerce platform";
const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

pub const DEFAULT_SHOPIFY_API_VERSION: &str = "2023-07";

#[derive(Debug, Deserialize)]
struct CreatedProduct {
  product: CreatedProductBody,
}

#[derive(Debug, Deserialize)]
struct CreatedProductBody {
  id: u64,
}

pub struct ShopifyPublisher {
  client: reqwest::Client,
  api_base: String,
  access_token: String,
}

impl ShopifyPublisher {
  /// `api_base` is the full Admin API root, e.g. `https://shop.myshopify.com/admin/api/2023-07`.
  pub fn new(client: reqwest::Client, api_base: impl Into<String>, access_token: impl Into<String>) -> Self {
    Self {
      client,
      api_base: api_base.into().trim_end_matches('/').to_string(),
      access_token: access_token.into(),
    }
  }

  pub fn for_store(client: reqwest::Client, store: &str, api_version: &str, access_token: impl Into<String>) -> Self {
    Self::new(client, format!("https://{}/admin/api/{}", store, api_version), access_token)
  }

  fn product_body(product: &EnrichedProduct) -> Value {
    let draft = &product.draft;
    json!({
      "product": {
        "title": draft.title,
        "body_html": draft.description,
        "tags": draft.tags.join(", "),
        "variants": [{ "price": format!("{:.2}", draft.price) }],
        "metafields": [{
          "namespace": "ai_data",
          "key": "caption",
          "value": product.caption,
          "type": "single_line_text_field"
        }]
      }
    })
  }

  async fn create_product(&self, product: &EnrichedProduct) -> Result<u64, AdapterError> {
    let request = self
      .client
      .post(format!("{}/products.json", self.api_base))
      .header(ACCESS_TOKEN_HEADER, &self.access_token)
      .json(&Self::product_body(product));
    let created: CreatedProduct = http::send_json(SERVICE, request).await?;
    Ok(created.product.id)
  }

  async fn attach_image(&self, product_id: u64, path: &Path) -> Result<(), AdapterError> {
    let bytes = tokio::fs::read(path)
      .await
      .map_err(|e| AdapterError::local_file(path, e))?;
    let request = self
      .client
      .post(format!("{}/products/{}/images.json", self.api_base, product_id))
      .header(ACCESS_TOKEN_HEADER, &self.access_token)
      .json(&json!({ "image": { "attachment": STANDARD.encode(&bytes) } }));
    http::send(SERVICE, request).await?;
    debug!(product_id, path = %path.display(), "Image attached.");
    Ok(())
  }

  async fn try_publish(&self, product: &EnrichedProduct) -> Result<u64, AdapterError> {
    let product_id = self.create_product(product).await?;
    info!(product_id, "Commerce product created.");

    for path in [&product.mockup_path, &product.image_path] {
      let is_file = tokio::fs::metadata(path).await.map(|m| m.is_file()).unwrap_or(false);
      if !is_file {
        warn!(path = %path.display(), "Image not found on disk; not attached.");
        continue;
      }
      self.attach_image(product_id, path).await?;
    }
    Ok(product_id)
  }
}

#[async_trait]
impl CommercePublisher for ShopifyPublisher {
  #[instrument(name = "ShopifyPublisher::publish", skip_all, fields(title = %product.draft.title))]
  async fn publish(&self, product: &EnrichedProduct) -> CommerceReceipt {
    match self.try_publish(product).await {
      Ok(product_id) => CommerceReceipt::success(product_id),
      Err(AdapterError::Status { detail, .. }) => CommerceReceipt::error(format!("HTTP error: {}", detail)),
      Err(e) => CommerceReceipt::error(e.diagnostic()),
    }
  }
}
