// merchforge/app/src/web/handlers/generator_handlers.rs

use actix_web::{web, HttpResponse};
use anyhow::Context;
use merchforge::orchestrator::PRODUCT_PROMPT;
use merchforge::{parse_draft, ProductDraft};
use serde::Serialize;
use serde_json::json;
use std::path::Path;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::state::GeneratorState;

/// The draft plus the artwork reference, as returned and as written to `product.json`.
#[derive(Debug, Serialize)]
pub struct GeneratedProduct {
  #[serde(flatten)]
  pub draft: ProductDraft,
  pub image_path: String,
}

pub async fn banner_handler() -> HttpResponse {
  HttpResponse::Ok().json(json!({ "message": "Merchforge Generator API" }))
}

#[instrument(name = "handler::generate_product", skip(state))]
pub async fn generate_product_handler(state: web::Data<GeneratorState>) -> Result<HttpResponse, AppError> {
  let raw = state.text.generate(PRODUCT_PROMPT).await?;
  let draft = parse_draft(&raw);
  if !draft.has_title() {
    warn!("Generated listing has no title.");
    return Err(AppError::Generation("the generated listing has no product title".to_string()));
  }

  let image_path = state.image.generate(&draft.image_prompt).await?;
  let product = GeneratedProduct { draft, image_path };

  write_product_json(&state.config.generator_output_dir, &product).await?;
  info!(title = %product.draft.title, "Product generated.");
  Ok(HttpResponse::Ok().json(product))
}

async fn write_product_json(output_dir: &Path, product: &GeneratedProduct) -> anyhow::Result<()> {
  tokio::fs::create_dir_all(output_dir)
    .await
    .with_context(|| format!("creating {}", output_dir.display()))?;
  let path = output_dir.join("product.json");
  let body = serde_json::to_vec_pretty(product).context("encoding product.json")?;
  tokio::fs::write(&path, body)
    .await
    .with_context(|| format!("writing {}", path.display()))?;
  Ok(())
}
