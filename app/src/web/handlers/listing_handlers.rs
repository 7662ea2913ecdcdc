// merchforge/app/src/web/handlers/listing_handlers.rs

use actix_web::{web, HttpResponse};
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::state::AppState;

/// Every published record, oldest first, with mockup paths turned into URLs.
#[instrument(name = "handler::list_products", skip(app_state))]
pub async fn list_products_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let records = app_state.store.list_records().await?;
  info!(count = records.len(), "Listing published products.");
  Ok(HttpResponse::Ok().json(records))
}

pub async fn health_check_handler() -> HttpResponse {
  HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}
