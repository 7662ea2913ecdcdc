// merchforge/app/src/errors.rs

use actix_web::{HttpResponse, ResponseError};
use merchforge::{AdapterError, RunError, StoreError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Record Store Error: {0}")]
  Store(#[from] StoreError),

  #[error("Upstream Service Error: {0}")]
  Upstream(#[from] AdapterError),

  #[error("Run Error: {0}")]
  Run(#[from] RunError),

  #[error("Generation Error: {0}")]
  Generation(String),

  #[error("HTTP Client Error: {0}")]
  HttpClient(#[from] reqwest::Error),

  #[error("I/O Error: {0}")]
  Io(#[from] std::io::Error),

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    match err.downcast::<StoreError>() {
      Ok(store_err) => AppError::Store(store_err),
      Err(err) => AppError::Internal(format!("{:#}", err)),
    }
  }
}

impl ResponseError for AppError {
  fn error_response(&self) -> HttpResponse {
    tracing::error!(application_error = %self, "Responding with error");
    match self {
      AppError::Config(m) => {
        HttpResponse::InternalServerError().json(json!({"error": "Configuration issue", "detail": m}))
      }
      AppError::Store(_) => HttpResponse::InternalServerError().json(json!({"error": "Record store operation failed"})),
      AppError::Upstream(e) => {
        HttpResponse::BadGateway().json(json!({"error": "Upstream service failed", "detail": e.diagnostic()}))
      }
      AppError::Run(e) => {
        HttpResponse::InternalServerError().json(json!({"error": "Run failed", "detail": e.diagnostic()}))
      }
      AppError::Generation(m) => HttpResponse::BadGateway().json(json!({"error": "Generation failed", "detail": m})),
      AppError::HttpClient(_) | AppError::Io(_) | AppError::Internal(_) => {
        HttpResponse::InternalServerError().json(json!({"error": "An internal error occurred", "detail": self.to_string()}))
      }
    }
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
