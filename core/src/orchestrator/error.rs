// merchforge/src/orchestrator/error.rs
use crate::adapters::{AdapterError, FailureKind};
use crate::error::FlowError;
use crate::store::StoreError;
use std::path::PathBuf;
use thiserror::Error;

/// Why a run stopped short of `Done`.
#[derive(Debug, Error)]
pub enum RunError {
  #[error("Workflow engine error: {source}")]
  Flow {
    #[from]
    source: FlowError,
  },

  #[error("Remote call failed: {0}")]
  Adapter(#[from] AdapterError),

  #[error("Record store error: {0}")]
  Store(#[from] StoreError),

  #[error("Generation produced no product title")]
  EmptyTitle,

  /// The demo sink accepted the product but the local record was not written.
  #[error("Published as '{external_id}' but the record for '{title}' could not be saved: {source}")]
  RecordAfterPublish {
    title: String,
    external_id: String,
    #[source]
    source: StoreError,
  },

  #[error("Commerce publish failed: {0}")]
  Commerce(String),

  #[error("Could not resolve local path {path:?}: {source}")]
  LocalPath {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Run context is missing {0}")]
  MissingContext(&'static str),
}

impl RunError {
  /// The adapter classification, when the failure came from a remote call.
  pub fn failure_kind(&self) -> Option<FailureKind> {
    match self {
      RunError::Adapter(e) => Some(e.kind()),
      _ => None,
    }
  }

  pub fn diagnostic(&self) -> String {
    match self {
      RunError::Adapter(e) => e.diagnostic(),
      other => other.to_string(),
    }
  }
}
