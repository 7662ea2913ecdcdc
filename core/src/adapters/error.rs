// merchforge/src/adapters/error.rs

//! Failure classification shared by every remote-service adapter.

use std::path::PathBuf;
use thiserror::Error;

/// Coarse failure category, used to pick the operator-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
  /// The peer refused or could not be reached.
  Connectivity,
  Timeout,
  /// The peer answered with a non-2xx status.
  HttpStatus(u16),
  /// 2xx, but the body was not what the contract promises.
  InvalidResponse,
  /// Any other client-side transport problem.
  Transport,
  /// Reading or writing a local file around the call.
  LocalIo,
}

#[derive(Debug, Error)]
pub enum AdapterError {
  #[error("could not connect to the {service}")]
  Connect {
    service: &'static str,
    #[source]
    source: reqwest::Error,
  },

  #[error("{service} request timed out")]
  Timeout {
    service: &'static str,
    #[source]
    source: reqwest::Error,
  },

  #[error("{service} returned HTTP {status}: {detail}")]
  Status {
    service: &'static str,
    status: u16,
    detail: String,
  },

  #[error("{service} sent an unexpected response: {message}")]
  InvalidResponse { service: &'static str, message: String },

  #[error("{service} request failed: {source}")]
  Transport {
    service: &'static str,
    #[source]
    source: reqwest::Error,
  },

  #[error("local file {path:?}: {source}")]
  LocalFile {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

impl AdapterError {
  /// Sorts a `reqwest` failure into connect / timeout / status / body / other.
  pub fn from_reqwest(service: &'static str, err: reqwest::Error) -> Self {
    if err.is_timeout() {
      AdapterError::Timeout { service, source: err }
    } else if err.is_connect() {
      AdapterError::Connect { service, source: err }
    } else if let Some(status) = err.status() {
      AdapterError::Status {
        service,
        status: status.as_u16(),
        detail: err.to_string(),
      }
    } else if err.is_decode() || err.is_body() {
      AdapterError::InvalidResponse {
        service,
        message: err.to_string(),
      }
    } else {
      AdapterError::Transport { service, source: err }
    }
  }

  pub fn local_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    AdapterError::LocalFile {
      path: path.into(),
      source,
    }
  }

  pub fn kind(&self) -> FailureKind {
    match self {
      AdapterError::Connect { .. } => FailureKind::Connectivity,
      AdapterError::Timeout { .. } => FailureKind::Timeout,
      AdapterError::Status { status, .. } => FailureKind::HttpStatus(*status),
      AdapterError::InvalidResponse { .. } => FailureKind::InvalidResponse,
      AdapterError::Transport { .. } => FailureKind::Transport,
      AdapterError::LocalFile { .. } => FailureKind::LocalIo,
    }
  }

  /// Human-readable message for logs and the run report.
  pub fn diagnostic(&self) -> String {
    match self {
      AdapterError::Connect { service, .. } => {
        format!("Could not connect to the {}. Is the server running?", service)
      }
      AdapterError::Timeout { service, .. } => format!("The {} request timed out. Try again later.", service),
      AdapterError::Status { status: 401, .. } => "Unauthorized. Check your API token or credentials.".to_string(),
      AdapterError::Status { status: 429, .. } => "Rate limit exceeded. Try again later.".to_string(),
      AdapterError::Status { service, status, detail } => {
        let reason = reqwest::StatusCode::from_u16(*status)
          .ok()
          .and_then(|s| s.canonical_reason())
          .unwrap_or("Unknown Status");
        format!("HTTP error from the {}: {} {} - {}", service, status, reason, detail)
      }
      other => other.to_string(),
    }
  }
}
