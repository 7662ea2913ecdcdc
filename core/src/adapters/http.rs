// merchforge/src/adapters/http.rs

//! Request helpers shared by the HTTP adapters.

use crate::adapters::error::AdapterError;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// The one client every adapter shares; `timeout` bounds each whole request.
pub fn build_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
  reqwest::Client::builder().timeout(timeout).build()
}

/// Pulls a useful message out of an error body.
///
/// Understands `{"error": {"message": ".."}}` and `{"error": ".."}`; any other
/// JSON is returned whole, and non-JSON text as-is.
pub fn error_detail(body: &str) -> String {
  let trimmed = body.trim();
  match serde_json::from_str::<serde_json::Value>(trimmed) {
    Ok(json) => match json.get("error") {
      Some(serde_json::Value::Object(err)) => match err.get("message").and_then(|m| m.as_str()) {
        Some(message) => message.to_string(),
        None => json.to_string(),
      },
      Some(serde_json::Value::String(message)) => message.clone(),
      _ => json.to_string(),
    },
    Err(_) if trimmed.is_empty() => "no error body".to_string(),
    Err(_) => trimmed.to_string(),
  }
}

/// Sends `request` and returns the response if its status is 2xx.
pub(crate) async fn send(service: &'static str, request: reqwest::RequestBuilder) -> Result<reqwest::Response, AdapterError> {
  let response = request
    .send()
    .await
    .map_err(|e| AdapterError::from_reqwest(service, e))?;

  let status = response.status();
  if !status.is_success() {
    let body = response
      .text()
      .await
      .unwrap_or_else(|_| "<unreadable body>".to_string());
    return Err(AdapterError::Status {
      service,
      status: status.as_u16(),
      detail: error_detail(&body),
    });
  }
  Ok(response)
}

/// Sends `request` and decodes a 2xx JSON body into `T`.
pub(crate) async fn send_json<T: DeserializeOwned>(
  service: &'static str,
  request: reqwest::RequestBuilder,
) -> Result<T, AdapterError> {
  let bytes = send_bytes(service, request).await?;
  serde_json::from_slice(&bytes).map_err(|e| AdapterError::InvalidResponse {
    service,
    message: e.to_string(),
  })
}

/// Sends `request` and returns the raw 2xx body.
pub(crate) async fn send_bytes(service: &'static str, request: reqwest::RequestBuilder) -> Result<Vec<u8>, AdapterError> {
  let response = send(service, request).await?;
  let bytes = response
    .bytes()
    .await
    .map_err(|e| AdapterError::from_reqwest(service, e))?;
  Ok(bytes.to_vec())
}
