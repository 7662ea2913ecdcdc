// merchforge/src/adapters/mod.rs

//! Thin clients for the remote services a run talks to.
//!
//! Each service is reached through one trait so the orchestrator can be driven
//! against scripted fakes; the HTTP implementations live in the submodules.

use crate::models::{CommerceReceipt, EnrichedProduct};
use async_trait::async_trait;

pub mod caption;
pub mod commerce;
pub mod error;
pub mod http;
pub mod image;
pub mod mockup;
pub mod publisher;
pub mod text;

pub use caption::{DisabledCaptioner, HttpCaptioner};
pub use commerce::ShopifyPublisher;
pub use error::{AdapterError, FailureKind};
pub use image::{CloudflareCredentials, CloudflareImageGenerator};
pub use mockup::{MockupClient, MockupRequest, MockupResponse};
pub use publisher::{DemoPublishResponse, DemoSinkClient};
pub use text::GeminiTextGenerator;

/// Turns a prompt into free-form listing text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
  async fn generate(&self, prompt: &str) -> Result<String, AdapterError>;
}

/// Renders artwork for a description and returns a reference to it (a local path).
#[async_trait]
pub trait ImageGenerator: Send + Sync {
  async fn generate(&self, description: &str) -> Result<String, AdapterError>;
}

/// Composites artwork onto a product template.
#[async_trait]
pub trait MockupRenderer: Send + Sync {
  async fn render(&self, request: &MockupRequest) -> Result<MockupResponse, AdapterError>;
}

/// Describes an image given as a local path or an `http(s)` URL.
///
/// Callers treat any error as "no caption".
#[async_trait]
pub trait Captioner: Send + Sync {
  async fn caption(&self, image: &str) -> Result<String, AdapterError>;
}

/// The non-authoritative demo sink that hands out the external identifier.
#[async_trait]
pub trait DemoPublisher: Send + Sync {
  async fn publish(&self, product: &EnrichedProduct) -> Result<DemoPublishResponse, AdapterError>;
}

/// The commerce platform. Failures are reported inside the receipt.
#[async_trait]
pub trait CommercePublisher: Send + Sync {
  async fn publish(&self, product: &EnrichedProduct) -> CommerceReceipt;
}
