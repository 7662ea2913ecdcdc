// tests/common/mod.rs
#![allow(dead_code)] // Each test binary uses a different subset.

use async_trait::async_trait;
use merchforge::adapters::{
  AdapterError, Captioner, CommercePublisher, DemoPublishResponse, DemoPublisher, ImageGenerator, MockupRenderer,
  MockupRequest, MockupResponse, TextGenerator,
};
use merchforge::orchestrator::{OrchestratorSettings, Services};
use merchforge::{CommerceReceipt, EnrichedProduct, FlowError, RecordStore};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::Level;

// --- Tracing ---
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Engine test context ---
#[derive(Clone, Debug, Default)]
pub struct TestContext {
  pub steps_executed: Vec<String>,
  pub should_stop_at: Option<String>,
  pub skip_b: bool,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  #[error("engine: {0}")]
  Flow(String),

  #[error("handler failed: {0}")]
  Handler(String),
}

impl From<FlowError> for TestError {
  fn from(e: FlowError) -> Self {
    TestError::Flow(e.to_string())
  }
}

// --- Store ---
pub const MOCKUP_PUBLIC_URL: &str = "http://localhost:3000";

pub async fn memory_store() -> RecordStore {
  RecordStore::connect("sqlite::memory:", MOCKUP_PUBLIC_URL)
    .await
    .expect("in-memory store")
}

// --- Scripted adapters ---
pub const MOCKUP_FILE: &str = "mockup_42.png";
pub const SAMPLE_IMAGE: &str = "demo_assets/sample_image.png";

#[derive(Debug, Default)]
pub struct Calls {
  pub text: AtomicUsize,
  pub image: AtomicUsize,
  pub mockup: AtomicUsize,
  pub caption: AtomicUsize,
  pub publish: AtomicUsize,
  pub commerce: AtomicUsize,
}

impl Calls {
  pub fn get(counter: &AtomicUsize) -> usize {
    counter.load(Ordering::SeqCst)
  }

  pub fn remote_after_gate(&self) -> usize {
    Self::get(&self.image)
      + Self::get(&self.mockup)
      + Self::get(&self.caption)
      + Self::get(&self.publish)
      + Self::get(&self.commerce)
  }
}

/// What each fake does. `Some(status)` makes the call fail with that HTTP status.
#[derive(Debug, Clone)]
pub struct Script {
  pub listing: String,
  pub text_status: Option<u16>,
  pub mockup_status: Option<u16>,
  pub caption_status: Option<u16>,
  pub caption: String,
  pub publish_status: Option<u16>,
  pub external_id: String,
  pub commerce: Option<CommerceReceipt>,
}

impl Default for Script {
  fn default() -> Self {
    Self {
      listing: merchforge::adapters::text::DEMO_LISTING.to_string(),
      text_status: None,
      mockup_status: None,
      caption_status: None,
      caption: "a cat in a spacesuit on a white t-shirt".to_string(),
      publish_status: None,
      external_id: "fake_1001".to_string(),
      commerce: None,
    }
  }
}

fn status(service: &'static str, status: u16) -> AdapterError {
  AdapterError::Status {
    service,
    status,
    detail: "scripted failure".to_string(),
  }
}

#[derive(Default)]
pub struct Seen {
  pub prompt: Mutex<Option<String>>,
  pub image_description: Mutex<Option<String>>,
  pub mockup_request: Mutex<Option<MockupRequest>>,
  pub captioned: Mutex<Option<String>>,
  pub published: Mutex<Option<EnrichedProduct>>,
  pub commerce_published: Mutex<Option<EnrichedProduct>>,
}

pub struct Fakes {
  pub script: Script,
  pub calls: Arc<Calls>,
  pub seen: Arc<Seen>,
}

impl Fakes {
  pub fn new(script: Script) -> Arc<Self> {
    Arc::new(Self {
      script,
      calls: Arc::new(Calls::default()),
      seen: Arc::new(Seen::default()),
    })
  }

  pub fn services(self: &Arc<Self>, store: RecordStore) -> Services {
    Services {
      text: Arc::new(FakeText(Arc::clone(self))),
      image: Arc::new(FakeImage(Arc::clone(self))),
      mockup: Arc::new(FakeMockup(Arc::clone(self))),
      captioner: Arc::new(FakeCaptioner(Arc::clone(self))),
      publisher: Arc::new(FakePublisher(Arc::clone(self))),
      commerce: self
        .script
        .commerce
        .as_ref()
        .map(|_| Arc::new(FakeCommerce(Arc::clone(self))) as Arc<dyn CommercePublisher>),
      store,
    }
  }
}

pub fn settings(root: &Path) -> OrchestratorSettings {
  OrchestratorSettings {
    assets_dir: root.join("assets"),
    mockup_output_dir: root.join("mockup").join("output"),
    ..OrchestratorSettings::default()
  }
}

struct FakeText(Arc<Fakes>);
struct FakeImage(Arc<Fakes>);
struct FakeMockup(Arc<Fakes>);
struct FakeCaptioner(Arc<Fakes>);
struct FakePublisher(Arc<Fakes>);
struct FakeCommerce(Arc<Fakes>);

#[async_trait]
impl TextGenerator for FakeText {
  async fn generate(&self, prompt: &str) -> Result<String, AdapterError> {
    self.0.calls.text.fetch_add(1, Ordering::SeqCst);
    *self.0.seen.prompt.lock() = Some(prompt.to_string());
    match self.0.script.text_status {
      Some(code) => Err(status("text generation service", code)),
      None => Ok(self.0.script.listing.clone()),
    }
  }
}

#[async_trait]
impl ImageGenerator for FakeImage {
  async fn generate(&self, description: &str) -> Result<String, AdapterError> {
    self.0.calls.image.fetch_add(1, Ordering::SeqCst);
    *self.0.seen.image_description.lock() = Some(description.to_string());
    Ok(SAMPLE_IMAGE.to_string())
  }
}

#[async_trait]
impl MockupRenderer for FakeMockup {
  async fn render(&self, request: &MockupRequest) -> Result<MockupResponse, AdapterError> {
    self.0.calls.mockup.fetch_add(1, Ordering::SeqCst);
    *self.0.seen.mockup_request.lock() = Some(request.clone());
    match self.0.script.mockup_status {
      Some(code) => Err(status("mockup service", code)),
      None => Ok(MockupResponse {
        mockup_url: format!("{}/output/{}", MOCKUP_PUBLIC_URL, MOCKUP_FILE),
        mockup_id: Some("42".to_string()),
      }),
    }
  }
}

#[async_trait]
impl Captioner for FakeCaptioner {
  async fn caption(&self, image: &str) -> Result<String, AdapterError> {
    self.0.calls.caption.fetch_add(1, Ordering::SeqCst);
    *self.0.seen.captioned.lock() = Some(image.to_string());
    match self.0.script.caption_status {
      Some(code) => Err(status("captioning service", code)),
      None => Ok(self.0.script.caption.clone()),
    }
  }
}

#[async_trait]
impl DemoPublisher for FakePublisher {
  async fn publish(&self, product: &EnrichedProduct) -> Result<DemoPublishResponse, AdapterError> {
    self.0.calls.publish.fetch_add(1, Ordering::SeqCst);
    *self.0.seen.published.lock() = Some(product.clone());
    match self.0.script.publish_status {
      Some(code) => Err(status("publisher", code)),
      None => Ok(DemoPublishResponse {
        fake_product_id: self.0.script.external_id.clone(),
        status: Some("success".to_string()),
        message: None,
      }),
    }
  }
}

#[async_trait]
impl CommercePublisher for FakeCommerce {
  async fn publish(&self, product: &EnrichedProduct) -> CommerceReceipt {
    self.0.calls.commerce.fetch_add(1, Ordering::SeqCst);
    *self.0.seen.commerce_published.lock() = Some(product.clone());
    self
      .0
      .script
      .commerce
      .clone()
      .unwrap_or_else(|| CommerceReceipt::error("not scripted"))
  }
}

// --- One-shot HTTP peer for adapter tests ---

/// Accepts a single connection, captures the request and answers with
/// `status_line` (e.g. `"200 OK"`) and a JSON `body`.
pub async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
  let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
  let addr = listener.local_addr().expect("local addr");
  let handle = tokio::spawn(async move {
    let (mut socket, _) = listener.accept().await.expect("accept");
    let request = read_request(&mut socket).await;
    let response = format!(
      "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
      status_line,
      body.len(),
      body
    );
    socket.write_all(response.as_bytes()).await.expect("write response");
    socket.shutdown().await.ok();
    request
  });
  (format!("http://{}", addr), handle)
}

/// Accepts one connection per entry of `responses`, in order, and returns the
/// captured requests once every response has been written.
pub async fn serve_sequence(responses: Vec<(&'static str, &'static str)>) -> (String, JoinHandle<Vec<String>>) {
  let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
  let addr = listener.local_addr().expect("local addr");
  let handle = tokio::spawn(async move {
    let mut requests = Vec::with_capacity(responses.len());
    for (status_line, body) in responses {
      let (mut socket, _) = listener.accept().await.expect("accept");
      requests.push(read_request(&mut socket).await);
      let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_line,
        body.len(),
        body
      );
      socket.write_all(response.as_bytes()).await.expect("write response");
      socket.shutdown().await.ok();
    }
    requests
  });
  (format!("http://{}", addr), handle)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
  let mut buf = Vec::new();
  let mut chunk = [0u8; 4096];
  loop {
    let n = socket.read(&mut chunk).await.expect("read request");
    if n == 0 {
      break;
    }
    buf.extend_from_slice(&chunk[..n]);
    if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
      let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
      let body_len = head
        .lines()
        .find_map(|l| l.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);
      if buf.len() >= end + 4 + body_len {
        break;
      }
    }
  }
  String::from_utf8_lossy(&buf).into_owned()
}

/// A local port nothing listens on.
pub async fn closed_port_url() -> String {
  let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
  let addr = listener.local_addr().expect("local addr");
  drop(listener);
  format!("http://{}", addr)
}
