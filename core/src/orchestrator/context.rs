// merchforge/src/orchestrator/context.rs

//! Run states and the mutable context threaded through one run.

use crate::models::{CommerceReceipt, EnrichedProduct, ProductDraft};
use crate::orchestrator::error::RunError;
use crate::orchestrator::{OrchestratorSettings, Services};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Where a run is. The order is fixed; there are no back-edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunState {
  Generating,
  CheckingIdempotency,
  MockupRequested,
  Captioning,
  PublishingLocal,
  Recording,
  PublishingExternal,
  Done,
  Aborted,
}

impl RunState {
  /// States that own a pipeline step, in run order.
  pub const STEPS: [RunState; 7] = [
    RunState::Generating,
    RunState::CheckingIdempotency,
    RunState::MockupRequested,
    RunState::Captioning,
    RunState::PublishingLocal,
    RunState::Recording,
    RunState::PublishingExternal,
  ];

  pub fn step_name(self) -> &'static str {
    match self {
      RunState::Generating => "generating",
      RunState::CheckingIdempotency => "checking_idempotency",
      RunState::MockupRequested => "mockup_requested",
      RunState::Captioning => "captioning",
      RunState::PublishingLocal => "publishing_local",
      RunState::Recording => "recording",
      RunState::PublishingExternal => "publishing_external",
      RunState::Done => "done",
      RunState::Aborted => "aborted",
    }
  }

  pub fn from_step_name(name: &str) -> Option<Self> {
    Self::STEPS.into_iter().find(|s| s.step_name() == name)
  }
}

impl fmt::Display for RunState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.step_name().to_uppercase())
  }
}

/// Everything one run knows. Lives inside a [`crate::ContextData`].
pub struct RunContext {
  pub services: Services,
  pub settings: Arc<OrchestratorSettings>,

  pub state: RunState,
  /// States entered so far, in order.
  pub visited: Vec<RunState>,

  pub draft: Option<ProductDraft>,
  pub image_path: Option<PathBuf>,
  pub mockup_path: Option<PathBuf>,
  pub caption: String,
  pub external_id: Option<String>,
  pub commerce: Option<CommerceReceipt>,
  pub already_published: bool,
}

impl RunContext {
  pub fn new(services: Services, settings: Arc<OrchestratorSettings>) -> Self {
    Self {
      services,
      settings,
      state: RunState::Generating,
      visited: Vec::new(),
      draft: None,
      image_path: None,
      mockup_path: None,
      caption: String::new(),
      external_id: None,
      commerce: None,
      already_published: false,
    }
  }

  pub fn enter(&mut self, state: RunState) {
    self.state = state;
    self.visited.push(state);
  }

  pub fn draft(&self) -> Result<&ProductDraft, RunError> {
    self.draft.as_ref().ok_or(RunError::MissingContext("a product draft"))
  }

  pub fn title(&self) -> String {
    self.draft.as_ref().map(|d| d.title.clone()).unwrap_or_default()
  }

  /// The publish payload; needs the artwork and mockup paths.
  pub fn enriched(&self) -> Result<EnrichedProduct, RunError> {
    let image_path = self.image_path.clone().ok_or(RunError::MissingContext("the artwork path"))?;
    let mockup_path = self.mockup_path.clone().ok_or(RunError::MissingContext("the mockup path"))?;
    Ok(self.draft()?.enrich(image_path, mockup_path, self.caption.clone()))
  }
}
