// merchforge/src/orchestrator/mod.rs

//! Drives one end-to-end run: generate, gate on the record store, mockup,
//! caption, publish, record, then push to the commerce platform.
//!
//! A run is a single pass over a fixed [`Pipeline`]; there are no retries and
//! no back-edges. [`Orchestrator::run_once`] never fails; every way a run can
//! end is described by the returned [`RunReport`].

pub mod context;
pub mod error;
mod steps;

pub use context::{RunContext, RunState};
pub use error::RunError;
pub use steps::basename;

use crate::adapters::{Captioner, CommercePublisher, DemoPublisher, ImageGenerator, MockupRenderer, TextGenerator};
use crate::core::context_data::ContextData;
use crate::core::control::FlowOutcome;
use crate::models::CommerceReceipt;
use crate::pipeline::definition::Pipeline;
use crate::store::RecordStore;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// The listing prompt sent to the text generator on every run.
pub const PRODUCT_PROMPT: &str = "\
You are generating a product listing for a merchandise item to be sold on a Shopify store.

Please provide ONLY the following fields, each on its own line, in this exact format:

Product Title: <a short, catchy product title, 3-5 words, and always end with the product type, e.g., 'Cute Cat T-shirt'>
Product Description: <a 50-70 word description focused on the product's features, style, and appeal; do NOT mention AI or how it was made>
Tags: <a comma-separated list of relevant search tags, e.g. 't-shirt, cat, space'>
Price: <a realistic retail price in dollars, between 10 and 50, with 1 decimal place>
Product Type: <must be one of these three only: t-shirt, cup, or cap. Choose a random one each time.>
Image Prompt: <a detailed and vivid description of the image/design to be printed on the product, like the graphic on a T-shirt or mug>

The product must be a tangible item a t-shirt, cup, or cap, and the image prompt should describe how the product looks visually.

Do NOT include any other text, explanation, or formatting.
";

/// The remote services and the store a run talks to.
///
/// `commerce` is `None` when no commerce credentials are configured; the
/// external publish step is then skipped.
#[derive(Clone)]
pub struct Services {
  pub text: Arc<dyn TextGenerator>,
  pub image: Arc<dyn ImageGenerator>,
  pub mockup: Arc<dyn MockupRenderer>,
  pub captioner: Arc<dyn Captioner>,
  pub publisher: Arc<dyn DemoPublisher>,
  pub commerce: Option<Arc<dyn CommercePublisher>>,
  pub store: RecordStore,
}

#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
  pub prompt: String,
  /// Where generated artwork lands; artwork references are re-rooted here.
  pub assets_dir: PathBuf,
  /// The mockup service's output directory, as seen from this process.
  pub mockup_output_dir: PathBuf,
  pub mockup_color: String,
}

impl Default for OrchestratorSettings {
  fn default() -> Self {
    Self {
      prompt: PRODUCT_PROMPT.to_string(),
      assets_dir: PathBuf::from("demo_assets"),
      mockup_output_dir: PathBuf::from("mockup/output"),
      mockup_color: "white".to_string(),
    }
  }
}

/// How a run ended.
#[derive(Debug)]
pub enum RunOutcome {
  Completed {
    title: String,
    external_id: String,
    /// `None` when commerce publishing was not configured.
    commerce: Option<CommerceReceipt>,
  },
  /// The title was already in the record store; nothing was published.
  Skipped { title: String },
  Aborted { state: RunState, error: RunError },
}

#[derive(Debug)]
pub struct RunReport {
  pub outcome: RunOutcome,
  /// Every state entered, in order, ending with the terminal one.
  pub visited: Vec<RunState>,
}

impl RunReport {
  pub fn final_state(&self) -> RunState {
    match self.outcome {
      RunOutcome::Completed { .. } => RunState::Done,
      RunOutcome::Skipped { .. } | RunOutcome::Aborted { .. } => RunState::Aborted,
    }
  }

  pub fn is_aborted(&self) -> bool {
    matches!(self.outcome, RunOutcome::Aborted { .. })
  }
}

pub struct Orchestrator {
  services: Services,
  settings: Arc<OrchestratorSettings>,
  pipeline: Pipeline<RunContext, RunError>,
}

impl Orchestrator {
  pub fn new(services: Services, settings: OrchestratorSettings) -> Self {
    Self {
      services,
      settings: Arc::new(settings),
      pipeline: steps::build_pipeline(),
    }
  }

  pub fn services(&self) -> &Services {
    &self.services
  }

  pub fn settings(&self) -> &OrchestratorSettings {
    &self.settings
  }

  /// Step names of the underlying pipeline, in run order.
  pub fn step_names(&self) -> Vec<&str> {
    self.pipeline.step_names()
  }

  /// Performs one complete run.
  #[instrument(name = "Orchestrator::run_once", skip_all)]
  pub async fn run_once(&self) -> RunReport {
    let ctx = ContextData::new(RunContext::new(self.services.clone(), Arc::clone(&self.settings)));
    let result = self.pipeline.run(ctx.clone()).await;

    let report = ctx.update(|run| {
      let outcome = match result {
        Ok(FlowOutcome::Completed) => {
          run.enter(RunState::Done);
          RunOutcome::Completed {
            title: run.title(),
            external_id: run.external_id.clone().unwrap_or_default(),
            commerce: run.commerce.clone(),
          }
        }
        Ok(FlowOutcome::Stopped) => {
          let state = run.state;
          run.enter(RunState::Aborted);
          if run.already_published {
            RunOutcome::Skipped { title: run.title() }
          } else {
            RunOutcome::Aborted {
              state,
              error: RunError::MissingContext("a reason for stopping"),
            }
          }
        }
        Err(error) => {
          let state = run.state;
          run.enter(RunState::Aborted);
          RunOutcome::Aborted { state, error }
        }
      };
      RunReport {
        outcome,
        visited: std::mem::take(&mut run.visited),
      }
    });

    match &report.outcome {
      RunOutcome::Completed {
        title,
        external_id,
        commerce,
      } => info!(%title, %external_id, commerce = ?commerce, "Run completed."),
      RunOutcome::Skipped { title } => info!(%title, "Run skipped: already published."),
      RunOutcome::Aborted { state, error } => {
        let kind = error.failure_kind();
        if matches!(error, RunError::RecordAfterPublish { .. }) {
          error!(%state, error = %error, "Run aborted after publishing; the record store is out of step.");
        } else {
          warn!(%state, failure_kind = ?kind, diagnostic = %error.diagnostic(), "Run aborted.");
        }
      }
    }
    report
  }
}
