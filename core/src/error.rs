// merchforge/src/error.rs
use thiserror::Error;

/// Errors raised by the pipeline engine itself, as opposed to its handlers.
#[derive(Debug, Error)]
pub enum FlowError {
  #[error("Step not found: {step_name}")]
  StepNotFound { step_name: String },

  #[error("Handler missing for non-optional step: {step_name}")]
  HandlerMissing { step_name: String },
}

pub type FlowResult<T, E = FlowError> = std::result::Result<T, E>;
