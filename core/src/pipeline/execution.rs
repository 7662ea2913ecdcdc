// merchforge/src/pipeline/execution.rs

//! `Pipeline::run()`: walks the steps in order and drives each phase.

use crate::core::context::Handler;
use crate::core::context_data::ContextData;
use crate::core::control::{FlowOutcome, StepControl};
use crate::error::FlowError;
use crate::pipeline::definition::Pipeline;
use tracing::{event, instrument, span, Instrument, Level};

/// What a single phase of a step decided.
enum PhaseResult {
  Continue,
  Stopped,
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Runs every step against `ctx_data`.
  ///
  /// The first handler error ends the run and is returned unchanged. A
  /// non-optional step without any handler fails with
  /// [`FlowError::HandlerMissing`] converted into `Err`.
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(
      context_type = %std::any::type_name::<TData>(),
      num_steps = self.steps.len(),
    ),
    err(Display)
  )]
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<FlowOutcome, Err> {
    event!(Level::DEBUG, "Pipeline execution starting.");

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_name = step_def.name.as_str();
      let step_span = span!(
        Level::INFO,
        "pipeline_step",
        step_name = step_name,
        step_index = step_idx,
        optional = step_def.optional
      );

      if let Some(skip_if) = &step_def.skip_if {
        if skip_if(ctx_data.clone()) {
          event!(parent: &step_span, Level::INFO, "Step skipped by its skip condition.");
          continue;
        }
      }

      let phases = [
        ("before", self.before_handlers.get(step_name)),
        ("on", self.on_handlers.get(step_name)),
        ("after", self.after_handlers.get(step_name)),
      ];

      let has_handlers = phases.iter().any(|(_, h)| h.is_some_and(|v| !v.is_empty()));
      if !has_handlers {
        if step_def.optional {
          event!(parent: &step_span, Level::DEBUG, "Optional step has no handlers, skipping.");
          continue;
        }
        event!(parent: &step_span, Level::ERROR, "Non-optional step has no handlers.");
        return Err(Err::from(FlowError::HandlerMissing {
          step_name: step_def.name.clone(),
        }));
      }

      for (phase_name, handlers) in phases {
        let Some(handlers) = handlers else { continue };
        let result = Self::run_phase(phase_name, handlers, &ctx_data)
          .instrument(step_span.clone())
          .await?;
        if let PhaseResult::Stopped = result {
          return Ok(FlowOutcome::Stopped);
        }
      }
      event!(parent: &step_span, Level::DEBUG, "Step finished.");
    }

    event!(Level::DEBUG, "Pipeline execution completed.");
    Ok(FlowOutcome::Completed)
  }

  async fn run_phase(
    phase_name: &'static str,
    handlers: &[Handler<TData, Err>],
    ctx_data: &ContextData<TData>,
  ) -> Result<PhaseResult, Err> {
    for (handler_idx, handler_fn) in handlers.iter().enumerate() {
      match handler_fn(ctx_data.clone()).await {
        Ok(StepControl::Continue) => {}
        Ok(StepControl::Stop) => {
          event!(Level::INFO, phase = phase_name, handler_index = handler_idx, "Pipeline stopped by a handler.");
          return Ok(PhaseResult::Stopped);
        }
        Err(e) => {
          event!(Level::ERROR, phase = phase_name, handler_index = handler_idx, error = %e, "Handler failed.");
          return Err(e);
        }
      }
    }
    Ok(PhaseResult::Continue)
  }
}
