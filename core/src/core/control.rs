// merchforge/src/core/control.rs

//! Signals a handler returns to steer the run, and the outcome of a full run.

/// Returned by every handler to tell the pipeline what to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepControl {
  /// Keep going: remaining handlers of this step, then the next step.
  Continue,
  /// Halt the run without an error. Nothing after this handler executes.
  Stop,
}

/// How a run ended when no handler failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowOutcome {
  /// Every step that was not skipped ran to the end.
  Completed,
  /// A handler returned [`StepControl::Stop`].
  Stopped,
}
