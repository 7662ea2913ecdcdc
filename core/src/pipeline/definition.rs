// merchforge/src/pipeline/definition.rs

//! `Pipeline<TData, Err>` and the methods that shape its list of steps.

use crate::core::context::Handler;
use crate::core::step::{SkipCondition, StepDef};
use crate::error::{FlowError, FlowResult};
use std::collections::HashMap;

/// An ordered list of named steps plus the handlers attached to each phase.
///
/// `TData` is the run context shared by all handlers; `Err` is what handlers
/// fail with, and must absorb engine errors through `From<FlowError>`.
pub struct Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub(crate) steps: Vec<StepDef<TData>>,

  pub(crate) before_handlers: HashMap<String, Vec<Handler<TData, Err>>>,
  pub(crate) on_handlers: HashMap<String, Vec<Handler<TData, Err>>>,
  pub(crate) after_handlers: HashMap<String, Vec<Handler<TData, Err>>>,
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Creates a pipeline from `(name, optional, skip_if)` triples, in run order.
  pub fn new(step_defs: &[(&str, bool, Option<SkipCondition<TData>>)]) -> Self {
    let steps = step_defs
      .iter()
      .map(|(name, optional, skip_if)| StepDef {
        name: (*name).to_string(),
        optional: *optional,
        skip_if: skip_if.clone(),
      })
      .collect();

    Self {
      steps,
      before_handlers: HashMap::new(),
      on_handlers: HashMap::new(),
      after_handlers: HashMap::new(),
    }
  }

  /// Step names in the order they run.
  pub fn step_names(&self) -> Vec<&str> {
    self.steps.iter().map(|s| s.name.as_str()).collect()
  }

  /// Panics when `step_name` is not part of the pipeline.
  ///
  /// Handler registration happens at setup time, so a typo in a step name is a
  /// programming error rather than something to recover from.
  pub(crate) fn ensure_step_exists(&self, step_name: &str) {
    if !self.steps.iter().any(|s| s.name == step_name) {
      panic!("pipeline setup error: step '{}' is not defined", step_name);
    }
  }

  /// Replaces the skip predicate of an existing step.
  pub fn set_skip_condition(&mut self, step_name: &str, skip_if: Option<SkipCondition<TData>>) -> FlowResult<()> {
    let step = self
      .steps
      .iter_mut()
      .find(|s| s.name == step_name)
      .ok_or_else(|| FlowError::StepNotFound {
        step_name: step_name.to_string(),
      })?;
    step.skip_if = skip_if;
    Ok(())
  }

  /// Marks an existing step optional (or required again).
  pub fn set_optional(&mut self, step_name: &str, optional: bool) -> FlowResult<()> {
    let step = self
      .steps
      .iter_mut()
      .find(|s| s.name == step_name)
      .ok_or_else(|| FlowError::StepNotFound {
        step_name: step_name.to_string(),
      })?;
    step.optional = optional;
    Ok(())
  }
}
