// merchforge/src/pipeline/hooks.rs

//! Registration of `before`, `on` and `after` handlers.
//!
//! Handlers may fail with any error that converts into the pipeline's `Err`;
//! the conversion happens once, when the handler is boxed.

use crate::core::context::Handler;
use crate::core::context_data::ContextData;
use crate::core::control::StepControl;
use crate::error::FlowError;
use crate::pipeline::definition::Pipeline;
use std::collections::HashMap;
use std::future::Future;

fn boxed<TData, Err, F, UserErr>(handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static) -> Handler<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: 'static,
  F: Future<Output = Result<StepControl, UserErr>> + Send + 'static,
  UserErr: Into<Err> + Send + Sync + 'static,
{
  Box::new(move |ctx_data| {
    let user_fut = handler_fn(ctx_data);
    Box::pin(async move { user_fut.await.map_err(Into::into) })
  })
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  fn push_handler(
    phase: &mut HashMap<String, Vec<Handler<TData, Err>>>,
    step_name: &str,
    handler: Handler<TData, Err>,
  ) {
    phase.entry(step_name.to_string()).or_default().push(handler);
  }

  /// Adds a handler that runs before the step's `on` handlers.
  pub fn before<F, UserErr>(&mut self, step_name: &str, handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static)
  where
    F: Future<Output = Result<StepControl, UserErr>> + Send + 'static,
    UserErr: Into<Err> + Send + Sync + 'static,
  {
    self.ensure_step_exists(step_name);
    Self::push_handler(&mut self.before_handlers, step_name, boxed(handler_fn));
  }

  /// Adds a main handler for the step.
  pub fn on<F, UserErr>(&mut self, step_name: &str, handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static)
  where
    F: Future<Output = Result<StepControl, UserErr>> + Send + 'static,
    UserErr: Into<Err> + Send + Sync + 'static,
  {
    self.ensure_step_exists(step_name);
    Self::push_handler(&mut self.on_handlers, step_name, boxed(handler_fn));
  }

  /// Adds a handler that runs after the step's `on` handlers.
  pub fn after<F, UserErr>(&mut self, step_name: &str, handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static)
  where
    F: Future<Output = Result<StepControl, UserErr>> + Send + 'static,
    UserErr: Into<Err> + Send + Sync + 'static,
  {
    self.ensure_step_exists(step_name);
    Self::push_handler(&mut self.after_handlers, step_name, boxed(handler_fn));
  }

  /// Adds the same `before` handler to every step, in step order.
  ///
  /// Used for cross-cutting bookkeeping such as recording which step is
  /// currently executing.
  pub fn before_each<F, UserErr>(&mut self, handler_fn: impl Fn(&str, ContextData<TData>) -> F + Send + Sync + Clone + 'static)
  where
    F: Future<Output = Result<StepControl, UserErr>> + Send + 'static,
    UserErr: Into<Err> + Send + Sync + 'static,
  {
    let names: Vec<String> = self.steps.iter().map(|s| s.name.clone()).collect();
    for name in names {
      let f = handler_fn.clone();
      let step_name = name.clone();
      Self::push_handler(
        &mut self.before_handlers,
        &name,
        boxed(move |ctx_data| f(&step_name, ctx_data)),
      );
    }
  }
}
