// merchforge/src/core/context.rs

//! The boxed handler signature stored by a [`crate::Pipeline`].

use crate::core::context_data::ContextData;
use crate::core::control::StepControl;
use std::future::Future;
use std::pin::Pin;

/// A registered step handler.
///
/// Takes a clone of the run context and resolves to a [`StepControl`] or the
/// pipeline's error type. Handlers must release any context guard before their
/// first `.await`.
pub type Handler<TData, Err> = Box<
  dyn Fn(ContextData<TData>) -> Pin<Box<dyn Future<Output = Result<StepControl, Err>> + Send>> + Send + Sync,
>;
