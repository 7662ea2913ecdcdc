// merchforge/src/core/context_data.rs
use parking_lot::{RwLock, RwLockReadGuard};
use std::sync::Arc;

/// Shared, lockable state for one pipeline run.
///
/// Every handler receives its own clone; all clones point at the same value.
/// The guard is a blocking lock: take what you need, drop the guard, and only
/// then `.await`.
#[derive(Debug)]
pub struct ContextData<T: Send + Sync + 'static>(Arc<RwLock<T>>);

impl<T: Send + Sync + 'static> ContextData<T> {
  pub fn new(data: T) -> Self {
    ContextData(Arc::new(RwLock::new(data)))
  }

  pub fn read(&self) -> RwLockReadGuard<'_, T> {
    self.0.read()
  }

  /// Runs `f` under a short read lock and returns its result.
  ///
  /// Handy for pulling a few owned values out before an `.await`.
  pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
    f(&self.0.read())
  }

  /// Runs `f` under a short write lock.
  pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
    f(&mut self.0.write())
  }
}

impl<T: Send + Sync + 'static> Clone for ContextData<T> {
  fn clone(&self) -> Self {
    ContextData(Arc::clone(&self.0))
  }
}
