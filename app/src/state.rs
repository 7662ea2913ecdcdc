// merchforge/app/src/state.rs
use crate::config::AppConfig;
use merchforge::adapters::{ImageGenerator, TextGenerator};
use merchforge::RecordStore;
use std::sync::Arc;

/// Shared by the listing routes.
#[derive(Clone)]
pub struct AppState {
  pub store: RecordStore,
}

/// Shared by the generator routes; the generator never touches the record store.
#[derive(Clone)]
pub struct GeneratorState {
  pub text: Arc<dyn TextGenerator>,
  pub image: Arc<dyn ImageGenerator>,
  pub config: Arc<AppConfig>,
}
