// merchforge/app/src/wiring.rs

//! Builds the concrete adapters, the store and the orchestrator from [`AppConfig`].

use crate::config::AppConfig;
use crate::errors::Result;
use merchforge::adapters::http::build_client;
use merchforge::adapters::{
  Captioner, CloudflareImageGenerator, CommercePublisher, DemoSinkClient, DisabledCaptioner, GeminiTextGenerator,
  HttpCaptioner, ImageGenerator, MockupClient, ShopifyPublisher, TextGenerator,
};
use merchforge::{Orchestrator, OrchestratorSettings, RecordStore, Services};
use std::sync::Arc;
use tracing::info;

pub fn http_client(config: &AppConfig) -> Result<reqwest::Client> {
  Ok(build_client(config.http_timeout)?)
}

pub async fn open_store(config: &AppConfig) -> Result<RecordStore> {
  Ok(RecordStore::connect(&config.database_url, config.mockup_public_url.clone()).await?)
}

pub fn text_generator(config: &AppConfig, client: &reqwest::Client) -> Arc<dyn TextGenerator> {
  Arc::new(GeminiTextGenerator::new(
    client.clone(),
    config.gemini_api_base.clone(),
    config.gemini_model.clone(),
    config.google_api_key.clone(),
  ))
}

pub fn image_generator(config: &AppConfig, client: &reqwest::Client) -> Arc<dyn ImageGenerator> {
  Arc::new(CloudflareImageGenerator::new(
    client.clone(),
    config.cloudflare_api_base.clone(),
    config.cloudflare.clone(),
    config.assets_dir.clone(),
    config.sample_image.clone(),
  ))
}

fn captioner(config: &AppConfig, client: &reqwest::Client) -> Arc<dyn Captioner> {
  match &config.caption_url {
    Some(url) => Arc::new(HttpCaptioner::new(client.clone(), url.clone(), config.caption_api_token.clone())),
    None => {
      info!("No CAPTION_URL configured; captions will be empty.");
      Arc::new(DisabledCaptioner)
    }
  }
}

fn commerce(config: &AppConfig, client: &reqwest::Client) -> Option<Arc<dyn CommercePublisher>> {
  let shopify = config.shopify.as_ref()?;
  Some(Arc::new(ShopifyPublisher::for_store(
    client.clone(),
    &shopify.store,
    &shopify.api_version,
    shopify.access_token.clone(),
  )))
}

pub fn services(config: &AppConfig, client: &reqwest::Client, store: RecordStore) -> Services {
  Services {
    text: text_generator(config, client),
    image: image_generator(config, client),
    mockup: Arc::new(MockupClient::new(client.clone(), config.mockup_url.clone())),
    captioner: captioner(config, client),
    publisher: Arc::new(DemoSinkClient::new(client.clone(), config.publisher_url.clone())),
    commerce: commerce(config, client),
    store,
  }
}

pub fn orchestrator_settings(config: &AppConfig) -> OrchestratorSettings {
  OrchestratorSettings {
    assets_dir: config.assets_dir.clone(),
    mockup_output_dir: config.mockup_output_dir.clone(),
    mockup_color: config.mockup_color.clone(),
    ..OrchestratorSettings::default()
  }
}

pub async fn orchestrator(config: &AppConfig) -> Result<Orchestrator> {
  let client = http_client(config)?;
  let store = open_store(config).await?;
  Ok(Orchestrator::new(
    services(config, &client, store),
    orchestrator_settings(config),
  ))
}
