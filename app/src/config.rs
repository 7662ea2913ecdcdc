// merchforge/app/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use merchforge::adapters::commerce::DEFAULT_SHOPIFY_API_VERSION;
use merchforge::adapters::image::DEFAULT_CLOUDFLARE_API_BASE;
use merchforge::adapters::text::{DEFAULT_GEMINI_API_BASE, DEFAULT_GEMINI_MODEL};
use merchforge::adapters::CloudflareCredentials;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopifyConfig {
  pub store: String,
  pub access_token: String,
  pub api_version: String,
}

/// A sibling service the supervisor starts and waits for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceCommand {
  pub name: &'static str,
  /// Whitespace-separated program and arguments.
  pub command: String,
  pub working_dir: PathBuf,
  /// Polled with `GET` until it answers 200.
  pub ready_url: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub database_url: String,
  pub http_timeout: Duration,

  pub google_api_key: Option<String>,
  pub gemini_api_base: String,
  pub gemini_model: String,

  pub cloudflare_api_base: String,
  pub cloudflare: Option<CloudflareCredentials>,
  pub assets_dir: PathBuf,
  pub sample_image: PathBuf,

  pub mockup_url: String,
  pub mockup_output_dir: PathBuf,
  pub mockup_color: String,
  pub mockup_public_url: String,

  pub caption_url: Option<String>,
  pub caption_api_token: Option<String>,

  pub publisher_url: String,

  pub shopify: Option<ShopifyConfig>,

  pub server_host: String,
  pub generator_port: u16,
  pub listing_port: u16,
  pub generator_output_dir: PathBuf,

  pub mockup_service: ServiceCommand,
  pub publisher_service: ServiceCommand,
  pub readiness_retries: u32,
  pub readiness_delay: Duration,
}

impl AppConfig {
  /// Reads the process environment, after loading `.env` if there is one.
  pub fn from_env() -> Result<Self> {
    dotenv().ok();
    Self::from_lookup(|name| env::var(name).ok())
  }

  /// Builds the configuration from any variable source. Empty values count as unset.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
    let get_or = |name: &str, default: &str| get(name).unwrap_or_else(|| default.to_string());

    let mockup_url = get_or("MOCKUP_URL", "http://localhost:3000").trim_end_matches('/').to_string();
    let publisher_url = get_or("PUBLISHER_URL", "http://localhost:8000/api.php");

    let cloudflare = match (get("CLOUDFLARE_ACCOUNT_ID"), get("CLOUDFLARE_API_TOKEN")) {
      (Some(account_id), Some(api_token)) => Some(CloudflareCredentials { account_id, api_token }),
      _ => None,
    };

    let shopify = match (get("SHOPIFY_STORE"), get("SHOPIFY_ACCESS_TOKEN")) {
      (Some(store), Some(access_token)) => Some(ShopifyConfig {
        store,
        access_token,
        api_version: get_or("SHOPIFY_API_VERSION", DEFAULT_SHOPIFY_API_VERSION),
      }),
      _ => None,
    };

    let config = Self {
      database_url: get_or("DATABASE_URL", "sqlite://state.db"),
      http_timeout: Duration::from_secs(parse_var(&get, "HTTP_TIMEOUT_SECS", 60u64)?),

      google_api_key: get("GOOGLE_API_KEY"),
      gemini_api_base: get_or("GEMINI_API_BASE", DEFAULT_GEMINI_API_BASE),
      gemini_model: get_or("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),

      cloudflare_api_base: get_or("CLOUDFLARE_API_BASE", DEFAULT_CLOUDFLARE_API_BASE),
      cloudflare,
      assets_dir: PathBuf::from(get_or("ASSETS_DIR", "demo_assets")),
      sample_image: PathBuf::from(get_or("SAMPLE_IMAGE", "demo_assets/sample_image.png")),

      mockup_public_url: get("MOCKUP_PUBLIC_URL").unwrap_or_else(|| mockup_url.clone()),
      mockup_output_dir: PathBuf::from(get_or("MOCKUP_OUTPUT_DIR", "mockup/output")),
      mockup_color: get_or("MOCKUP_COLOR", "white"),

      caption_url: get("CAPTION_URL"),
      caption_api_token: get("CAPTION_API_TOKEN"),

      shopify,

      server_host: get_or("SERVER_HOST", "127.0.0.1"),
      generator_port: parse_var(&get, "GENERATOR_PORT", 8001u16)?,
      listing_port: parse_var(&get, "LISTING_PORT", 5001u16)?,
      generator_output_dir: PathBuf::from(get_or("GENERATOR_OUTPUT_DIR", "output")),

      mockup_service: ServiceCommand {
        name: "mockup",
        command: get_or("MOCKUP_SERVICE_CMD", "node server.js"),
        working_dir: PathBuf::from(get_or("MOCKUP_SERVICE_DIR", "../mockup")),
        ready_url: format!("{}/", mockup_url),
      },
      publisher_service: ServiceCommand {
        name: "publisher",
        command: get_or("PUBLISHER_SERVICE_CMD", "php -S localhost:8000"),
        working_dir: PathBuf::from(get_or("PUBLISHER_SERVICE_DIR", "../publisher")),
        ready_url: publisher_url.clone(),
      },
      readiness_retries: parse_var(&get, "READINESS_RETRIES", 10u32)?,
      readiness_delay: Duration::from_secs(parse_var(&get, "READINESS_DELAY_SECS", 3u64)?),

      mockup_url,
      publisher_url,
    };

    tracing::info!(
      database_url = %config.database_url,
      text_generation = config.google_api_key.is_some(),
      image_generation = config.cloudflare.is_some(),
      captioning = config.caption_url.is_some(),
      commerce = config.shopify.is_some(),
      "Application configuration loaded."
    );
    Ok(config)
  }
}

fn parse_var<T>(get: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> Result<T>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  match get(name) {
    None => Ok(default),
    Some(raw) => raw
      .parse::<T>()
      .map_err(|e| AppError::Config(format!("Invalid {} value '{}': {}", name, raw, e))),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;
  use std::collections::HashMap;

  fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig> {
    let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    AppConfig::from_lookup(|name| vars.get(name).cloned())
  }

  #[test]
  fn defaults_apply_when_nothing_is_set() {
    let config = config_from(&[]).unwrap();

    assert_eq!(config.database_url, "sqlite://state.db");
    assert_eq!(config.http_timeout, Duration::from_secs(60));
    assert_eq!(config.google_api_key, None);
    assert!(config.cloudflare.is_none());
    assert!(config.shopify.is_none());
    assert_eq!(config.mockup_url, "http://localhost:3000");
    assert_eq!(config.mockup_public_url, "http://localhost:3000");
    assert_eq!(config.mockup_color, "white");
    assert_eq!(config.publisher_url, "http://localhost:8000/api.php");
    assert_eq!(config.generator_port, 8001);
    assert_eq!(config.listing_port, 5001);
    assert_eq!(config.readiness_retries, 10);
    assert_eq!(config.readiness_delay, Duration::from_secs(3));
    assert_eq!(config.mockup_service.ready_url, "http://localhost:3000/");
    assert_eq!(config.publisher_service.ready_url, "http://localhost:8000/api.php");
  }

  #[test]
  fn credentials_need_both_halves() {
    let config = config_from(&[("CLOUDFLARE_API_TOKEN", "tok"), ("SHOPIFY_STORE", "demo.myshopify.com")]).unwrap();
    assert!(config.cloudflare.is_none());
    assert!(config.shopify.is_none());

    let config = config_from(&[
      ("CLOUDFLARE_API_TOKEN", "tok"),
      ("CLOUDFLARE_ACCOUNT_ID", "acct"),
      ("SHOPIFY_STORE", "demo.myshopify.com"),
      ("SHOPIFY_ACCESS_TOKEN", "shpat"),
    ])
    .unwrap();
    assert_eq!(config.cloudflare.map(|c| c.account_id), Some("acct".to_string()));
    let shopify = config.shopify.unwrap();
    assert_eq!(shopify.store, "demo.myshopify.com");
    assert_eq!(shopify.api_version, "2023-07");
  }

  #[test]
  fn empty_values_count_as_unset() {
    let config = config_from(&[("GOOGLE_API_KEY", "  "), ("LISTING_PORT", "")]).unwrap();
    assert_eq!(config.google_api_key, None);
    assert_eq!(config.listing_port, 5001);
  }

  #[test]
  fn public_url_can_differ_from_service_url() {
    let config = config_from(&[("MOCKUP_URL", "http://mockup:3000/"), ("MOCKUP_PUBLIC_URL", "https://cdn.example")]).unwrap();
    assert_eq!(config.mockup_url, "http://mockup:3000");
    assert_eq!(config.mockup_public_url, "https://cdn.example");
  }

  #[test]
  fn malformed_numbers_are_config_errors() {
    for (name, value) in [("HTTP_TIMEOUT_SECS", "soon"), ("LISTING_PORT", "70000"), ("READINESS_RETRIES", "-1")] {
      match config_from(&[(name, value)]) {
        Err(AppError::Config(message)) => assert!(message.contains(name), "{}", message),
        other => panic!("expected a config error for {}, got {:?}", name, other.map(|_| ())),
      }
    }
  }

  #[test]
  #[serial]
  fn process_environment_is_read() {
    env::set_var("GENERATOR_OUTPUT_DIR", "/tmp/merch-out");
    let config = AppConfig::from_env();
    env::remove_var("GENERATOR_OUTPUT_DIR");

    assert_eq!(config.unwrap().generator_output_dir, PathBuf::from("/tmp/merch-out"));
  }
}
