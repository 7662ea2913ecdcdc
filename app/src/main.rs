// merchforge/app/src/main.rs

mod config;
mod errors;
mod state;
mod supervisor;
mod web;
mod wiring;

use crate::config::AppConfig;
use crate::state::{AppState, GeneratorState};

use actix_web::{web as actix_data, App, HttpServer};
use clap::{Parser, Subcommand};
use merchforge::{RunOutcome, RunReport};
use serde_json::json;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Debug, Parser)]
#[command(name = "merchctl", version, about = "Demo merchandise pipeline: generate, mock up, caption and publish")]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
  /// Run the pipeline once and print the report.
  Run,
  /// Serve the generation API (`POST /generate`).
  Generator,
  /// Serve the read-only listing of published products.
  Listing,
  /// Start the sibling services, run once, then stop them.
  Supervise,
}

#[actix_web::main]
async fn main() -> anyhow::Result<ExitCode> {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_span_events(FmtSpan::CLOSE)
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let app_config = Arc::new(AppConfig::from_env()?);

  match cli.command {
    Command::Run => run(&app_config).await,
    Command::Generator => serve_generator(app_config).await,
    Command::Listing => serve_listing(app_config).await,
    Command::Supervise => supervisor::supervise(&app_config).await,
  }
}

async fn run(app_config: &AppConfig) -> anyhow::Result<ExitCode> {
  tracing::info!("Starting orchestrator run...");
  let orchestrator = wiring::orchestrator(app_config).await?;
  let report = orchestrator.run_once().await;

  println!("{}", serde_json::to_string_pretty(&report_json(&report))?);
  Ok(if report.is_aborted() {
    ExitCode::FAILURE
  } else {
    ExitCode::SUCCESS
  })
}

fn report_json(report: &RunReport) -> serde_json::Value {
  let visited: Vec<String> = report.visited.iter().map(|s| s.to_string()).collect();
  let finished_at = chrono::Utc::now().to_rfc3339();
  match &report.outcome {
    RunOutcome::Completed {
      title,
      external_id,
      commerce,
    } => json!({
      "outcome": "completed",
      "title": title,
      "external_id": external_id,
      "commerce": commerce,
      "visited": visited,
      "finished_at": finished_at,
    }),
    RunOutcome::Skipped { title } => json!({
      "outcome": "skipped",
      "reason": "already published",
      "title": title,
      "visited": visited,
      "finished_at": finished_at,
    }),
    RunOutcome::Aborted { state, error } => json!({
      "outcome": "aborted",
      "state": state.to_string(),
      "error": error.to_string(),
      "diagnostic": error.diagnostic(),
      "visited": visited,
      "finished_at": finished_at,
    }),
  }
}

async fn serve_generator(app_config: Arc<AppConfig>) -> anyhow::Result<ExitCode> {
  let client = wiring::http_client(&app_config)?;
  let state = GeneratorState {
    text: wiring::text_generator(&app_config, &client),
    image: wiring::image_generator(&app_config, &client),
    config: app_config.clone(),
  };

  let server_address = format!("{}:{}", app_config.server_host, app_config.generator_port);
  tracing::info!("Generator listening on {}", server_address);
  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(web::configure_generator_routes)
  })
  .bind(&server_address)?
  .run()
  .await?;
  Ok(ExitCode::SUCCESS)
}

async fn serve_listing(app_config: Arc<AppConfig>) -> anyhow::Result<ExitCode> {
  let state = AppState {
    store: wiring::open_store(&app_config).await?,
  };

  let server_address = format!("{}:{}", app_config.server_host, app_config.listing_port);
  tracing::info!("Listing view on {}", server_address);
  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(web::configure_listing_routes)
  })
  .bind(&server_address)?
  .run()
  .await?;
  Ok(ExitCode::SUCCESS)
}
