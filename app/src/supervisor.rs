// merchforge/app/src/supervisor.rs

//! Starts the sibling services, waits for them, runs one orchestrator pass as a
//! child process and tears everything down again.

use crate::config::{AppConfig, ServiceCommand};
use crate::errors::AppError;
use anyhow::{bail, Context};
use std::process::{ExitCode, Stdio};
use std::time::Duration;
use tokio::process::{Child, Command};
use tracing::{error, info, warn};

const READINESS_TIMEOUT: Duration = Duration::from_secs(2);
const LOG_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

struct Running {
  name: &'static str,
  child: Child,
}

/// Splits `"php -S localhost:8000"` into program and arguments.
pub fn split_command(command: &str) -> Result<(String, Vec<String>), AppError> {
  let mut parts = command.split_whitespace().map(str::to_string);
  let program = parts
    .next()
    .ok_or_else(|| AppError::Config(format!("empty service command '{}'", command)))?;
  Ok((program, parts.collect()))
}

fn spawn(service: &ServiceCommand) -> anyhow::Result<Child> {
  let (program, args) = split_command(&service.command)?;
  info!(service = service.name, %program, dir = %service.working_dir.display(), "Starting service.");
  Command::new(&program)
    .args(&args)
    .current_dir(&service.working_dir)
    .stdout(Stdio::piped())
    .stderr(Stdio::piped())
    .kill_on_drop(true)
    .spawn()
    .with_context(|| format!("starting the {} service ({})", service.name, service.command))
}

/// Polls `url` until it answers 200, at most `retries` times with `delay` in between.
pub async fn wait_until_ready(client: &reqwest::Client, url: &str, retries: u32, delay: Duration) -> bool {
  for attempt in 1..=retries {
    match client.get(url).timeout(READINESS_TIMEOUT).send().await {
      Ok(response) if response.status() == reqwest::StatusCode::OK => {
        info!(%url, "Service is up.");
        return true;
      }
      Ok(response) => info!(%url, status = response.status().as_u16(), attempt, retries, "Service not ready yet."),
      Err(e) => info!(%url, error = %e, attempt, retries, "Waiting for service."),
    }
    tokio::time::sleep(delay).await;
  }
  false
}

/// Stops the service and prints whatever it wrote.
async fn terminate(running: Running) {
  let Running { name, mut child } = running;
  if let Err(e) = child.start_kill() {
    warn!(service = name, error = %e, "Could not signal service.");
  }
  match tokio::time::timeout(LOG_DRAIN_TIMEOUT, child.wait_with_output()).await {
    Ok(Ok(output)) => {
      if !output.stdout.is_empty() {
        println!("[{} STDOUT]\n{}", name, String::from_utf8_lossy(&output.stdout));
      }
      if !output.stderr.is_empty() {
        println!("[{} STDERR]\n{}", name, String::from_utf8_lossy(&output.stderr));
      }
    }
    Ok(Err(e)) => warn!(service = name, error = %e, "Could not collect service output."),
    Err(_) => warn!(service = name, "Timed out collecting service output."),
  }
}

async fn start_all(config: &AppConfig, client: &reqwest::Client, running: &mut Vec<Running>) -> anyhow::Result<()> {
  let services = [&config.mockup_service, &config.publisher_service];
  for service in services {
    let child = spawn(service)?;
    running.push(Running {
      name: service.name,
      child,
    });
  }
  for service in services {
    if !wait_until_ready(client, &service.ready_url, config.readiness_retries, config.readiness_delay).await {
      bail!("{} service did not become ready at {}", service.name, service.ready_url);
    }
  }
  Ok(())
}

/// Runs `merchctl run` once and echoes its output.
async fn run_orchestrator() -> anyhow::Result<bool> {
  let exe = std::env::current_exe().context("locating the merchctl binary")?;
  info!("All services running. Starting orchestrator.");
  let output = Command::new(exe)
    .arg("run")
    .output()
    .await
    .context("running the orchestrator")?;

  println!("Orchestrator output:\n{}", String::from_utf8_lossy(&output.stdout));
  if !output.status.success() {
    error!(status = %output.status, "Orchestrator failed.");
    println!("Orchestrator failed:\n{}", String::from_utf8_lossy(&output.stderr));
  }
  Ok(output.status.success())
}

pub async fn supervise(config: &AppConfig) -> anyhow::Result<ExitCode> {
  let client = reqwest::Client::new();
  let mut running = Vec::new();

  let result = match start_all(config, &client, &mut running).await {
    Ok(()) => run_orchestrator().await,
    Err(e) => Err(e),
  };

  info!("Terminating all services.");
  for service in running {
    terminate(service).await;
  }
  info!("All services terminated.");

  match result {
    Ok(true) => Ok(ExitCode::SUCCESS),
    Ok(false) => Ok(ExitCode::FAILURE),
    Err(e) => {
      error!(error = %format!("{:#}", e), "Error during startup or orchestrator run.");
      Ok(ExitCode::FAILURE)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tokio::io::{AsyncReadExt, AsyncWriteExt};
  use tokio::net::TcpListener;

  #[test]
  fn commands_split_on_whitespace() {
    let (program, args) = split_command("php  -S localhost:8000").unwrap();
    assert_eq!(program, "php");
    assert_eq!(args, vec!["-S", "localhost:8000"]);

    assert!(matches!(split_command("   "), Err(AppError::Config(_))));
  }

  #[tokio::test]
  async fn unreachable_service_is_never_ready() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/", listener.local_addr().unwrap());
    drop(listener);

    let ready = wait_until_ready(&reqwest::Client::new(), &url, 2, Duration::from_millis(10)).await;
    assert!(!ready);
  }

  #[tokio::test]
  async fn service_answering_200_is_ready() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/", listener.local_addr().unwrap());
    tokio::spawn(async move {
      let (mut socket, _) = listener.accept().await.unwrap();
      let mut buf = [0u8; 1024];
      let _ = socket.read(&mut buf).await;
      socket
        .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    });

    let ready = wait_until_ready(&reqwest::Client::new(), &url, 3, Duration::from_millis(10)).await;
    assert!(ready);
  }
}
