mod catalog;
mod config;
mod error;
mod open_sheet;
mod parse_timetable;
mod process_downloads;
mod report;
mod state;
mod synth_groups;

use std::{fs::File, sync::LazyLock};

use miette::{Context, IntoDiagnostic};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use self::{config::Config, state::MasterState};

static HTTP_CLIENT: LazyLock<reqwest::Client> =
  LazyLock::new(reqwest::Client::new);

#[tokio::main]
async fn main() -> miette::Result<()> {
  let config =
    Config::from_env().context("failed to gather config from env")?;

  let log_file = File::options()
    .create(true)
    .append(true)
    .open(&config.log_file)
    .into_diagnostic()
    .with_context(|| format!("failed to open log file {:?}", config.log_file))?;

  tracing_subscriber::registry()
    .with(fmt::layer())
    .with(
      fmt::layer()
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(log_file)),
    )
    .with(
      EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info")),
    )
    .init();

  // drive state machine
  let mut state = MasterState::Start;
  loop {
    match state {
      s if s.completed() => {
        if let MasterState::SubmittedGroups { summary } = s {
          info!(
            accepted = summary.accepted,
            rejected = summary.rejected,
            failed = summary.failed,
            "state machine completed"
          );
        }
        break;
      }
      s => {
        state = s.step(&config).await.context("failed to step state")?;
      }
    }
  }

  Ok(())
}
