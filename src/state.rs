use chrono::{Datelike, Local, Utc};
use kinded::Kinded;
use miette::{Context, IntoDiagnostic};
use tracing::{error, info, warn};

use crate::{
  catalog::{CatalogClient, model::SubmissionSummary, submit_groups},
  config::Config,
  error::ScheduleError,
  parse_timetable::ParseSettings,
  process_downloads::{RunLayout, parse_downloads},
  report::Report,
  synth_groups::Group,
};

#[derive(Debug, Kinded)]
#[kinded(kind = MasterStateStep)]
pub enum MasterState {
  Start,
  PreparedRun {
    run:      RunLayout,
    settings: ParseSettings,
    report:   Report,
  },
  ParsedDownloads {
    groups: Vec<Group>,
    /// Set when the batch stopped early; the run fails after submitting.
    fatal:  Option<ScheduleError>,
  },
  SubmittedGroups {
    summary: SubmissionSummary,
  },
}

impl MasterState {
  pub fn completed(&self) -> bool {
    matches!(self, Self::SubmittedGroups { .. })
  }

  pub async fn step(self, config: &Config) -> miette::Result<Self> {
    let old_state_step = self.kind();
    let new_state: MasterState = match self {
      MasterState::Start => {
        let started_at = Local::now();
        let run =
          RunLayout::new(&config.cache_dir, &config.reports_dir, started_at);
        run
          .create_directories()
          .into_diagnostic()
          .context("failed to prepare run directories")?;
        let report = Report::create(&run.report_path())
          .into_diagnostic()
          .context("failed to create report file")?;

        MasterState::PreparedRun {
          run,
          settings: ParseSettings {
            year:  started_at.year(),
            sheet: config.sheet,
          },
          report,
        }
      }
      MasterState::PreparedRun {
        run,
        settings,
        mut report,
      } => {
        let outcome = tokio::task::spawn_blocking(move || {
          parse_downloads(&run, &settings, &mut report, Utc::now())
        })
        .await
        .into_diagnostic()
        .context("timetable parsing task panicked")?
        .into_diagnostic()
        .context("failed to parse downloaded timetables")?;

        for (file_name, reason) in outcome.defective_files() {
          warn!(file_name, reason, "timetable archived as defective");
        }
        info!(
          parsed = outcome.parsed_count(),
          defective = outcome.defective_files().count(),
          "sorted downloaded timetables"
        );

        MasterState::ParsedDownloads {
          groups: outcome.groups,
          fatal:  outcome.fatal,
        }
      }
      MasterState::ParsedDownloads { groups, fatal } => {
        info!(count = groups.len(), "submitting groups to the catalog");
        let client = CatalogClient::new(&config.api_url);
        let summary = submit_groups(&client, &groups).await;
        conclude_submission(summary, fatal)?
      }
      MasterState::SubmittedGroups { summary } => {
        MasterState::SubmittedGroups { summary }
      }
    };

    info!(
      old_state = ?old_state_step,
      new_state = ?(new_state.kind()),
      "successfully transitioned state"
    );
    Ok(new_state)
  }
}

/// Fails the run after submission if the batch had been stopped early.
fn conclude_submission(
  summary: SubmissionSummary,
  fatal: Option<ScheduleError>,
) -> miette::Result<MasterState> {
  if let Some(fatal) = fatal {
    error!(
      accepted = summary.accepted,
      rejected = summary.rejected,
      failed = summary.failed,
      "submitted groups parsed before the run was stopped"
    );
    return Err(fatal)
      .into_diagnostic()
      .context("run stopped before every timetable was parsed");
  }
  Ok(MasterState::SubmittedGroups { summary })
}
