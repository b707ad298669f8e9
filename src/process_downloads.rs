use std::{
  fs,
  path::{Path, PathBuf},
};

use chrono::{DateTime, Local, Utc};
use tracing::{debug, error, info, instrument, warn};

use crate::{
  error::ScheduleError,
  parse_timetable::{ParseSettings, parse_timetable_file},
  report::{ParseObserver, Report},
  synth_groups::{Group, synthesize_groups},
};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// Directories touched by one run.
#[derive(Clone, Debug)]
pub struct RunLayout {
  pub timestamp:     String,
  pub downloads_dir: PathBuf,
  /// Archive for successfully parsed files, scoped to this run.
  pub parsed_dir:    PathBuf,
  /// Archive for files that were skipped, scoped to this run.
  pub defective_dir: PathBuf,
  pub reports_dir:   PathBuf,
}

impl RunLayout {
  pub fn new(
    cache_dir: &Path,
    reports_dir: &Path,
    started_at: DateTime<Local>,
  ) -> Self {
    let timestamp = started_at.format(TIMESTAMP_FORMAT).to_string();
    Self {
      downloads_dir: cache_dir.join("downloads"),
      parsed_dir: cache_dir.join("parsed").join(&timestamp),
      defective_dir: cache_dir.join("defective").join(&timestamp),
      reports_dir: reports_dir.to_owned(),
      timestamp,
    }
  }

  pub fn report_path(&self) -> PathBuf {
    self
      .reports_dir
      .join(format!("report-{timestamp}.txt", timestamp = self.timestamp))
  }

  pub fn create_directories(&self) -> Result<(), ScheduleError> {
    for dir in [
      &self.downloads_dir,
      &self.parsed_dir,
      &self.defective_dir,
      &self.reports_dir,
    ] {
      fs::create_dir_all(dir).map_err(|e| {
        ScheduleError::io(format!("failed to create directory {dir:?}"), e)
      })?;
    }
    debug!(timestamp = self.timestamp, "created run directories");
    Ok(())
  }
}

/// What happened to one downloaded file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FileVerdict {
  Parsed { groups: usize },
  Defective { reason: String },
}

#[derive(Debug, Default)]
pub struct BatchOutcome {
  /// Groups of every file archived as parsed, including those handled
  /// before the batch was stopped.
  pub groups:   Vec<Group>,
  pub verdicts: Vec<(String, FileVerdict)>,
  /// Error that stopped the batch before every file was handled.
  pub fatal:    Option<ScheduleError>,
}

impl BatchOutcome {
  pub fn parsed_count(&self) -> usize {
    self
      .verdicts
      .iter()
      .filter(|(_, verdict)| matches!(verdict, FileVerdict::Parsed { .. }))
      .count()
  }

  /// File names and skip reasons of the files archived as defective.
  pub fn defective_files(&self) -> impl Iterator<Item = (&str, &str)> {
    self.verdicts.iter().filter_map(|(file_name, verdict)| match verdict {
      FileVerdict::Defective { reason } => {
        Some((file_name.as_str(), reason.as_str()))
      }
      FileVerdict::Parsed { .. } => None,
    })
  }
}

/// Timetable files waiting in `dir`, ordered by file name.
pub fn list_timetable_files(dir: &Path) -> Result<Vec<PathBuf>, ScheduleError> {
  let entries = fs::read_dir(dir).map_err(|e| {
    ScheduleError::io(format!("failed to list directory {dir:?}"), e)
  })?;

  let mut files = Vec::new();
  for entry in entries {
    let entry = entry.map_err(|e| {
      ScheduleError::io(format!("failed to list directory {dir:?}"), e)
    })?;
    let path = entry.path();
    let is_timetable = path.is_file()
      && entry.file_name().to_string_lossy().contains(".xlsx");
    if is_timetable {
      files.push(path);
    }
  }
  files.sort();

  Ok(files)
}

fn move_into(path: &Path, dir: &Path) -> Result<(), ScheduleError> {
  let Some(file_name) = path.file_name() else {
    return Ok(());
  };
  let destination = dir.join(file_name);
  fs::rename(path, &destination).map_err(|e| {
    ScheduleError::io(
      format!("failed to move {path:?} to {destination:?}, stopping the run"),
      e,
    )
  })
}

/// Parses every downloaded timetable, archiving each file by outcome.
///
/// Files that fail to parse are reported and moved aside. A run-fatal error
/// stops the batch and leaves the current file in place; it is handed back
/// in [`BatchOutcome::fatal`] together with the groups already archived.
/// Only a downloads directory that cannot be listed is an `Err`.
#[instrument(skip_all, fields(timestamp = run.timestamp))]
pub fn parse_downloads(
  run: &RunLayout,
  settings: &ParseSettings,
  report: &mut Report,
  last_update: DateTime<Utc>,
) -> Result<BatchOutcome, ScheduleError> {
  info!("parsing downloaded timetables");
  let mut outcome = BatchOutcome::default();

  for path in list_timetable_files(&run.downloads_dir)? {
    let file_name = path
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .unwrap_or_default();

    let result =
      parse_timetable_file(&path, settings, &mut report.for_file(&file_name))
        .and_then(|parsed| synthesize_groups(parsed, last_update));

    match result {
      Ok(groups) => {
        if let Err(e) = move_into(&path, &run.parsed_dir) {
          error!(file_name, "stopping the run: {e}");
          outcome.fatal = Some(e);
          break;
        }
        info!(file_name, groups = groups.len(), "parsed timetable");
        report.for_file(&file_name).info("Table parsed successfully");
        outcome.verdicts.push((file_name, FileVerdict::Parsed {
          groups: groups.len(),
        }));
        outcome.groups.extend(groups);
      }
      Err(e) if e.is_run_fatal() => {
        error!(file_name, "stopping the run: {e}");
        outcome.fatal = Some(e);
        break;
      }
      Err(e) => {
        warn!(file_name, "skipping table: {e}");
        let reason = e.to_string();
        report
          .for_file(&file_name)
          .error(&format!("Skipping table: {reason}"));
        if let Err(e) = move_into(&path, &run.defective_dir) {
          error!(file_name, "stopping the run: {e}");
          outcome.fatal = Some(e);
          break;
        }
        outcome
          .verdicts
          .push((file_name, FileVerdict::Defective { reason }));
      }
    }
  }

  info!(
    parsed = outcome.parsed_count(),
    defective = outcome.defective_files().count(),
    groups = outcome.groups.len(),
    stopped = outcome.fatal.is_some(),
    "finished parsing downloaded timetables"
  );
  Ok(outcome)
}
