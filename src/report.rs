use std::{
  fs::{File, OpenOptions},
  io::Write,
  path::Path,
};

use tracing::{error, info, warn};

use crate::{error::ScheduleError, parse_timetable::parse_model::ParseWarning};

/// Receives what the parser finds worth telling a human about a file.
pub trait ParseObserver {
  fn info(&mut self, message: &str);
  fn warn(&mut self, warning: &ParseWarning);
  fn error(&mut self, message: &str);
}

/// Human-readable log of one run, one `[file]  message` line per finding.
pub struct Report {
  sink: Box<dyn Write + Send>,
}

impl Report {
  pub fn create(path: &Path) -> Result<Self, ScheduleError> {
    let file = OpenOptions::new()
      .create(true)
      .append(true)
      .open(path)
      .map_err(|e| {
        ScheduleError::io(format!("failed to create report file {path:?}"), e)
      })?;
    Ok(Self::from_file(file))
  }

  fn from_file(file: File) -> Self {
    Self {
      sink: Box::new(file),
    }
  }

  /// Scopes the report to one file.
  pub fn for_file<'a>(&'a mut self, file_name: &'a str) -> FileReport<'a> {
    FileReport {
      report: self,
      file_name,
    }
  }

  fn write_line(&mut self, file_name: &str, message: &str) {
    // the report is best-effort, a failed write must not fail the parse
    if let Err(e) = writeln!(self.sink, "[{file_name}]  {message}") {
      error!(file_name, %e, "failed to write to report");
    }
  }
}

impl std::fmt::Debug for Report {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Report").finish_non_exhaustive()
  }
}

/// A [`Report`] bound to one file name.
pub struct FileReport<'a> {
  report:    &'a mut Report,
  file_name: &'a str,
}

impl ParseObserver for FileReport<'_> {
  fn info(&mut self, message: &str) {
    info!(file_name = self.file_name, "{message}");
    self.report.write_line(self.file_name, message);
  }

  fn warn(&mut self, warning: &ParseWarning) {
    warn!(file_name = self.file_name, "{warning}");
    self.report.write_line(self.file_name, &warning.to_string());
  }

  fn error(&mut self, message: &str) {
    error!(file_name = self.file_name, "{message}");
    self.report.write_line(self.file_name, message);
  }
}
