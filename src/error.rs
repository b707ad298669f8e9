use std::path::PathBuf;

use thiserror::Error;

use crate::parse_timetable::parse_model::Weekday;

/// Why the weekday bands of a sheet could not be trusted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LayoutFailureReason {
  /// A band never received its start row.
  MissingBandStart(Weekday),
  /// A band never received its end row.
  MissingBandEnd(Weekday),
  /// The band spans a row count that is not a whole number of slots.
  UnevenBandSpan { weekday: Weekday, rows: i64 },
}

impl std::fmt::Display for LayoutFailureReason {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::MissingBandStart(weekday) => {
        write!(f, "could not find the first row of {weekday}")
      }
      Self::MissingBandEnd(weekday) => {
        write!(f, "could not find the last row of {weekday}")
      }
      Self::UnevenBandSpan { weekday, rows } => write!(
        f,
        "{weekday} spans {rows} rows, which is not a multiple of 3; the \
         table may have a wrong number of rows"
      ),
    }
  }
}

#[derive(Debug, Error)]
pub enum ScheduleError {
  #[error("failed to open workbook {path:?}: {message}")]
  UnopenableWorkbook { path: PathBuf, message: String },

  #[error("invalid group name in file name: {group:?}")]
  InvalidGroupName { group: String },

  #[error("unknown month label for the first week: {label:?}")]
  UnknownMonthLabel { label: String },

  #[error("no day number found for the first week")]
  NoAnchorDate,

  #[error("day number of the first week is not an integer: {text:?}")]
  MalformedAnchorDay { text: String },

  #[error("failed to detect timetable layout: {reason}")]
  LayoutDetectionFailure { reason: LayoutFailureReason },

  #[error("unrecognized institute digit in group name {group:?}")]
  UnrecognizedInstituteDigit { group: String },

  #[error("{context}: {source}")]
  Io {
    context: String,
    #[source]
    source:  std::io::Error,
  },
}

impl ScheduleError {
  /// Errors that stop the whole batch instead of only the current file.
  pub fn is_run_fatal(&self) -> bool {
    matches!(
      self,
      Self::UnrecognizedInstituteDigit { .. } | Self::Io { .. }
    )
  }

  pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
    Self::Io {
      context: context.into(),
      source,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn only_institute_and_io_errors_abort_the_run() {
    assert!(
      ScheduleError::UnrecognizedInstituteDigit {
        group: "915".to_owned(),
      }
      .is_run_fatal()
    );
    assert!(
      ScheduleError::io(
        "failed to move file",
        std::io::Error::other("disk gone")
      )
      .is_run_fatal()
    );
    assert!(!ScheduleError::NoAnchorDate.is_run_fatal());
    assert!(
      !ScheduleError::InvalidGroupName {
        group: "abc".to_owned(),
      }
      .is_run_fatal()
    );
  }

  #[test]
  fn layout_failure_names_the_weekday() {
    let error = ScheduleError::LayoutDetectionFailure {
      reason: LayoutFailureReason::UnevenBandSpan {
        weekday: Weekday::Wednesday,
        rows:    10,
      },
    };
    let message = error.to_string();
    assert!(message.contains("Wednesday"), "{message}");
    assert!(message.contains("10 rows"), "{message}");
  }
}
