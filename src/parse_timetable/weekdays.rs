use tracing::{debug, trace};

use super::{
  boundaries::LABEL_COL,
  parse_model::{Band, Weekday, WeekdayBands},
};
use crate::{
  error::{LayoutFailureReason, ScheduleError},
  open_sheet::Grid,
};

/// Splits the schedule rows into one band per weekday.
pub fn segment_weekdays(
  grid: &Grid,
  first_row_index: usize,
  last_row_index: usize,
) -> Result<WeekdayBands, ScheduleError> {
  let labels = grid.column(LABEL_COL);
  let label_at = |row: usize| labels.get(row).map_or("", String::as_str);
  let mut bands = WeekdayBands::default();

  for row_index in first_row_index..=last_row_index {
    let Some(weekday) = Weekday::from_label(label_at(row_index)) else {
      continue;
    };
    trace!(row_index, %weekday, "found weekday label");

    if let Some(previous) = weekday.previous() {
      bands[previous].close(row_index.saturating_sub(1));
    }
    bands[weekday].start = row_index + 1;

    // some sheets carry a stray blank row right under the Thursday label
    if weekday == Weekday::Thursday {
      let start = bands[weekday].start;
      if label_at(start).is_empty() && !label_at(start + 1).is_empty() {
        bands[weekday].start += 1;
      }
    }

    if weekday == Weekday::Saturday {
      bands[weekday].close(last_row_index);
    }
  }

  let friday = bands[Weekday::Friday];
  let saturday = bands[Weekday::Saturday];
  if friday.start > 0
    && friday.end == 0
    && saturday.start == 0
    && saturday.end == 0
  {
    debug!("no Saturday label, treating Saturday as empty");
    bands[Weekday::Friday].close(last_row_index);
    bands[Weekday::Saturday] = Band {
      start:      last_row_index,
      end:        last_row_index,
      slot_count: 0,
    };
  }

  validate_bands(&bands)?;
  Ok(bands)
}

fn validate_bands(bands: &WeekdayBands) -> Result<(), ScheduleError> {
  let fail = |reason| Err(ScheduleError::LayoutDetectionFailure { reason });

  for weekday in Weekday::ALL {
    if bands[weekday].start == 0 {
      return fail(LayoutFailureReason::MissingBandStart(weekday));
    }
  }
  for weekday in Weekday::ALL {
    if bands[weekday].end == 0 {
      return fail(LayoutFailureReason::MissingBandEnd(weekday));
    }
  }
  for weekday in Weekday::ALL {
    let band = bands[weekday];
    if band.span() % 3 != 0 && band.end != band.start {
      return fail(LayoutFailureReason::UnevenBandSpan {
        weekday,
        rows: band.span(),
      });
    }
  }
  Ok(())
}
