use chrono::{Datelike, Days, NaiveDate};
use tracing::{instrument, trace};

use super::{boundaries::FIRST_WEEK_COL, parse_model::CalendarAnchor};
use crate::{error::ScheduleError, open_sheet::Grid};

const MONTH_LABELS: [&str; 12] = [
  "ЯНВАРЬ",
  "ФЕВРАЛЬ",
  "МАРТ",
  "АПРЕЛЬ",
  "МАЙ",
  "ИЮНЬ",
  "ИЮЛЬ",
  "АВГУСТ",
  "СЕНТЯБРЬ",
  "ОКТЯБРЬ",
  "НОЯБРЬ",
  "ДЕКАБРЬ",
];

const MONTH_LABEL_OFFSET: usize = 3;
const ANCHOR_SEARCH_COLS: usize = 3;
const ROLLBACK_DAY_THRESHOLD: u32 = 27;

fn month_from_label(label: &str) -> Option<u32> {
  MONTH_LABELS
    .iter()
    .position(|m| *m == label)
    .map(|i| i as u32 + 1)
}

/// Builds a date, letting day numbers past the end of the month spill into
/// the next one.
fn calendar_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
  NaiveDate::from_ymd_opt(year, month, 1)?
    .checked_add_days(Days::new(u64::from(day.checked_sub(1)?)))
}

/// Month of `date` after stepping back two months, where a day missing
/// from the target month spills forward like in [`calendar_date`].
fn month_two_months_before(date: NaiveDate) -> Option<u32> {
  let months = date.year() * 12 + date.month0() as i32 - 2;
  let shifted = calendar_date(
    months.div_euclid(12),
    months.rem_euclid(12) as u32 + 1,
    date.day(),
  )?;
  Some(shifted.month())
}

/// Finds the date of the first week-column, first weekday.
#[instrument(skip(grid))]
pub fn resolve_calendar_anchor(
  grid: &Grid,
  first_row_index: usize,
  year: i32,
) -> Result<CalendarAnchor, ScheduleError> {
  let label = first_row_index
    .checked_sub(MONTH_LABEL_OFFSET)
    .map(|row| grid.cell(row, FIRST_WEEK_COL))
    .unwrap_or("");
  let Some(month) = month_from_label(label) else {
    return Err(ScheduleError::UnknownMonthLabel {
      label: label.to_owned(),
    });
  };
  trace!(label, month, "parsed month label");

  let (first_col, day_text) = (FIRST_WEEK_COL
    ..FIRST_WEEK_COL + ANCHOR_SEARCH_COLS)
    .map(|col| (col, grid.cell(first_row_index, col)))
    .find(|(_, text)| !text.is_empty())
    .ok_or(ScheduleError::NoAnchorDate)?;

  let malformed = || ScheduleError::MalformedAnchorDay {
    text: day_text.to_owned(),
  };
  let day = day_text.trim().parse::<u32>().map_err(|_| malformed())?;

  let mut date = calendar_date(year, month, day).ok_or_else(malformed)?;
  if day >= ROLLBACK_DAY_THRESHOLD {
    // a leading week that still belongs to an earlier month; the year stays
    let month = month_two_months_before(date).ok_or_else(malformed)?;
    date = calendar_date(year, month, day).ok_or_else(malformed)?;
  }
  trace!(%date, first_col, "resolved calendar anchor");

  Ok(CalendarAnchor { date, first_col })
}
