use chrono::{Days, NaiveTime};
use tracing::{debug, trace, warn};

use super::{
  boundaries::{LABEL_COL, TIME_COL},
  parse_model::{Class, ClassType, ParseWarning, TimetableLayout, Weekday},
};
use crate::{open_sheet::Grid, report::ParseObserver};

/// Flattens a raw class-type cell onto one line with single spaces.
pub fn clean_class_type_code(raw: &str) -> String {
  let mut code = raw.trim().replace('\n', " ");
  while code.contains("  ") {
    code = code.replace("  ", " ");
  }
  code
}

/// Walks every weekday band, slot and week-column and collects the
/// scheduled classes.
pub fn extract_classes(
  grid: &Grid,
  layout: &TimetableLayout,
  observer: &mut dyn ParseObserver,
) -> Vec<Class> {
  let mut classes = Vec::new();
  let first_col = layout.anchor.first_col;

  for weekday in Weekday::ALL {
    let band = layout.bands[weekday];
    if band.slot_count == 0 {
      // permanent day off
      continue;
    }
    for slot in 0..band.slot_count {
      let base_row = band.slot_base_row(slot);
      for col in first_col..=layout.last_col_index {
        let raw_type = grid.cell(base_row, col);
        if raw_type.is_empty() {
          continue;
        }

        let code = clean_class_type_code(raw_type);
        let class_type = match ClassType::from_code(&code) {
          Some(class_type) => class_type.name().to_owned(),
          None => {
            let warning = ParseWarning::UnknownClassTypeCode {
              code: code.clone(),
              col,
              row: base_row,
            };
            warn!(%warning, "passing class type through unchanged");
            observer.warn(&warning);
            code
          }
        };

        let mut comment = grid.cell(base_row + 1, col).trim().to_owned();
        let comment_continuation = grid.cell(base_row + 2, col);
        if !comment_continuation.is_empty() {
          comment = format!("{comment} {comment_continuation}")
            .trim()
            .to_owned();
        }

        let days = 7 * (col - first_col) + weekday.index();
        let date = layout
          .anchor
          .date
          .checked_add_days(Days::new(days as u64))
          .unwrap_or(layout.anchor.date)
          .and_time(NaiveTime::MIN)
          .and_utc();

        let class = Class {
          discipline: grid.cell(base_row, LABEL_COL).trim().to_owned(),
          class_type,
          date,
          time: grid.cell(base_row, TIME_COL).trim().to_owned(),
          professor: grid.cell(base_row + 1, LABEL_COL).trim().to_owned(),
          subgroup: 0,
          location: grid.cell(base_row + 2, LABEL_COL).trim().to_owned(),
          comment,
        };
        trace!(?class, "extracted class");
        classes.push(class);
      }
    }
  }

  debug!(count = classes.len(), "extracted classes");
  classes
}
