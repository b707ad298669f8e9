pub mod anchor;
pub mod boundaries;
pub mod classes;
pub mod parse_model;
pub mod weekdays;

use std::path::Path;

use tracing::{debug, info, instrument};

use self::{
  anchor::resolve_calendar_anchor,
  boundaries::{find_first_row_index, find_last_col_index, find_last_row_index},
  classes::extract_classes,
  parse_model::{Class, TimetableLayout},
  weekdays::segment_weekdays,
};
use crate::{
  error::{LayoutFailureReason, ScheduleError},
  open_sheet::{Grid, SheetSelection, open_timetable_grid},
  report::ParseObserver,
  synth_groups::group_names_from_file_name,
};

/// Inputs of a parse that do not come from the sheet itself.
#[derive(Clone, Copy, Debug)]
pub struct ParseSettings {
  /// Year the anchor date falls in.
  pub year:  i32,
  pub sheet: SheetSelection,
}

impl ParseSettings {
  pub fn for_year(year: i32) -> Self {
    Self {
      year,
      sheet: SheetSelection::default(),
    }
  }
}

/// Classes of one file together with the groups named by the file.
#[derive(Clone, Debug)]
pub struct ParsedTimetable {
  pub group_names: Vec<String>,
  pub classes:     Vec<Class>,
}

/// Locates the schedule inside the grid.
pub fn detect_layout(
  grid: &Grid,
  settings: &ParseSettings,
) -> Result<TimetableLayout, ScheduleError> {
  let first_row_index = find_first_row_index(grid);
  if first_row_index == grid.row_count() {
    return Err(ScheduleError::LayoutDetectionFailure {
      reason: LayoutFailureReason::MissingBandStart(
        parse_model::Weekday::Monday,
      ),
    });
  }
  let last_row_index = find_last_row_index(grid, first_row_index);
  let anchor = resolve_calendar_anchor(grid, first_row_index, settings.year)?;
  let last_col_index = find_last_col_index(grid, first_row_index);
  let bands = segment_weekdays(grid, first_row_index, last_row_index)?;

  let layout = TimetableLayout {
    first_row_index,
    last_row_index,
    last_col_index,
    anchor,
    bands,
  };
  debug!(%layout, "detected timetable layout");
  Ok(layout)
}

/// Runs layout detection and class extraction over one grid.
pub fn parse_timetable_grid(
  grid: &Grid,
  settings: &ParseSettings,
  observer: &mut dyn ParseObserver,
) -> Result<Vec<Class>, ScheduleError> {
  let layout = detect_layout(grid, settings)?;
  observer.info(&layout.to_string());
  Ok(extract_classes(grid, &layout, observer))
}

/// Parses one timetable file. The group names in the file name are checked
/// before the workbook is opened.
#[instrument(skip(settings, observer))]
pub fn parse_timetable_file(
  path: &Path,
  settings: &ParseSettings,
  observer: &mut dyn ParseObserver,
) -> Result<ParsedTimetable, ScheduleError> {
  let file_name = path
    .file_name()
    .map(|n| n.to_string_lossy().into_owned())
    .unwrap_or_default();
  info!("starting to parse timetable");

  let group_names = group_names_from_file_name(&file_name)?;
  info!(?group_names, "found groups in file name");
  observer.info(&format!("found groups: {group_names:?}"));

  let grid = open_timetable_grid(path, settings.sheet)?;
  let classes = parse_timetable_grid(&grid, settings, observer)?;

  Ok(ParsedTimetable {
    group_names,
    classes,
  })
}
