use tracing::trace;

use super::parse_model::Weekday;
use crate::open_sheet::Grid;

/// Column holding the weekday labels and discipline names.
pub const LABEL_COL: usize = 1;
pub const FIRST_WEEK_COL: usize = 2;
pub const TIME_COL: usize = 0;

const TRAILING_EMPTY_ROWS: usize = 6;
const TRAILING_EMPTY_COLS: usize = 3;

/// Index of the first row labelled Monday, or `grid.row_count()` if there
/// is none.
pub fn find_first_row_index(grid: &Grid) -> usize {
  grid
    .column(LABEL_COL)
    .iter()
    .position(|label| label == Weekday::Monday.label())
    .unwrap_or(grid.row_count())
}

/// Index of the last row of the last class slot.
pub fn find_last_row_index(grid: &Grid, first_row_index: usize) -> usize {
  let times = grid.column(TIME_COL);
  let labels = grid.column(LABEL_COL);

  let mut empty_rows = 0;
  let mut row_index = first_row_index;
  while row_index < grid.row_count() && empty_rows < TRAILING_EMPTY_ROWS {
    let time_is_empty = times.get(row_index).is_none_or(String::is_empty);
    let label_is_empty = labels.get(row_index).is_none_or(String::is_empty);
    if time_is_empty || label_is_empty {
      empty_rows += 1;
    } else {
      empty_rows = 0;
    }
    row_index += 1;
  }

  // the footer after the last slot is shorter when Saturday has no classes
  let saturday_is_empty = row_index
    .checked_sub(4)
    .and_then(|r| labels.get(r))
    .is_some_and(|label| label == Weekday::Saturday.label());
  trace!(row_index, saturday_is_empty, "found end of schedule rows");

  if saturday_is_empty {
    row_index.saturating_sub(3)
  } else {
    row_index.saturating_sub(5)
  }
}

/// Index of the last non-empty week header at `first_row_index`.
pub fn find_last_col_index(grid: &Grid, first_row_index: usize) -> usize {
  let header = grid.rows().get(first_row_index);
  let mut empty_cols = 0;
  let mut stop_index = FIRST_WEEK_COL - 1;
  for (col_index, cell) in header
    .into_iter()
    .flatten()
    .enumerate()
    .skip(FIRST_WEEK_COL)
  {
    stop_index = col_index;
    if cell.is_empty() {
      empty_cols += 1;
    } else {
      empty_cols = 0;
    }
    if empty_cols == TRAILING_EMPTY_COLS {
      break;
    }
  }
  stop_index - empty_cols
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::parse_timetable::tests::FixtureBuilder;

  #[test]
  fn first_row_is_the_monday_label() {
    let grid = FixtureBuilder::standard().build();
    assert_eq!(find_first_row_index(&grid), 4);
  }

  #[test]
  fn missing_monday_label_points_past_the_grid() {
    let mut rows = FixtureBuilder::standard().build_rows();
    rows[4][1] = String::new();
    let grid = Grid::from_rows(rows);

    let first_row_index = find_first_row_index(&grid);

    assert_eq!(first_row_index, grid.row_count());
    // later stages must survive the sentinel
    let _ = find_last_row_index(&grid, first_row_index);
    let _ = find_last_col_index(&grid, first_row_index);
  }

  #[test]
  fn last_row_is_the_end_of_the_last_saturday_slot() {
    let grid = FixtureBuilder::standard().build();
    assert_eq!(find_last_row_index(&grid, 4), 30);
  }

  #[test]
  fn empty_saturday_ends_one_row_after_its_label() {
    let grid = FixtureBuilder::standard_without_saturday_classes().build();
    // Saturday label sits on row 27
    assert_eq!(find_last_row_index(&grid, 4), 28);
  }

  #[test]
  fn missing_saturday_ends_at_the_last_friday_slot() {
    let grid = FixtureBuilder::standard_without_saturday_label().build();
    assert_eq!(find_last_row_index(&grid, 4), 26);
  }

  #[test]
  fn last_col_skips_trailing_blank_headers() {
    let grid = FixtureBuilder::standard().build();
    assert_eq!(grid.col_count(), 9);
    assert_eq!(find_last_col_index(&grid, 4), 5);
  }

  #[test]
  fn single_blank_header_inside_the_weeks_is_tolerated() {
    let grid = FixtureBuilder::new("МАРТ", &["2", "", "16", "23"]).build();
    assert_eq!(find_last_col_index(&grid, 4), 5);
  }

  #[test]
  fn last_col_at_the_edge_of_the_sheet() {
    let grid = Grid::from_rows(vec![vec![
      String::new(),
      Weekday::Monday.label().to_owned(),
      "2".to_owned(),
      "9".to_owned(),
    ]]);
    assert_eq!(find_last_col_index(&grid, 0), 3);
  }
}
