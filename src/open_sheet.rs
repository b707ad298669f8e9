use std::{path::Path, str::FromStr};

use calamine::{Data, Range, Reader, Xlsx, open_workbook};
use tracing::{debug, instrument};

use crate::error::ScheduleError;

/// Which sheet of the workbook holds the timetable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SheetSelection {
  First,
  #[default]
  Active,
}

impl FromStr for SheetSelection {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "first" => Ok(Self::First),
      "active" => Ok(Self::Active),
      other => Err(format!(
        "unknown sheet selection {other:?}, expected \"first\" or \"active\""
      )),
    }
  }
}

/// Cell text of one sheet, addressable by absolute sheet position.
///
/// Both views are rectangular: every row has `col_count()` cells and every
/// column has `row_count()` cells. Reads outside the sheet yield `""`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Grid {
  rows: Vec<Vec<String>>,
  cols: Vec<Vec<String>>,
}

impl Grid {
  pub fn from_rows(mut rows: Vec<Vec<String>>) -> Self {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    for row in &mut rows {
      row.resize(width, String::new());
    }
    let cols = (0..width)
      .map(|col| rows.iter().map(|row| row[col].clone()).collect())
      .collect();
    Self { rows, cols }
  }

  fn from_range(range: &Range<Data>) -> Self {
    // calamine ranges start at the first used cell, but layout detection
    // relies on absolute positions, so rebuild from the sheet origin
    let Some((end_row, end_col)) = range.end() else {
      return Self::default();
    };
    let rows = (0..=end_row)
      .map(|row| {
        (0..=end_col)
          .map(|col| {
            range
              .get_value((row, col))
              .map(cell_text)
              .unwrap_or_default()
          })
          .collect()
      })
      .collect();
    Self::from_rows(rows)
  }

  pub fn rows(&self) -> &[Vec<String>] { &self.rows }

  /// One column top to bottom, empty if it lies outside the sheet.
  pub fn column(&self, col: usize) -> &[String] {
    self.cols.get(col).map(Vec::as_slice).unwrap_or_default()
  }

  pub fn row_count(&self) -> usize { self.rows.len() }

  pub fn col_count(&self) -> usize { self.cols.len() }

  pub fn cell(&self, row: usize, col: usize) -> &str {
    self
      .rows
      .get(row)
      .and_then(|r| r.get(col))
      .map(String::as_str)
      .unwrap_or("")
  }
}

/// Renders a cell the way a spreadsheet displays it.
fn cell_text(data: &Data) -> String {
  match data {
    Data::Empty => String::new(),
    Data::String(s) => s.clone(),
    Data::DateTime(dt) => match dt.as_datetime() {
      Some(ndt) if ndt.time() == chrono::NaiveTime::MIN => {
        ndt.format("%d.%m.%Y").to_string()
      }
      Some(ndt) => ndt.format("%H:%M").to_string(),
      None => data.to_string(),
    },
    other => other.to_string(),
  }
}

fn unopenable(path: &Path, message: impl ToString) -> ScheduleError {
  ScheduleError::UnopenableWorkbook {
    path:    path.to_owned(),
    message: message.to_string(),
  }
}

fn active_sheet_index(path: &Path) -> Result<usize, ScheduleError> {
  let book = umya_spreadsheet::reader::xlsx::lazy_read(path)
    .map_err(|e| unopenable(path, e))?;
  let active_tab = *book.get_workbook_view().get_active_tab();
  Ok(active_tab as usize)
}

/// Opens the workbook at `path` and reads the selected sheet into a [`Grid`].
#[instrument]
pub fn open_timetable_grid(
  path: &Path,
  selection: SheetSelection,
) -> Result<Grid, ScheduleError> {
  let mut workbook: Xlsx<_> =
    open_workbook(path).map_err(|e| unopenable(path, e))?;
  let sheet_names = workbook.sheet_names();

  let sheet_index = match selection {
    SheetSelection::First => 0,
    SheetSelection::Active => active_sheet_index(path)?,
  };
  let sheet_name = sheet_names
    .get(sheet_index)
    .or(sheet_names.first())
    .ok_or_else(|| unopenable(path, "workbook has no sheets"))?
    .clone();

  let range = workbook
    .worksheet_range(&sheet_name)
    .map_err(|e| unopenable(path, e))?;
  let grid = Grid::from_range(&range);
  debug!(
    sheet = sheet_name,
    rows = grid.row_count(),
    cols = grid.col_count(),
    "decoded timetable sheet"
  );

  Ok(grid)
}

#[cfg(test)]
pub(crate) mod tests {
  use std::path::Path;

  use super::*;

  /// Writes `rows` into the first sheet of a new workbook at `path`.
  pub(crate) fn write_xlsx(path: &Path, rows: &[Vec<String>]) {
    let mut book = umya_spreadsheet::new_file();
    let sheet = book.get_sheet_mut(&0).unwrap();
    for (row_index, row) in rows.iter().enumerate() {
      for (col_index, value) in row.iter().enumerate() {
        if value.is_empty() {
          continue;
        }
        // umya coordinates are (col, row) and one-indexed
        sheet
          .get_cell_mut(((col_index + 1) as u32, (row_index + 1) as u32))
          .set_value_string(value.clone());
      }
    }
    umya_spreadsheet::writer::xlsx::write(&book, path).unwrap();
  }

  fn strings(rows: &[&[&str]]) -> Vec<Vec<String>> {
    rows
      .iter()
      .map(|row| row.iter().map(|s| (*s).to_owned()).collect())
      .collect()
  }

  #[test]
  fn grid_pads_ragged_rows_and_transposes() {
    let grid = Grid::from_rows(strings(&[&["a"], &["b", "c", "d"]]));

    assert_eq!(grid.row_count(), 2);
    assert_eq!(grid.col_count(), 3);
    assert_eq!(grid.rows()[0], vec!["a", "", ""]);
    assert_eq!(grid.column(1), vec!["", "c"]);
    assert_eq!(grid.cell(1, 2), "d");
    assert_eq!(grid.cell(7, 7), "");
  }

  #[test]
  fn sheet_selection_parses_case_insensitively() {
    assert_eq!("First".parse::<SheetSelection>(), Ok(SheetSelection::First));
    assert_eq!(
      " active ".parse::<SheetSelection>(),
      Ok(SheetSelection::Active)
    );
    assert!("second".parse::<SheetSelection>().is_err());
  }

  #[test]
  fn reads_cells_at_absolute_positions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("315б.xlsx");
    write_xlsx(
      &path,
      &strings(&[&[], &["", "", "МАРТ"], &["", "ПОНЕДЕЛЬНИК", "2"]]),
    );

    let grid = open_timetable_grid(&path, SheetSelection::First).unwrap();

    assert_eq!(grid.cell(1, 2), "МАРТ");
    assert_eq!(grid.cell(2, 1), "ПОНЕДЕЛЬНИК");
    assert_eq!(grid.cell(2, 2), "2");
    assert_eq!(grid.cell(0, 0), "");
    assert_eq!(grid.column(2)[1], "МАРТ");
  }

  #[test]
  fn active_sheet_of_a_fresh_workbook_is_the_first() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("101.xlsx");
    write_xlsx(&path, &strings(&[&["09:00", "Алгебра"]]));

    let grid = open_timetable_grid(&path, SheetSelection::Active).unwrap();

    assert_eq!(grid.cell(0, 1), "Алгебра");
  }

  #[test]
  fn garbage_file_is_unopenable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("101.xlsx");
    std::fs::write(&path, b"definitely not a zip archive").unwrap();

    let error = open_timetable_grid(&path, SheetSelection::First).unwrap_err();

    assert!(
      matches!(error, ScheduleError::UnopenableWorkbook { .. }),
      "{error:?}"
    );
  }
}
