use std::path::PathBuf;

use crate::open_sheet::SheetSelection;

#[derive(Debug)]
pub struct Config {
  pub api_url:     String,
  pub cache_dir:   PathBuf,
  pub reports_dir: PathBuf,
  pub log_file:    PathBuf,
  pub sheet:       SheetSelection,
}

impl Config {
  pub fn from_env() -> miette::Result<Self> {
    Self::from_lookup(|key| std::env::var(key).ok())
  }

  fn from_lookup(
    lookup: impl Fn(&str) -> Option<String>,
  ) -> miette::Result<Self> {
    let api_url = lookup("API_URL")
      .ok_or_else(|| miette::miette!("missing `API_URL` env var"))?;

    let cache_dir = lookup("CACHE_DIR").unwrap_or_else(|| "./cache".to_owned());
    let reports_dir =
      lookup("REPORTS_DIR").unwrap_or_else(|| "./reports".to_owned());
    let log_file = lookup("LOG_FILE").unwrap_or_else(|| "log.txt".to_owned());

    let sheet = match lookup("SHEET") {
      Some(sheet) => sheet.parse::<SheetSelection>().map_err(|e| {
        miette::miette!("failed to parse `SHEET` env var: {e}")
      })?,
      None => SheetSelection::default(),
    };

    Ok(Self {
      api_url,
      cache_dir: cache_dir.into(),
      reports_dir: reports_dir.into(),
      log_file: log_file.into(),
      sheet,
    })
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap;

  use super::*;

  fn config_from(vars: &[(&str, &str)]) -> miette::Result<Config> {
    let vars = vars
      .iter()
      .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
      .collect::<HashMap<_, _>>();
    Config::from_lookup(|key| vars.get(key).cloned())
  }

  #[test]
  fn defaults_fill_in_optional_vars() {
    let config = config_from(&[("API_URL", "http://localhost:8080")]).unwrap();

    assert_eq!(config.api_url, "http://localhost:8080");
    assert_eq!(config.cache_dir, PathBuf::from("./cache"));
    assert_eq!(config.reports_dir, PathBuf::from("./reports"));
    assert_eq!(config.log_file, PathBuf::from("log.txt"));
    assert_eq!(config.sheet, SheetSelection::Active);
  }

  #[test]
  fn explicit_vars_win() {
    let config = config_from(&[
      ("API_URL", "http://catalog"),
      ("CACHE_DIR", "/var/cache/timetables"),
      ("SHEET", "first"),
    ])
    .unwrap();

    assert_eq!(config.cache_dir, PathBuf::from("/var/cache/timetables"));
    assert_eq!(config.sheet, SheetSelection::First);
  }

  #[test]
  fn api_url_is_required() {
    assert!(config_from(&[]).is_err());
  }

  #[test]
  fn bad_sheet_selection_is_rejected() {
    assert!(
      config_from(&[("API_URL", "http://catalog"), ("SHEET", "last")])
        .is_err()
    );
  }
}
