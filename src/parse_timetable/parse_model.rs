use std::ops::{Index, IndexMut};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// The six teaching days of a timetable, in sheet order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weekday {
  Monday,
  Tuesday,
  Wednesday,
  Thursday,
  Friday,
  Saturday,
}

impl Weekday {
  pub const ALL: [Weekday; 6] = [
    Weekday::Monday,
    Weekday::Tuesday,
    Weekday::Wednesday,
    Weekday::Thursday,
    Weekday::Friday,
    Weekday::Saturday,
  ];

  /// Section label used in column 1 of the sheet.
  pub fn label(self) -> &'static str {
    match self {
      Weekday::Monday => "ПОНЕДЕЛЬНИК",
      Weekday::Tuesday => "ВТОРНИК",
      Weekday::Wednesday => "СРЕДА",
      Weekday::Thursday => "ЧЕТВЕРГ",
      Weekday::Friday => "ПЯТНИЦА",
      Weekday::Saturday => "СУББОТА",
    }
  }

  pub fn from_label(label: &str) -> Option<Weekday> {
    Weekday::ALL.into_iter().find(|w| w.label() == label)
  }

  /// Days after Monday.
  pub fn index(self) -> usize { self as usize }

  pub fn previous(self) -> Option<Weekday> {
    self.index().checked_sub(1).map(|i| Weekday::ALL[i])
  }
}

impl std::fmt::Display for Weekday {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    std::fmt::Debug::fmt(self, f)
  }
}

/// Rows of one weekday section. A slot is 3 rows: discipline and time,
/// professor, location.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Band {
  pub start:      usize,
  pub end:        usize,
  pub slot_count: usize,
}

impl Band {
  /// Row count of the band, which is negative for inverted bounds.
  pub fn span(&self) -> i64 { self.end as i64 - self.start as i64 + 1 }

  pub fn close(&mut self, end: usize) {
    self.end = end;
    self.slot_count = usize::try_from(self.span() / 3).unwrap_or(0);
  }

  pub fn slot_base_row(&self, slot: usize) -> usize { self.start + slot * 3 }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WeekdayBands(pub [Band; 6]);

impl Index<Weekday> for WeekdayBands {
  type Output = Band;

  fn index(&self, weekday: Weekday) -> &Band { &self.0[weekday.index()] }
}

impl IndexMut<Weekday> for WeekdayBands {
  fn index_mut(&mut self, weekday: Weekday) -> &mut Band {
    &mut self.0[weekday.index()]
  }
}

impl WeekdayBands {
  pub fn starts(&self) -> [usize; 6] { self.0.map(|b| b.start) }

  pub fn ends(&self) -> [usize; 6] { self.0.map(|b| b.end) }

  pub fn slot_counts(&self) -> [usize; 6] { self.0.map(|b| b.slot_count) }
}

/// The first calendar date in the grid and the week-column it sits in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CalendarAnchor {
  pub date:      NaiveDate,
  pub first_col: usize,
}

/// Everything layout detection learns about a sheet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimetableLayout {
  pub first_row_index: usize,
  pub last_row_index:  usize,
  pub last_col_index:  usize,
  pub anchor:          CalendarAnchor,
  pub bands:           WeekdayBands,
}

impl std::fmt::Display for TimetableLayout {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(
      f,
      "FRI:{} LRI:{} LCI:{} FD:{} FCI:{} WS:{:?} WE:{:?} WD:{:?}",
      self.first_row_index,
      self.last_row_index,
      self.last_col_index,
      self.anchor.date,
      self.anchor.first_col,
      self.bands.starts(),
      self.bands.ends(),
      self.bands.slot_counts(),
    )
  }
}

/// Known session kinds, keyed by the codes written in week-column cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClassType {
  Lecture,
  Seminar,
  PracticalSession,
  PassFailExam,
  LectureOrPractical,
  LectureOrSeminar,
  LaboratoryWork,
  DifferentiatedPassFailExam,
  Defense,
  SeminarOrLecture,
  PracticalOrLecture,
  LectureOrPassFailExam,
  Consultation,
  Exam,
  VideoLecture,
}

impl ClassType {
  pub fn from_code(code: &str) -> Option<ClassType> {
    Some(match code {
      "Л" => ClassType::Lecture,
      "С" => ClassType::Seminar,
      "ПЗ" => ClassType::PracticalSession,
      "ЗАЧ" => ClassType::PassFailExam,
      "Л/ПЗ" => ClassType::LectureOrPractical,
      "Л/С" => ClassType::LectureOrSeminar,
      "Лаб" | "ЛАБ" => ClassType::LaboratoryWork,
      "ДИФ.ЗАЧ" => ClassType::DifferentiatedPassFailExam,
      "ЗАЩ" => ClassType::Defense,
      "С/Л" => ClassType::SeminarOrLecture,
      "ПЗ/Л" => ClassType::PracticalOrLecture,
      "Л/ЗАЧ" => ClassType::LectureOrPassFailExam,
      "К" => ClassType::Consultation,
      "ЭКЗ" => ClassType::Exam,
      "ВЛ" => ClassType::VideoLecture,
      _ => return None,
    })
  }

  pub fn name(self) -> &'static str {
    match self {
      ClassType::Lecture => "Lecture",
      ClassType::Seminar => "Seminar",
      ClassType::PracticalSession => "Practical session",
      ClassType::PassFailExam => "Pass/fail exam",
      ClassType::LectureOrPractical => "Lecture / Practical session",
      ClassType::LectureOrSeminar => "Lecture / Seminar",
      ClassType::LaboratoryWork => "Laboratory work",
      ClassType::DifferentiatedPassFailExam => "Differentiated pass/fail exam",
      ClassType::Defense => "Defense",
      ClassType::SeminarOrLecture => "Seminar / Lecture",
      ClassType::PracticalOrLecture => "Practical session / Lecture",
      ClassType::LectureOrPassFailExam => "Lecture / Pass-fail exam",
      ClassType::Consultation => "Consultation",
      ClassType::Exam => "Exam",
      ClassType::VideoLecture => "Video lecture",
    }
  }
}

/// One scheduled session of a group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Class {
  pub discipline: String,
  pub class_type: String,
  /// Midnight UTC of the session's day.
  pub date:       DateTime<Utc>,
  pub time:       String,
  pub professor:  String,
  /// Always 0, subgroups are not split out.
  pub subgroup:   u32,
  pub location:   String,
  pub comment:    String,
}

/// Non-fatal findings while extracting classes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseWarning {
  UnknownClassTypeCode { code: String, col: usize, row: usize },
}

impl std::fmt::Display for ParseWarning {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      ParseWarning::UnknownClassTypeCode { code, col, row } => {
        write!(f, "unknown class type: {code} [{col}:{row}]")
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn weekday_labels_round_trip_in_order() {
    for (i, weekday) in Weekday::ALL.into_iter().enumerate() {
      assert_eq!(weekday.index(), i);
      assert_eq!(Weekday::from_label(weekday.label()), Some(weekday));
    }
    assert_eq!(Weekday::from_label("ВОСКРЕСЕНЬЕ"), None);
    assert_eq!(Weekday::Monday.previous(), None);
    assert_eq!(Weekday::Saturday.previous(), Some(Weekday::Friday));
  }

  #[test]
  fn closing_a_band_counts_whole_slots() {
    let mut band = Band {
      start: 5,
      ..Band::default()
    };
    band.close(10);
    assert_eq!(band.span(), 6);
    assert_eq!(band.slot_count, 2);

    // inverted bounds never produce slots
    let mut band = Band {
      start: 20,
      ..Band::default()
    };
    band.close(10);
    assert_eq!(band.slot_count, 0);
  }

  #[test]
  fn lab_codes_share_one_type() {
    assert_eq!(ClassType::from_code("Лаб"), Some(ClassType::LaboratoryWork));
    assert_eq!(ClassType::from_code("ЛАБ"), Some(ClassType::LaboratoryWork));
    assert_eq!(ClassType::from_code("Л").map(ClassType::name), Some("Lecture"));
    assert_eq!(ClassType::from_code("л"), None);
  }

  #[test]
  fn class_serializes_with_camel_case_keys() {
    let class = Class {
      discipline: "Алгебра".to_owned(),
      class_type: "Lecture".to_owned(),
      date:       NaiveDate::from_ymd_opt(2026, 3, 2)
        .unwrap()
        .and_time(chrono::NaiveTime::MIN)
        .and_utc(),
      time:       "09:00-10:30".to_owned(),
      professor:  "Иванов И.И.".to_owned(),
      subgroup:   0,
      location:   "ауд. 101".to_owned(),
      comment:    String::new(),
    };

    let json = serde_json::to_value(&class).unwrap();

    assert_eq!(json["classType"], "Lecture");
    assert_eq!(json["date"], "2026-03-02T00:00:00Z");
    assert_eq!(json["subgroup"], 0);
  }
}
