use std::{path::Path, sync::{Arc, LazyLock}};

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Serialize, Serializer};
use tracing::{debug, error};

use crate::{
  error::ScheduleError,
  parse_timetable::{ParsedTimetable, parse_model::Class},
};

static GROUP_NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^[0-9]{3}[А-Яа-я]{0,3}(-?[0-9])?$")
    .expect("group name pattern is a valid regex")
});

pub const STUDY_FORM: &str = "In-person";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Institute {
  EconomicsManagementAndFinance,
  Law,
  BusinessTechnologies,
  InformationSystemsAndComputerEngineering,
  PsychologyAndPedagogy,
  HumanitarianTechnologies,
}

impl Institute {
  /// Institute encoded by the first digit of a group name.
  pub fn from_group_name(group_name: &str) -> Result<Self, ScheduleError> {
    Ok(match group_name.chars().next() {
      Some('1') => Institute::EconomicsManagementAndFinance,
      Some('2') => Institute::Law,
      Some('3') => Institute::BusinessTechnologies,
      Some('4') => Institute::InformationSystemsAndComputerEngineering,
      Some('5') => Institute::PsychologyAndPedagogy,
      Some('6') => Institute::HumanitarianTechnologies,
      _ => {
        return Err(ScheduleError::UnrecognizedInstituteDigit {
          group: group_name.to_owned(),
        });
      }
    })
  }

  /// 1-based number, matching the leading digit of its group names.
  pub fn index(self) -> u8 { self as u8 + 1 }

  pub fn name(self) -> &'static str {
    match self {
      Institute::EconomicsManagementAndFinance => {
        "Institute of Economics, Management and Finance"
      }
      Institute::Law => "Law Institute",
      Institute::BusinessTechnologies => "Institute of Business Technologies",
      Institute::InformationSystemsAndComputerEngineering => {
        "Institute of Information Systems and Computer Engineering \
         Technologies"
      }
      Institute::PsychologyAndPedagogy => {
        "Institute of Psychology and Pedagogy"
      }
      Institute::HumanitarianTechnologies => {
        "Institute of Humanitarian Technologies"
      }
    }
  }
}

impl Serialize for Institute {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(self.name())
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum StudyLevel {
  Undergraduate,
  Graduate,
}

impl StudyLevel {
  pub fn from_group_name(group_name: &str) -> Self {
    if group_name.contains('м') {
      StudyLevel::Graduate
    } else {
      StudyLevel::Undergraduate
    }
  }
}

/// One group's schedule, as submitted to the catalog.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
  pub group_name:          String,
  /// Always 0, subgroups are not split out.
  pub number_of_subgroups: u32,
  pub last_update:         DateTime<Utc>,
  pub institute:           Institute,
  pub study_level:         StudyLevel,
  pub study_form:          &'static str,
  /// Shared by every group parsed from the same file.
  pub classes:             Arc<[Class]>,
}

/// Group names listed in a timetable file name, e.g. `315бп-1,316б.xlsx`.
pub fn group_names_from_file_name(
  file_name: &str,
) -> Result<Vec<String>, ScheduleError> {
  let stem = Path::new(file_name)
    .file_stem()
    .map(|s| s.to_string_lossy().into_owned())
    .unwrap_or_default();
  // qualifier suffixes like "бп" sometimes get split by a comma themselves
  let normalized = stem
    .replace(", ", ",")
    .replace("б,п", "бп")
    .replace("п,б", "пб");

  let group_names = normalized
    .split(',')
    .map(ToOwned::to_owned)
    .collect::<Vec<_>>();
  if let Some(bad) = group_names
    .iter()
    .find(|g| !GROUP_NAME_PATTERN.is_match(g))
  {
    error!(file_name, group = bad, "invalid group name in file name");
    return Err(ScheduleError::InvalidGroupName { group: bad.clone() });
  }

  Ok(group_names)
}

/// Fans the parsed classes out into one [`Group`] per group name.
pub fn synthesize_groups(
  parsed: ParsedTimetable,
  last_update: DateTime<Utc>,
) -> Result<Vec<Group>, ScheduleError> {
  let classes: Arc<[Class]> = parsed.classes.into();

  let mut groups = Vec::with_capacity(parsed.group_names.len());
  for group_name in parsed.group_names {
    let institute = Institute::from_group_name(&group_name)?;
    let study_level = StudyLevel::from_group_name(&group_name);

    // TODO: split classes per subgroup once sheets mark subgroups
    let group = Group {
      group_name,
      number_of_subgroups: 0,
      last_update,
      institute,
      study_level,
      study_form: STUDY_FORM,
      classes: Arc::clone(&classes),
    };
    debug!(
      group = group.group_name,
      institute = group.institute.index(),
      study_level = ?group.study_level,
      classes = group.classes.len(),
      "synthesized group"
    );
    groups.push(group);
  }

  Ok(groups)
}
