use serde::{Deserialize, Serialize};

/// Reply of the catalog service to a submitted group.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResponse {
  pub successful: bool,
  #[serde(default, rename = "error")]
  pub err:        String,
  #[serde(default)]
  pub message:    String,
}

/// Tally of one submission pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SubmissionSummary {
  pub accepted: usize,
  /// The service answered but refused the group.
  pub rejected: usize,
  /// No usable answer came back.
  pub failed:   usize,
}
