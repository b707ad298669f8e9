pub mod model;

use miette::{Context, IntoDiagnostic};
use tracing::{error, info, instrument, trace};

use self::model::{SubmissionSummary, SubmitResponse};
use crate::{HTTP_CLIENT, synth_groups::Group};

/// Where finished groups are handed off.
pub trait GroupSubmitter {
  async fn submit(&self, group: &Group) -> miette::Result<SubmitResponse>;
}

/// Submits groups to the catalog service's REST API.
#[derive(Debug)]
pub struct CatalogClient<'a> {
  api_url: &'a str,
}

impl<'a> CatalogClient<'a> {
  pub fn new(api_url: &'a str) -> Self { Self { api_url } }

  fn group_url(&self, group_name: &str) -> String {
    format!(
      "{api_url}/groups/{group_name}",
      api_url = self.api_url.trim_end_matches('/'),
    )
  }
}

impl GroupSubmitter for CatalogClient<'_> {
  #[instrument(skip(self, group), fields(group = group.group_name, url))]
  async fn submit(&self, group: &Group) -> miette::Result<SubmitResponse> {
    let url = self.group_url(&group.group_name);
    tracing::Span::current().record("url", &url);

    trace!("sending catalog request to submit group");
    let resp = HTTP_CLIENT
      .post(&url)
      .json(group)
      .send()
      .await
      .into_diagnostic()
      .context("failed to send request to submit group")?;

    // the service answers with a JSON verdict on errors too
    let status = resp.status();
    let payload = resp.text().await.into_diagnostic().context(
      "failed to consume body of response from group submission request",
    )?;
    trace!(%status, "got response from group submission request");

    let jd = &mut serde_json::Deserializer::from_str(&payload);
    let response: SubmitResponse = serde_path_to_error::deserialize(jd)
      .into_diagnostic()
      .context(format!(
        "failed to parse group submission response (status {status})"
      ))
      .inspect_err(|_| {
        error!(payload, "failed to parse group submission response as JSON");
      })?;

    Ok(response)
  }
}

/// Submits every group, logging failures without stopping.
pub async fn submit_groups(
  submitter: &impl GroupSubmitter,
  groups: &[Group],
) -> SubmissionSummary {
  let mut summary = SubmissionSummary::default();

  for group in groups {
    match submitter.submit(group).await {
      Ok(response) if response.successful => {
        info!(
          group = group.group_name,
          reply = response.message,
          "group accepted"
        );
        summary.accepted += 1;
      }
      Ok(response) => {
        error!(
          group = group.group_name,
          error = response.err,
          reply = response.message,
          "catalog rejected group"
        );
        summary.rejected += 1;
      }
      Err(e) => {
        error!(group = group.group_name, "failed to submit group: {e:?}");
        summary.failed += 1;
      }
    }
  }

  summary
}

#[cfg(test)]
mod tests {
  use std::sync::Mutex;

  use chrono::Utc;

  use super::*;
  use crate::{
    parse_timetable::ParsedTimetable, synth_groups::synthesize_groups,
  };

  /// Accepts groups whose name is in `accept`, refuses the rest, and
  /// errors on `unreachable`.
  #[derive(Default)]
  struct FakeCatalog {
    accept:      Vec<&'static str>,
    unreachable: Vec<&'static str>,
    seen:        Mutex<Vec<String>>,
  }

  impl GroupSubmitter for FakeCatalog {
    async fn submit(&self, group: &Group) -> miette::Result<SubmitResponse> {
      self.seen.lock().unwrap().push(group.group_name.clone());
      if self.unreachable.contains(&group.group_name.as_str()) {
        miette::bail!("connection refused");
      }
      let successful = self.accept.contains(&group.group_name.as_str());
      Ok(SubmitResponse {
        successful,
        err: if successful {
          String::new()
        } else {
          "unknown group".to_owned()
        },
        message: String::new(),
      })
    }
  }

  fn groups(names: &[&str]) -> Vec<Group> {
    synthesize_groups(
      ParsedTimetable {
        group_names: names.iter().map(|n| (*n).to_owned()).collect(),
        classes:     Vec::new(),
      },
      Utc::now(),
    )
    .unwrap()
  }

  #[tokio::test]
  async fn every_group_is_submitted_and_tallied() {
    let catalog = FakeCatalog {
      accept: vec!["315б", "101"],
      unreachable: vec!["202"],
      ..FakeCatalog::default()
    };

    let summary =
      submit_groups(&catalog, &groups(&["315б", "316б", "202", "101"])).await;

    assert_eq!(summary, SubmissionSummary {
      accepted: 2,
      rejected: 1,
      failed:   1,
    });
    assert_eq!(*catalog.seen.lock().unwrap(), vec![
      "315б", "316б", "202", "101"
    ]);
  }

  #[tokio::test]
  async fn nothing_to_submit() {
    let summary = submit_groups(&FakeCatalog::default(), &[]).await;
    assert_eq!(summary, SubmissionSummary::default());
  }

  #[test]
  fn group_url_is_under_the_groups_route() {
    let client = CatalogClient::new("http://localhost:8080/api");
    assert_eq!(
      client.group_url("315бп-1"),
      "http://localhost:8080/api/groups/315бп-1"
    );
  }

  #[test]
  fn group_url_drops_trailing_slash() {
    let client = CatalogClient::new("http://localhost:8080/api/");
    assert_eq!(
      client.group_url("101"),
      "http://localhost:8080/api/groups/101"
    );
  }
}
