// src/interventions.rs

use reqwest::blocking::Client;
use std::collections::BTreeMap;
use tracing::{info, instrument};

use crate::error::{PipelineError, Result};
use crate::fetch::fetch_text;

/// One feed entry. `state` is the feed's own key (a postal abbreviation in
/// the published feed), not necessarily a reference-table name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterventionEntry {
    pub state: String,
    pub intervention: String,
}

/// Parse the `{ "<state>": "<label>", ... }` feed body.
pub fn parse_interventions(text: &str, origin: &str) -> Result<Vec<InterventionEntry>> {
    let map: BTreeMap<String, String> =
        serde_json::from_str(text).map_err(|source| PipelineError::Json {
            origin: origin.to_string(),
            source,
        })?;
    Ok(map
        .into_iter()
        .map(|(state, intervention)| InterventionEntry {
            state,
            intervention,
        })
        .collect())
}

/// Fetch the intervention feed. Re-fetched every run.
#[instrument(level = "info", skip(client))]
pub fn load_interventions(client: &Client, url: &str) -> Result<Vec<InterventionEntry>> {
    let text = fetch_text(client, url)?;
    let entries = parse_interventions(&text, url)?;
    info!(entries = entries.len(), "interventions loaded");
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[test]
    fn parses_state_to_label_pairs() {
        let entries = parse_interventions(
            r#"{"CA": "shelter_in_place", "AL": "limited_action"}"#,
            "feed",
        )
        .unwrap();
        assert_eq!(
            entries,
            vec![
                InterventionEntry {
                    state: "AL".into(),
                    intervention: "limited_action".into()
                },
                InterventionEntry {
                    state: "CA".into(),
                    intervention: "shelter_in_place".into()
                },
            ]
        );
    }

    #[test]
    fn non_object_body_is_a_json_error() {
        assert!(matches!(
            parse_interventions("[1, 2, 3]", "feed"),
            Err(PipelineError::Json { .. })
        ));
    }

    #[test]
    fn fetches_from_feed_url() {
        let mut server = Server::new();
        let mock = server
            .mock("GET", "/interventions.json")
            .with_status(200)
            .with_body(r#"{"NY": "shelter_in_place"}"#)
            .create();
        let client = crate::fetch::build_client(5).unwrap();
        let entries =
            load_interventions(&client, &format!("{}/interventions.json", server.url())).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].state, "NY");
        mock.assert();
    }
}
