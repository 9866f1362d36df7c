// src/fetch/mod.rs

pub mod urls;

use reqwest::blocking::Client;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::error::{PipelineError, Result};

/// Blocking client with the configured timeout.
pub fn build_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(concat!("covidsnap/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|source| PipelineError::Network {
            url: String::new(),
            source,
        })
}

/// GET `url` and return the body. Non-2xx statuses are errors; nothing is retried.
#[instrument(level = "debug", skip(client))]
pub fn fetch_text(client: &Client, url: &str) -> Result<String> {
    let network = |source| PipelineError::Network {
        url: url.to_string(),
        source,
    };
    let body = client
        .get(url)
        .send()
        .map_err(network)?
        .error_for_status()
        .map_err(network)?
        .text()
        .map_err(network)?;
    debug!(bytes = body.len(), "fetched");
    Ok(body)
}
