// src/error.rs

use chrono::NaiveDate;
use std::path::PathBuf;

/// Every way a snapshot run can fail. None of these are retried; the
/// caller is expected to abort the run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("GET {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("CSV parse error in {origin}: {source}")]
    Csv {
        origin: String,
        #[source]
        source: csv::Error,
    },

    #[error("JSON parse error in {origin}: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("expected columns missing from report: {}", missing.join(", "))]
    SchemaMismatch { missing: Vec<String> },

    #[error("combined key {key:?} occurs {count} times")]
    UniquenessViolation { key: String, count: usize },

    #[error("no baseline date for projections within 4 days of {today}")]
    MissingBaseline { today: NaiveDate },

    #[error("found {found} hospitalization rows at {date}, expected 1")]
    AmbiguousOrMissingDataPoint { date: NaiveDate, found: usize },

    #[error("malformed projection row {row} in {path:?}: {reason}")]
    MalformedProjection {
        path: PathBuf,
        row: usize,
        reason: String,
    },

    #[error("unknown column {0:?}")]
    UnknownColumn(String),

    #[error("shapefile error on {path:?}: {source}")]
    Shapefile {
        path: PathBuf,
        #[source]
        source: shapefile::Error,
    },

    #[error("invalid DBF field {0:?}")]
    InvalidField(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T, E = PipelineError> = std::result::Result<T, E>;
