// src/projection/mod.rs

pub mod extract;

pub use extract::{BaselineSearch, Projection, ProjectionSeries, SeriesPoint};

use chrono::NaiveDate;
use serde_json::Value;
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument};

use crate::error::{PipelineError, Result};
use crate::process::date_parser::parse_projection_date;
use crate::reference::ReferenceTable;

/// Position of the date string in a model output row.
pub const DATE_INDEX: usize = 0;
/// Position of the hospitalization count in a model output row.
pub const HOSPITALIZATION_INDEX: usize = 8;
/// Scenario file suffix; scenario 0 is "no intervention".
pub const NO_INTERVENTION_SCENARIO: u32 = 0;

/// Projected hospitalizations for one state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectionRecord {
    pub abbreviation: String,
    pub projection: Projection,
}

/// Projections keyed by state abbreviation. States without a model file are absent.
#[derive(Debug, Clone, Default)]
pub struct ProjectionTable {
    by_abbreviation: BTreeMap<String, Projection>,
}

impl ProjectionTable {
    pub fn from_records(records: impl IntoIterator<Item = ProjectionRecord>) -> Self {
        Self {
            by_abbreviation: records
                .into_iter()
                .map(|r| (r.abbreviation, r.projection))
                .collect(),
        }
    }

    pub fn get(&self, abbreviation: &str) -> Option<Projection> {
        self.by_abbreviation.get(abbreviation).copied()
    }

    pub fn len(&self) -> usize {
        self.by_abbreviation.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_abbreviation.is_empty()
    }
}

/// `<dir>/<abbrev>.0.json`
pub fn projection_file(dir: &Path, abbreviation: &str) -> PathBuf {
    dir.join(format!("{}.{}.json", abbreviation, NO_INTERVENTION_SCENARIO))
}

fn hospitalization_value(v: &Value) -> std::result::Result<Option<i64>, String> {
    match v {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.round() as i64))
            .map(Some)
            .ok_or_else(|| format!("unrepresentable number {}", n)),
        other => Err(format!("expected a number, got {}", other)),
    }
}

/// Parse one model output file: an array of positional rows.
pub fn parse_series(text: &str, path: &Path) -> Result<ProjectionSeries> {
    let rows: Vec<Vec<Value>> = serde_json::from_str(text).map_err(|source| PipelineError::Json {
        origin: path.display().to_string(),
        source,
    })?;
    let malformed = |row: usize, reason: String| PipelineError::MalformedProjection {
        path: path.to_path_buf(),
        row,
        reason,
    };

    let mut points = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let date = row
            .get(DATE_INDEX)
            .and_then(Value::as_str)
            .and_then(parse_projection_date)
            .ok_or_else(|| malformed(i, "missing or unparseable date".into()))?;
        let raw = row.get(HOSPITALIZATION_INDEX).ok_or_else(|| {
            malformed(
                i,
                format!("row has {} fields, need {}", row.len(), HOSPITALIZATION_INDEX + 1),
            )
        })?;
        let hospitalizations = hospitalization_value(raw).map_err(|reason| malformed(i, reason))?;
        points.push(SeriesPoint {
            date,
            hospitalizations,
        });
    }
    Ok(ProjectionSeries::new(points))
}

/// Extract projections for every reference state that has a model file in `dir`.
#[instrument(level = "info", skip(reference), fields(dir = %dir.display()))]
pub fn load_projections(
    dir: &Path,
    reference: &ReferenceTable,
    today: NaiveDate,
) -> Result<ProjectionTable> {
    let mut records = Vec::new();
    for abbreviation in reference.abbreviations() {
        let path = projection_file(dir, abbreviation);
        if !path.exists() {
            debug!(abbreviation, "no projection file");
            continue;
        }
        let text = fs::read_to_string(&path).map_err(|source| PipelineError::Io {
            path: path.clone(),
            source,
        })?;
        let projection = parse_series(&text, &path)?.project(today)?;
        debug!(abbreviation, near = projection.near, far = projection.far, "projected");
        records.push(ProjectionRecord {
            abbreviation: abbreviation.to_string(),
            projection,
        });
    }
    info!(states = records.len(), "projections loaded");
    Ok(ProjectionTable::from_records(records))
}
