// src/process/state.rs

use chrono::NaiveDateTime;
use reqwest::blocking::Client;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, instrument};

use crate::config::RunContext;
use crate::error::Result;
use crate::interventions::{load_interventions, InterventionEntry};
use crate::projection::{load_projections, ProjectionTable};
use crate::reference::ReferenceTable;
use crate::table::{CanonicalGeoRow, CanonicalTable, ShapeTag, TableKind};

/// County rows folded into one state.
///
/// Country and coordinates take the first non-missing county value, which
/// assumes they agree across a state. That is not checked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateAggregate {
    pub name: String,
    pub last_update: Option<NaiveDateTime>,
    pub confirmed: Option<i64>,
    pub recovered: Option<i64>,
    pub deaths: Option<i64>,
    pub active: Option<i64>,
    pub country_region: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

fn add(acc: &mut Option<i64>, v: Option<i64>) {
    if let Some(v) = v {
        *acc = Some(acc.unwrap_or(0) + v);
    }
}

fn first<T: Clone>(acc: &mut Option<T>, v: &Option<T>) {
    if acc.is_none() {
        acc.clone_from(v);
    }
}

impl StateAggregate {
    fn absorb(&mut self, row: &CanonicalGeoRow) {
        self.last_update = self.last_update.max(row.last_update);
        add(&mut self.confirmed, row.confirmed);
        add(&mut self.recovered, row.recovered);
        add(&mut self.deaths, row.deaths);
        add(&mut self.active, row.active);
        first(&mut self.country_region, &row.country_region);
        first(&mut self.latitude, &row.latitude);
        first(&mut self.longitude, &row.longitude);
    }
}

/// Group county rows by state name, in name order. Rows without a state are ignored.
pub fn aggregate_states(counties: &CanonicalTable) -> Vec<StateAggregate> {
    let mut groups: BTreeMap<&str, StateAggregate> = BTreeMap::new();
    for row in &counties.rows {
        let Some(name) = row.province_state.as_deref() else {
            continue;
        };
        groups
            .entry(name)
            .or_insert_with(|| StateAggregate {
                name: name.to_string(),
                ..Default::default()
            })
            .absorb(row);
    }
    groups.into_values().collect()
}

/// Fold counties into states and attach abbreviation, intervention and projections.
///
/// States without an intervention entry (or without a reference abbreviation)
/// are dropped. States without projections keep null predictions.
#[instrument(level = "info", skip_all, fields(counties = counties.len()))]
pub fn build_state_table(
    counties: &CanonicalTable,
    reference: &ReferenceTable,
    interventions: &[InterventionEntry],
    projections: &ProjectionTable,
) -> Result<CanonicalTable> {
    let by_state: HashMap<&str, &str> = interventions
        .iter()
        .rev()
        .map(|e| (e.state.as_str(), e.intervention.as_str()))
        .collect();

    let mut rows = Vec::new();
    for agg in aggregate_states(counties) {
        let Some(abbreviation) = reference.try_abbreviation(&agg.name) else {
            debug!(state = %agg.name, "no reference abbreviation, dropped");
            continue;
        };
        let Some(intervention) = by_state.get(abbreviation) else {
            debug!(state = %agg.name, abbreviation, "no intervention entry, dropped");
            continue;
        };
        let projection = projections.get(abbreviation);

        rows.push(CanonicalGeoRow {
            fips: reference.try_fips_code(&agg.name),
            combined_key: Some(agg.name.clone()),
            province_state: Some(agg.name),
            country_region: agg.country_region,
            last_update: agg.last_update,
            latitude: agg.latitude,
            longitude: agg.longitude,
            confirmed: agg.confirmed,
            recovered: agg.recovered,
            deaths: agg.deaths,
            active: agg.active,
            county: None,
            incident_rate: None,
            people_tested: None,
            shape: ShapeTag::Point,
            intervention: Some(intervention.to_string()),
            projection_4_day: projection.map(|p| p.near),
            projection_8_day: projection.map(|p| p.far),
        });
    }
    info!(states = rows.len(), "state table built");

    CanonicalTable::new(TableKind::State, rows)
}

/// Fetch interventions, read projections for `ctx.now`, and build the state table.
#[instrument(level = "info", skip_all)]
pub fn load_state_snapshot(
    client: &Client,
    ctx: &RunContext,
    counties: &CanonicalTable,
    reference: &ReferenceTable,
) -> Result<CanonicalTable> {
    let interventions = load_interventions(client, &ctx.config.interventions_url)?;
    let projections = load_projections(&ctx.config.projections_dir, reference, ctx.now.date())?;
    build_state_table(counties, reference, &interventions, &projections)
}
