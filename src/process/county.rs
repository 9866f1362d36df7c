// src/process/county.rs

use csv::{ReaderBuilder, StringRecord};
use reqwest::blocking::Client;
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

use super::date_parser::parse_last_update;
use super::utils::{clean_str, normalize_fips, parse_count, parse_float};
use crate::config::RunContext;
use crate::error::{PipelineError, Result};
use crate::fetch::{fetch_text, urls::daily_report_url};
use crate::table::{CanonicalGeoRow, CanonicalTable, ShapeTag, TableKind};

/// Columns every daily report must carry.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "Province_State",
    "Country_Region",
    "Last_Update",
    "Lat",
    "Long_",
    "Confirmed",
    "Recovered",
    "Deaths",
    "Active",
    "Combined_Key",
    "Admin2",
    "FIPS",
];

const UNASSIGNED: &str = "Unassigned";
const UNASSIGNED_PREFIX: &str = "Unassigned, ";
const US: &str = "US";

/// Header positions of the columns we read.
struct ReportColumns {
    province_state: usize,
    country_region: usize,
    last_update: usize,
    lat: usize,
    long: usize,
    confirmed: usize,
    recovered: usize,
    deaths: usize,
    active: usize,
    combined_key: usize,
    admin2: usize,
    fips: usize,
    incident_rate: Option<usize>,
    people_tested: Option<usize>,
}

impl ReportColumns {
    fn locate(headers: &StringRecord) -> Result<Self> {
        let index: HashMap<&str, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim_start_matches('\u{feff}').trim(), i))
            .collect();

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|c| !index.contains_key(*c))
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(PipelineError::SchemaMismatch { missing });
        }

        let at = |name: &str| index[name];
        Ok(Self {
            province_state: at("Province_State"),
            country_region: at("Country_Region"),
            last_update: at("Last_Update"),
            lat: at("Lat"),
            long: at("Long_"),
            confirmed: at("Confirmed"),
            recovered: at("Recovered"),
            deaths: at("Deaths"),
            active: at("Active"),
            combined_key: at("Combined_Key"),
            admin2: at("Admin2"),
            fips: at("FIPS"),
            incident_rate: index
                .get("Incident_Rate")
                .or_else(|| index.get("Incidence_Rate"))
                .copied(),
            people_tested: index.get("People_Tested").copied(),
        })
    }
}

fn field<'r>(record: &'r StringRecord, idx: usize) -> &'r str {
    record.get(idx).unwrap_or("")
}

fn to_canonical(cols: &ReportColumns, record: &StringRecord) -> CanonicalGeoRow {
    let raw_update = field(record, cols.last_update);
    let last_update = parse_last_update(raw_update);
    if last_update.is_none() && !raw_update.trim().is_empty() {
        warn!(value = raw_update, "unrecognised Last_Update format");
    }

    let county = clean_str(field(record, cols.admin2)).filter(|c| c != UNASSIGNED);
    let combined_key = clean_str(field(record, cols.combined_key)).map(|k| {
        k.strip_prefix(UNASSIGNED_PREFIX)
            .map(str::to_string)
            .unwrap_or(k)
    });

    CanonicalGeoRow {
        province_state: clean_str(field(record, cols.province_state)),
        country_region: clean_str(field(record, cols.country_region)),
        last_update,
        latitude: parse_float("Lat", field(record, cols.lat)),
        longitude: parse_float("Long_", field(record, cols.long)),
        confirmed: parse_count("Confirmed", field(record, cols.confirmed)),
        recovered: parse_count("Recovered", field(record, cols.recovered)),
        deaths: parse_count("Deaths", field(record, cols.deaths)),
        active: parse_count("Active", field(record, cols.active)),
        county,
        fips: normalize_fips(field(record, cols.fips)),
        combined_key,
        incident_rate: cols
            .incident_rate
            .and_then(|i| parse_float("Incident_Rate", field(record, i))),
        people_tested: cols
            .people_tested
            .and_then(|i| parse_float("People_Tested", field(record, i))),
        shape: ShapeTag::Point,
        ..Default::default()
    }
}

/// Parse a daily report into the county table: US rows only, renamed and
/// normalised. `origin` names the source in error messages.
#[instrument(level = "info", skip(text), fields(bytes = text.len()))]
pub fn parse_county_report(text: &str, origin: &str) -> Result<CanonicalTable> {
    let csv_err = |source| PipelineError::Csv {
        origin: origin.to_string(),
        source,
    };
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = rdr.headers().map_err(csv_err)?.clone();
    let cols = ReportColumns::locate(&headers)?;

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for result in rdr.records() {
        let record = result.map_err(csv_err)?;
        if field(&record, cols.country_region).trim() != US {
            skipped += 1;
            continue;
        }
        rows.push(to_canonical(&cols, &record));
    }
    debug!(kept = rows.len(), skipped, "filtered to US rows");

    CanonicalTable::new(TableKind::County, rows)
}

/// Fetch the report for `ctx.report_date` and build the county table.
#[instrument(level = "info", skip(client, ctx), fields(date = %ctx.report_date))]
pub fn load_county_snapshot(client: &Client, ctx: &RunContext) -> Result<CanonicalTable> {
    let url = daily_report_url(&ctx.config.report_base_url, ctx.report_date)?;
    info!(%url, "fetching daily report");
    let text = fetch_text(client, url.as_str())?;
    let table = parse_county_report(&text, url.as_str())?;
    info!(rows = table.len(), "county snapshot loaded");
    Ok(table)
}
