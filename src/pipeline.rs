// src/pipeline.rs

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use tracing::{info, instrument};

use crate::config::RunContext;
use crate::output::write_tables;
use crate::process::{load_county_snapshot, load_state_snapshot};
use crate::reference::ReferenceTable;
use crate::shape::{join_and_write_shapefile, JoinStats};
use crate::table::Column;

/// Census field holding the 2-digit state code.
pub const STATE_PIVOT_FIELD: &str = "STATEFP";
/// Census field holding the 5-digit state+county code.
pub const COUNTY_PIVOT_FIELD: &str = "GEOID";
/// Digits in a county `GEOID`.
pub const COUNTY_FIPS_WIDTH: usize = 5;

/// Row and record counts from one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub counties: usize,
    pub states: usize,
    pub state_shapes: JoinStats,
    pub county_shapes: JoinStats,
}

/// Build one snapshot: county and state tables, their tabular exports,
/// and both enriched shapefiles under `output_dir`.
#[instrument(level = "info", skip_all, fields(date = %ctx.report_date))]
pub fn run(ctx: &RunContext, client: &Client) -> Result<RunSummary> {
    let config = &ctx.config;
    let out = &config.output_dir;
    let reference = ReferenceTable::us_states();

    // Both tables and both geometry sources resolve before anything is written.
    let counties = load_county_snapshot(client, ctx).context("loading county snapshot")?;
    let states = load_state_snapshot(client, ctx, &counties, &reference)
        .context("loading state snapshot")?;
    let state_source = config.state_shapefile()?;
    let county_source = config.county_shapefile()?;

    write_tables(&counties, out, "counties")?;
    write_tables(&states, out, "states")?;

    let state_shapes = join_and_write_shapefile(
        &states,
        &state_source,
        STATE_PIVOT_FIELD,
        Column::Fips.name(),
        &out.join("states"),
    )
    .context("writing state shapefile")?;

    let mut padded = counties.clone();
    padded.pad_fips(COUNTY_FIPS_WIDTH);
    let county_shapes = join_and_write_shapefile(
        &padded,
        &county_source,
        COUNTY_PIVOT_FIELD,
        Column::Fips.name(),
        &out.join("counties"),
    )
    .context("writing county shapefile")?;

    let summary = RunSummary {
        counties: counties.len(),
        states: states.len(),
        state_shapes,
        county_shapes,
    };
    info!(?summary, output = %out.display(), "snapshot complete");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::PipelineError;
    use crate::fetch::build_client;
    use chrono::NaiveDate;
    use mockito::Server;
    use shapefile::dbase::{FieldName, FieldValue, Record, TableWriterBuilder};
    use shapefile::Point;
    use std::{fs, path::Path};
    use tempfile::tempdir;
    use url::Url;

    const REPORT: &str = "FIPS,Admin2,Province_State,Country_Region,Last_Update,Lat,Long_,Confirmed,Deaths,Recovered,Active,Combined_Key
6001.0,Alameda,California,US,2020-04-01 21:58:49,37.6,-121.8,256,4,0,0,\"Alameda, California, US\"
6003.0,Alpine,California,US,2020-04-01 21:58:49,38.5,-119.8,1,0,0,0,\"Alpine, California, US\"
36001.0,Albany,New York,US,2020-04-01 21:58:49,42.6,-73.9,100,2,0,0,\"Albany, New York, US\"
,,Hubei,China,2020-04-01 21:58:49,30.9,112.2,67802,3199,63326,1277,\"Hubei, China\"
";

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter("debug")
            .try_init();
    }

    fn write_geometry(path: &Path, pivot: &str, width: u8, keys: &[&str]) -> Result<()> {
        let builder =
            TableWriterBuilder::new().add_character_field(FieldName::try_from(pivot).unwrap(), width);
        let mut writer = shapefile::Writer::from_path(path.with_extension("shp"), builder)?;
        for key in keys {
            let mut record = Record::default();
            record.insert(pivot.to_string(), FieldValue::Character(Some(key.to_string())));
            writer.write_shape_and_record(&Point::new(0.0, 0.0), &record)?;
        }
        Ok(())
    }

    fn count_records(path: &Path) -> Result<usize> {
        let mut reader = shapefile::Reader::from_path(path.with_extension("shp"))?;
        Ok(reader.iter_shapes_and_records().count())
    }

    #[test]
    fn end_to_end_snapshot() -> Result<()> {
        init_tracing();
        let tmp = tempdir()?;
        let public = tmp.path().join("public");
        let shapes = public.join("data/shapefiles-uscensus");
        fs::create_dir_all(&shapes)?;
        write_geometry(&shapes.join("tl_2019_us_state"), "STATEFP", 2, &["06", "36", "48"])?;
        write_geometry(
            &shapes.join("tl_2019_us_county"),
            "GEOID",
            5,
            &["06001", "06003", "36001", "48001"],
        )?;
        let projections = tmp.path().join("projections");
        fs::create_dir_all(&projections)?;

        let mut server = Server::new();
        let report = server
            .mock("GET", "/reports/04-01-2020.csv")
            .with_status(200)
            .with_body(REPORT)
            .create();
        let feed = server
            .mock("GET", "/interventions.json")
            .with_status(200)
            .with_body(r#"{"CA": "shelter_in_place"}"#)
            .create();

        let config = Config {
            report_base_url: format!("{}/reports/", server.url()),
            interventions_url: format!("{}/interventions.json", server.url()),
            public_data_url: Url::from_directory_path(&public).unwrap().to_string(),
            projections_dir: projections,
            output_dir: tmp.path().join("out"),
            ..Config::default()
        };
        let now = NaiveDate::from_ymd_opt(2020, 4, 2)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let ctx = RunContext::new(config, now);
        let client = build_client(5)?;

        let summary = run(&ctx, &client)?;
        report.assert();
        feed.assert();

        assert_eq!(summary.counties, 3);
        assert_eq!(summary.states, 1);
        assert_eq!(summary.state_shapes, JoinStats { written: 1, dropped: 2 });
        assert_eq!(summary.county_shapes, JoinStats { written: 3, dropped: 1 });

        let out = tmp.path().join("out");
        for name in ["counties.csv", "counties.parquet", "states.csv", "states.parquet"] {
            assert!(out.join(name).exists(), "{} missing", name);
        }
        assert_eq!(count_records(&out.join("states"))?, 1);
        assert_eq!(count_records(&out.join("counties"))?, 3);
        Ok(())
    }

    #[test]
    fn state_stage_failure_leaves_no_county_output() -> Result<()> {
        let tmp = tempdir()?;
        let projections = tmp.path().join("projections");
        fs::create_dir_all(&projections)?;
        // no date within four days of the run, so the baseline search fails
        fs::write(
            projections.join("CA.0.json"),
            r#"[["04/20/2020", 0, 0, 0, 0, 0, 0, 0, 5]]"#,
        )?;

        let mut server = Server::new();
        let _report = server
            .mock("GET", "/reports/04-01-2020.csv")
            .with_status(200)
            .with_body(REPORT)
            .create();
        let _feed = server
            .mock("GET", "/interventions.json")
            .with_status(200)
            .with_body(r#"{"CA": "shelter_in_place"}"#)
            .create();
        let config = Config {
            report_base_url: format!("{}/reports/", server.url()),
            interventions_url: format!("{}/interventions.json", server.url()),
            projections_dir: projections,
            output_dir: tmp.path().join("out"),
            ..Config::default()
        };
        let now = NaiveDate::from_ymd_opt(2020, 4, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let ctx = RunContext::new(config, now);

        let err = run(&ctx, &build_client(5)?).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::MissingBaseline { .. })
        ));
        assert!(!tmp.path().join("out").exists());
        Ok(())
    }

    #[test]
    fn missing_report_aborts_before_writing() -> Result<()> {
        let tmp = tempdir()?;
        let mut server = Server::new();
        let _report = server
            .mock("GET", "/reports/04-01-2020.csv")
            .with_status(404)
            .create();
        let config = Config {
            report_base_url: format!("{}/reports/", server.url()),
            output_dir: tmp.path().join("out"),
            ..Config::default()
        };
        let now = NaiveDate::from_ymd_opt(2020, 4, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let ctx = RunContext::new(config, now);

        assert!(run(&ctx, &build_client(5)?).is_err());
        assert!(!tmp.path().join("out").exists());
        Ok(())
    }
}
