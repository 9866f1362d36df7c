// src/config.rs

use chrono::{Duration, Local, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::info;
use url::Url;

use crate::error::{PipelineError, Result};

static DEFAULT_REPORT_BASE_URL: &str = "https://github.com/CSSEGISandData/COVID-19/raw/master/csse_covid_19_data/csse_covid_19_daily_reports/";
static DEFAULT_INTERVENTIONS_URL: &str = "https://raw.githubusercontent.com/covid-projections/covid-projections/master/src/assets/data/interventions.json";

/// Run configuration, usually read from `covidsnap.yaml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory URL holding the per-day `MM-DD-YYYY.csv` case reports.
    pub report_base_url: String,
    pub interventions_url: String,
    /// `file://` URI of the checked-out public data repo.
    pub public_data_url: String,
    /// Where the upstream model run left its `<abbrev>.0.json` files.
    pub projections_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Report day to fetch; yesterday when unset.
    pub report_date: Option<NaiveDate>,
    pub http_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            report_base_url: DEFAULT_REPORT_BASE_URL.to_string(),
            interventions_url: DEFAULT_INTERVENTIONS_URL.to_string(),
            public_data_url: "file:///var/lib/covid-data-public".to_string(),
            projections_dir: PathBuf::from("results/test"),
            output_dir: PathBuf::from("results"),
            report_date: None,
            http_timeout_secs: 60,
        }
    }
}

impl Config {
    /// Load from a YAML file. Missing keys fall back to the defaults.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| PipelineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).map_err(|e| PipelineError::Config(e.to_string()))
    }

    /// Local directory behind `public_data_url`.
    pub fn public_data_path(&self) -> Result<PathBuf> {
        let url = Url::parse(&self.public_data_url)
            .map_err(|e| PipelineError::Config(format!("{}: {}", self.public_data_url, e)))?;
        if url.scheme() != "file" {
            return Err(PipelineError::Config(format!(
                "public_data_url must be a file:// URI, got {}",
                self.public_data_url
            )));
        }
        url.to_file_path().map_err(|_| {
            PipelineError::Config(format!("cannot map {} to a path", self.public_data_url))
        })
    }

    /// Census state boundaries (`tl_2019_us_state`), without extension.
    pub fn state_shapefile(&self) -> Result<PathBuf> {
        Ok(self
            .public_data_path()?
            .join("data/shapefiles-uscensus/tl_2019_us_state"))
    }

    /// Census county boundaries (`tl_2019_us_county`), without extension.
    pub fn county_shapefile(&self) -> Result<PathBuf> {
        Ok(self
            .public_data_path()?
            .join("data/shapefiles-uscensus/tl_2019_us_county"))
    }
}

/// Everything one run needs, built once in `main` and passed down.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub config: Config,
    /// Day of the case report being fetched.
    pub report_date: NaiveDate,
    /// Wall-clock time of the run; its date anchors the projection search.
    pub now: NaiveDateTime,
}

impl RunContext {
    pub fn new(config: Config, now: NaiveDateTime) -> Self {
        let report_date = config
            .report_date
            .unwrap_or_else(|| now.date() - Duration::days(1));
        info!(%report_date, %now, "run context");
        Self {
            config,
            report_date,
            now,
        }
    }

    pub fn from_local_clock(config: Config) -> Self {
        Self::new(config, Local::now().naive_local())
    }
}
