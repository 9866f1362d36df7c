// src/projection/extract.rs

use chrono::{Duration, NaiveDate};
use std::collections::HashMap;
use tracing::{debug, instrument};

use crate::error::{PipelineError, Result};

/// Days searched forward from "today" for the first date in the series.
pub const BASELINE_WINDOW_DAYS: i64 = 4;
/// Distance between the baseline and each projected date.
pub const PROJECTION_STRIDE_DAYS: i64 = 4;

/// One row of a state's model output.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    /// `None` when the model left the cell null.
    pub hospitalizations: Option<i64>,
}

/// Outcome of the baseline search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaselineSearch {
    Found(NaiveDate),
    NotFound,
}

/// Hospitalization estimates 4 and 8 days past the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Projection {
    pub near: i64,
    pub far: i64,
}

/// A state's time series, indexed by date. Rows may arrive in any order.
#[derive(Debug, Clone, Default)]
pub struct ProjectionSeries {
    by_date: HashMap<NaiveDate, Vec<Option<i64>>>,
}

impl ProjectionSeries {
    pub fn new(points: impl IntoIterator<Item = SeriesPoint>) -> Self {
        let mut by_date: HashMap<NaiveDate, Vec<Option<i64>>> = HashMap::new();
        for p in points {
            by_date.entry(p.date).or_default().push(p.hospitalizations);
        }
        Self { by_date }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.by_date.contains_key(&date)
    }

    /// First of `today .. today + BASELINE_WINDOW_DAYS` present in the series.
    pub fn find_baseline(&self, today: NaiveDate) -> BaselineSearch {
        (0..BASELINE_WINDOW_DAYS)
            .map(|offset| today + Duration::days(offset))
            .find(|d| self.contains(*d))
            .map_or(BaselineSearch::NotFound, BaselineSearch::Found)
    }

    /// The hospitalization value of the single row at `date`.
    ///
    /// Zero or several rows is an error, whatever their values. A lone row
    /// holding null counts as missing.
    pub fn hospitalizations_at(&self, date: NaiveDate) -> Result<i64> {
        let rows = self.by_date.get(&date).map(Vec::as_slice).unwrap_or_default();
        match rows {
            [Some(value)] => Ok(*value),
            [None] => Err(PipelineError::AmbiguousOrMissingDataPoint { date, found: 0 }),
            _ => Err(PipelineError::AmbiguousOrMissingDataPoint {
                date,
                found: rows.len(),
            }),
        }
    }

    /// Locate the baseline, then read the values one and two strides later.
    #[instrument(level = "debug", skip(self))]
    pub fn project(&self, today: NaiveDate) -> Result<Projection> {
        let baseline = match self.find_baseline(today) {
            BaselineSearch::Found(d) => d,
            BaselineSearch::NotFound => return Err(PipelineError::MissingBaseline { today }),
        };
        let stride = Duration::days(PROJECTION_STRIDE_DAYS);
        let near_date = baseline + stride;
        let far_date = near_date + stride;
        debug!(%baseline, %near_date, %far_date, "projection dates");

        Ok(Projection {
            near: self.hospitalizations_at(near_date)?,
            far: self.hospitalizations_at(far_date)?,
        })
    }
}
