// src/table/column.rs

use std::fmt;

use crate::error::PipelineError;

/// Placeholder written for missing cells in the tabular exports.
pub const NULL_VALUE: &str = "<Null>";

/// Display-named columns of the canonical tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    ProvinceState,
    CountryRegion,
    LastUpdate,
    Latitude,
    Longitude,
    Confirmed,
    Recovered,
    Deaths,
    Active,
    County,
    Fips,
    CombinedKey,
    IncidentRate,
    PeopleTested,
    Shape,
    Intervention,
    FourDayHospitalizations,
    EightDayHospitalizations,
}

/// Columns shared by county and state tables, in output order.
pub const BASE_COLUMNS: &[Column] = &[
    Column::ProvinceState,
    Column::CountryRegion,
    Column::LastUpdate,
    Column::Latitude,
    Column::Longitude,
    Column::Confirmed,
    Column::Recovered,
    Column::Deaths,
    Column::Active,
    Column::County,
    Column::Fips,
    Column::CombinedKey,
    Column::IncidentRate,
    Column::PeopleTested,
    Column::Shape,
];

/// Extra columns only the state table carries.
pub const STATE_COLUMNS: &[Column] = &[
    Column::Intervention,
    Column::FourDayHospitalizations,
    Column::EightDayHospitalizations,
];

impl Column {
    pub fn name(self) -> &'static str {
        match self {
            Column::ProvinceState => "Province/State",
            Column::CountryRegion => "Country/Region",
            Column::LastUpdate => "Last Update",
            Column::Latitude => "Latitude",
            Column::Longitude => "Longitude",
            Column::Confirmed => "Confirmed",
            Column::Recovered => "Recovered",
            Column::Deaths => "Deaths",
            Column::Active => "Active",
            Column::County => "County",
            Column::Fips => "State/County FIPS Code",
            Column::CombinedKey => "Combined Key",
            Column::IncidentRate => "Incident Rate",
            Column::PeopleTested => "People Tested",
            Column::Shape => "Shape",
            Column::Intervention => "Intervention",
            Column::FourDayHospitalizations => "4-day Hospitalizations Prediction",
            Column::EightDayHospitalizations => "8-day Hospitalizations Prediction",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, PipelineError> {
        BASE_COLUMNS
            .iter()
            .chain(STATE_COLUMNS)
            .copied()
            .find(|c| c.name() == name)
            .ok_or_else(|| PipelineError::UnknownColumn(name.to_string()))
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One cell of a canonical row, typed.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Int(i64),
    Float(f64),
    Null,
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Text form used for CSV export and pivot matching. Nulls become `<Null>`.
    pub fn render(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Int(v) => v.to_string(),
            Cell::Float(v) => v.to_string(),
            Cell::Null => NULL_VALUE.to_string(),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(v) => Some(*v as f64),
            Cell::Float(v) => Some(*v),
            Cell::Text(s) => s.trim().parse().ok(),
            Cell::Null => None,
        }
    }
}

impl From<Option<String>> for Cell {
    fn from(v: Option<String>) -> Self {
        v.map(Cell::Text).unwrap_or(Cell::Null)
    }
}

impl From<Option<i64>> for Cell {
    fn from(v: Option<i64>) -> Self {
        v.map(Cell::Int).unwrap_or(Cell::Null)
    }
}

impl From<Option<f64>> for Cell {
    fn from(v: Option<f64>) -> Self {
        v.map(Cell::Float).unwrap_or(Cell::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for c in BASE_COLUMNS.iter().chain(STATE_COLUMNS) {
            assert_eq!(Column::from_name(c.name()).unwrap(), *c);
        }
    }

    #[test]
    fn unknown_name_is_an_error() {
        assert!(matches!(
            Column::from_name("FIPS"),
            Err(PipelineError::UnknownColumn(n)) if n == "FIPS"
        ));
    }

    #[test]
    fn null_renders_as_placeholder() {
        assert_eq!(Cell::Null.render(), "<Null>");
        assert_eq!(Cell::from(None::<i64>), Cell::Null);
        assert_eq!(Cell::Int(12).render(), "12");
    }
}
