// src/table/row.rs

use chrono::NaiveDateTime;

use super::column::{Cell, Column};

/// Render format for `Last Update`, e.g. `4/1/2020 21:58`.
pub const LAST_UPDATE_FORMAT: &str = "%-m/%-d/%Y %H:%M";

/// Geometry tag carried in the `Shape` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShapeTag {
    #[default]
    Point,
}

impl ShapeTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeTag::Point => "Point",
        }
    }
}

/// One county or state. `None` is the missing marker for every field.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CanonicalGeoRow {
    pub province_state: Option<String>,
    pub country_region: Option<String>,
    pub last_update: Option<NaiveDateTime>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub confirmed: Option<i64>,
    pub recovered: Option<i64>,
    pub deaths: Option<i64>,
    pub active: Option<i64>,
    pub county: Option<String>,
    /// County rows: state+county digits. State rows: 2-digit state code.
    pub fips: Option<String>,
    pub combined_key: Option<String>,
    pub incident_rate: Option<f64>,
    pub people_tested: Option<f64>,
    pub shape: ShapeTag,
    pub intervention: Option<String>,
    pub projection_4_day: Option<i64>,
    pub projection_8_day: Option<i64>,
}

impl CanonicalGeoRow {
    pub fn cell(&self, column: Column) -> Cell {
        match column {
            Column::ProvinceState => self.province_state.clone().into(),
            Column::CountryRegion => self.country_region.clone().into(),
            Column::LastUpdate => self
                .last_update
                .map(|t| t.format(LAST_UPDATE_FORMAT).to_string())
                .into(),
            Column::Latitude => self.latitude.into(),
            Column::Longitude => self.longitude.into(),
            Column::Confirmed => self.confirmed.into(),
            Column::Recovered => self.recovered.into(),
            Column::Deaths => self.deaths.into(),
            Column::Active => self.active.into(),
            Column::County => self.county.clone().into(),
            Column::Fips => self.fips.clone().into(),
            Column::CombinedKey => self.combined_key.clone().into(),
            Column::IncidentRate => self.incident_rate.into(),
            Column::PeopleTested => self.people_tested.into(),
            Column::Shape => Cell::Text(self.shape.as_str().to_string()),
            Column::Intervention => self.intervention.clone().into(),
            Column::FourDayHospitalizations => self.projection_4_day.into(),
            Column::EightDayHospitalizations => self.projection_8_day.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn last_update_renders_without_padding() {
        let row = CanonicalGeoRow {
            last_update: Some(
                NaiveDate::from_ymd_opt(2020, 4, 1)
                    .unwrap()
                    .and_hms_opt(21, 58, 49)
                    .unwrap(),
            ),
            ..Default::default()
        };
        assert_eq!(
            row.cell(Column::LastUpdate),
            Cell::Text("4/1/2020 21:58".into())
        );
    }

    #[test]
    fn shape_is_always_point() {
        let row = CanonicalGeoRow::default();
        assert_eq!(row.cell(Column::Shape), Cell::Text("Point".into()));
        assert!(row.cell(Column::County).is_null());
    }
}
