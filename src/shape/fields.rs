// src/shape/fields.rs

use shapefile::dbase::{FieldName, FieldValue, TableWriterBuilder};

use crate::error::{PipelineError, Result};
use crate::table::{CanonicalGeoRow, CanonicalTable, Cell, Column};

/// DBF column type of an enrichment field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Character { length: u8 },
    Numeric { length: u8, decimals: u8 },
}

/// A canonical column copied onto geometry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrichmentField {
    pub column: Column,
    /// DBF names are capped at 10 characters.
    pub dbf_name: &'static str,
    pub kind: FieldKind,
}

const COUNT: FieldKind = FieldKind::Numeric {
    length: 14,
    decimals: 0,
};
const RATE: FieldKind = FieldKind::Numeric {
    length: 14,
    decimals: 4,
};

/// Allow-list of enrichment fields, in output order.
pub const ENRICHMENT_FIELDS: &[EnrichmentField] = &[
    EnrichmentField {
        column: Column::Confirmed,
        dbf_name: "Confirmed",
        kind: COUNT,
    },
    EnrichmentField {
        column: Column::Recovered,
        dbf_name: "Recovered",
        kind: COUNT,
    },
    EnrichmentField {
        column: Column::Deaths,
        dbf_name: "Deaths",
        kind: COUNT,
    },
    EnrichmentField {
        column: Column::Active,
        dbf_name: "Active",
        kind: COUNT,
    },
    EnrichmentField {
        column: Column::IncidentRate,
        dbf_name: "Incident R",
        kind: RATE,
    },
    EnrichmentField {
        column: Column::PeopleTested,
        dbf_name: "People Tes",
        kind: RATE,
    },
    EnrichmentField {
        column: Column::Intervention,
        dbf_name: "Interventi",
        kind: FieldKind::Character { length: 32 },
    },
    EnrichmentField {
        column: Column::FourDayHospitalizations,
        dbf_name: "4-day Hosp",
        kind: COUNT,
    },
    EnrichmentField {
        column: Column::EightDayHospitalizations,
        dbf_name: "8-day Hosp",
        kind: COUNT,
    },
];

/// The allow-listed fields this table actually has.
pub fn fields_for(table: &CanonicalTable) -> Vec<EnrichmentField> {
    ENRICHMENT_FIELDS
        .iter()
        .filter(|f| table.has_column(f.column))
        .copied()
        .collect()
}

impl EnrichmentField {
    fn field_name(&self) -> Result<FieldName> {
        FieldName::try_from(self.dbf_name)
            .map_err(|_| PipelineError::InvalidField(self.dbf_name.to_string()))
    }

    /// Append this field's definition to a DBF schema.
    pub fn declare(&self, builder: TableWriterBuilder) -> Result<TableWriterBuilder> {
        let name = self.field_name()?;
        Ok(match self.kind {
            FieldKind::Character { length } => builder.add_character_field(name, length),
            FieldKind::Numeric { length, decimals } => {
                builder.add_numeric_field(name, length, decimals)
            }
        })
    }

    /// DBF value for `row`. Missing cells become real DBF nulls.
    pub fn value(&self, row: &CanonicalGeoRow) -> FieldValue {
        let cell = row.cell(self.column);
        match self.kind {
            FieldKind::Character { length } => FieldValue::Character(match cell {
                Cell::Null => None,
                other => Some(other.render().chars().take(length as usize).collect()),
            }),
            FieldKind::Numeric { .. } => FieldValue::Numeric(cell.as_f64()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::TableKind;

    #[test]
    fn dbf_names_fit_ten_characters() {
        for f in ENRICHMENT_FIELDS {
            assert!(f.dbf_name.len() <= 10, "{} too long", f.dbf_name);
            assert!(f.field_name().is_ok());
        }
    }

    #[test]
    fn county_tables_skip_state_only_fields() {
        let county = CanonicalTable::new(TableKind::County, vec![]).unwrap();
        let names: Vec<&str> = fields_for(&county).iter().map(|f| f.dbf_name).collect();
        assert_eq!(
            names,
            vec!["Confirmed", "Recovered", "Deaths", "Active", "Incident R", "People Tes"]
        );
        let state = CanonicalTable::new(TableKind::State, vec![]).unwrap();
        assert_eq!(fields_for(&state).len(), ENRICHMENT_FIELDS.len());
    }

    #[test]
    fn missing_cells_become_dbf_nulls() {
        let row = CanonicalGeoRow {
            confirmed: Some(12),
            ..Default::default()
        };
        let by_column = |c: Column| {
            ENRICHMENT_FIELDS
                .iter()
                .find(|f| f.column == c)
                .unwrap()
                .value(&row)
        };
        assert_eq!(by_column(Column::Confirmed), FieldValue::Numeric(Some(12.0)));
        assert_eq!(by_column(Column::Deaths), FieldValue::Numeric(None));
        assert_eq!(by_column(Column::Intervention), FieldValue::Character(None));
    }

    #[test]
    fn long_labels_are_truncated_to_field_width() {
        let row = CanonicalGeoRow {
            intervention: Some("x".repeat(40)),
            ..Default::default()
        };
        let field = ENRICHMENT_FIELDS
            .iter()
            .find(|f| f.column == Column::Intervention)
            .unwrap();
        match field.value(&row) {
            FieldValue::Character(Some(s)) => assert_eq!(s.len(), 32),
            other => panic!("unexpected {:?}", other),
        }
    }
}
