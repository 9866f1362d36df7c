// src/table/mod.rs

pub mod column;
pub mod row;

pub use column::{Cell, Column, BASE_COLUMNS, NULL_VALUE, STATE_COLUMNS};
pub use row::{CanonicalGeoRow, ShapeTag, LAST_UPDATE_FORMAT};

use std::collections::HashMap;
use tracing::error;

use crate::error::PipelineError;

/// Which geography a table holds; decides the column set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    County,
    State,
}

/// A canonical row-per-geography table. Row position is the `OBJECTID`.
#[derive(Debug, Clone)]
pub struct CanonicalTable {
    pub kind: TableKind,
    pub rows: Vec<CanonicalGeoRow>,
}

impl CanonicalTable {
    /// Build a table, enforcing that `Combined Key` is unique.
    pub fn new(kind: TableKind, rows: Vec<CanonicalGeoRow>) -> Result<Self, PipelineError> {
        let table = Self { kind, rows };
        table.check_unique_keys()?;
        Ok(table)
    }

    pub fn columns(&self) -> Vec<Column> {
        let mut cols = BASE_COLUMNS.to_vec();
        if self.kind == TableKind::State {
            cols.extend_from_slice(STATE_COLUMNS);
        }
        cols
    }

    pub fn has_column(&self, column: Column) -> bool {
        BASE_COLUMNS.contains(&column)
            || (self.kind == TableKind::State && STATE_COLUMNS.contains(&column))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Missing keys compare equal to each other, so two keyless rows collide.
    pub fn check_unique_keys(&self) -> Result<(), PipelineError> {
        let mut counts: HashMap<Option<&str>, usize> = HashMap::with_capacity(self.rows.len());
        for row in &self.rows {
            *counts.entry(row.combined_key.as_deref()).or_default() += 1;
        }
        let worst = counts
            .into_iter()
            .filter(|(_, n)| *n > 1)
            .max_by_key(|(_, n)| *n);
        if let Some((key, count)) = worst {
            let key = key.unwrap_or(NULL_VALUE).to_string();
            error!(%key, count, "duplicate combined key");
            return Err(PipelineError::UniquenessViolation { key, count });
        }
        Ok(())
    }

    /// Left-pad every FIPS code with zeros to `width` digits.
    pub fn pad_fips(&mut self, width: usize) {
        for row in &mut self.rows {
            if let Some(f) = row.fips.as_mut() {
                *f = format!("{:0>width$}", f, width = width);
            }
        }
    }

    pub fn find_by_key(&self, combined_key: &str) -> Option<&CanonicalGeoRow> {
        self.rows
            .iter()
            .find(|r| r.combined_key.as_deref() == Some(combined_key))
    }
}
