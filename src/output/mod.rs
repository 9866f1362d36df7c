// src/output/mod.rs

//! Tabular exports of the canonical tables.

pub mod csv;
pub mod parquet;

pub use self::csv::write_csv;
pub use self::parquet::write_parquet;

use anyhow::{Context, Result};
use std::{fs, path::Path};

use crate::table::CanonicalTable;

/// Name of the synthetic row id column that leads every export.
pub const OBJECTID: &str = "OBJECTID";

/// Write `table` as `<dir>/<stem>.csv` and `<dir>/<stem>.parquet`.
pub fn write_tables(table: &CanonicalTable, dir: &Path, stem: &str) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("creating output directory {:?}", dir))?;
    write_csv(table, &dir.join(format!("{}.csv", stem)))?;
    write_parquet(table, &dir.join(format!("{}.parquet", stem)))?;
    Ok(())
}
