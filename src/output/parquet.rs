// src/output/parquet.rs

use anyhow::{Context, Result};
use arrow::array::{
    ArrayRef, Float64Builder, Int64Builder, StringBuilder, TimestampMicrosecondBuilder,
    UInt64Array,
};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::{fs::File, path::Path, sync::Arc};
use tracing::{info, instrument};

use super::OBJECTID;
use crate::table::{CanonicalGeoRow, CanonicalTable, Cell, Column};

/// Arrow type of each canonical column.
pub fn arrow_type(column: Column) -> DataType {
    match column {
        Column::LastUpdate => DataType::Timestamp(TimeUnit::Microsecond, None),
        Column::Latitude | Column::Longitude | Column::IncidentRate | Column::PeopleTested => {
            DataType::Float64
        }
        Column::Confirmed
        | Column::Recovered
        | Column::Deaths
        | Column::Active
        | Column::FourDayHospitalizations
        | Column::EightDayHospitalizations => DataType::Int64,
        _ => DataType::Utf8,
    }
}

fn table_schema(columns: &[Column]) -> Schema {
    let mut fields = Vec::with_capacity(columns.len() + 1);
    fields.push(Field::new(OBJECTID, DataType::UInt64, false));
    fields.extend(
        columns
            .iter()
            .map(|&c| Field::new(c.name(), arrow_type(c), true)),
    );
    Schema::new(fields)
}

fn column_array(rows: &[CanonicalGeoRow], column: Column) -> ArrayRef {
    match arrow_type(column) {
        DataType::Timestamp(..) => {
            let mut b = TimestampMicrosecondBuilder::with_capacity(rows.len());
            for row in rows {
                b.append_option(row.last_update.map(|t| t.and_utc().timestamp_micros()));
            }
            Arc::new(b.finish())
        }
        DataType::Float64 => {
            let mut b = Float64Builder::with_capacity(rows.len());
            for row in rows {
                b.append_option(row.cell(column).as_f64());
            }
            Arc::new(b.finish())
        }
        DataType::Int64 => {
            let mut b = Int64Builder::with_capacity(rows.len());
            for row in rows {
                b.append_option(match row.cell(column) {
                    Cell::Int(v) => Some(v),
                    _ => None,
                });
            }
            Arc::new(b.finish())
        }
        _ => {
            let mut b = StringBuilder::new();
            for row in rows {
                let cell = row.cell(column);
                b.append_option((!cell.is_null()).then(|| cell.render()));
            }
            Arc::new(b.finish())
        }
    }
}

/// Write `table` as one Snappy-compressed Parquet row group. Missing cells are Arrow nulls.
#[instrument(level = "info", skip(table), fields(rows = table.len()))]
pub fn write_parquet(table: &CanonicalTable, path: &Path) -> Result<()> {
    let columns = table.columns();
    let schema = Arc::new(table_schema(&columns));

    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(columns.len() + 1);
    arrays.push(Arc::new(UInt64Array::from_iter_values(
        0..table.len() as u64,
    )));
    arrays.extend(columns.iter().map(|&c| column_array(&table.rows, c)));

    let batch = RecordBatch::try_new(schema.clone(), arrays)
        .with_context(|| format!("building record batch for {:?}", path))?;
    let file = File::create(path).with_context(|| format!("creating parquet file {:?}", path))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer =
        ArrowWriter::try_new(file, schema, Some(props)).context("creating Arrow writer")?;
    writer.write(&batch).context("writing record batch")?;
    writer.close().context("closing parquet writer")?;
    info!(path = %path.display(), "parquet written");
    Ok(())
}
