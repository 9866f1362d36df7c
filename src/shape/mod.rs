// src/shape/mod.rs

pub mod fields;

pub use fields::{fields_for, EnrichmentField, FieldKind, ENRICHMENT_FIELDS};

use shapefile::dbase::{FieldValue, Record, TableWriterBuilder};
use shapefile::Shape;
use std::{collections::HashMap, fs, path::Path};
use tracing::{debug, info, instrument, warn};

use crate::error::{PipelineError, Result};
use crate::table::{CanonicalGeoRow, CanonicalTable, Column};

/// What a join wrote and what it dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinStats {
    pub written: usize,
    pub dropped: usize,
}

/// Text of a DBF attribute as used for pivot matching.
pub fn field_text(value: &FieldValue) -> Option<String> {
    match value {
        FieldValue::Character(Some(s)) => Some(s.trim().to_string()),
        FieldValue::Numeric(Some(n)) if n.fract() == 0.0 => Some(format!("{}", *n as i64)),
        FieldValue::Numeric(Some(n)) => Some(n.to_string()),
        FieldValue::Integer(i) => Some(i.to_string()),
        _ => None,
    }
}

/// Index from pivot text to the first row carrying it. Missing cells never match.
fn pivot_index(table: &CanonicalTable, pivot_column: Column) -> HashMap<String, usize> {
    let mut index = HashMap::with_capacity(table.len());
    for (i, row) in table.rows.iter().enumerate() {
        let cell = row.cell(pivot_column);
        if !cell.is_null() {
            index.entry(cell.render()).or_insert(i);
        }
    }
    index
}

fn enrich(mut record: Record, row: &CanonicalGeoRow, fields: &[EnrichmentField]) -> Record {
    for f in fields {
        record.insert(f.dbf_name.to_string(), f.value(row));
    }
    record
}

/// Attach enrichment fields to every geometry record whose `pivot_field`
/// matches a row's `pivot_column`. Unmatched records and null geometry are dropped.
pub fn join_records(
    table: &CanonicalTable,
    records: impl IntoIterator<Item = (Shape, Record)>,
    pivot_field: &str,
    pivot_column: Column,
    fields: &[EnrichmentField],
) -> (Vec<(Shape, Record)>, JoinStats) {
    let index = pivot_index(table, pivot_column);
    let mut stats = JoinStats::default();
    let mut joined = Vec::new();

    for (shape, record) in records {
        if matches!(shape, Shape::NullShape) {
            warn!(pivot_field, "null geometry, dropped");
            stats.dropped += 1;
            continue;
        }
        let key = record.get(pivot_field).and_then(field_text);
        match key.as_deref().and_then(|k| index.get(k)) {
            Some(&row_idx) => {
                joined.push((shape, enrich(record, &table.rows[row_idx], fields)));
                stats.written += 1;
            }
            None => {
                debug!(pivot_field, key = ?key, "no matching row, dropped");
                stats.dropped += 1;
            }
        }
    }
    (joined, stats)
}

fn shapefile_err(path: &Path) -> impl Fn(shapefile::Error) -> PipelineError + '_ {
    move |source| PipelineError::Shapefile {
        path: path.to_path_buf(),
        source,
    }
}

/// Join `table` onto the geometry at `source` and write the result to `output`.
///
/// Both paths name a shapefile with or without its `.shp` extension. The
/// output schema is the source schema plus the enrichment fields the table
/// carries; geometry is copied unchanged.
#[instrument(level = "info", skip(table), fields(rows = table.len()))]
pub fn join_and_write_shapefile(
    table: &CanonicalTable,
    source: &Path,
    pivot_field: &str,
    pivot_column: &str,
    output: &Path,
) -> Result<JoinStats> {
    let pivot_column = Column::from_name(pivot_column)?;
    let source_shp = source.with_extension("shp");
    let output_shp = output.with_extension("shp");

    let mut reader =
        shapefile::Reader::from_path(&source_shp).map_err(shapefile_err(&source_shp))?;
    let records = reader
        .iter_shapes_and_records()
        .collect::<std::result::Result<Vec<(Shape, Record)>, _>>()
        .map_err(shapefile_err(&source_shp))?;
    let table_info = reader.into_table_info();
    debug!(records = records.len(), "read geometry source");

    let fields = fields_for(table);
    let mut builder = TableWriterBuilder::from_table_info(table_info);
    for f in &fields {
        builder = f.declare(builder)?;
    }

    let (joined, stats) = join_records(table, records, pivot_field, pivot_column, &fields);

    if let Some(parent) = output_shp.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| PipelineError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let mut writer =
        shapefile::Writer::from_path(&output_shp, builder).map_err(shapefile_err(&output_shp))?;
    for (shape, record) in &joined {
        let written = match shape {
            Shape::Point(s) => writer.write_shape_and_record(s, record),
            Shape::PointM(s) => writer.write_shape_and_record(s, record),
            Shape::PointZ(s) => writer.write_shape_and_record(s, record),
            Shape::Polyline(s) => writer.write_shape_and_record(s, record),
            Shape::PolylineM(s) => writer.write_shape_and_record(s, record),
            Shape::PolylineZ(s) => writer.write_shape_and_record(s, record),
            Shape::Polygon(s) => writer.write_shape_and_record(s, record),
            Shape::PolygonM(s) => writer.write_shape_and_record(s, record),
            Shape::PolygonZ(s) => writer.write_shape_and_record(s, record),
            Shape::Multipoint(s) => writer.write_shape_and_record(s, record),
            Shape::MultipointM(s) => writer.write_shape_and_record(s, record),
            Shape::MultipointZ(s) => writer.write_shape_and_record(s, record),
            Shape::Multipatch(s) => writer.write_shape_and_record(s, record),
            // join_records never passes these through
            Shape::NullShape => continue,
        };
        written.map_err(shapefile_err(&output_shp))?;
    }
    drop(writer);

    let source_prj = source.with_extension("prj");
    if source_prj.exists() {
        let output_prj = output.with_extension("prj");
        fs::copy(&source_prj, &output_prj).map_err(|source| PipelineError::Io {
            path: output_prj.clone(),
            source,
        })?;
    }

    info!(
        written = stats.written,
        dropped = stats.dropped,
        output = %output_shp.display(),
        "shapefile written"
    );
    Ok(stats)
}
