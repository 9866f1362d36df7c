// src/output/csv.rs

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, instrument};

use super::OBJECTID;
use crate::table::CanonicalTable;

/// Write `table` as CSV: `OBJECTID` first, display-name headers, `<Null>` for missing cells.
#[instrument(level = "info", skip(table), fields(rows = table.len()))]
pub fn write_csv(table: &CanonicalTable, path: &Path) -> Result<()> {
    let columns = table.columns();
    let mut wtr =
        csv::Writer::from_path(path).with_context(|| format!("creating CSV file {:?}", path))?;

    let mut header = Vec::with_capacity(columns.len() + 1);
    header.push(OBJECTID);
    header.extend(columns.iter().map(|c| c.name()));
    wtr.write_record(&header)?;

    for (id, row) in table.rows.iter().enumerate() {
        let mut record = Vec::with_capacity(columns.len() + 1);
        record.push(id.to_string());
        record.extend(columns.iter().map(|&c| row.cell(c).render()));
        wtr.write_record(&record)
            .with_context(|| format!("writing row {} to {:?}", id, path))?;
    }
    wtr.flush().with_context(|| format!("flushing {:?}", path))?;
    info!(path = %path.display(), "CSV written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{CanonicalGeoRow, TableKind};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn writes_objectid_and_null_markers() -> Result<()> {
        let tmp = tempdir()?;
        let path = tmp.path().join("counties.csv");
        let table = CanonicalTable::new(
            TableKind::County,
            vec![
                CanonicalGeoRow {
                    province_state: Some("Alabama".into()),
                    combined_key: Some("Autauga, Alabama, US".into()),
                    county: Some("Autauga".into()),
                    confirmed: Some(6),
                    ..Default::default()
                },
                CanonicalGeoRow {
                    province_state: Some("Alabama".into()),
                    combined_key: Some("Alabama, US".into()),
                    ..Default::default()
                },
            ],
        )?;
        write_csv(&table, &path)?;

        let text = fs::read_to_string(&path)?;
        let mut lines = text.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("OBJECTID,Province/State,Country/Region,Last Update"));
        assert!(header.ends_with("People Tested,Shape"));

        let mut rdr = csv::Reader::from_path(&path)?;
        let rows: Vec<csv::StringRecord> = rdr.records().collect::<std::result::Result<_, _>>()?;
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "0");
        assert_eq!(&rows[1][0], "1");
        assert_eq!(&rows[0][6], "6");
        assert_eq!(&rows[1][10], "<Null>");
        assert_eq!(&rows[1][15], "Point");
        Ok(())
    }

    #[test]
    fn state_tables_get_prediction_columns() -> Result<()> {
        let tmp = tempdir()?;
        let path = tmp.path().join("states.csv");
        let table = CanonicalTable::new(TableKind::State, vec![])?;
        write_csv(&table, &path)?;
        let text = fs::read_to_string(&path)?;
        assert!(text
            .trim_end()
            .ends_with("Intervention,4-day Hospitalizations Prediction,8-day Hospitalizations Prediction"));
        Ok(())
    }
}
