use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use super::model::{Column, ZipRecord};

/// Default file name offered by the save dialog.
pub const DEFAULT_EXPORT_NAME: &str = "filtered_la_county_data.csv";

/// Write `records` as CSV with the given columns, in the given order.
///
/// Exporting with [`Column::ALL`] produces a file that [`super::loader::read_csv`]
/// loads back into the same records.
pub fn write_csv<'a, W: Write>(
    sink: W,
    records: impl IntoIterator<Item = &'a ZipRecord>,
    columns: &[Column],
) -> Result<usize> {
    let mut writer = csv::Writer::from_writer(sink);
    writer
        .write_record(columns.iter().map(|c| c.name()))
        .context("writing CSV header")?;

    let mut rows = 0;
    for record in records {
        writer
            .write_record(columns.iter().map(|&c| record.cell(c)))
            .with_context(|| format!("writing CSV row {}", rows + 1))?;
        rows += 1;
    }
    writer.flush().context("flushing CSV output")?;
    Ok(rows)
}

/// Export to a file on disk; returns the number of data rows written.
pub fn export_csv<'a>(
    path: &Path,
    records: impl IntoIterator<Item = &'a ZipRecord>,
    columns: &[Column],
) -> Result<usize> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let rows = write_csv(file, records, columns)?;
    log::info!("Exported {rows} rows to {}", path.display());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{FilterCriteria, FilteredView, ScoreRange};
    use crate::data::loader::{load_file, read_csv};
    use crate::data::model::tests::record;
    use crate::data::model::ZipDataset;

    fn dataset() -> ZipDataset {
        let mut quoted = record("90265", "Malibu, CA", "Very \"High\"", 88.125);
        quoted.median_income = Some(123_456.789);
        ZipDataset::from_records(vec![
            record("01234", "Avalon", "Low", 12.5),
            quoted,
            record("90802", "Long Beach", "Medium", 55.0),
            record("90012", "Los Angeles", "High", 71.0),
        ])
    }

    #[test]
    fn filtered_export_round_trips() {
        let ds = dataset();
        let criteria = FilterCriteria {
            score_range: ScoreRange::new(50.0, 100.0).ok(),
            ..Default::default()
        };
        let view = FilteredView::new(&ds, &criteria);

        let mut buf = Vec::new();
        let rows = write_csv(&mut buf, view.records(), &Column::ALL).unwrap();
        assert_eq!(rows, 3);

        let reloaded = read_csv(buf.as_slice()).unwrap();
        assert_eq!(reloaded, view.to_records());
    }

    #[test]
    fn round_trips_through_a_file() {
        let ds = dataset();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_EXPORT_NAME);

        export_csv(&path, ds.records.iter(), &Column::ALL).unwrap();
        let reloaded = load_file(&path).unwrap();
        assert_eq!(reloaded.records, ds.records);
        assert_eq!(reloaded.records[0].zip_code, "01234");
    }

    #[test]
    fn projection_keeps_requested_columns() {
        let ds = dataset();
        let mut buf = Vec::new();
        write_csv(
            &mut buf,
            ds.records.iter().take(1),
            &[Column::PrimaryCity, Column::ZipCode, Column::HousingScore],
        )
        .unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "primary_city,zip_code,housing_score\nAvalon,01234,\n");
    }

    #[test]
    fn empty_view_exports_header_only() {
        let mut buf = Vec::new();
        let rows = write_csv(&mut buf, std::iter::empty(), &Column::ALL).unwrap();
        assert_eq!(rows, 0);
        let reloaded = read_csv(buf.as_slice()).unwrap();
        assert!(reloaded.is_empty());
    }
}
