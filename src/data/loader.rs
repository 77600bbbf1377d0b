use std::collections::BTreeSet;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use arrow::array::{
    Array, ArrayRef, AsArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

use super::model::{Column, ZipDataset, ZipRecord};

// ---------------------------------------------------------------------------
// Load errors
// ---------------------------------------------------------------------------

/// Fatal problems with the input file. Wrapped in `anyhow::Error` with context.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LoadError {
    #[error("Could not find '{}'", .0.display())]
    NotFound(PathBuf),

    #[error("Unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<&'static str>),

    #[error("Row {row}, column '{column}': {message}")]
    InvalidCell {
        row: usize,
        column: &'static str,
        message: String,
    },
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the zip code dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with the column names of [`Column::ALL`]
/// * `.json`    – `[{ "zip_code": "90001", "composite_score": 61.2, ... }, ...]`
/// * `.parquet` – one flat column per [`Column`]
pub fn load_file(path: &Path) -> Result<ZipDataset> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()).into());
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let records = match ext.as_str() {
        "csv" => {
            let file = std::fs::File::open(path).context("opening CSV")?;
            read_csv(file)?
        }
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => return Err(LoadError::UnsupportedExtension(other.to_string()).into()),
    };

    Ok(ZipDataset::from_records(records))
}

/// Fail with [`LoadError::MissingColumns`] unless every required column is present.
fn check_columns<'a>(present: impl IntoIterator<Item = &'a str>) -> Result<(), LoadError> {
    let present: BTreeSet<&str> = present.into_iter().collect();
    let missing: Vec<&'static str> = Column::ALL
        .iter()
        .map(|c| c.name())
        .filter(|name| !present.contains(name))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(LoadError::MissingColumns(missing))
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one zip code per row.
/// Extra columns are ignored, blank numeric cells load as missing. Header names
/// are trimmed before matching.
pub fn read_csv<R: Read>(source: R) -> Result<Vec<ZipRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(source);
    let headers = reader.headers().context("reading CSV headers")?.clone();
    check_columns(headers.iter())?;

    let mut records = Vec::new();
    for (row_no, result) in reader.deserialize::<ZipRecord>().enumerate() {
        let record = result.with_context(|| format!("CSV row {}", row_no + 1))?;
        records.push(record);
    }
    Ok(records)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "zip_code": 90001, "primary_city": "Los Angeles", "composite_score": 41.3, ... },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Vec<ZipRecord>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let rows = root.as_array().context("Expected top-level JSON array")?;

    rows.iter()
        .enumerate()
        .map(|(i, row)| -> Result<ZipRecord> {
            let obj = row
                .as_object()
                .with_context(|| format!("Row {i} is not a JSON object"))?;
            Ok(json_to_record(obj, i)?)
        })
        .collect()
}

fn json_to_record(obj: &Map<String, JsonValue>, row: usize) -> Result<ZipRecord, LoadError> {
    check_columns(obj.keys().map(String::as_str))?;

    let text = |col: Column| json_text(&obj[col.name()]);
    let composite = json_number(&obj[Column::CompositeScore.name()], row, Column::CompositeScore)?
        .ok_or(LoadError::InvalidCell {
            row,
            column: Column::CompositeScore.name(),
            message: "composite score is required".to_string(),
        })?;

    let mut record = ZipRecord::new(
        text(Column::ZipCode),
        text(Column::PrimaryCity),
        text(Column::ScoreCategory),
        composite,
    );
    for col in Column::numeric() {
        let value = json_number(&obj[col.name()], row, col)?;
        if let Some(slot) = record.numeric_slot(col) {
            *slot = value;
        }
    }
    Ok(record)
}

fn json_text(val: &JsonValue) -> String {
    match val {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

fn json_number(val: &JsonValue, row: usize, column: Column) -> Result<Option<f64>, LoadError> {
    match val {
        JsonValue::Null => Ok(None),
        JsonValue::Number(n) => Ok(n.as_f64()),
        other => Err(LoadError::InvalidCell {
            row,
            column: column.name(),
            message: format!("expected a number, got {other}"),
        }),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one flat column per [`Column`].
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`); integer zip codes are turned into text and
/// categorical or view string columns are decoded.
fn load_parquet(path: &Path) -> Result<Vec<ZipRecord>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    check_columns(builder.schema().fields().iter().map(|f| f.name().as_str()))?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        // Indexed by `Column as usize`, which follows `Column::ALL` order.
        let mut columns: Vec<ArrayRef> = Vec::with_capacity(Column::ALL.len());
        for col in Column::ALL {
            let idx = schema
                .index_of(col.name())
                .map_err(|_| LoadError::MissingColumns(vec![col.name()]))?;
            columns.push(batch.column(idx).clone());
        }
        let array = |wanted: Column| &columns[wanted as usize];

        let first_row = records.len();
        let zip_codes = text_column(array(Column::ZipCode), first_row, Column::ZipCode)?;
        let cities = text_column(array(Column::PrimaryCity), first_row, Column::PrimaryCity)?;
        let categories =
            text_column(array(Column::ScoreCategory), first_row, Column::ScoreCategory)?;

        for row in 0..batch.num_rows() {
            let global_row = records.len();
            let composite = arrow_number(
                array(Column::CompositeScore),
                row,
                global_row,
                Column::CompositeScore,
            )?
            .ok_or(LoadError::InvalidCell {
                    row: global_row,
                    column: Column::CompositeScore.name(),
                    message: "composite score is required".to_string(),
                })?;

            let mut record = ZipRecord::new(
                arrow_text(&zip_codes, row),
                arrow_text(&cities, row),
                arrow_text(&categories, row),
                composite,
            );
            for col in Column::numeric() {
                if let Some(slot) = record.numeric_slot(col) {
                    *slot = arrow_number(array(col), row, global_row, col)?;
                }
            }
            records.push(record);
        }
    }

    Ok(records)
}

// -- Parquet / Arrow helpers --

/// Text column as `Utf8`. Dictionary-encoded, view and integer columns (zip codes
/// written as numbers) are cast; anything that cannot become text is an error.
fn text_column(
    col: &ArrayRef,
    first_row: usize,
    column: Column,
) -> Result<StringArray, LoadError> {
    let invalid = |message: String| LoadError::InvalidCell {
        row: first_row,
        column: column.name(),
        message,
    };
    let text = cast(col, &DataType::Utf8)
        .map_err(|e| invalid(format!("cannot read {} as text: {e}", col.data_type())))?;
    text.as_string_opt::<i32>()
        .cloned()
        .ok_or_else(|| invalid(format!("cannot read {} as text", col.data_type())))
}

/// Text cell; nulls are empty strings.
fn arrow_text(col: &StringArray, row: usize) -> String {
    if col.is_null(row) {
        String::new()
    } else {
        col.value(row).to_string()
    }
}

/// Numeric cell as `f64`; nulls are missing values.
fn arrow_number(
    col: &ArrayRef,
    row: usize,
    global_row: usize,
    column: Column,
) -> Result<Option<f64>, LoadError> {
    if col.is_null(row) {
        return Ok(None);
    }
    let any = col.as_any();
    let value = match col.data_type() {
        DataType::Float64 => any.downcast_ref::<Float64Array>().map(|a| a.value(row)),
        DataType::Float32 => any
            .downcast_ref::<Float32Array>()
            .map(|a| a.value(row) as f64),
        DataType::Int64 => any.downcast_ref::<Int64Array>().map(|a| a.value(row) as f64),
        DataType::Int32 => any.downcast_ref::<Int32Array>().map(|a| a.value(row) as f64),
        _ => None,
    };
    match value {
        Some(v) => Ok(Some(v)),
        None => Err(LoadError::InvalidCell {
            row: global_row,
            column: column.name(),
            message: format!("unsupported type {:?}", col.data_type()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{DictionaryArray, StringViewArray};
    use arrow::datatypes::{Field, Int32Type, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use tempfile::NamedTempFile;

    use super::*;

    const HEADER: &str = "zip_code,primary_city,score_category,composite_score,density_score,transit_score,income_score,education_score,housing_score,median_income,median_home_value,estimated_population,population_density,public_transit_pct,education_pct";

    fn write_temp(suffix: &str, body: &str) -> NamedTempFile {
        let mut tmp = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        write!(tmp, "{body}").unwrap();
        tmp
    }

    fn load_err(path: &Path) -> LoadError {
        let err = load_file(path).unwrap_err();
        err.downcast_ref::<LoadError>()
            .cloned()
            .unwrap_or_else(|| panic!("not a LoadError: {err:#}"))
    }

    /// Columns of a parquet batch with zip codes as integers and the given composite scores.
    fn parquet_columns(composite: Vec<Option<f64>>) -> (Vec<Field>, Vec<ArrayRef>) {
        let rows = composite.len();
        let mut fields = Vec::new();
        let mut arrays: Vec<ArrayRef> = Vec::new();
        for col in Column::ALL {
            match col {
                Column::ZipCode => {
                    fields.push(Field::new(col.name(), DataType::Int64, false));
                    arrays.push(Arc::new(Int64Array::from_iter_values(
                        (0..rows as i64).map(|i| 90001 + i),
                    )));
                }
                Column::PrimaryCity | Column::ScoreCategory => {
                    fields.push(Field::new(col.name(), DataType::Utf8, false));
                    arrays.push(Arc::new(StringArray::from(vec!["Los Angeles"; rows])));
                }
                Column::CompositeScore => {
                    fields.push(Field::new(col.name(), DataType::Float64, true));
                    arrays.push(Arc::new(Float64Array::from(composite.clone())));
                }
                _ => {
                    fields.push(Field::new(col.name(), DataType::Float64, true));
                    let values: Vec<Option<f64>> =
                        (0..rows).map(|i| (i % 2 == 0).then_some(55.5)).collect();
                    arrays.push(Arc::new(Float64Array::from(values)));
                }
            }
        }
        (fields, arrays)
    }

    fn write_batch(fields: Vec<Field>, arrays: Vec<ArrayRef>) -> NamedTempFile {
        let schema = Arc::new(Schema::new(fields));
        let batch = RecordBatch::try_new(schema.clone(), arrays).unwrap();

        let tmp = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(tmp.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
        tmp
    }

    fn write_parquet(composite: Vec<Option<f64>>) -> NamedTempFile {
        let (fields, arrays) = parquet_columns(composite);
        write_batch(fields, arrays)
    }

    /// Parquet file whose `primary_city` column is replaced by `city`.
    fn write_parquet_with_city(city_type: DataType, city: ArrayRef) -> NamedTempFile {
        let (mut fields, mut arrays) = parquet_columns(vec![Some(61.0), Some(42.0)]);
        let idx = Column::PrimaryCity as usize;
        fields[idx] = Field::new(Column::PrimaryCity.name(), city_type, true);
        arrays[idx] = city;
        write_batch(fields, arrays)
    }

    #[test]
    fn loads_csv_with_blanks_and_extra_columns() {
        let body = format!(
            "{HEADER},notes\n\
             01234,Avalon,Low,12.5,1,2,3,4,5,40000,350000,3500,120.5,1.2,20.1,island\n\
             90210,Beverly Hills,Very High,91.25,,,,,,,,,,,,\n"
        );
        let tmp = write_temp(".csv", &body);
        let ds = load_file(tmp.path()).unwrap();

        assert_eq!(ds.len(), 2);
        let first = &ds.records[0];
        assert_eq!(first.zip_code, "01234");
        assert_eq!(first.median_income, Some(40000.0));
        assert_eq!(first.education_pct, Some(20.1));
        let second = &ds.records[1];
        assert_eq!(second.composite_score, 91.25);
        assert_eq!(second.median_income, None);
        assert_eq!(ds.score_bounds, Some((12.5, 91.25)));
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = load_err(Path::new("/definitely/not/here.csv"));
        assert_eq!(err, LoadError::NotFound(PathBuf::from("/definitely/not/here.csv")));
    }

    #[test]
    fn missing_columns_are_listed() {
        let tmp = write_temp(".csv", "zip_code,primary_city,composite_score\n90001,LA,50\n");
        match load_err(tmp.path()) {
            LoadError::MissingColumns(cols) => {
                assert!(cols.contains(&"score_category"));
                assert!(cols.contains(&"education_pct"));
                assert!(!cols.contains(&"zip_code"));
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn malformed_cell_is_an_error() {
        let body = format!("{HEADER}\n90001,LA,High,not-a-number,,,,,,,,,,,\n");
        let tmp = write_temp(".csv", &body);
        let err = load_file(tmp.path()).unwrap_err();
        assert!(format!("{err:#}").contains("CSV row 1"));
    }

    #[test]
    fn unsupported_extension() {
        let tmp = write_temp(".xlsx", "whatever");
        assert_eq!(
            load_err(tmp.path()),
            LoadError::UnsupportedExtension("xlsx".to_string())
        );
    }

    #[test]
    fn loads_records_json() {
        let body = r#"[
            {"zip_code": 90001, "primary_city": "Los Angeles", "score_category": "Low",
             "composite_score": 30.5, "density_score": 80, "transit_score": 60.5,
             "income_score": 10, "education_score": 12, "housing_score": null,
             "median_income": 41000, "median_home_value": 450000,
             "estimated_population": 57000, "population_density": 16000,
             "public_transit_pct": 11.2, "education_pct": 7.5, "extra": true}
        ]"#;
        let tmp = write_temp(".json", body);
        let ds = load_file(tmp.path()).unwrap();
        assert_eq!(ds.len(), 1);
        let r = &ds.records[0];
        assert_eq!(r.zip_code, "90001");
        assert_eq!(r.density_score, Some(80.0));
        assert_eq!(r.housing_score, None);
        assert_eq!(r.education_pct, Some(7.5));
    }

    #[test]
    fn json_requires_composite_score() {
        let body = r#"[{"zip_code": "90001", "primary_city": "LA", "score_category": "Low",
             "composite_score": null, "density_score": 1, "transit_score": 1,
             "income_score": 1, "education_score": 1, "housing_score": 1,
             "median_income": 1, "median_home_value": 1, "estimated_population": 1,
             "population_density": 1, "public_transit_pct": 1, "education_pct": 1}]"#;
        let tmp = write_temp(".json", body);
        assert!(matches!(
            load_err(tmp.path()),
            LoadError::InvalidCell { row: 0, column: "composite_score", .. }
        ));
    }

    #[test]
    fn loads_parquet_with_integer_zip_codes() {
        let tmp = write_parquet(vec![Some(55.5), Some(66.0)]);
        let ds = load_file(tmp.path()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].zip_code, "90001");
        assert_eq!(ds.records[1].zip_code, "90002");
        assert_eq!(ds.records[1].composite_score, 66.0);
        assert_eq!(ds.records[0].median_income, Some(55.5));
        assert_eq!(ds.records[1].median_income, None);
    }

    #[test]
    fn parquet_null_composite_is_invalid() {
        let tmp = write_parquet(vec![Some(40.0), None]);
        assert!(matches!(
            load_err(tmp.path()),
            LoadError::InvalidCell { row: 1, column: "composite_score", .. }
        ));
    }

    #[test]
    fn loads_dictionary_encoded_city_column() {
        let city: DictionaryArray<Int32Type> =
            vec!["Los Angeles", "Pasadena"].into_iter().collect();
        let tmp = write_parquet_with_city(
            DataType::Dictionary(Box::new(DataType::Int32), Box::new(DataType::Utf8)),
            Arc::new(city),
        );
        let ds = load_file(tmp.path()).unwrap();
        assert_eq!(ds.records[0].primary_city, "Los Angeles");
        assert_eq!(ds.records[1].primary_city, "Pasadena");
        assert_eq!(ds.cities.len(), 2);
    }

    #[test]
    fn loads_string_view_city_column() {
        let city = StringViewArray::from(vec![Some("Los Angeles"), None]);
        let tmp = write_parquet_with_city(DataType::Utf8View, Arc::new(city));
        let ds = load_file(tmp.path()).unwrap();
        assert_eq!(ds.records[0].primary_city, "Los Angeles");
        assert_eq!(ds.records[1].primary_city, "");
    }

    #[test]
    fn csv_headers_are_trimmed() {
        let padded = HEADER.replace(',', ", ");
        let body = format!("{padded}\n90001,Los Angeles,Low,35.5,,,,,,,,,,,\n");
        let tmp = write_temp(".csv", &body);
        let ds = load_file(tmp.path()).unwrap();
        assert_eq!(ds.records[0].zip_code, "90001");
        assert_eq!(ds.records[0].composite_score, 35.5);
    }
}
