use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, Date32Array, Int32Array, Int64Array, StringArray, UInt64Array};
use arrow::datatypes::DataType;
use chrono::NaiveDate;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{RegistrationRecord, RegistrationTable, SchemaError};

/// Column names every source file must provide. Extra columns are ignored.
const COL_DATE: &str = "date";
const COL_CATEGORY: &str = "category";
const COL_MANUFACTURER: &str = "manufacturer";
const COL_REGISTRATIONS: &str = "registrations";

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a registration table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with `date`, `category`, `manufacturer`,
///                `registrations` columns (the primary format)
/// * `.json`    – `[{ "date": "...", "category": "...", ... }, ...]`
/// * `.parquet` – flat columns with the same four names
pub fn load_file(path: &Path) -> Result<RegistrationTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

/// Parse a calendar date cell.  Accepts `YYYY-MM-DD`, or `YYYY-MM` for
/// monthly-bucketed data (interpreted as the first of the month).
fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d").ok()
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<RegistrationTable> {
    let reader = csv::Reader::from_path(path).context("opening CSV")?;
    read_csv(reader)
}

/// CSV layout: header row naming the four required columns;
/// any other columns are ignored.
fn read_csv<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<RegistrationTable> {
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let col = |name: &'static str| -> Result<usize, SchemaError> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or(SchemaError::MissingColumn(name))
    };
    let date_idx = col(COL_DATE)?;
    let cat_idx = col(COL_CATEGORY)?;
    let man_idx = col(COL_MANUFACTURER)?;
    let reg_idx = col(COL_REGISTRATIONS)?;

    let mut records = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;

        let date_raw = record.get(date_idx).unwrap_or("");
        let date = parse_date(date_raw).ok_or_else(|| SchemaError::BadDate {
            row: row_no,
            value: date_raw.to_string(),
        })?;

        let reg_raw = record.get(reg_idx).unwrap_or("");
        let registrations =
            reg_raw
                .trim()
                .parse::<u64>()
                .map_err(|_| SchemaError::BadCount {
                    row: row_no,
                    value: reg_raw.to_string(),
                })?;

        records.push(RegistrationRecord {
            date,
            category: record.get(cat_idx).unwrap_or("").trim().to_string(),
            manufacturer: record.get(man_idx).unwrap_or("").trim().to_string(),
            registrations,
        });
    }

    Ok(RegistrationTable::from_records(records))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default
/// `df.to_json(orient='records')`):
///
/// ```json
/// [
///   {
///     "date": "2023-01-01",
///     "category": "2W",
///     "manufacturer": "Hero",
///     "registrations": 12345
///   },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<RegistrationTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let rows = root.as_array().context("Expected top-level JSON array")?;

    let mut records = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let date_raw = obj
            .get(COL_DATE)
            .and_then(|v| v.as_str())
            .ok_or(SchemaError::MissingColumn(COL_DATE))?;
        let date = parse_date(date_raw).ok_or_else(|| SchemaError::BadDate {
            row: i,
            value: date_raw.to_string(),
        })?;

        let category = obj
            .get(COL_CATEGORY)
            .and_then(|v| v.as_str())
            .ok_or(SchemaError::MissingColumn(COL_CATEGORY))?;
        let manufacturer = obj
            .get(COL_MANUFACTURER)
            .and_then(|v| v.as_str())
            .ok_or(SchemaError::MissingColumn(COL_MANUFACTURER))?;

        let reg_val = obj
            .get(COL_REGISTRATIONS)
            .ok_or(SchemaError::MissingColumn(COL_REGISTRATIONS))?;
        let registrations = reg_val.as_u64().ok_or_else(|| SchemaError::BadCount {
            row: i,
            value: reg_val.to_string(),
        })?;

        records.push(RegistrationRecord {
            date,
            category: category.trim().to_string(),
            manufacturer: manufacturer.trim().to_string(),
            registrations,
        });
    }

    Ok(RegistrationTable::from_records(records))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with flat registration columns.
///
/// Expected schema:
/// - `date`: Utf8 date string or Date32
/// - `category`, `manufacturer`: Utf8
/// - `registrations`: Int64 / Int32 / UInt64
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<RegistrationTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();
    let mut row_base = 0usize;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();
        let n_rows = batch.num_rows();

        let col = |name: &'static str| -> Result<usize, SchemaError> {
            schema
                .index_of(name)
                .map_err(|_| SchemaError::MissingColumn(name))
        };
        let date_col = batch.column(col(COL_DATE)?);
        let cat_col = batch.column(col(COL_CATEGORY)?);
        let man_col = batch.column(col(COL_MANUFACTURER)?);
        let reg_col = batch.column(col(COL_REGISTRATIONS)?);

        for row in 0..n_rows {
            let row_no = row_base + row;
            let date = extract_date(date_col, row)
                .ok_or_else(|| SchemaError::BadDate {
                    row: row_no,
                    value: format!("{:?}", date_col.data_type()),
                })?;

            let registrations =
                extract_count(reg_col, row).ok_or_else(|| SchemaError::BadCount {
                    row: row_no,
                    value: format!("{:?}", reg_col.data_type()),
                })?;

            records.push(RegistrationRecord {
                date,
                category: extract_string(cat_col, row)
                    .with_context(|| format!("Row {row_no}: failed to read 'category'"))?,
                manufacturer: extract_string(man_col, row)
                    .with_context(|| format!("Row {row_no}: failed to read 'manufacturer'"))?,
                registrations,
            });
        }
        row_base += n_rows;
    }

    Ok(RegistrationTable::from_records(records))
}

// -- Parquet / Arrow helpers --

/// Days between 0001-01-01 (CE day 1) and the Unix epoch; Date32 stores
/// days since the epoch.
const EPOCH_DAYS_FROM_CE: i32 = 719_163;

fn extract_date(col: &Arc<dyn Array>, row: usize) -> Option<NaiveDate> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Utf8 => {
            let arr = col.as_any().downcast_ref::<StringArray>()?;
            parse_date(arr.value(row))
        }
        DataType::Date32 => {
            let arr = col.as_any().downcast_ref::<Date32Array>()?;
            NaiveDate::from_num_days_from_ce_opt(arr.value(row) + EPOCH_DAYS_FROM_CE)
        }
        _ => None,
    }
}

fn extract_string(col: &Arc<dyn Array>, row: usize) -> Result<String> {
    if col.is_null(row) {
        bail!("null value in string column");
    }
    let arr = col
        .as_any()
        .downcast_ref::<StringArray>()
        .with_context(|| format!("expected Utf8 column, got {:?}", col.data_type()))?;
    Ok(arr.value(row).trim().to_string())
}

fn extract_count(col: &Arc<dyn Array>, row: usize) -> Option<u64> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Int64 => {
            let v = col.as_any().downcast_ref::<Int64Array>()?.value(row);
            u64::try_from(v).ok()
        }
        DataType::Int32 => {
            let v = col.as_any().downcast_ref::<Int32Array>()?.value(row);
            u64::try_from(v).ok()
        }
        DataType::UInt64 => Some(col.as_any().downcast_ref::<UInt64Array>()?.value(row)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn csv_table(text: &str) -> Result<RegistrationTable> {
        read_csv(csv::Reader::from_reader(text.as_bytes()))
    }

    #[test]
    fn csv_roundtrip_with_extra_columns() {
        let table = csv_table(
            "date,state,category,manufacturer,registrations\n\
             2023-02-01,KA,2W,Hero,120\n\
             2023-01-01,MH,4W,Tata,45\n",
        )
        .unwrap();

        assert_eq!(table.len(), 2);
        // sorted by date, extra "state" column ignored
        assert_eq!(table.records[0].manufacturer, "Tata");
        assert_eq!(table.records[0].registrations, 45);
        assert_eq!(table.records[1].category, "2W");
    }

    #[test]
    fn csv_accepts_month_granularity_dates() {
        let table = csv_table(
            "date,category,manufacturer,registrations\n\
             2023-05,3W,Bajaj,9\n",
        )
        .unwrap();
        assert_eq!(
            table.records[0].date,
            NaiveDate::from_ymd_opt(2023, 5, 1).unwrap()
        );
    }

    #[test]
    fn csv_missing_column_is_fatal() {
        let err = csv_table("date,category,registrations\n2023-01-01,2W,5\n")
            .unwrap_err()
            .to_string();
        assert!(err.contains("manufacturer"), "got: {err}");
    }

    #[test]
    fn csv_bad_date_is_fatal() {
        let err = csv_table(
            "date,category,manufacturer,registrations\n\
             soon,2W,Hero,5\n",
        )
        .unwrap_err()
        .to_string();
        assert!(err.contains("not a valid date"), "got: {err}");
    }

    #[test]
    fn csv_negative_count_is_fatal() {
        let err = csv_table(
            "date,category,manufacturer,registrations\n\
             2023-01-01,2W,Hero,-4\n",
        )
        .unwrap_err()
        .to_string();
        assert!(err.contains("registration count"), "got: {err}");
    }

    #[test]
    fn json_records_orientation() {
        let text = r#"[
            {"date": "2023-01-01", "category": "2W", "manufacturer": "Hero", "registrations": 10},
            {"date": "2023-02-01", "category": "2W", "manufacturer": "Hero", "registrations": 12}
        ]"#;
        let dir = std::env::temp_dir().join("regi-dash-json-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("rows.json");
        std::fs::write(&path, text).unwrap();

        let table = load_file(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.records[1].registrations, 12);
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = load_file(Path::new("data.xlsx")).unwrap_err().to_string();
        assert!(err.contains("Unsupported file extension"), "got: {err}");
    }
}
