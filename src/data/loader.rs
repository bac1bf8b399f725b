use std::path::Path;

use anyhow::{Context, Result};
use arrow::array::{
    Array, ArrayRef, Date32Array, Float32Array, Float64Array, Int16Array, Int32Array,
    Int64Array, LargeStringArray, StringArray, TimestampMicrosecondArray,
    TimestampMillisecondArray, TimestampNanosecondArray, TimestampSecondArray,
};
use arrow::datatypes::{DataType, TimeUnit};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Fall, MeteoriteDataset, MeteoriteRecord};
use crate::error::ExplorerError;

/// Source column names as they appear in the landings table.
pub const COL_NAME: &str = "name";
pub const COL_MASS: &str = "mass (g)";
pub const COL_RECCLASS: &str = "recclass";
pub const COL_FALL: &str = "fall";
pub const COL_YEAR: &str = "year";
pub const COL_RECLAT: &str = "reclat";
pub const COL_RECLONG: &str = "reclong";
pub const COL_GEOLOCATION: &str = "GeoLocation";

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the meteorite table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – the landings export, one row per meteorite
/// * `.json`    – `[{ "name": ..., "mass (g)": ..., ... }, ...]`
/// * `.parquet` – same columns, any of the common Arrow types
///
/// Only `name` is mandatory; absent columns leave the field missing on every
/// record. Any read or parse failure is reported as
/// [`ExplorerError::DataUnavailable`].
pub fn load_file(path: &Path) -> Result<MeteoriteDataset, ExplorerError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let result = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(anyhow::anyhow!("Unsupported file extension: .{other}")),
    };

    match result {
        Ok(dataset) => {
            log::info!(
                "Loaded {} meteorites ({} recclasses) from {}",
                dataset.len(),
                dataset.recclasses.len(),
                path.display()
            );
            Ok(dataset)
        }
        Err(e) => Err(ExplorerError::DataUnavailable {
            path: path.to_path_buf(),
            reason: format!("{e:#}"),
        }),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Column positions resolved from a CSV header row.
struct CsvColumns {
    name: usize,
    mass: Option<usize>,
    recclass: Option<usize>,
    fall: Option<usize>,
    year: Option<usize>,
    reclat: Option<usize>,
    reclong: Option<usize>,
    geolocation: Option<usize>,
}

impl CsvColumns {
    fn resolve(headers: &[String]) -> Result<Self> {
        let find = |col: &str| headers.iter().position(|h| h.trim() == col);
        Ok(CsvColumns {
            name: find(COL_NAME).context("CSV missing 'name' column")?,
            mass: find(COL_MASS),
            recclass: find(COL_RECCLASS),
            fall: find(COL_FALL),
            year: find(COL_YEAR),
            reclat: find(COL_RECLAT),
            reclong: find(COL_RECLONG),
            geolocation: find(COL_GEOLOCATION),
        })
    }
}

fn load_csv(path: &Path) -> Result<MeteoriteDataset> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();
    let cols = CsvColumns::resolve(&headers)?;

    let mut records = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let row = result.with_context(|| format!("CSV row {row_no}"))?;
        let cell = |idx: Option<usize>| idx.and_then(|i| row.get(i)).unwrap_or("");

        records.push(MeteoriteRecord {
            name: cell(Some(cols.name)).to_string(),
            mass_g: parse_optional_f64(cell(cols.mass)),
            recclass: cell(cols.recclass).trim().to_string(),
            fall: cell(cols.fall).parse::<Fall>().ok(),
            year: parse_year(cell(cols.year)),
            reclat: parse_optional_f64(cell(cols.reclat)),
            reclong: parse_optional_f64(cell(cols.reclong)),
            geolocation: non_empty(cell(cols.geolocation)),
        });
    }

    Ok(MeteoriteDataset::from_records(records))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')`:
///
/// ```json
/// [
///   { "name": "Aachen", "mass (g)": 21, "recclass": "L5", "fall": "Fell",
///     "year": "01/01/1880 12:00:00 AM", "reclat": 50.775, "reclong": 6.08333 },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<MeteoriteDataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let rows = root.as_array().context("Expected top-level JSON array")?;

    let mut records = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let name = obj
            .get(COL_NAME)
            .and_then(json_to_string)
            .with_context(|| format!("Row {i}: missing 'name'"))?;

        records.push(MeteoriteRecord {
            name,
            mass_g: obj.get(COL_MASS).and_then(json_to_f64),
            recclass: obj
                .get(COL_RECCLASS)
                .and_then(json_to_string)
                .unwrap_or_default(),
            fall: obj
                .get(COL_FALL)
                .and_then(json_to_string)
                .and_then(|s| s.parse::<Fall>().ok()),
            year: obj.get(COL_YEAR).and_then(json_to_year),
            reclat: obj.get(COL_RECLAT).and_then(json_to_f64),
            reclong: obj.get(COL_RECLONG).and_then(json_to_f64),
            geolocation: obj.get(COL_GEOLOCATION).and_then(json_to_string),
        });
    }

    Ok(MeteoriteDataset::from_records(records))
}

fn json_to_string(val: &JsonValue) -> Option<String> {
    match val {
        JsonValue::String(s) => non_empty(s),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn json_to_f64(val: &JsonValue) -> Option<f64> {
    match val {
        JsonValue::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        JsonValue::String(s) => parse_optional_f64(s),
        _ => None,
    }
}

fn json_to_year(val: &JsonValue) -> Option<i32> {
    match val {
        JsonValue::Number(n) => n
            .as_i64()
            .and_then(|y| i32::try_from(y).ok())
            .or_else(|| n.as_f64().and_then(whole_year)),
        JsonValue::String(s) => parse_year(s),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file holding the landings table.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`); `year` may be an integer, a string,
/// a date or a timestamp column.
fn load_parquet(path: &Path) -> Result<MeteoriteDataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();
        let column = |name: &str| schema.index_of(name).ok().map(|i| batch.column(i).clone());

        let name_col = column(COL_NAME)
            .ok_or_else(|| anyhow::anyhow!("Parquet file missing 'name' column"))?;
        let mass_col = column(COL_MASS);
        let recclass_col = column(COL_RECCLASS);
        let fall_col = column(COL_FALL);
        let year_col = column(COL_YEAR);
        let reclat_col = column(COL_RECLAT);
        let reclong_col = column(COL_RECLONG);
        let geo_col = column(COL_GEOLOCATION);

        for row in 0..batch.num_rows() {
            let name = cell_string(&name_col, row)
                .with_context(|| format!("Row {row}: missing or non-text 'name'"))?;

            records.push(MeteoriteRecord {
                name,
                mass_g: mass_col.as_ref().and_then(|c| cell_f64(c, row)),
                recclass: recclass_col
                    .as_ref()
                    .and_then(|c| cell_string(c, row))
                    .unwrap_or_default(),
                fall: fall_col
                    .as_ref()
                    .and_then(|c| cell_string(c, row))
                    .and_then(|s| s.parse::<Fall>().ok()),
                year: year_col.as_ref().and_then(|c| cell_year(c, row)),
                reclat: reclat_col.as_ref().and_then(|c| cell_f64(c, row)),
                reclong: reclong_col.as_ref().and_then(|c| cell_f64(c, row)),
                geolocation: geo_col.as_ref().and_then(|c| cell_string(c, row)),
            });
        }
    }

    Ok(MeteoriteDataset::from_records(records))
}

// -- Parquet / Arrow helpers --

fn cell_string(col: &ArrayRef, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    let text = match col.data_type() {
        DataType::Utf8 => col
            .as_any()
            .downcast_ref::<StringArray>()
            .map(|a| a.value(row).to_string()),
        DataType::LargeUtf8 => col
            .as_any()
            .downcast_ref::<LargeStringArray>()
            .map(|a| a.value(row).to_string()),
        _ => None,
    };
    text.and_then(|s| non_empty(&s))
}

fn cell_f64(col: &ArrayRef, row: usize) -> Option<f64> {
    if col.is_null(row) {
        return None;
    }
    let value = match col.data_type() {
        DataType::Float64 => col
            .as_any()
            .downcast_ref::<Float64Array>()
            .map(|a| a.value(row)),
        DataType::Float32 => col
            .as_any()
            .downcast_ref::<Float32Array>()
            .map(|a| a.value(row) as f64),
        DataType::Int64 => col
            .as_any()
            .downcast_ref::<Int64Array>()
            .map(|a| a.value(row) as f64),
        DataType::Int32 => col
            .as_any()
            .downcast_ref::<Int32Array>()
            .map(|a| a.value(row) as f64),
        DataType::Utf8 | DataType::LargeUtf8 => {
            cell_string(col, row).and_then(|s| parse_optional_f64(&s))
        }
        _ => None,
    };
    value.filter(|v| v.is_finite())
}

fn cell_year(col: &ArrayRef, row: usize) -> Option<i32> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Int64 => col
            .as_any()
            .downcast_ref::<Int64Array>()
            .and_then(|a| i32::try_from(a.value(row)).ok()),
        DataType::Int32 => col
            .as_any()
            .downcast_ref::<Int32Array>()
            .map(|a| a.value(row)),
        DataType::Int16 => col
            .as_any()
            .downcast_ref::<Int16Array>()
            .map(|a| a.value(row) as i32),
        DataType::Float64 | DataType::Float32 => cell_f64(col, row).and_then(whole_year),
        DataType::Utf8 | DataType::LargeUtf8 => cell_string(col, row).and_then(|s| parse_year(&s)),
        DataType::Date32 => col
            .as_any()
            .downcast_ref::<Date32Array>()
            .and_then(|a| {
                // Date32 counts days since 1970-01-01 (day 719_163 of the CE).
                NaiveDate::from_num_days_from_ce_opt(a.value(row) + 719_163)
            })
            .map(|d| d.year()),
        DataType::Timestamp(unit, _) => {
            let any = col.as_any();
            let dt = match unit {
                TimeUnit::Second => any
                    .downcast_ref::<TimestampSecondArray>()
                    .and_then(|a| DateTime::from_timestamp(a.value(row), 0)),
                TimeUnit::Millisecond => any
                    .downcast_ref::<TimestampMillisecondArray>()
                    .and_then(|a| DateTime::from_timestamp_millis(a.value(row))),
                TimeUnit::Microsecond => any
                    .downcast_ref::<TimestampMicrosecondArray>()
                    .and_then(|a| DateTime::from_timestamp_micros(a.value(row))),
                TimeUnit::Nanosecond => any
                    .downcast_ref::<TimestampNanosecondArray>()
                    .map(|a| DateTime::from_timestamp_nanos(a.value(row))),
            };
            dt.map(|d| d.year())
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Cell parsing shared by all loaders
// ---------------------------------------------------------------------------

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

/// Empty or unparsable cells are missing values, not errors.
pub(crate) fn parse_optional_f64(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => {
            log::debug!("Treating unparsable number {s:?} as missing");
            None
        }
    }
}

fn whole_year(v: f64) -> Option<i32> {
    (v.is_finite() && v.fract() == 0.0 && v.abs() < i32::MAX as f64).then_some(v as i32)
}

const DATETIME_FORMATS: [&str; 3] = [
    "%m/%d/%Y %I:%M:%S %p",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
];
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

/// Extract the calendar year from a year cell.
///
/// The landings export stores years as full timestamps
/// (`01/01/1880 12:00:00 AM`); ISO dates and bare integers are accepted too.
/// Anything else is a missing year.
pub(crate) fn parse_year(s: &str) -> Option<i32> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(y) = s.parse::<i32>() {
        return Some(y);
    }
    if let Ok(v) = s.parse::<f64>() {
        return whole_year(v);
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.year());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d.year());
        }
    }
    log::debug!("Treating unparsable year {s:?} as missing");
    None
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;

    const SAMPLE_CSV: &str = "\
name,id,nametype,recclass,mass (g),fall,year,reclat,reclong,GeoLocation
Aachen,1,Valid,L5,21,Fell,01/01/1880 12:00:00 AM,50.775000,6.083330,\"(50.775, 6.08333)\"
Aarhus,2,Valid,H6,720,Fell,01/01/1951 12:00:00 AM,56.183330,10.233330,\"(56.18333, 10.23333)\"
Abee,6,Valid,EH4,107000,Found,not a date,,,
Acapulco,10,Valid,Acapulcoite,,Fell,1976,16.883330,-99.900000,\"(16.88333, -99.9)\"
";

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_landings_csv() {
        let file = write_temp(".csv", SAMPLE_CSV);
        let ds = load_file(file.path()).unwrap();

        assert_eq!(ds.len(), 4);
        let aachen = &ds.records[0];
        assert_eq!(aachen.name, "Aachen");
        assert_eq!(aachen.recclass, "L5");
        assert_eq!(aachen.mass_g, Some(21.0));
        assert_eq!(aachen.fall, Some(Fall::Fell));
        assert_eq!(aachen.year, Some(1880));
        assert_eq!(aachen.reclat, Some(50.775));
        assert_eq!(aachen.geolocation.as_deref(), Some("(50.775, 6.08333)"));

        let abee = &ds.records[2];
        assert_eq!(abee.fall, Some(Fall::Found));
        assert_eq!(abee.year, None, "unparsable year becomes missing");
        assert_eq!(abee.reclat, None);
        assert_eq!(abee.geolocation, None);

        let acapulco = &ds.records[3];
        assert_eq!(acapulco.mass_g, None);
        assert_eq!(acapulco.year, Some(1976));

        assert_eq!(ds.year_extent, Some((1880, 1976)));
    }

    #[test]
    fn missing_file_is_data_unavailable() {
        let err = load_file(Path::new("/definitely/not/here/Meteorite_Landings.csv")).unwrap_err();
        assert!(matches!(err, ExplorerError::DataUnavailable { .. }));
    }

    #[test]
    fn csv_without_name_column_is_data_unavailable() {
        let file = write_temp(".csv", "recclass,mass (g)\nL6,10\n");
        let err = load_file(file.path()).unwrap_err();
        match err {
            ExplorerError::DataUnavailable { reason, .. } => assert!(reason.contains("name")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn ragged_csv_row_is_data_unavailable() {
        let file = write_temp(".csv", "name,recclass\nAachen,L5\nAarhus,H6,extra\n");
        assert!(load_file(file.path()).is_err());
    }

    #[test]
    fn unsupported_extension_is_data_unavailable() {
        let file = write_temp(".xlsx", "");
        let err = load_file(file.path()).unwrap_err();
        assert!(err.to_string().contains(".xlsx"));
    }

    #[test]
    fn loads_records_json() {
        let json = r#"[
            {"name": "Aachen", "mass (g)": 21, "recclass": "L5", "fall": "Fell",
             "year": "01/01/1880 12:00:00 AM", "reclat": 50.775, "reclong": 6.08333},
            {"name": "Abee", "mass (g)": "107000", "recclass": "EH4", "fall": "Found",
             "year": 1952, "reclat": null, "reclong": null}
        ]"#;
        let file = write_temp(".json", json);
        let ds = load_file(file.path()).unwrap();

        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].year, Some(1880));
        assert_eq!(ds.records[1].mass_g, Some(107000.0));
        assert_eq!(ds.records[1].year, Some(1952));
        assert_eq!(ds.records[1].reclat, None);
    }

    #[test]
    fn loads_parquet_with_mixed_types() {
        let schema = Arc::new(Schema::new(vec![
            Field::new(COL_NAME, DataType::Utf8, false),
            Field::new(COL_MASS, DataType::Float64, true),
            Field::new(COL_RECCLASS, DataType::Utf8, false),
            Field::new(COL_FALL, DataType::Utf8, true),
            Field::new(COL_YEAR, DataType::Int64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["Aachen", "Abee"])),
                Arc::new(Float64Array::from(vec![Some(21.0), None])),
                Arc::new(StringArray::from(vec!["L5", "EH4"])),
                Arc::new(StringArray::from(vec![Some("Fell"), Some("Found")])),
                Arc::new(Int64Array::from(vec![Some(1880), None])),
            ],
        )
        .unwrap();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.as_file().try_clone().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].mass_g, Some(21.0));
        assert_eq!(ds.records[0].year, Some(1880));
        assert_eq!(ds.records[1].fall, Some(Fall::Found));
        assert_eq!(ds.records[1].mass_g, None);
        assert_eq!(ds.records[1].reclat, None, "absent column leaves field missing");
    }

    #[test]
    fn year_cell_formats() {
        assert_eq!(parse_year("01/01/1880 12:00:00 AM"), Some(1880));
        assert_eq!(parse_year("1999-06-30"), Some(1999));
        assert_eq!(parse_year("2001-01-01T00:00:00"), Some(2001));
        assert_eq!(parse_year("1976"), Some(1976));
        assert_eq!(parse_year("1976.0"), Some(1976));
        assert_eq!(parse_year(""), None);
        assert_eq!(parse_year("unknown"), None);
    }

    #[test]
    fn numeric_cells() {
        assert_eq!(parse_optional_f64(" 12.5 "), Some(12.5));
        assert_eq!(parse_optional_f64(""), None);
        assert_eq!(parse_optional_f64("n/a"), None);
        assert_eq!(parse_optional_f64("NaN"), None);
    }
}
