use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, AsArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray};
use arrow::datatypes::DataType;
use log::{info, warn};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Mode, ModeSet};
use crate::units::FrequencyUnit;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a mode table from a file.  Dispatch by extension.
///
/// Every format carries the same columns: `frequency`, `intensity`, and
/// optionally `linewidth` and `irrep`. Frequencies and linewidths are taken
/// to be in `unit`.
///
/// Supported formats:
/// * `.csv`           – header row with the column names above
/// * `.json`          – `[{ "frequency": .., "intensity": .., ... }, ...]`
/// * `.parquet`       – scalar columns with the names above
/// * `.dat` / `.txt`  – whitespace columns `frequency intensity [linewidth]`,
///   `#` starts a comment
pub fn load_file(path: &Path, unit: FrequencyUnit) -> Result<ModeSet> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let rows = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path)?,
        "json" => load_json(path)?,
        "csv" => load_csv(path)?,
        "dat" | "txt" => load_dat(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };

    let modes = rows_to_mode_set(rows, unit)?;
    info!(
        "Loaded {} modes ({}) from {}",
        modes.len(),
        unit,
        path.display()
    );
    Ok(modes)
}

/// Error context for data rows is always `Row N`, counting data rows from 1
/// (headers, comments and blank lines are not counted).
fn row_label(index: usize) -> String {
    format!("Row {}", index + 1)
}

/// One parsed table row, before validation.
#[derive(Debug, Clone, PartialEq)]
struct ModeRow {
    frequency: f64,
    intensity: f64,
    linewidth: Option<f64>,
    irrep: Option<String>,
}

fn rows_to_mode_set(rows: Vec<ModeRow>, unit: FrequencyUnit) -> Result<ModeSet> {
    let has_irreps = rows.iter().any(|r| r.irrep.is_some());
    if has_irreps && rows.iter().any(|r| r.irrep.is_none()) {
        warn!("Some rows have no ir. rep. label; they will be shown as '?'");
    }

    let mut modes = Vec::with_capacity(rows.len());
    let mut labels = Vec::with_capacity(rows.len());
    for (i, row) in rows.into_iter().enumerate() {
        let mode = Mode::new(row.frequency, row.intensity, row.linewidth)
            .with_context(|| row_label(i))?;
        modes.push(mode);
        labels.push(row.irrep.unwrap_or_else(|| "?".to_string()));
    }

    let set = ModeSet::new(modes, unit);
    if has_irreps {
        Ok(set.with_labels(labels)?)
    } else {
        Ok(set)
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "frequency": 112.3, "intensity": 0.41, "linewidth": 2.1, "irrep": "B1u" },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Vec<ModeRow>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    parse_json(&text)
}

fn parse_json(text: &str) -> Result<Vec<ModeRow>> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    records
        .iter()
        .enumerate()
        .map(|(i, rec)| {
            let obj = rec
                .as_object()
                .with_context(|| format!("{} is not a JSON object", row_label(i)))?;

            let number = |key: &str| -> Result<Option<f64>> {
                match obj.get(key) {
                    None | Some(JsonValue::Null) => Ok(None),
                    Some(v) => v
                        .as_f64()
                        .map(Some)
                        .with_context(|| format!("{}: '{key}' is not a number", row_label(i))),
                }
            };

            Ok(ModeRow {
                frequency: number("frequency")?
                    .with_context(|| format!("{}: missing 'frequency'", row_label(i)))?,
                intensity: number("intensity")?
                    .with_context(|| format!("{}: missing 'intensity'", row_label(i)))?,
                linewidth: number("linewidth")?,
                irrep: obj.get("irrep").and_then(|v| v.as_str()).map(str::to_string),
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one mode per row.
/// `linewidth` and `irrep` columns are optional, and empty cells in them
/// mean "not given".
fn load_csv(path: &Path) -> Result<Vec<ModeRow>> {
    let reader = csv::Reader::from_path(path).context("opening CSV")?;
    parse_csv(reader)
}

fn parse_csv<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Vec<ModeRow>> {
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_ascii_lowercase())
        .collect();

    let column = |name: &str| headers.iter().position(|h| h == name);
    let f_idx = column("frequency").context("CSV missing 'frequency' column")?;
    let i_idx = column("intensity").context("CSV missing 'intensity' column")?;
    let w_idx = column("linewidth");
    let r_idx = column("irrep");

    let mut rows = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| row_label(row_no))?;

        let cell = |idx: usize| record.get(idx).unwrap_or("").trim();
        let linewidth = match w_idx.map(cell) {
            None | Some("") => None,
            Some(s) => Some(parse_float(s, row_no, "linewidth")?),
        };
        let irrep = r_idx
            .map(cell)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        rows.push(ModeRow {
            frequency: parse_float(cell(f_idx), row_no, "frequency")?,
            intensity: parse_float(cell(i_idx), row_no, "intensity")?,
            linewidth,
            irrep,
        });
    }

    Ok(rows)
}

fn parse_float(s: &str, row: usize, col: &str) -> Result<f64> {
    s.parse::<f64>()
        .with_context(|| format!("{}, {col}: '{s}' is not a number", row_label(row)))
}

// ---------------------------------------------------------------------------
// Plain-text loader
// ---------------------------------------------------------------------------

/// Whitespace-separated columns: `frequency intensity [linewidth]`.
/// Blank lines and anything after `#` are ignored.
fn load_dat(path: &Path) -> Result<Vec<ModeRow>> {
    let text = std::fs::read_to_string(path).context("reading text file")?;
    parse_dat(&text)
}

fn parse_dat(text: &str) -> Result<Vec<ModeRow>> {
    let mut rows = Vec::new();

    for (line_no, line) in text.lines().enumerate() {
        let content = line.split('#').next().unwrap_or("").trim();
        if content.is_empty() {
            continue;
        }
        let row_no = rows.len();
        let fields: Vec<&str> = content.split_whitespace().collect();
        if !(2..=3).contains(&fields.len()) {
            bail!(
                "{} (line {}): expected 2 or 3 columns, found {}",
                row_label(row_no),
                line_no + 1,
                fields.len()
            );
        }
        let at_line = || format!("line {}", line_no + 1);
        rows.push(ModeRow {
            frequency: parse_float(fields[0], row_no, "frequency").with_context(at_line)?,
            intensity: parse_float(fields[1], row_no, "intensity").with_context(at_line)?,
            linewidth: fields
                .get(2)
                .map(|s| parse_float(s, row_no, "linewidth").with_context(at_line))
                .transpose()?,
            irrep: None,
        });
    }

    Ok(rows)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet mode table.
///
/// Expected schema:
/// - `frequency`: Float64 / Float32 / Int64 / Int32
/// - `intensity`: same numeric types
/// - `linewidth` (optional): same numeric types, nulls allowed
/// - `irrep` (optional): Utf8 / LargeUtf8
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Vec<ModeRow>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    read_parquet(file, PARQUET_BATCH_SIZE)
}

/// Rows per record batch when reading Parquet.
const PARQUET_BATCH_SIZE: usize = 1024;

fn read_parquet(file: std::fs::File, batch_size: usize) -> Result<Vec<ModeRow>> {
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder
        .with_batch_size(batch_size)
        .build()
        .context("building parquet reader")?;

    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let f_idx = schema
            .index_of("frequency")
            .map_err(|_| anyhow::anyhow!("Parquet file missing 'frequency' column"))?;
        let i_idx = schema
            .index_of("intensity")
            .map_err(|_| anyhow::anyhow!("Parquet file missing 'intensity' column"))?;
        let w_col = schema.index_of("linewidth").ok().map(|i| batch.column(i));
        let r_col = schema.index_of("irrep").ok().map(|i| batch.column(i));

        let f_col = batch.column(f_idx);
        let i_col = batch.column(i_idx);

        // Row numbers continue across batches.
        for row in 0..batch.num_rows() {
            let label = row_label(rows.len());
            let frequency = extract_f64(f_col, row)
                .with_context(|| format!("{label}: failed to read 'frequency'"))?
                .with_context(|| format!("{label}: null 'frequency'"))?;
            let intensity = extract_f64(i_col, row)
                .with_context(|| format!("{label}: failed to read 'intensity'"))?
                .with_context(|| format!("{label}: null 'intensity'"))?;
            let linewidth = match w_col {
                Some(col) => extract_f64(col, row)
                    .with_context(|| format!("{label}: failed to read 'linewidth'"))?,
                None => None,
            };
            let irrep = match r_col {
                Some(col) => extract_string(col, row)
                    .with_context(|| format!("{label}: failed to read 'irrep'"))?,
                None => None,
            };

            rows.push(ModeRow {
                frequency,
                intensity,
                linewidth,
                irrep,
            });
        }
    }

    Ok(rows)
}

// -- Parquet / Arrow helpers --

/// Extract a numeric cell as `f64`; `None` for a null cell.
fn extract_f64(col: &Arc<dyn Array>, row: usize) -> Result<Option<f64>> {
    if col.is_null(row) {
        return Ok(None);
    }
    let value = match col.data_type() {
        DataType::Float64 => col
            .as_any()
            .downcast_ref::<Float64Array>()
            .context("expected Float64Array")?
            .value(row),
        DataType::Float32 => col
            .as_any()
            .downcast_ref::<Float32Array>()
            .context("expected Float32Array")?
            .value(row) as f64,
        DataType::Int64 => col
            .as_any()
            .downcast_ref::<Int64Array>()
            .context("expected Int64Array")?
            .value(row) as f64,
        DataType::Int32 => col
            .as_any()
            .downcast_ref::<Int32Array>()
            .context("expected Int32Array")?
            .value(row) as f64,
        other => bail!("Expected a numeric column, got {other:?}"),
    };
    Ok(Some(value))
}

/// Extract a string cell; `None` for a null cell.
fn extract_string(col: &Arc<dyn Array>, row: usize) -> Result<Option<String>> {
    if col.is_null(row) {
        return Ok(None);
    }
    match col.data_type() {
        DataType::Utf8 => {
            let s = col
                .as_any()
                .downcast_ref::<StringArray>()
                .context("expected StringArray")?;
            Ok(Some(s.value(row).to_string()))
        }
        DataType::LargeUtf8 => Ok(Some(col.as_string::<i64>().value(row).to_string())),
        other => bail!("Expected a string column, got {other:?}"),
    }
}
