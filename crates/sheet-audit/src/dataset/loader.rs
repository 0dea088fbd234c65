//! Dataset loading from spreadsheet and CSV files.

use super::Dataset;
use crate::error::{AuditError, Result};
use crate::types::CellValue;
use calamine::{Data, DataType, Range, Reader, open_workbook_auto};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::SerReader;
use std::path::Path;
use tracing::debug;

/// Loads one input file into a [`Dataset`].
///
/// Workbooks (`xlsx`, `xlsm`, `xls`, `ods`) are read with calamine: the first
/// worksheet is used and its first row is the header. CSV files are read
/// with polars.
pub struct DatasetLoader;

impl DatasetLoader {
    /// Load a file, picking the reader from its extension.
    pub fn load(path: &Path) -> Result<Dataset> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "xlsx" | "xlsm" | "xls" | "ods" => Self::load_workbook(path),
            "csv" => Self::load_csv(path),
            _ => Err(AuditError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Load the first worksheet of a workbook.
    pub fn load_workbook(path: &Path) -> Result<Dataset> {
        let path_display = path.display().to_string();

        let mut workbook =
            open_workbook_auto(path).map_err(|e| AuditError::file_load(&path_display, e))?;

        let Some(range) = workbook.worksheet_range_at(0) else {
            debug!("No worksheet found in {}", path_display);
            return Ok(Dataset::empty());
        };
        let range = range.map_err(|e| AuditError::file_load(&path_display, e))?;

        let (height, width) = range.get_size();
        debug!("Read {} ({} rows x {} columns)", path_display, height, width);

        Self::from_range(&range)
    }

    /// Build a dataset from a worksheet range whose first row is the header.
    pub fn from_range(range: &Range<Data>) -> Result<Dataset> {
        let mut rows = range.rows();
        let Some(header_row) = rows.next() else {
            return Ok(Dataset::empty());
        };

        let headers: Vec<String> = header_row.iter().map(header_text).collect();
        let body: Vec<Vec<CellValue>> = rows
            .map(|row| row.iter().map(to_cell_value).collect())
            .collect();

        Dataset::from_rows(headers, body)
    }

    /// Load a CSV file with a header row.
    ///
    /// Column types are inferred from every row, so a stray text value deep
    /// in a numeric column turns the column into text instead of failing
    /// the parse.
    pub fn load_csv(path: &Path) -> Result<Dataset> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(None)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .and_then(|reader| reader.finish())
            .map_err(|e| AuditError::file_load(path.display().to_string(), e))?;

        Ok(Dataset::new(df))
    }
}

/// Workbook error cells (`#N/A`, `#DIV/0!`, ...) count as missing.
fn to_cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Null,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(_) => match cell.as_datetime() {
            Some(dt) => CellValue::Text(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => CellValue::Text(cell.to_string()),
        },
        other => CellValue::Text(other.to_string()),
    }
}

fn header_text(cell: &Data) -> String {
    to_cell_value(cell).to_string()
}
