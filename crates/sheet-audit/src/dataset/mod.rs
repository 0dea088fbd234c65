//! In-memory tabular data loaded from one input file.
//!
//! A [`Dataset`] wraps a polars `DataFrame` and exposes it through
//! [`CellValue`]s, which is the only shape the checks and the report writer
//! need. Datasets are immutable once built; checks that need a transformed
//! column derive a new one and leave the loaded data as it is.

mod loader;

pub use loader::DatasetLoader;

use crate::error::{AuditError, Result};
use crate::types::{CellValue, ReportRow};
use crate::utils::dedupe_headers;
use polars::prelude::*;

/// Selects columns whose name starts with a literal, case-sensitive prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSelector {
    prefix: String,
}

impl ColumnSelector {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn matches(&self, column: &str) -> bool {
        column.starts_with(&self.prefix)
    }
}

/// Ordered named columns of equal length.
#[derive(Debug, Clone)]
pub struct Dataset {
    df: DataFrame,
}

impl Dataset {
    /// Wrap an existing DataFrame.
    pub fn new(df: DataFrame) -> Self {
        Self { df }
    }

    /// A dataset with no columns and no rows.
    pub fn empty() -> Self {
        Self {
            df: DataFrame::empty(),
        }
    }

    /// Build a dataset from a header row and body rows.
    ///
    /// Headers are made unique first. Short rows are padded with nulls.
    /// Each column becomes `Float64` when all its values are numbers,
    /// `Boolean` when all are booleans, and `String` otherwise.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Result<Self> {
        let headers = dedupe_headers(headers);
        let mut columns = Vec::with_capacity(headers.len());

        for (idx, name) in headers.iter().enumerate() {
            let values: Vec<CellValue> = rows
                .iter()
                .map(|row| row.get(idx).cloned().unwrap_or(CellValue::Null))
                .collect();
            columns.push(build_column(name, &values));
        }

        let df = DataFrame::new(columns)?;
        Ok(Self { df })
    }

    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.df.height()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.df.width()
    }

    /// True when there is nothing to check: no rows or no columns.
    pub fn is_empty(&self) -> bool {
        self.height() == 0 || self.width() == 0
    }

    pub fn column_names(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect()
    }

    /// Names of the columns matched by `selector`, in dataset order.
    pub fn select(&self, selector: &ColumnSelector) -> Vec<String> {
        self.column_names()
            .into_iter()
            .filter(|name| selector.matches(name))
            .collect()
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.df
            .column(name)
            .map_err(|_| AuditError::ColumnNotFound(name.to_string()))
    }

    /// Every value of one column, in row order.
    pub fn column_values(&self, name: &str) -> Result<Vec<CellValue>> {
        let series = self.column(name)?.as_materialized_series();
        (0..series.len())
            .map(|idx| Ok(to_cell_value(series.get(idx)?)))
            .collect()
    }

    /// Every column's value at row `index`.
    pub fn row(&self, index: usize) -> Result<Vec<CellValue>> {
        self.df
            .get_columns()
            .iter()
            .map(|column| Ok(to_cell_value(column.as_materialized_series().get(index)?)))
            .collect()
    }

    /// Materialize the given rows, keeping their order.
    pub fn rows(&self, indices: &[usize]) -> Result<Vec<ReportRow>> {
        indices
            .iter()
            .map(|&index| {
                Ok(ReportRow {
                    index,
                    values: self.row(index)?,
                })
            })
            .collect()
    }
}

/// Build a typed column from cell values.
fn build_column(name: &str, values: &[CellValue]) -> Column {
    let has_values = values.iter().any(|v| !v.is_null());
    let all_numbers = values
        .iter()
        .all(|v| matches!(v, CellValue::Null | CellValue::Number(_)));
    let all_bools = values
        .iter()
        .all(|v| matches!(v, CellValue::Null | CellValue::Bool(_)));

    let series = if has_values && all_numbers {
        let data: Vec<Option<f64>> = values
            .iter()
            .map(|v| match v {
                CellValue::Number(n) => Some(*n),
                _ => None,
            })
            .collect();
        Series::new(name.into(), data)
    } else if has_values && all_bools {
        let data: Vec<Option<bool>> = values
            .iter()
            .map(|v| match v {
                CellValue::Bool(b) => Some(*b),
                _ => None,
            })
            .collect();
        Series::new(name.into(), data)
    } else {
        let data: Vec<Option<String>> = values
            .iter()
            .map(|v| match v {
                CellValue::Null => None,
                other => Some(other.to_string()),
            })
            .collect();
        Series::new(name.into(), data)
    };

    Column::from(series)
}

/// Convert a polars value into a report cell.
pub(crate) fn to_cell_value(value: AnyValue<'_>) -> CellValue {
    match value {
        AnyValue::Null => CellValue::Null,
        AnyValue::Boolean(b) => CellValue::Bool(b),
        AnyValue::String(s) => CellValue::Text(s.to_string()),
        AnyValue::StringOwned(s) => CellValue::Text(s.to_string()),
        other => match other.try_extract::<f64>() {
            Ok(n) => CellValue::Number(n),
            Err(_) => CellValue::Text(other.to_string()),
        },
    }
}
