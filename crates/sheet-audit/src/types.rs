use crate::pipeline::FileStage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

// ============================================================================
// Cell values
// ============================================================================

/// One cell of a dataset or report sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Text content, if this is a text cell.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Canonical text form. Integral numbers render without a fraction
/// (`2`, not `2.0`); nulls render as the empty string.
impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Number(n) => {
                // integral values print without a fraction; -0.0 prints as 0
                if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<usize> for CellValue {
    fn from(value: usize) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Null)
    }
}

// ============================================================================
// Check reports
// ============================================================================

/// A full dataset row, kept with its zero-based position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub index: usize,
    pub values: Vec<CellValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnNullCount {
    pub column: String,
    pub null_count: usize,
}

/// Missing-value findings for one dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NullReport {
    pub headers: Vec<String>,
    pub null_counts: Vec<ColumnNullCount>,
    pub rows: Vec<ReportRow>,
}

impl NullReport {
    pub fn total_nulls(&self) -> usize {
        self.null_counts.iter().map(|c| c.null_count).sum()
    }

    pub fn null_count(&self, column: &str) -> Option<usize> {
        self.null_counts
            .iter()
            .find(|c| c.column == column)
            .map(|c| c.null_count)
    }
}

/// Flagged rows for one checked column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnFinding {
    pub column: String,
    pub count: usize,
    pub rows: Vec<ReportRow>,
}

impl ColumnFinding {
    pub fn row_indices(&self) -> Vec<usize> {
        self.rows.iter().map(|r| r.index).collect()
    }
}

/// Findings for every column matched by one prefix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrefixFindings {
    pub prefix: String,
    pub columns: Vec<ColumnFinding>,
}

impl PrefixFindings {
    pub fn matched_columns(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.column.as_str()).collect()
    }
}

/// Duplicate-value findings, one entry per requested prefix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateReport {
    pub headers: Vec<String>,
    pub selections: Vec<PrefixFindings>,
}

/// Non-numeric-value findings, one entry per requested prefix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericConformanceReport {
    pub headers: Vec<String>,
    pub selections: Vec<PrefixFindings>,
}

/// Lookup shared by the two prefix-driven reports.
pub trait PrefixReport {
    fn selections(&self) -> &[PrefixFindings];

    fn finding(&self, column: &str) -> Option<&ColumnFinding> {
        self.selections()
            .iter()
            .flat_map(|s| s.columns.iter())
            .find(|c| c.column == column)
    }

    /// Total flagged rows across every checked column.
    fn flagged_rows(&self) -> usize {
        self.selections()
            .iter()
            .flat_map(|s| s.columns.iter())
            .map(|c| c.count)
            .sum()
    }
}

impl PrefixReport for DuplicateReport {
    fn selections(&self) -> &[PrefixFindings] {
        &self.selections
    }
}

impl PrefixReport for NumericConformanceReport {
    fn selections(&self) -> &[PrefixFindings] {
        &self.selections
    }
}

// ============================================================================
// Batch results
// ============================================================================

/// Terminal state of one input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Done,
    Failed,
}

/// Findings totals for one processed file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFindings {
    pub rows: usize,
    pub columns: usize,
    pub rows_with_nulls: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicate_rows: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub non_numeric_rows: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileOutcome {
    pub file_name: String,
    pub status: FileStatus,
    /// Stage the file was in when it failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_stage: Option<FileStage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub findings: Option<FileFindings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of a whole batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub generated_at: String,
    pub folder: PathBuf,
    /// `None` when no candidate files were found and nothing was written.
    pub output_file: Option<PathBuf>,
    pub files: Vec<FileOutcome>,
}

impl BatchSummary {
    pub fn succeeded(&self) -> usize {
        self.files
            .iter()
            .filter(|f| f.status == FileStatus::Done)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.files
            .iter()
            .filter(|f| f.status == FileStatus::Failed)
            .count()
    }

    pub fn no_files_found(&self) -> bool {
        self.files.is_empty()
    }
}
