//! Spreadsheet Audit Library
//!
//! Batch data-quality auditing over a folder of spreadsheet files, built on
//! Polars and calamine.
//!
//! # Overview
//!
//! For every matching file in a folder the auditor:
//!
//! - **Null check**: counts missing values per column and lists the rows
//!   that hold any
//! - **Duplicate check**: finds repeated values (case-insensitive) in the
//!   columns selected by name prefix
//! - **Numeric check**: finds values that are not numbers in the columns
//!   selected by name prefix
//!
//! Findings are written to one `.xlsx` report with one sheet per input file.
//! A file that cannot be read is skipped without stopping the batch.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use sheet_audit::{AuditConfig, Auditor};
//!
//! let config = AuditConfig::builder()
//!     .folder_path("data/incoming")
//!     .output_excel_filename("audit.xlsx")
//!     .duplicate_prefix("ID")
//!     .numeric_prefix("Score")
//!     .build()?;
//!
//! let summary = Auditor::builder()
//!     .config(config)
//!     .on_progress(|event| {
//!         println!("[{:.0}%] {}", event.progress * 100.0, event.message);
//!     })
//!     .build()?
//!     .run()?;
//!
//! println!("{} files audited, {} failed", summary.succeeded(), summary.failed());
//! ```
//!
//! # Using the checks directly
//!
//! The checkers work on a [`Dataset`] and return plain report types, so
//! they can be used without the batch runner:
//!
//! ```rust,ignore
//! use sheet_audit::{DatasetLoader, DuplicateChecker};
//!
//! let dataset = DatasetLoader::load("customers.xlsx".as_ref())?;
//! let report = DuplicateChecker::check(&dataset, &["ID".to_string()])?;
//! ```

pub mod checks;
pub mod config;
pub mod dataset;
pub mod error;
pub mod pipeline;
pub mod reporting;
pub mod types;
pub mod utils;

// Re-export commonly used types at crate root
pub use checks::{DuplicateChecker, NullChecker, NumericChecker, normalize_column};
pub use config::{AuditConfig, AuditConfigBuilder, ConfigValidationError};
pub use dataset::{ColumnSelector, Dataset, DatasetLoader};
pub use error::{AuditError, Result as AuditResult, ResultExt};
pub use pipeline::{
    AuditEvent, Auditor, AuditorBuilder, ClosureProgressReporter, DatasetChecks, FileStage,
    ProgressReporter,
};
pub use reporting::{CellStyle, ReportDocument, ReportSheet, ReportSink, SectionWriter, SheetBuffer};
pub use types::{
    BatchSummary, CellValue, ColumnFinding, ColumnNullCount, DuplicateReport, FileFindings,
    FileOutcome, FileStatus, NullReport, NumericConformanceReport, PrefixFindings, PrefixReport,
    ReportRow,
};
