//! Report output: the per-sheet buffer, the section layout and the workbook.
//!
//! A [`SheetBuffer`] collects rows, styles and widths for one input file
//! through the [`ReportSink`] trait. A [`SectionWriter`] owns the layout
//! policy and drives the sink. Finished buffers are collected by a
//! [`ReportDocument`], which writes the `.xlsx` file once at the end.

mod document;
mod sink;
mod writer;

pub use document::{ReportDocument, ReportSheet};
pub use sink::{CellStyle, MAX_SHEET_COLS, MAX_SHEET_ROWS, ReportSink, SheetBuffer};
pub use writer::{EMPTY_DATASET_NOTICE, SectionWriter};
