//! Custom error types for the audit pipeline.
//!
//! This module provides the error hierarchy using `thiserror`. Errors are
//! split by the granularity at which the batch orchestrator recovers from
//! them: configuration errors abort the run, file-level errors skip one file.
//!
//! Errors are serializable so they can be embedded in the JSON batch summary.

use serde::Serialize;
use serde::ser::SerializeStruct;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the audit pipeline.
#[derive(Error, Debug)]
pub enum AuditError {
    /// Invalid or incomplete configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Target folder is missing or is not a directory.
    #[error("Folder '{}' does not exist or is not a directory", .0.display())]
    InvalidFolder(PathBuf),

    /// An input file could not be opened or parsed.
    #[error("Failed to load '{path}': {reason}")]
    FileLoad { path: String, reason: String },

    /// The file extension has no loader.
    #[error("Unsupported file format: '{0}'")]
    UnsupportedFormat(String),

    /// A check failed while processing one file.
    #[error("Failed to process '{file}': {reason}")]
    Processing { file: String, reason: String },

    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// Report writer error.
    #[error("Report writer error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<AuditError>,
    },
}

impl AuditError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        AuditError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Build a [`AuditError::FileLoad`] from any displayable reason.
    pub fn file_load(path: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        AuditError::FileLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Build a [`AuditError::Processing`] from any displayable reason.
    pub fn processing(file: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        AuditError::Processing {
            file: file.into(),
            reason: reason.to_string(),
        }
    }

    /// Get a stable error code for machine-readable output.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::InvalidFolder(_) => "INVALID_FOLDER",
            Self::FileLoad { .. } => "FILE_LOAD_FAILED",
            Self::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            Self::Processing { .. } => "PROCESSING_FAILED",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::Xlsx(_) => "REPORT_WRITER_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if the orchestrator may recover from this error by skipping
    /// the file it occurred in.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::FileLoad { .. }
            | Self::UnsupportedFormat(_)
            | Self::Processing { .. }
            | Self::ColumnNotFound(_)
            | Self::Polars(_) => true,
            Self::WithContext { source, .. } => source.is_recoverable(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for AuditError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("AuditError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for audit operations.
pub type Result<T> = std::result::Result<T, AuditError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| AuditError::Io(e).with_context(context))
    }
}
