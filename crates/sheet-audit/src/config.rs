//! Configuration types for the audit pipeline.
//!
//! The same [`AuditConfig`] backs both entry points of the binary: the
//! positional `scan` command and the JSON configuration file. Use the builder
//! for programmatic setup.

use crate::error::{AuditError, Result, ResultExt};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File extensions scanned when none are configured.
pub const DEFAULT_EXTENSIONS: [&str; 2] = ["xlsx", "xls"];

/// Extensions that have a loader.
pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xls", "ods", "csv"];

fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect()
}

/// Configuration for one audit run.
///
/// Field names match the JSON configuration file:
///
/// ```json
/// {
///     "folder_path": "data/incoming",
///     "output_excel_filename": "audit.xlsx",
///     "duplicate_column_prefixes": ["ID"],
///     "numeric_column_prefixes": ["Score"]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Folder whose spreadsheet files are audited (not recursive).
    pub folder_path: PathBuf,

    /// Path of the report workbook to write.
    pub output_excel_filename: PathBuf,

    /// Column-name prefixes checked for duplicate values.
    /// An empty list disables the duplicate check.
    #[serde(default)]
    pub duplicate_column_prefixes: Vec<String>,

    /// Column-name prefixes that must hold numeric values.
    /// An empty list disables the numeric check.
    #[serde(default)]
    pub numeric_column_prefixes: Vec<String>,

    /// File extensions (without dot, case-insensitive) picked up from the folder.
    /// Default: `["xlsx", "xls"]`
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl AuditConfig {
    /// Create a new configuration builder.
    pub fn builder() -> AuditConfigBuilder {
        AuditConfigBuilder::default()
    }

    /// Load and validate a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .context(format!("Reading configuration '{}'", path.display()))?;
        Self::from_json_str(&content)
    }

    /// Parse and validate a JSON configuration document.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: AuditConfig = serde_json::from_str(content)?;
        config
            .validate()
            .map_err(|e| AuditError::InvalidConfig(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration and return errors if invalid.
    ///
    /// Folder existence is checked when the run starts, not here.
    pub fn validate(&self) -> std::result::Result<(), ConfigValidationError> {
        if self.folder_path.as_os_str().is_empty() {
            return Err(ConfigValidationError::MissingField("folder_path"));
        }

        if self.output_excel_filename.as_os_str().is_empty() {
            return Err(ConfigValidationError::MissingField("output_excel_filename"));
        }

        if self.extensions.is_empty() {
            return Err(ConfigValidationError::NoExtensions);
        }

        for ext in &self.extensions {
            let normalized = normalize_extension(ext);
            if !SUPPORTED_EXTENSIONS.contains(&normalized.as_str()) {
                return Err(ConfigValidationError::UnsupportedExtension(ext.clone()));
            }
        }

        Ok(())
    }

    /// Whether the duplicate check runs.
    pub fn checks_duplicates(&self) -> bool {
        !self.duplicate_column_prefixes.is_empty()
    }

    /// Whether the numeric-conformance check runs.
    pub fn checks_numeric(&self) -> bool {
        !self.numeric_column_prefixes.is_empty()
    }

    /// Whether `path` has one of the configured extensions.
    pub fn matches_extension(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        let ext = ext.to_ascii_lowercase();
        self.extensions
            .iter()
            .any(|configured| normalize_extension(configured) == ext)
    }
}

fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_ascii_lowercase()
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required field '{0}'")]
    MissingField(&'static str),

    #[error("At least one file extension must be configured")]
    NoExtensions,

    #[error("Unsupported extension '{0}' (supported: xlsx, xlsm, xls, ods, csv)")]
    UnsupportedExtension(String),
}

/// Builder for [`AuditConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct AuditConfigBuilder {
    folder_path: Option<PathBuf>,
    output_excel_filename: Option<PathBuf>,
    duplicate_column_prefixes: Vec<String>,
    numeric_column_prefixes: Vec<String>,
    extensions: Option<Vec<String>>,
}

impl AuditConfigBuilder {
    /// Set the folder to scan.
    pub fn folder_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.folder_path = Some(path.into());
        self
    }

    /// Set the report output path.
    pub fn output_excel_filename(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_excel_filename = Some(path.into());
        self
    }

    /// Add one duplicate-check prefix.
    pub fn duplicate_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.duplicate_column_prefixes.push(prefix.into());
        self
    }

    /// Replace the duplicate-check prefixes.
    pub fn duplicate_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.duplicate_column_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// Add one numeric-check prefix.
    pub fn numeric_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.numeric_column_prefixes.push(prefix.into());
        self
    }

    /// Replace the numeric-check prefixes.
    pub fn numeric_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.numeric_column_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// Set the scanned file extensions.
    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = Some(extensions.into_iter().map(Into::into).collect());
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `AuditConfig` or an error if validation fails.
    pub fn build(self) -> std::result::Result<AuditConfig, ConfigValidationError> {
        let config = AuditConfig {
            folder_path: self
                .folder_path
                .ok_or(ConfigValidationError::MissingField("folder_path"))?,
            output_excel_filename: self
                .output_excel_filename
                .ok_or(ConfigValidationError::MissingField("output_excel_filename"))?,
            duplicate_column_prefixes: self.duplicate_column_prefixes,
            numeric_column_prefixes: self.numeric_column_prefixes,
            extensions: self.extensions.unwrap_or_else(default_extensions),
        };

        config.validate()?;
        Ok(config)
    }
}
