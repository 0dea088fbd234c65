//! The batch auditor: discovers input files, checks each one and collects
//! one report sheet per file.

use super::progress::{AuditEvent, ClosureProgressReporter, FileStage, ProgressReporter};
use crate::checks::{DuplicateChecker, NullChecker, NumericChecker};
use crate::config::{AuditConfig, ConfigValidationError};
use crate::dataset::{Dataset, DatasetLoader};
use crate::error::{AuditError, Result, ResultExt};
use crate::reporting::{ReportDocument, SectionWriter, SheetBuffer};
use crate::types::{
    BatchSummary, DuplicateReport, FileFindings, FileOutcome, FileStatus, NullReport,
    NumericConformanceReport, PrefixReport,
};
use chrono::Local;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Everything the checks found in one dataset.
#[derive(Debug, Clone)]
pub struct DatasetChecks {
    pub rows: usize,
    pub columns: usize,
    pub is_empty: bool,
    pub nulls: NullReport,
    /// `None` when no duplicate prefixes are configured.
    pub duplicates: Option<DuplicateReport>,
    /// `None` when no numeric prefixes are configured.
    pub numeric: Option<NumericConformanceReport>,
}

impl DatasetChecks {
    pub fn findings(&self) -> FileFindings {
        FileFindings {
            rows: self.rows,
            columns: self.columns,
            rows_with_nulls: self.nulls.rows.len(),
            duplicate_rows: self.duplicates.as_ref().map(|r| r.flagged_rows()),
            non_numeric_rows: self.numeric.as_ref().map(|r| r.flagged_rows()),
        }
    }

    /// Lay the findings out on a fresh sheet.
    pub fn write_sheet(&self, file_name: &str) -> SheetBuffer {
        let mut buffer = SheetBuffer::new();
        let mut writer = SectionWriter::new(&mut buffer);

        if self.is_empty {
            let sections =
                1 + usize::from(self.duplicates.is_some()) + usize::from(self.numeric.is_some());
            for _ in 0..sections {
                writer.write_empty_notice();
            }
        } else {
            writer.write_null_section(file_name, &self.nulls);
            if let Some(duplicates) = &self.duplicates {
                writer.write_duplicate_section(duplicates);
            }
            if let Some(numeric) = &self.numeric {
                writer.write_numeric_section(numeric);
            }
        }

        writer.finish();
        buffer
    }
}

/// Audits every matching file of a folder into one report workbook.
///
/// Use [`Auditor::builder()`] to create one.
///
/// # Example
///
/// ```rust,ignore
/// use sheet_audit::{AuditConfig, Auditor};
///
/// let config = AuditConfig::builder()
///     .folder_path("data/incoming")
///     .output_excel_filename("audit.xlsx")
///     .duplicate_prefix("ID")
///     .build()?;
///
/// let summary = Auditor::builder().config(config).build()?.run()?;
/// println!("{} files audited", summary.succeeded());
/// ```
pub struct Auditor {
    config: AuditConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(Auditor: Send, Sync);

impl Auditor {
    /// Create a new auditor builder.
    pub fn builder() -> AuditorBuilder {
        AuditorBuilder::default()
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// Run the whole batch.
    ///
    /// Fails only when the folder is unusable or the report cannot be
    /// saved; a file that cannot be audited is recorded as failed and the
    /// batch moves on. When no file matches, nothing is written and the
    /// summary has no output file.
    pub fn run(&self) -> Result<BatchSummary> {
        let folder = &self.config.folder_path;
        let files = self.discover_files()?;
        let generated_at = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

        if files.is_empty() {
            info!("No files found in {}", folder.display());
            return Ok(BatchSummary {
                generated_at,
                folder: folder.clone(),
                output_file: None,
                files: Vec::new(),
            });
        }

        info!("Auditing {} files from {}", files.len(), folder.display());

        let mut document = ReportDocument::new();
        let total = files.len();
        let outcomes: Vec<FileOutcome> = files
            .iter()
            .enumerate()
            .map(|(index, path)| self.audit_file(index, total, path, &mut document))
            .collect();

        let output = &self.config.output_excel_filename;
        document.save(output)?;

        let summary = BatchSummary {
            generated_at,
            folder: folder.clone(),
            output_file: Some(output.clone()),
            files: outcomes,
        };
        info!(
            "Batch finished: {} succeeded, {} failed",
            summary.succeeded(),
            summary.failed()
        );
        Ok(summary)
    }

    /// Candidate files of the configured folder, sorted by file name.
    ///
    /// Only regular files directly inside the folder are considered. The
    /// report itself is skipped when it is written into the same folder.
    pub fn discover_files(&self) -> Result<Vec<PathBuf>> {
        let folder = &self.config.folder_path;
        if !folder.is_dir() {
            return Err(AuditError::InvalidFolder(folder.clone()));
        }

        let output = std::fs::canonicalize(&self.config.output_excel_filename).ok();

        let mut files = Vec::new();
        for entry in std::fs::read_dir(folder)
            .context(format!("Reading folder '{}'", folder.display()))?
        {
            let path = entry
                .context(format!("Reading folder '{}'", folder.display()))?
                .path();
            if !path.is_file() || !self.config.matches_extension(&path) {
                continue;
            }
            if output.is_some() && std::fs::canonicalize(&path).ok() == output {
                debug!("Skipping report file {}", path.display());
                continue;
            }
            files.push(path);
        }

        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(files)
    }

    /// Run the configured checks on one dataset.
    pub fn check_dataset(&self, dataset: &Dataset) -> Result<DatasetChecks> {
        let duplicates = if self.config.checks_duplicates() {
            Some(DuplicateChecker::check(
                dataset,
                &self.config.duplicate_column_prefixes,
            )?)
        } else {
            None
        };

        let numeric = if self.config.checks_numeric() {
            Some(NumericChecker::check(
                dataset,
                &self.config.numeric_column_prefixes,
            )?)
        } else {
            None
        };

        Ok(DatasetChecks {
            rows: dataset.height(),
            columns: dataset.width(),
            is_empty: dataset.is_empty(),
            nulls: NullChecker::check(dataset)?,
            duplicates,
            numeric,
        })
    }

    /// Audit one file and add its sheet to `document`.
    ///
    /// Never fails: errors are logged and recorded in the outcome.
    pub fn audit_file(
        &self,
        index: usize,
        total: usize,
        path: &Path,
        document: &mut ReportDocument,
    ) -> FileOutcome {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_name.clone());

        let mut stage = FileStage::Loading;
        let result = (|| -> Result<(String, FileFindings)> {
            self.emit(stage, &file_name, index, total, format!("Loading {}", file_name));
            let dataset = DatasetLoader::load(path)?;
            info!(
                "Loaded {} ({} rows x {} columns)",
                file_name,
                dataset.height(),
                dataset.width()
            );

            stage = FileStage::Checking;
            self.emit(stage, &file_name, index, total, format!("Checking {}", file_name));
            let checks = self
                .check_dataset(&dataset)
                .map_err(|e| AuditError::processing(&file_name, e))?;

            stage = FileStage::WritingSheet;
            self.emit(stage, &file_name, index, total, format!("Writing sheet for {}", file_name));
            let buffer = checks.write_sheet(&file_name);
            let sheet_name = document
                .add_sheet(&stem, buffer)
                .map_err(|e| AuditError::processing(&file_name, e))?;

            Ok((sheet_name, checks.findings()))
        })();

        match result {
            Ok((sheet_name, findings)) => {
                info!("Audited {} into sheet '{}'", file_name, sheet_name);
                self.emit(
                    FileStage::Done,
                    &file_name,
                    index,
                    total,
                    format!("Audited {}", file_name),
                );
                FileOutcome {
                    file_name,
                    status: FileStatus::Done,
                    failed_stage: None,
                    sheet_name: Some(sheet_name),
                    findings: Some(findings),
                    error: None,
                }
            }
            Err(e) => {
                if e.is_recoverable() {
                    warn!("Skipping {} ({}): {}", file_name, stage.display_name(), e);
                } else {
                    error!("Skipping {} ({}): {}", file_name, stage.display_name(), e);
                }
                self.emit(FileStage::Failed, &file_name, index, total, e.to_string());
                FileOutcome {
                    file_name,
                    status: FileStatus::Failed,
                    failed_stage: Some(stage),
                    sheet_name: None,
                    findings: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    fn emit(&self, stage: FileStage, file_name: &str, index: usize, total: usize, message: String) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(AuditEvent::new(stage, file_name, index, total, message));
        }
    }
}

/// Builder for [`Auditor`].
#[derive(Default)]
pub struct AuditorBuilder {
    config: Option<AuditConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

impl AuditorBuilder {
    /// Set the audit configuration (required).
    pub fn config(mut self, config: AuditConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter for receiving per-file events.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(AuditEvent) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the auditor.
    ///
    /// Returns an error if the configuration is missing or invalid.
    pub fn build(self) -> std::result::Result<Auditor, ConfigValidationError> {
        let config = self
            .config
            .ok_or(ConfigValidationError::MissingField("config"))?;
        config.validate()?;

        Ok(Auditor {
            config,
            progress_reporter: self.progress_reporter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::fixtures::people;
    use crate::reporting::{EMPTY_DATASET_NOTICE, MAX_SHEET_COLS};
    use crate::types::CellValue;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    fn auditor_for(folder: &Path) -> Auditor {
        let config = AuditConfig::builder()
            .folder_path(folder)
            .output_excel_filename(folder.join("audit.xlsx"))
            .duplicate_prefix("ID")
            .numeric_prefix("Score")
            .extensions(["xlsx", "csv"])
            .build()
            .unwrap();
        Auditor::builder().config(config).build().unwrap()
    }

    #[test]
    fn test_builder_requires_config() {
        assert!(matches!(
            Auditor::builder().build(),
            Err(ConfigValidationError::MissingField("config"))
        ));
    }

    #[test]
    fn test_check_dataset_runs_configured_checks() {
        let dir = TempDir::new().unwrap();
        let checks = auditor_for(dir.path()).check_dataset(&people()).unwrap();

        assert_eq!(
            checks.findings(),
            FileFindings {
                rows: 3,
                columns: 3,
                rows_with_nulls: 1,
                duplicate_rows: Some(2),
                non_numeric_rows: Some(2),
            }
        );
    }

    #[test]
    fn test_disabled_checks_are_none() {
        let dir = TempDir::new().unwrap();
        let config = AuditConfig::builder()
            .folder_path(dir.path())
            .output_excel_filename("out.xlsx")
            .build()
            .unwrap();
        let auditor = Auditor::builder().config(config).build().unwrap();

        let checks = auditor.check_dataset(&people()).unwrap();
        assert!(checks.duplicates.is_none());
        assert!(checks.numeric.is_none());
        assert_eq!(checks.findings().duplicate_rows, None);
    }

    #[test]
    fn test_empty_dataset_sheet_has_one_notice_per_section() {
        let dir = TempDir::new().unwrap();
        let checks = auditor_for(dir.path())
            .check_dataset(&Dataset::empty())
            .unwrap();

        let buffer = checks.write_sheet("empty.xlsx");
        assert_eq!(
            buffer.rows().to_vec(),
            vec![vec![CellValue::text(EMPTY_DATASET_NOTICE)]; 3]
        );
        assert!(buffer.column_widths().is_empty());
    }

    #[test]
    fn test_discover_files_filters_and_sorts() {
        let dir = TempDir::new().unwrap();
        for name in ["b.csv", "a.xlsx", "C.XLSX", "notes.txt"] {
            fs::write(dir.path().join(name), "x").unwrap();
        }
        fs::create_dir(dir.path().join("nested.xlsx")).unwrap();
        // a previous report in the scanned folder is not an input
        fs::write(dir.path().join("audit.xlsx"), "x").unwrap();

        let files = auditor_for(dir.path()).discover_files().unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["C.XLSX", "a.xlsx", "b.csv"]);
    }

    #[test]
    fn test_missing_folder_is_config_error() {
        let dir = TempDir::new().unwrap();
        let err = auditor_for(&dir.path().join("missing")).run().unwrap_err();
        assert_eq!(err.error_code(), "INVALID_FOLDER");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_empty_folder_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let auditor = auditor_for(dir.path());

        let summary = auditor.run().unwrap();
        assert!(summary.no_files_found());
        assert_eq!(summary.output_file, None);
        assert!(!dir.path().join("audit.xlsx").exists());
    }

    #[test]
    fn test_failed_file_reports_stage_and_continues() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("broken.xlsx"), "not a workbook").unwrap();
        fs::write(
            dir.path().join("people.csv"),
            "ID,Name,Score\n1,Alice,10\n2,bob,\n2,BOB,x\n",
        )
        .unwrap();

        let events = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&events);
        let config = auditor_for(dir.path()).config().clone();
        let auditor = Auditor::builder()
            .config(config)
            .on_progress(move |event| {
                seen.lock().unwrap().push((event.file_name, event.stage));
            })
            .build()
            .unwrap();

        let summary = auditor.run().unwrap();
        assert_eq!(summary.succeeded(), 1);
        assert_eq!(summary.failed(), 1);

        let broken = &summary.files[0];
        assert_eq!(broken.file_name, "broken.xlsx");
        assert_eq!(broken.failed_stage, Some(FileStage::Loading));
        assert!(broken.sheet_name.is_none());

        let people = &summary.files[1];
        assert_eq!(people.sheet_name.as_deref(), Some("people"));
        assert_eq!(people.findings.as_ref().map(|f| f.rows_with_nulls), Some(1));
        assert!(dir.path().join("audit.xlsx").exists());

        let stages: Vec<FileStage> = events
            .lock()
            .unwrap()
            .iter()
            .filter(|(name, _)| name == "people.csv")
            .map(|(_, stage)| *stage)
            .collect();
        assert_eq!(
            stages,
            vec![
                FileStage::Loading,
                FileStage::Checking,
                FileStage::WritingSheet,
                FileStage::Done
            ]
        );
    }

    #[test]
    fn test_unwritable_sheet_fails_at_writing_stage() {
        let dir = TempDir::new().unwrap();
        // the rows-with-nulls table of this file is wider than a worksheet
        let width = MAX_SHEET_COLS + 10;
        let header: Vec<String> = (0..width).map(|i| format!("c{}", i)).collect();
        let body = format!("1{}", ",".repeat(width - 1));
        fs::write(
            dir.path().join("a_wide.csv"),
            format!("{}\n{}\n", header.join(","), body),
        )
        .unwrap();
        fs::write(
            dir.path().join("people.csv"),
            "ID,Name,Score\n1,Alice,10\n2,bob,\n",
        )
        .unwrap();

        let summary = auditor_for(dir.path()).run().unwrap();
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.succeeded(), 1);

        let wide = &summary.files[0];
        assert_eq!(wide.file_name, "a_wide.csv");
        assert_eq!(wide.status, FileStatus::Failed);
        assert_eq!(wide.failed_stage, Some(FileStage::WritingSheet));
        assert!(wide.sheet_name.is_none());
        assert!(wide.error.as_deref().unwrap_or("").contains("a_wide.csv"));

        assert_eq!(summary.files[1].sheet_name.as_deref(), Some("people"));
        assert!(dir.path().join("audit.xlsx").exists());
    }
}
