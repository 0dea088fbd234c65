//! Progress reporting for batch runs.
//!
//! Every file moves through `Loading → Checking → WritingSheet → Done`, or
//! stops at `Failed`. One [`AuditEvent`] is emitted per transition.
//!
//! # Example
//!
//! ```rust,ignore
//! use sheet_audit::{AuditConfig, Auditor};
//!
//! let summary = Auditor::builder()
//!     .config(config)
//!     .on_progress(|event| {
//!         println!("[{:.0}%] {}", event.progress * 100.0, event.message);
//!     })
//!     .build()?
//!     .run()?;
//! ```

use serde::{Deserialize, Serialize};

/// Stages a single input file goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStage {
    /// Reading the file into a dataset
    Loading,
    /// Running the configured checks
    Checking,
    /// Laying out the report sheet
    WritingSheet,
    /// Sheet added to the report
    Done,
    /// The file was skipped after an error
    Failed,
}

impl FileStage {
    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Loading => "Loading",
            Self::Checking => "Checking",
            Self::WritingSheet => "Writing Sheet",
            Self::Done => "Done",
            Self::Failed => "Failed",
        }
    }

    /// Share of one file's work finished when this stage starts.
    pub fn fraction(&self) -> f32 {
        match self {
            Self::Loading => 0.0,
            Self::Checking => 0.4,
            Self::WritingSheet => 0.7,
            Self::Done | Self::Failed => 1.0,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

/// One file changing stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub stage: FileStage,
    pub file_name: String,

    /// Zero-based position of the file in the batch
    pub file_index: usize,

    pub total_files: usize,

    /// Overall batch progress (0.0 - 1.0)
    pub progress: f32,

    pub message: String,
}

impl AuditEvent {
    pub fn new(
        stage: FileStage,
        file_name: impl Into<String>,
        file_index: usize,
        total_files: usize,
        message: impl Into<String>,
    ) -> Self {
        let progress = if total_files > 0 {
            (file_index as f32 + stage.fraction()) / total_files as f32
        } else {
            1.0
        };
        Self {
            stage,
            file_name: file_name.into(),
            file_index,
            total_files,
            progress: progress.clamp(0.0, 1.0),
            message: message.into(),
        }
    }
}

/// Trait for receiving progress updates during a batch run.
///
/// # Example
///
/// ```rust,ignore
/// use sheet_audit::{AuditEvent, ProgressReporter};
///
/// struct StderrReporter;
///
/// impl ProgressReporter for StderrReporter {
///     fn report(&self, event: AuditEvent) {
///         eprintln!("{}: {}", event.stage.display_name(), event.file_name);
///     }
/// }
/// ```
pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: AuditEvent);
}

/// Wrapper that implements [`ProgressReporter`] using a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(AuditEvent) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(AuditEvent) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(AuditEvent) + Send + Sync,
{
    fn report(&self, event: AuditEvent) {
        (self.callback)(event);
    }
}

static_assertions::assert_impl_all!(AuditEvent: Send, Sync);
