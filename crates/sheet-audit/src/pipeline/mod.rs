//! Batch orchestration over a folder of input files.

mod auditor;
pub mod progress;

pub use auditor::{Auditor, AuditorBuilder, DatasetChecks};
pub use progress::{AuditEvent, ClosureProgressReporter, FileStage, ProgressReporter};
