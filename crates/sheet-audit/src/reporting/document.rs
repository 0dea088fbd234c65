use super::sink::SheetBuffer;
use crate::error::{AuditError, Result, ResultExt};
use crate::utils::{SHEET_NAME_MAX_LEN, sanitize_sheet_name, truncate_chars};
use rust_xlsxwriter::{Workbook, Worksheet};
use std::path::Path;
use tracing::{debug, info};

/// One named sheet of the report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSheet {
    pub name: String,
    pub buffer: SheetBuffer,
}

/// The output workbook: sheets in insertion order, written once by
/// [`save`](Self::save).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportDocument {
    sheets: Vec<ReportSheet>,
}

impl ReportDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sheets(&self) -> &[ReportSheet] {
        &self.sheets
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Sheet name derived from `stem` that no existing sheet uses.
    ///
    /// Names compare case-insensitively. A taken name gets a ` (2)`,
    /// ` (3)`, ... suffix, cutting the base so the result stays within
    /// the sheet-name length limit.
    pub fn unique_sheet_name(&self, stem: &str) -> String {
        let base = sanitize_sheet_name(stem);
        if !self.is_taken(&base) {
            return base;
        }

        let mut n = 2usize;
        loop {
            let suffix = format!(" ({})", n);
            let keep = SHEET_NAME_MAX_LEN.saturating_sub(suffix.chars().count());
            let candidate = format!("{}{}", truncate_chars(&base, keep).trim_end(), suffix);
            if !self.is_taken(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Add a finished sheet under a unique name derived from `stem` and
    /// return that name.
    ///
    /// A sheet the workbook could not hold is rejected here, before it takes
    /// a name, so that [`save`](Self::save) only sees writable sheets.
    pub fn add_sheet(&mut self, stem: &str, buffer: SheetBuffer) -> Result<String> {
        buffer.check_bounds()?;
        let name = self.unique_sheet_name(stem);
        Worksheet::new().set_name(&name)?;

        debug!("Adding sheet '{}' ({} rows)", name, buffer.cursor());
        self.sheets.push(ReportSheet {
            name: name.clone(),
            buffer,
        });
        Ok(name)
    }

    /// Render every sheet and write the workbook to `path`, creating missing
    /// parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)
                .context(format!("Creating output directory '{}'", parent.display()))?;
        }

        let mut workbook = Workbook::new();
        for sheet in &self.sheets {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(&sheet.name)?;
            sheet.buffer.render(worksheet)?;
        }

        workbook.save(path).map_err(|e| {
            AuditError::from(e).with_context(format!("Saving report '{}'", path.display()))
        })?;

        info!("Report saved to {} ({} sheets)", path.display(), self.sheets.len());
        Ok(())
    }

    fn is_taken(&self, name: &str) -> bool {
        let lowered = name.to_lowercase();
        self.sheets.iter().any(|s| s.name.to_lowercase() == lowered)
    }
}
