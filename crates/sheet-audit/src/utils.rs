//! Shared utilities for the audit pipeline.
//!
//! This module contains common helper functions used across multiple modules
//! to keep value parsing, normalization and naming rules consistent.

use crate::types::CellValue;

// =============================================================================
// Value Utilities
// =============================================================================

/// Text that an absent value takes when values are compared as text.
pub const NULL_TEXT: &str = "none";

/// Try to parse a string as a numeric value (f64).
///
/// Surrounding whitespace is ignored. Integers, decimals, signs, exponents
/// and infinities are accepted; empty strings and `NaN` are not.
///
/// # Example
///
/// ```rust
/// use sheet_audit::utils::parse_numeric_string;
///
/// assert_eq!(parse_numeric_string(" 123.45 "), Some(123.45));
/// assert_eq!(parse_numeric_string("12a"), None);
/// ```
pub fn parse_numeric_string(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Check if a cell holds a value that converts to a number.
pub fn is_numeric_cell(value: &CellValue) -> bool {
    match value {
        CellValue::Null => false,
        CellValue::Bool(_) => true,
        CellValue::Number(n) => !n.is_nan(),
        CellValue::Text(s) => parse_numeric_string(s).is_some(),
    }
}

/// Lowercase text form of a cell, used only for duplicate comparison.
pub fn normalized_text(value: &CellValue) -> String {
    match value {
        CellValue::Null => NULL_TEXT.to_string(),
        other => other.to_string().to_lowercase(),
    }
}

/// Display length of a string in characters.
pub fn text_width(s: &str) -> usize {
    s.chars().count()
}

// =============================================================================
// Naming Utilities
// =============================================================================

/// Maximum length of a worksheet name.
pub const SHEET_NAME_MAX_LEN: usize = 31;

/// Characters not allowed in worksheet names.
pub const SHEET_NAME_ILLEGAL: [char; 7] = ['*', ':', '?', '/', '\\', '[', ']'];

/// Keep at most `max` characters of `s`.
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Make `name` a legal worksheet name.
///
/// Illegal characters become `_`, surrounding whitespace and apostrophes are
/// dropped and the result is cut to [`SHEET_NAME_MAX_LEN`] characters.
pub fn sanitize_sheet_name(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| if SHEET_NAME_ILLEGAL.contains(&c) { '_' } else { c })
        .collect();
    let trimmed = replaced.trim().trim_matches('\'').trim();
    if trimmed.is_empty() {
        return "Sheet".to_string();
    }
    truncate_chars(trimmed, SHEET_NAME_MAX_LEN)
        .trim_end_matches(['\'', ' '])
        .to_string()
}

/// Make header names unique the way spreadsheet readers do: empty headers
/// become `Unnamed: <index>`, repeats get `.1`, `.2`, ... suffixes.
pub fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(headers.len());
    for (idx, header) in headers.into_iter().enumerate() {
        let base = if header.trim().is_empty() {
            format!("Unnamed: {}", idx)
        } else {
            header
        };

        let mut candidate = base.clone();
        let mut suffix = 1;
        while seen.contains(&candidate) {
            candidate = format!("{}.{}", base, suffix);
            suffix += 1;
        }
        seen.push(candidate);
    }
    seen
}

// =============================================================================
// Tests
// =============================================================================
