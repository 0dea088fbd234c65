use crate::dataset::{ColumnSelector, Dataset};
use crate::error::Result;
use crate::types::{ColumnFinding, NumericConformanceReport, PrefixFindings};
use crate::utils::is_numeric_cell;
use tracing::{debug, warn};

/// Finds values in prefix-selected columns that do not convert to numbers.
pub struct NumericChecker;

impl NumericChecker {
    pub fn check(dataset: &Dataset, prefixes: &[String]) -> Result<NumericConformanceReport> {
        let mut selections = Vec::with_capacity(prefixes.len());

        for prefix in prefixes {
            let matched = dataset.select(&ColumnSelector::new(prefix.as_str()));
            if matched.is_empty() {
                warn!("No columns match numeric prefix '{}'", prefix);
            }

            let columns = matched
                .iter()
                .map(|name| Self::check_column(dataset, name))
                .collect::<Result<Vec<_>>>()?;

            selections.push(PrefixFindings {
                prefix: prefix.clone(),
                columns,
            });
        }

        Ok(NumericConformanceReport {
            headers: dataset.column_names(),
            selections,
        })
    }

    /// Rows of `name` whose value is null, empty or not a number.
    pub fn check_column(dataset: &Dataset, name: &str) -> Result<ColumnFinding> {
        let flagged: Vec<usize> = dataset
            .column_values(name)?
            .iter()
            .enumerate()
            .filter_map(|(idx, value)| (!is_numeric_cell(value)).then_some(idx))
            .collect();

        debug!("Column '{}': {} non-numeric rows", name, flagged.len());

        Ok(ColumnFinding {
            column: name.to_string(),
            count: flagged.len(),
            rows: dataset.rows(&flagged)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::fixtures::people;
    use crate::types::{CellValue, PrefixReport};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_flags_null_and_text() {
        let report = NumericChecker::check(&people(), &["Score".to_string()]).unwrap();
        let finding = report.finding("Score").unwrap();

        assert_eq!(finding.count, 2);
        assert_eq!(finding.row_indices(), vec![1, 2]);
    }

    #[test]
    fn test_classification() {
        let ds = Dataset::from_rows(
            vec!["Amount".to_string()],
            vec![
                vec!["123".into()],
                vec!["123.45".into()],
                vec!["-5".into()],
                vec![" 7 ".into()],
                vec!["".into()],
                vec![CellValue::Null],
                vec!["abc".into()],
                vec!["12a".into()],
            ],
        )
        .unwrap();

        let finding = NumericChecker::check_column(&ds, "Amount").unwrap();
        assert_eq!(finding.row_indices(), vec![4, 5, 6, 7]);
    }

    #[test]
    fn test_numeric_column_passes() {
        let report = NumericChecker::check(&people(), &["ID".to_string()]).unwrap();
        assert_eq!(report.flagged_rows(), 0);
        assert!(report.finding("ID").unwrap().rows.is_empty());
    }

    #[test]
    fn test_unmatched_prefix_is_empty_selection() {
        let report = NumericChecker::check(&people(), &["Price".to_string()]).unwrap();
        assert_eq!(report.selections.len(), 1);
        assert!(report.selections[0].columns.is_empty());
    }
}
