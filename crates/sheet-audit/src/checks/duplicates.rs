use crate::dataset::{ColumnSelector, Dataset, to_cell_value};
use crate::error::Result;
use crate::types::{ColumnFinding, DuplicateReport, PrefixFindings};
use crate::utils::normalized_text;
use polars::prelude::*;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Finds values repeated within prefix-selected columns.
///
/// Values are compared on their lowercased text form, so `Foo` and `foo`
/// collide, and every row of a repeated group is flagged: `[A, A, A, B]`
/// gives a count of 3.
pub struct DuplicateChecker;

impl DuplicateChecker {
    pub fn check(dataset: &Dataset, prefixes: &[String]) -> Result<DuplicateReport> {
        let mut selections = Vec::with_capacity(prefixes.len());

        for prefix in prefixes {
            let selector = ColumnSelector::new(prefix.as_str());
            let matched = dataset.select(&selector);
            if matched.is_empty() {
                warn!("No columns match duplicate prefix '{}'", prefix);
            }

            let mut columns = Vec::with_capacity(matched.len());
            for name in matched {
                columns.push(Self::check_column(dataset, &name)?);
            }

            selections.push(PrefixFindings {
                prefix: prefix.clone(),
                columns,
            });
        }

        Ok(DuplicateReport {
            headers: dataset.column_names(),
            selections,
        })
    }

    /// Duplicate finding for a single column.
    pub fn check_column(dataset: &Dataset, name: &str) -> Result<ColumnFinding> {
        let normalized = normalize_column(dataset.column(name)?)?;
        let values = normalized.str()?;

        let mut occurrences: HashMap<&str, usize> = HashMap::new();
        for value in values.into_iter().flatten() {
            *occurrences.entry(value).or_insert(0) += 1;
        }

        let flagged: Vec<usize> = values
            .into_iter()
            .enumerate()
            .filter_map(|(idx, value)| {
                let repeated = value
                    .and_then(|v| occurrences.get(v))
                    .is_some_and(|&n| n > 1);
                repeated.then_some(idx)
            })
            .collect();

        debug!("Column '{}': {} duplicate rows", name, flagged.len());

        Ok(ColumnFinding {
            column: name.to_string(),
            count: flagged.len(),
            rows: dataset.rows(&flagged)?,
        })
    }
}

/// Lowercased text form of every value in `column`, as a new series.
///
/// Nulls become the literal `none`, so the result has no nulls.
pub fn normalize_column(column: &Column) -> PolarsResult<Series> {
    let series = column.as_materialized_series();
    let mut normalized = Vec::with_capacity(series.len());
    for idx in 0..series.len() {
        normalized.push(normalized_text(&to_cell_value(series.get(idx)?)));
    }
    Ok(Series::new(column.name().clone(), normalized))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::fixtures::people;
    use crate::types::{CellValue, PrefixReport};
    use pretty_assertions::assert_eq;

    fn single_column(values: Vec<CellValue>) -> Dataset {
        let rows = values.into_iter().map(|v| vec![v]).collect();
        Dataset::from_rows(vec!["Code".to_string()], rows).unwrap()
    }

    fn prefixes(list: &[&str]) -> Vec<String> {
        list.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_counts_every_occurrence() {
        let ds = single_column(vec!["A".into(), "A".into(), "A".into(), "B".into()]);
        let finding = DuplicateChecker::check_column(&ds, "Code").unwrap();

        assert_eq!(finding.count, 3);
        assert_eq!(finding.row_indices(), vec![0, 1, 2]);
    }

    #[test]
    fn test_comparison_is_case_insensitive() {
        let report = DuplicateChecker::check(&people(), &prefixes(&["Name"])).unwrap();
        let finding = report.finding("Name").unwrap();

        assert_eq!(finding.count, 2);
        assert_eq!(finding.row_indices(), vec![1, 2]);
    }

    #[test]
    fn test_numeric_column_duplicates() {
        let report = DuplicateChecker::check(&people(), &prefixes(&["ID"])).unwrap();
        let finding = report.finding("ID").unwrap();

        assert_eq!(finding.row_indices(), vec![1, 2]);
        assert_eq!(
            finding.rows[1].values,
            vec![CellValue::Number(2.0), CellValue::text("BOB"), CellValue::text("x")]
        );
    }

    #[test]
    fn test_nulls_group_together() {
        let ds = single_column(vec![CellValue::Null, "x".into(), CellValue::Null]);
        let finding = DuplicateChecker::check_column(&ds, "Code").unwrap();
        assert_eq!(finding.row_indices(), vec![0, 2]);

        // an absent cell and the text "None" share a normalized value
        let ds = single_column(vec![CellValue::Null, "None".into()]);
        assert_eq!(DuplicateChecker::check_column(&ds, "Code").unwrap().count, 2);
    }

    #[test]
    fn test_no_duplicates() {
        let ds = single_column(vec!["a".into(), "b".into(), "c".into()]);
        let finding = DuplicateChecker::check_column(&ds, "Code").unwrap();
        assert_eq!(finding.count, 0);
        assert!(finding.rows.is_empty());
    }

    #[test]
    fn test_prefixes_in_caller_order_with_empty_selection() {
        let report =
            DuplicateChecker::check(&people(), &prefixes(&["Score", "Missing", "ID"])).unwrap();

        let order: Vec<&str> = report.selections.iter().map(|s| s.prefix.as_str()).collect();
        assert_eq!(order, vec!["Score", "Missing", "ID"]);
        assert!(report.selections[1].columns.is_empty());
        assert_eq!(report.selections[2].matched_columns(), vec!["ID"]);
        assert_eq!(report.flagged_rows(), 2);
    }

    #[test]
    fn test_normalize_column_leaves_dataset_untouched() {
        let ds = people();
        let normalized = normalize_column(ds.column("Name").unwrap()).unwrap();

        let values: Vec<Option<&str>> = normalized.str().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some("alice"), Some("bob"), Some("bob")]);
        assert_eq!(
            ds.column_values("Name").unwrap(),
            vec![CellValue::text("Alice"), CellValue::text("bob"), CellValue::text("BOB")]
        );
    }

    #[test]
    fn test_normalize_numbers_and_nulls() {
        let ds = people();
        let normalized = normalize_column(ds.column("ID").unwrap()).unwrap();
        let values: Vec<Option<&str>> = normalized.str().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some("1"), Some("2"), Some("2")]);

        let normalized = normalize_column(ds.column("Score").unwrap()).unwrap();
        let values: Vec<Option<&str>> = normalized.str().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some("10"), Some("none"), Some("x")]);
    }
}
