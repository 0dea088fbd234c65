use crate::dataset::Dataset;
use crate::error::Result;
use crate::types::{ColumnNullCount, NullReport};
use tracing::debug;

/// Counts absent cells per column and lists the rows holding any.
pub struct NullChecker;

impl NullChecker {
    pub fn check(dataset: &Dataset) -> Result<NullReport> {
        let headers = dataset.column_names();
        let df = dataset.dataframe();

        let mut null_counts = Vec::with_capacity(headers.len());
        let mut row_has_null = vec![false; dataset.height()];

        for column in df.get_columns() {
            let count = column.null_count();
            null_counts.push(ColumnNullCount {
                column: column.name().to_string(),
                null_count: count,
            });

            if count == 0 {
                continue;
            }
            debug!("Column '{}' has {} null values", column.name(), count);

            let mask = column.as_materialized_series().is_null();
            for (idx, flag) in row_has_null.iter_mut().enumerate() {
                if mask.get(idx).unwrap_or(false) {
                    *flag = true;
                }
            }
        }

        let flagged: Vec<usize> = row_has_null
            .iter()
            .enumerate()
            .filter_map(|(idx, &has_null)| has_null.then_some(idx))
            .collect();

        Ok(NullReport {
            headers,
            null_counts,
            rows: dataset.rows(&flagged)?,
        })
    }
}
