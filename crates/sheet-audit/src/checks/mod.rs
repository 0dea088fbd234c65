//! The three data-quality checks run against each dataset.
//!
//! Each checker is a stateless unit struct that turns a [`Dataset`] into a
//! report type from [`crate::types`]. None of them write anything; laying the
//! findings out on a sheet is the job of [`crate::reporting`].
//!
//! [`Dataset`]: crate::dataset::Dataset

mod duplicates;
mod nulls;
mod numeric;

pub use duplicates::{DuplicateChecker, normalize_column};
pub use nulls::NullChecker;
pub use numeric::NumericChecker;
