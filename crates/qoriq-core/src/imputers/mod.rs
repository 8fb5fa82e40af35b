//! Imputation module for filling missing values.
//!
//! Numeric columns are filled with their median; every other column is
//! filled with the empty string.

mod statistical;

pub use statistical::StatisticalImputer;
