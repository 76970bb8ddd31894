use thiserror::Error;

/// Errors raised while wiring a batch into a sorted cursor.
///
/// Pool allocation and row comparison never return errors: their
/// preconditions are contract violations and panic instead.
#[derive(Debug, Error)]
pub enum RowRefError {
    /// A sort key referenced a column the batch does not have.
    #[error("sort key column {index} out of range for batch with {num_columns} columns")]
    SortColumnOutOfRange {
        /// Offending column index.
        index: usize,
        /// Number of columns in the batch.
        num_columns: usize,
    },
    /// The sort key listed no columns.
    #[error("sort key must name at least one column")]
    EmptySortKey,
}
