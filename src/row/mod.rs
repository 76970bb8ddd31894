//! References to a single row of a sorted input.
//!
//! Two flavours share one comparison surface:
//! - [`RowRef`] borrows the sort columns of a live cursor and is only valid
//!   until that cursor moves.
//! - [`OwnedRowRef`] pins the batch through a pooled handle, so the row stays
//!   addressable after the cursor advances or drops the batch.
//!
//! Both start empty, become bound, and go back to empty on `clear`. Comparing
//! an empty reference is a bug in the caller and panics.
mod owned;
mod view;

use arrow::array::ArrayRef;
pub use owned::OwnedRowRef;
pub use view::RowRef;

use crate::compare::{check_equals, first_non_equal};

/// A row addressed by its sort-key columns and row index.
pub trait SortRow {
    /// Sort-key columns holding the row.
    ///
    /// # Panics
    /// Panics if the reference is empty.
    fn sort_columns(&self) -> &[ArrayRef];

    /// Row index inside [`sort_columns`](Self::sort_columns).
    fn row_num(&self) -> usize;

    /// Whether both rows hold equal values in every sort-key column.
    fn equal_sort_key<O>(&self, other: &O) -> bool
    where
        O: SortRow + ?Sized,
    {
        check_equals(
            self.sort_columns(),
            self.row_num(),
            other.sort_columns(),
            other.row_num(),
        )
    }

    /// First sort-key column at or after `offset` where the rows differ, or
    /// the sort-key width when they agree from `offset` on.
    fn first_differing_sort_column<O>(&self, offset: usize, other: &O) -> usize
    where
        O: SortRow + ?Sized,
    {
        first_non_equal(
            offset,
            self.sort_columns(),
            self.row_num(),
            other.sort_columns(),
            other.row_num(),
        )
    }
}
