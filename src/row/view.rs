use std::fmt;

use arrow::array::ArrayRef;

use super::SortRow;
use crate::cursor::SortCursor;

/// Borrowed reference to a row in a cursor's current batch.
///
/// The lifetime ties the reference to whatever owns the sort columns,
/// usually the cursor, so the cursor cannot advance while the reference is
/// alive. Binding never allocates.
#[derive(Clone, Copy, Default)]
pub struct RowRef<'a> {
    sort_columns: Option<&'a [ArrayRef]>,
    row_num: usize,
    source_stream_index: usize,
}

impl<'a> RowRef<'a> {
    /// Reference row `row_num` of `sort_columns`, read from stream
    /// `source_stream_index`.
    pub fn new(sort_columns: &'a [ArrayRef], row_num: usize, source_stream_index: usize) -> Self {
        Self {
            sort_columns: Some(sort_columns),
            row_num,
            source_stream_index,
        }
    }

    /// Reference the current row of `cursor`.
    pub fn from_cursor<C>(cursor: &'a C) -> Self
    where
        C: SortCursor + ?Sized,
    {
        Self::new(cursor.sort_columns(), cursor.row(), cursor.source_index())
    }

    /// Rebind to the current row of `cursor`.
    pub fn bind<C>(&mut self, cursor: &'a C)
    where
        C: SortCursor + ?Sized,
    {
        *self = Self::from_cursor(cursor);
    }

    /// Whether the reference points at no row.
    pub fn is_empty(&self) -> bool {
        self.sort_columns.is_none()
    }

    /// Forget the referenced row.
    pub fn clear(&mut self) {
        self.sort_columns = None;
    }

    /// Number of sort-key columns, zero when empty.
    pub fn num_columns(&self) -> usize {
        self.sort_columns.map_or(0, <[ArrayRef]>::len)
    }

    /// Stream the row was read from.
    pub fn source_stream_index(&self) -> usize {
        self.source_stream_index
    }
}

impl SortRow for RowRef<'_> {
    fn sort_columns(&self) -> &[ArrayRef] {
        self.sort_columns.expect("compared an empty row reference")
    }

    fn row_num(&self) -> usize {
        self.row_num
    }
}

impl fmt::Debug for RowRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowRef")
            .field("num_columns", &self.num_columns())
            .field("row_num", &self.row_num)
            .field("source_stream_index", &self.source_stream_index)
            .finish()
    }
}
