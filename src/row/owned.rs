use std::fmt;

use arrow::array::{ArrayRef, RecordBatch};

use super::SortRow;
use crate::{
    cursor::{CursorId, SortCursor},
    pool::SharedBatchRef,
};

/// Reference to a row that keeps its batch alive through a pool handle.
///
/// Used by merges that must remember an earlier row, such as the first row of
/// the current key, after the producing cursor has advanced past it. Rows are
/// never copied; the reference only pins the pooled batch and records where
/// the row sits in it.
#[derive(Default)]
pub struct OwnedRowRef<'pool> {
    owned_batch: Option<SharedBatchRef<'pool>>,
    row_num: usize,
    cursor_id: Option<CursorId>,
    source_stream_index: usize,
}

impl<'pool> OwnedRowRef<'pool> {
    /// Reference the current row of `cursor`, pinning `batch`.
    pub fn from_cursor<C>(cursor: &C, batch: SharedBatchRef<'pool>) -> Self
    where
        C: SortCursor + ?Sized,
    {
        debug_assert_eq!(
            cursor.sort_columns().len(),
            batch.sort_columns().len(),
            "cursor and pooled batch disagree on sort key width"
        );
        debug_assert!(cursor.row() < batch.num_rows(), "cursor row outside pooled batch");
        Self {
            owned_batch: Some(batch),
            row_num: cursor.row(),
            cursor_id: Some(cursor.cursor_id()),
            source_stream_index: cursor.source_index(),
        }
    }

    /// Rebind to the current row of `cursor`, taking over `batch`.
    ///
    /// `batch` must hold the batch the cursor is positioned in. Any handle
    /// held before the call is released.
    pub fn bind<C>(&mut self, cursor: &C, batch: SharedBatchRef<'pool>)
    where
        C: SortCursor + ?Sized,
    {
        *self = Self::from_cursor(cursor, batch);
    }

    /// Release the pinned batch and return to the empty state.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Exchange contents with `other` without touching reference counts.
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }

    /// Whether no batch is pinned.
    pub fn is_empty(&self) -> bool {
        self.owned_batch.is_none()
    }

    /// Handle to the pinned batch.
    pub fn owned_batch(&self) -> Option<&SharedBatchRef<'pool>> {
        self.owned_batch.as_ref()
    }

    /// The pinned batch.
    ///
    /// # Panics
    /// Panics if the reference is empty.
    pub fn batch(&self) -> &RecordBatch {
        self.shared().batch()
    }

    /// Every column of the pinned batch.
    ///
    /// # Panics
    /// Panics if the reference is empty.
    pub fn all_columns(&self) -> &[ArrayRef] {
        self.shared().all_columns()
    }

    /// Cursor the row was bound from.
    pub fn cursor_id(&self) -> Option<CursorId> {
        self.cursor_id
    }

    /// Stream the row was read from.
    pub fn source_stream_index(&self) -> usize {
        self.source_stream_index
    }

    fn shared(&self) -> &SharedBatchRef<'pool> {
        self.owned_batch.as_ref().expect("compared an empty row reference")
    }
}

impl SortRow for OwnedRowRef<'_> {
    fn sort_columns(&self) -> &[ArrayRef] {
        self.shared().sort_columns()
    }

    fn row_num(&self) -> usize {
        self.row_num
    }
}

impl fmt::Debug for OwnedRowRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnedRowRef")
            .field("owned_batch", &self.owned_batch)
            .field("row_num", &self.row_num)
            .field("cursor_id", &self.cursor_id)
            .field("source_stream_index", &self.source_stream_index)
            .finish()
    }
}
