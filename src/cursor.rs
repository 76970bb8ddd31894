//! Sorted cursor contract consumed by row references.
//!
//! A merge driver owns one cursor per input stream. Row references only need
//! the cursor's current row, its sort-key columns and the stream it belongs
//! to; [`SortCursor`] is exactly that surface. [`BatchCursor`] is the plain
//! implementation over Arrow record batches.

use std::sync::atomic::{AtomicU64, Ordering};

use arrow::array::{ArrayRef, RecordBatch};

use crate::{error::RowRefError, observability::log_trace};

static NEXT_CURSOR_ID: AtomicU64 = AtomicU64::new(0);

/// Identity of a cursor instance.
///
/// Merge policies compare it against the cursor at the head of their queue
/// to tell whether a retained row came from that cursor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CursorId(u64);

impl CursorId {
    /// Mint an id distinct from every other id handed out by this process.
    pub fn next() -> Self {
        CursorId(NEXT_CURSOR_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Position of a sorted cursor over one input stream.
pub trait SortCursor {
    /// Row index inside the current batch.
    fn row(&self) -> usize;

    /// Sort-key columns of the current batch, in sort-key order.
    fn sort_columns(&self) -> &[ArrayRef];

    /// Every column of the current batch.
    fn all_columns(&self) -> &[ArrayRef];

    /// Input stream this cursor reads from.
    fn source_index(&self) -> usize;

    /// Identity of this cursor.
    fn cursor_id(&self) -> CursorId;
}

/// Cursor over the rows of one record batch at a time.
///
/// The cursor keeps its own handle to the batch (an `Arc` clone of the
/// columns), so callers are free to move the batch itself into a
/// [`crate::BatchPool`]. Column buffers are reused across
/// [`BatchCursor::reset`] calls.
#[derive(Debug)]
pub struct BatchCursor {
    id: CursorId,
    source_index: usize,
    sort_key: Vec<usize>,
    batch: Option<RecordBatch>,
    all_columns: Vec<ArrayRef>,
    sort_columns: Vec<ArrayRef>,
    num_rows: usize,
    pos: usize,
}

impl BatchCursor {
    /// Create a cursor positioned on the first row of `batch`.
    ///
    /// An empty batch is accepted and leaves the cursor finished.
    ///
    /// # Errors
    /// Returns [`RowRefError::EmptySortKey`] when `sort_key` is empty and
    /// [`RowRefError::SortColumnOutOfRange`] when it names a column `batch`
    /// does not have.
    pub fn new(
        source_index: usize,
        batch: &RecordBatch,
        sort_key: Vec<usize>,
    ) -> Result<Self, RowRefError> {
        let mut cursor = Self::empty(source_index, sort_key)?;
        cursor.reset(batch)?;
        Ok(cursor)
    }

    /// Create a finished cursor for `source_index` that holds no batch; call
    /// [`reset`](Self::reset) to point it at one.
    ///
    /// # Errors
    /// Returns [`RowRefError::EmptySortKey`] when `sort_key` is empty.
    pub fn empty(source_index: usize, sort_key: Vec<usize>) -> Result<Self, RowRefError> {
        if sort_key.is_empty() {
            return Err(RowRefError::EmptySortKey);
        }
        let width = sort_key.len();
        Ok(Self {
            id: CursorId::next(),
            source_index,
            sort_key,
            batch: None,
            all_columns: Vec::new(),
            sort_columns: Vec::with_capacity(width),
            num_rows: 0,
            pos: 0,
        })
    }

    /// Point the cursor at the first row of the stream's next batch.
    ///
    /// # Errors
    /// Returns [`RowRefError::SortColumnOutOfRange`] when the sort key names a
    /// column `batch` does not have; the cursor is left finished and holds no
    /// batch.
    pub fn reset(&mut self, batch: &RecordBatch) -> Result<(), RowRefError> {
        self.batch = None;
        self.all_columns.clear();
        self.sort_columns.clear();
        self.num_rows = 0;
        self.pos = 0;

        project_sort_columns(&mut self.sort_columns, batch, &self.sort_key)?;
        self.all_columns.extend(batch.columns().iter().cloned());
        self.num_rows = batch.num_rows();
        self.batch = Some(batch.clone());
        log_trace!(
            component = "cursor",
            event = "cursor_reset",
            source = self.source_index,
            rows = self.num_rows,
        );
        Ok(())
    }

    /// The batch the cursor is walking, if any.
    pub fn batch(&self) -> Option<&RecordBatch> {
        self.batch.as_ref()
    }

    /// Hand the cursor's batch to the caller, typically to move it into a
    /// [`crate::BatchPool`].
    ///
    /// The cursor keeps its position and column handles, so rows stay
    /// addressable until the next [`reset`](Self::reset).
    pub fn take_batch(&mut self) -> Option<RecordBatch> {
        self.batch.take()
    }

    /// Move to the next row.
    pub fn advance(&mut self) {
        debug_assert!(!self.is_finished(), "advanced a finished cursor");
        self.pos += 1;
    }

    /// Whether every row of the current batch has been consumed.
    pub fn is_finished(&self) -> bool {
        self.pos >= self.num_rows
    }

    /// Whether the cursor sits on the last row of its batch.
    pub fn is_last(&self) -> bool {
        self.pos + 1 == self.num_rows
    }

    /// Number of rows in the current batch.
    pub fn rows(&self) -> usize {
        self.num_rows
    }

    /// Column indices forming the sort key.
    pub fn sort_key(&self) -> &[usize] {
        &self.sort_key
    }
}

impl SortCursor for BatchCursor {
    fn row(&self) -> usize {
        self.pos
    }

    fn sort_columns(&self) -> &[ArrayRef] {
        &self.sort_columns
    }

    fn all_columns(&self) -> &[ArrayRef] {
        &self.all_columns
    }

    fn source_index(&self) -> usize {
        self.source_index
    }

    fn cursor_id(&self) -> CursorId {
        self.id
    }
}

/// Append the sort-key columns of `batch` to `dst`.
///
/// `dst` keeps its capacity between calls, so projecting a batch of the same
/// width does not allocate.
pub(crate) fn project_sort_columns(
    dst: &mut Vec<ArrayRef>,
    batch: &RecordBatch,
    sort_key: &[usize],
) -> Result<(), RowRefError> {
    let num_columns = batch.num_columns();
    if let Some(&index) = sort_key.iter().find(|&&index| index >= num_columns) {
        return Err(RowRefError::SortColumnOutOfRange { index, num_columns });
    }
    dst.extend(sort_key.iter().map(|&index| batch.column(index).clone()));
    Ok(())
}
