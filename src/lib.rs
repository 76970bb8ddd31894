#![deny(missing_docs)]
//! Row references and batch ownership for k-way sorted merges over Arrow
//! record batches.
//!
//! A merge step compares rows from many sorted inputs at once. Copying those
//! rows out of their batches would dominate the merge loop, so this crate
//! lets the merge point at "row N of batch B" instead:
//!
//! - [`RowRef`] borrows the current row of a live [`SortCursor`].
//! - [`OwnedRowRef`] pins the row's batch in a [`BatchPool`], so merges that
//!   look back at an earlier row (collapsing, replacing) can keep it after
//!   the cursor moves on.
//!
//! The pool is sized once per merge and never allocates afterwards. Handles
//! use non-atomic reference counts; everything here is meant for the single
//! thread running one merge pass.

pub mod compare;
mod cursor;
mod error;
mod observability;
mod option;
mod pool;
mod row;

pub use crate::{
    cursor::{BatchCursor, CursorId, SortCursor},
    error::RowRefError,
    option::{PoolOption, ReleasePolicy},
    pool::{BatchPool, SharedBatch, SharedBatchRef},
    row::{OwnedRowRef, RowRef, SortRow},
};
