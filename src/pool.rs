//! Fixed-capacity pool of batches retained past their cursor.
//!
//! A merge that needs lookback (collapsing, replacing, deduplicating) has to
//! keep a batch alive after the cursor that produced it moves on. The pool
//! holds those batches in slots allocated once at construction; handles
//! ([`SharedBatchRef`]) count how many row references still point into a
//! slot and hand it back to the free stack when the last one goes away.
//!
//! Everything here is single-threaded. Reference counts are plain `Cell`s and
//! the pool is `!Sync`, so handles cannot leave the thread that owns the pool.
//! Handles borrow the pool, so the pool cannot be dropped while any of them
//! is alive.

use std::{
    cell::{Cell, RefCell, RefMut, UnsafeCell},
    fmt,
    ops::Deref,
};

use arrow::array::{ArrayRef, RecordBatch, UInt64Array, UInt64Builder};

use crate::{
    cursor::project_sort_columns,
    error::RowRefError,
    observability::{log_debug, log_error, log_trace},
    option::{PoolOption, ReleasePolicy},
};

/// A batch retained by the pool, with its sort-key columns resolved once at
/// allocation time.
#[derive(Default)]
pub struct SharedBatch {
    batch: Option<RecordBatch>,
    sort_columns: Vec<ArrayRef>,
    /// Row selection built by merges that only emit the final row per key.
    final_selection: RefCell<Option<UInt64Builder>>,
}

impl SharedBatch {
    /// The retained batch.
    ///
    /// # Panics
    /// Panics if called on a slot that holds no batch, which cannot happen
    /// through a live [`SharedBatchRef`].
    pub fn batch(&self) -> &RecordBatch {
        self.batch.as_ref().expect("held slot always carries a batch")
    }

    /// Every column of the retained batch.
    pub fn all_columns(&self) -> &[ArrayRef] {
        match &self.batch {
            Some(batch) => batch.columns(),
            None => &[],
        }
    }

    /// Sort-key columns of the retained batch, in sort-key order.
    pub fn sort_columns(&self) -> &[ArrayRef] {
        &self.sort_columns
    }

    /// Number of rows in the retained batch.
    pub fn num_rows(&self) -> usize {
        self.batch.as_ref().map_or(0, RecordBatch::num_rows)
    }

    /// Mutable access to the final-row selection, created on first use.
    ///
    /// # Panics
    /// Panics if the selection is already borrowed.
    pub fn final_selection(&self) -> RefMut<'_, UInt64Builder> {
        RefMut::map(self.final_selection.borrow_mut(), |selection| {
            selection.get_or_insert_with(UInt64Builder::new)
        })
    }

    /// Whether a final-row selection has been started for this batch.
    pub fn has_final_selection(&self) -> bool {
        self.final_selection.borrow().is_some()
    }

    /// Finish and remove the final-row selection, if any.
    pub fn take_final_selection(&self) -> Option<UInt64Array> {
        self.final_selection
            .borrow_mut()
            .take()
            .map(|mut builder| builder.finish())
    }

    fn fill(&mut self, batch: RecordBatch, sort_key: &[usize]) -> Result<(), RowRefError> {
        self.sort_columns.clear();
        project_sort_columns(&mut self.sort_columns, &batch, sort_key)?;
        self.batch = Some(batch);
        *self.final_selection.get_mut() = None;
        Ok(())
    }

    fn clear(&mut self) {
        self.batch = None;
        // Keeps capacity for the next batch of the same width.
        self.sort_columns.clear();
        *self.final_selection.get_mut() = None;
    }
}

impl fmt::Debug for SharedBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedBatch")
            .field("num_rows", &self.num_rows())
            .field("num_columns", &self.all_columns().len())
            .field("sort_columns", &self.sort_columns.len())
            .finish()
    }
}

struct Slot {
    ref_count: Cell<usize>,
    // Written only while the slot sits on the free stack.
    batch: UnsafeCell<SharedBatch>,
}

impl Slot {
    fn new() -> Self {
        Self {
            ref_count: Cell::new(0),
            batch: UnsafeCell::new(SharedBatch::default()),
        }
    }
}

/// Fixed-capacity arena of [`SharedBatch`] slots.
///
/// The capacity is the worst-case number of batches the calling merge keeps
/// alive at once, usually the number of streams that need lookback plus one
/// for the batch being produced. The pool never grows; running out of slots
/// is a bug in that sizing and panics.
pub struct BatchPool {
    slots: Box<[Slot]>,
    free: RefCell<Vec<usize>>,
    release_policy: ReleasePolicy,
}

impl BatchPool {
    /// Pool with `capacity` slots (at least one) and eager release.
    pub fn new(capacity: usize) -> Self {
        Self::with_option(PoolOption::new(capacity))
    }

    /// Pool configured by `option`.
    pub fn with_option(option: PoolOption) -> Self {
        let capacity = option.capacity.max(1);
        let slots: Box<[Slot]> = (0..capacity).map(|_| Slot::new()).collect();
        // Popped from the back, so slot 0 is handed out first.
        let free = (0..capacity).rev().collect::<Vec<_>>();

        log_debug!(
            component = "pool",
            event = "pool_created",
            capacity,
            release_policy = ?option.release_policy,
        );
        Self {
            slots,
            free: RefCell::new(free),
            release_policy: option.release_policy,
        }
    }

    /// Move `batch` into a free slot and return the first handle to it.
    ///
    /// `sort_key` lists the batch's sort-key column indices in sort order.
    ///
    /// # Panics
    /// Panics if every slot is held, or if `sort_key` names a column the batch
    /// does not have. Both are sizing/wiring bugs in the calling merge.
    pub fn alloc(&self, batch: RecordBatch, sort_key: &[usize]) -> SharedBatchRef<'_> {
        let popped = self.free.borrow_mut().pop();
        let Some(slot_idx) = popped else {
            log_error!(
                component = "pool",
                event = "pool_exhausted",
                capacity = self.slots.len(),
            );
            panic!("batch pool exhausted: all {} slots are held", self.slots.len());
        };
        let slot = &self.slots[slot_idx];
        debug_assert_eq!(slot.ref_count.get(), 0, "free slot still referenced");

        // SAFETY: the slot came off the free stack, so no handle to it exists
        // and nothing borrows its batch.
        let filled = unsafe { (*slot.batch.get()).fill(batch, sort_key) };
        if let Err(err) = filled {
            // The slot never became held; it goes back before unwinding.
            self.free.borrow_mut().push(slot_idx);
            panic!("sort key does not fit the pooled batch: {err}");
        }
        slot.ref_count.set(1);

        log_trace!(component = "pool", event = "slot_allocated", slot = slot_idx);
        SharedBatchRef {
            pool: self,
            slot: slot_idx,
        }
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of slots on the free stack.
    pub fn free_slots(&self) -> usize {
        self.free.borrow().len()
    }

    /// Number of slots held by at least one handle.
    pub fn held_slots(&self) -> usize {
        self.capacity() - self.free_slots()
    }

    /// Whether the next [`alloc`](Self::alloc) will succeed.
    pub fn has_free_slot(&self) -> bool {
        !self.free.borrow().is_empty()
    }

    /// When released slots drop their batch.
    pub fn release_policy(&self) -> ReleasePolicy {
        self.release_policy
    }

    fn release(&self, slot_idx: usize) {
        if self.release_policy == ReleasePolicy::Eager {
            // SAFETY: the last handle to this slot is being dropped, so no
            // borrow of its batch can outlive this call.
            unsafe { (*self.slots[slot_idx].batch.get()).clear() };
        }
        self.free.borrow_mut().push(slot_idx);
        log_trace!(component = "pool", event = "slot_reclaimed", slot = slot_idx);
    }
}

impl fmt::Debug for BatchPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchPool")
            .field("capacity", &self.capacity())
            .field("free_slots", &self.free_slots())
            .field("release_policy", &self.release_policy)
            .finish()
    }
}

impl Drop for BatchPool {
    fn drop(&mut self) {
        let free = self.free.get_mut().len();
        if free != self.slots.len() {
            // Only reachable when handles were leaked with `mem::forget`.
            log_error!(
                component = "pool",
                event = "pool_dropped_with_held_slots",
                held = self.slots.len() - free,
            );
            debug_assert!(
                std::thread::panicking(),
                "batch pool dropped with {} held slots",
                self.slots.len() - free
            );
        }
    }
}

/// Counted handle to a pooled [`SharedBatch`].
///
/// Cloning adds a share; dropping the last share returns the slot to the
/// pool.
pub struct SharedBatchRef<'pool> {
    pool: &'pool BatchPool,
    slot: usize,
}

impl<'pool> SharedBatchRef<'pool> {
    /// Slot index inside the pool.
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Number of live handles to this slot, including `self`.
    pub fn ref_count(&self) -> usize {
        self.pool.slots[self.slot].ref_count.get()
    }

    /// Whether both handles point at the same slot of the same pool.
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        std::ptr::eq(this.pool, other.pool) && this.slot == other.slot
    }
}

impl Deref for SharedBatchRef<'_> {
    type Target = SharedBatch;

    fn deref(&self) -> &SharedBatch {
        // SAFETY: `self` keeps the slot held, and held slots are never written.
        unsafe { &*self.pool.slots[self.slot].batch.get() }
    }
}

impl Clone for SharedBatchRef<'_> {
    fn clone(&self) -> Self {
        let count = &self.pool.slots[self.slot].ref_count;
        count.set(count.get() + 1);
        Self {
            pool: self.pool,
            slot: self.slot,
        }
    }
}

impl Drop for SharedBatchRef<'_> {
    fn drop(&mut self) {
        let count = &self.pool.slots[self.slot].ref_count;
        let remaining = count.get() - 1;
        count.set(remaining);
        if remaining == 0 {
            self.pool.release(self.slot);
        }
    }
}

impl fmt::Debug for SharedBatchRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedBatchRef")
            .field("slot", &self.slot)
            .field("ref_count", &self.ref_count())
            .finish()
    }
}
