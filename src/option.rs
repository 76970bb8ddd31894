/// What happens to a slot's batch when its last handle is released.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReleasePolicy {
    /// Drop the batch, its column handles and the selection buffer as soon as
    /// the slot returns to the free stack.
    #[default]
    Eager,
    /// Keep the released batch in its slot until the next allocation
    /// overwrites it.
    Lazy,
}

/// Sizing and release options for a [`crate::BatchPool`].
#[derive(Debug, Clone)]
pub struct PoolOption {
    pub(crate) capacity: usize,
    pub(crate) release_policy: ReleasePolicy,
}

impl PoolOption {
    /// Options for a pool retaining at most `capacity` batches at once.
    ///
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        PoolOption {
            capacity: capacity.max(1),
            release_policy: ReleasePolicy::default(),
        }
    }

    /// Options for a merge where `streams` inputs may each pin one batch for
    /// lookback, plus the batch currently being produced.
    pub fn for_lookback(streams: usize) -> Self {
        Self::new(streams.saturating_add(1))
    }

    /// Override the slot count.
    pub fn capacity(self, capacity: usize) -> Self {
        PoolOption {
            capacity: capacity.max(1),
            ..self
        }
    }

    /// Choose when released slots drop their batch.
    pub fn release_policy(self, release_policy: ReleasePolicy) -> Self {
        PoolOption {
            release_policy,
            ..self
        }
    }
}

impl Default for PoolOption {
    fn default() -> Self {
        Self::new(1)
    }
}
