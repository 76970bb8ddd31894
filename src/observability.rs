//! Structured log events for the row-reference layer.
//!
//! Events go through `tracing` with target "rowref" and always carry an
//! `event` field. The crate never installs a subscriber; embedding engines
//! configure `tracing` themselves.
//!
//! ## Conventions
//!
//! - `event`: snake_case event name (required)
//! - `component`: subsystem (e.g. "pool", "cursor")
//! - Use `%` for Display, `?` for Debug formatting
//! - Per-row paths only log at trace level

/// Target for all row-reference log events.
pub(crate) const ROWREF_TARGET: &str = "rowref";

/// Macro for debug-level log events.
///
/// # Example
/// ```ignore
/// log_debug!(
///     component = "pool",
///     event = "pool_created",
///     capacity = 4,
/// );
/// ```
macro_rules! log_debug {
    ($($field:tt)*) => {
        ::tracing::debug!(target: $crate::observability::ROWREF_TARGET, $($field)*)
    };
}

/// Macro for trace-level log events, used on the allocate/reclaim path.
macro_rules! log_trace {
    ($($field:tt)*) => {
        ::tracing::trace!(target: $crate::observability::ROWREF_TARGET, $($field)*)
    };
}

/// Macro for error-level log events.
macro_rules! log_error {
    ($($field:tt)*) => {
        ::tracing::error!(target: $crate::observability::ROWREF_TARGET, $($field)*)
    };
}

pub(crate) use log_debug;
pub(crate) use log_error;
pub(crate) use log_trace;
