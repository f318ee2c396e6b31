//! Metric names and descriptions for the store runtime.
//!
//! The store records through the `metrics` facade; nothing is exported
//! unless the application installs a recorder. Call [`describe_metrics`]
//! once after installing one to attach help text.
//!
//! Every metric carries a `store` label with the store's configured name.

use metrics::{Unit, describe_counter, describe_histogram};

// Re-export metrics macros and the label type for use in other modules
pub use metrics::{SharedString, counter, histogram};

/// Dispatch calls, including rejected ones
pub const DISPATCH_TOTAL: &str = "store_dispatch_total";

/// Dispatch calls rejected as neither action nor sequence
pub const DISPATCH_REJECTED_TOTAL: &str = "store_dispatch_rejected_total";

/// Transitions applied to state
pub const TRANSITIONS_TOTAL: &str = "store_transitions_total";

/// Reducer failures
pub const REDUCER_ERRORS_TOTAL: &str = "store_reducer_errors_total";

/// Action sequences that ended with an error
pub const SEQUENCE_ERRORS_TOTAL: &str = "store_sequence_errors_total";

/// Time spent inside the reducer per transition
pub const REDUCER_DURATION_SECONDS: &str = "store_reducer_duration_seconds";

/// Notification passes that reached observers
pub const NOTIFY_PASSES_TOTAL: &str = "store_notify_passes_total";

/// Notifier firings coalesced into an earlier pass
pub const NOTIFY_SKIPPED_TOTAL: &str = "store_notify_skipped_total";

/// Observers that panicked during a pass
pub const OBSERVER_PANICS_TOTAL: &str = "store_observer_panics_total";

/// Register descriptions for every store metric.
pub fn describe_metrics() {
    describe_counter!(DISPATCH_TOTAL, Unit::Count, "Total number of dispatch calls");
    describe_counter!(
        DISPATCH_REJECTED_TOTAL,
        Unit::Count,
        "Dispatch calls rejected as neither a plain action nor an action sequence"
    );
    describe_counter!(TRANSITIONS_TOTAL, Unit::Count, "Total number of state transitions applied");
    describe_counter!(REDUCER_ERRORS_TOTAL, Unit::Count, "Total number of reducer failures");
    describe_counter!(
        SEQUENCE_ERRORS_TOTAL,
        Unit::Count,
        "Total number of action sequences that failed"
    );
    describe_histogram!(
        REDUCER_DURATION_SECONDS,
        Unit::Seconds,
        "Time taken by the reducer for one transition"
    );
    describe_counter!(
        NOTIFY_PASSES_TOTAL,
        Unit::Count,
        "Notification passes delivered to observers"
    );
    describe_counter!(
        NOTIFY_SKIPPED_TOTAL,
        Unit::Count,
        "Notifier firings with no pending change"
    );
    describe_counter!(
        OBSERVER_PANICS_TOTAL,
        Unit::Count,
        "Observers that panicked during a notification pass"
    );
}
