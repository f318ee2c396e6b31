//! Tokio-backed deferred scheduling.
//!
//! [`TokioScheduler`] runs each notification task on a freshly spawned Tokio
//! task that first yields (or sleeps for the configured delay), so it runs
//! after the dispatching code and after tasks that were already woken.
//!
//! On a current-thread runtime this gives the "next turn of the event loop"
//! ordering the store relies on for coalescing. On a multi-thread runtime the
//! task may run in parallel with further dispatches; state stays consistent
//! but several passes may be delivered for one burst.

use aredux_core::error::StoreError;
use aredux_core::scheduler::{Scheduler, Task};
use std::time::Duration;
use tokio::runtime::Handle;

/// Scheduler that defers tasks onto a Tokio runtime
///
/// # Example
///
/// ```no_run
/// use aredux_runtime::TokioScheduler;
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), aredux_core::StoreError> {
/// let scheduler = TokioScheduler::current()?.with_delay(Duration::from_millis(5));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: Handle,
    delay: Duration,
}

impl TokioScheduler {
    /// Create a scheduler bound to the given runtime handle
    #[must_use]
    pub const fn new(handle: Handle) -> Self {
        Self {
            handle,
            delay: Duration::ZERO,
        }
    }

    /// Create a scheduler bound to the runtime of the calling context
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Configuration`] when called outside a Tokio runtime.
    pub fn current() -> Result<Self, StoreError> {
        Handle::try_current().map(Self::new).map_err(|error| {
            StoreError::Configuration(format!(
                "no Tokio runtime available for deferred notifications: {error}"
            ))
        })
    }

    /// Wait `delay` before running each task instead of the next idle turn
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Configured delay (zero means "next idle turn")
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, task: Task) {
        let delay = self.delay;
        // Detached: the store tracks pending work with its dirty flag
        drop(self.handle.spawn(async move {
            if delay.is_zero() {
                tokio::task::yield_now().await;
            } else {
                tokio::time::sleep(delay).await;
            }
            task();
        }));
    }
}
