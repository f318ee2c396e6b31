//! # aredux Testing
//!
//! Testing utilities and helpers for aredux stores and reducers.
//!
//! This crate provides:
//! - [`ManualScheduler`]: a deferred-task queue flushed explicitly by the test
//! - [`Recorder`]: an observer that records every state it is handed
//! - [`ReducerTest`]: Given-When-Then assertions for reducers
//! - [`test_store`]: a store wired to a manual scheduler
//!
//! ## Example
//!
//! ```
//! use aredux_core::action::Action;
//! use aredux_core::reducer::reducer_fn;
//! use aredux_testing::{Recorder, test_store};
//!
//! #[derive(Debug, Default)]
//! struct Add(i64);
//!
//! impl Action for Add {}
//!
//! let (store, scheduler) = test_store(reducer_fn(|state: Option<&i64>, action: &Add| {
//!     Ok(state.copied().unwrap_or(0) + action.0)
//! }))
//! .unwrap();
//!
//! let recorder = Recorder::new();
//! let _subscription = store.subscribe(recorder.observer());
//!
//! let _ = store.dispatch(Add(1));
//! let _ = store.dispatch(Add(2));
//! assert_eq!(recorder.count(), 0);
//!
//! scheduler.run_until_idle();
//! assert_eq!(recorder.calls(), vec![3]);
//! ```


pub use helpers::{Recorder, init_test_tracing, test_store};
pub use mocks::ManualScheduler;
pub use reducer_test::ReducerTest;

/// Mock implementations of runtime seams
pub mod mocks {
    use aredux_core::scheduler::{Scheduler, Task};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

    /// Scheduler that queues tasks until the test runs them
    ///
    /// Clones share the queue, so a test can keep one handle while the store
    /// owns another.
    ///
    /// # Example
    ///
    /// ```
    /// use aredux_core::scheduler::Scheduler;
    /// use aredux_testing::mocks::ManualScheduler;
    ///
    /// let scheduler = ManualScheduler::new();
    /// scheduler.schedule(Box::new(|| println!("deferred")));
    ///
    /// assert_eq!(scheduler.pending(), 1);
    /// assert_eq!(scheduler.run_until_idle(), 1);
    /// ```
    #[derive(Clone, Default)]
    pub struct ManualScheduler {
        queue: Arc<Mutex<VecDeque<Task>>>,
    }

    impl ManualScheduler {
        /// Create an empty scheduler
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Number of queued tasks
        #[must_use]
        pub fn pending(&self) -> usize {
            self.lock().len()
        }

        /// Run the oldest queued task, if any
        ///
        /// Returns `false` when the queue was empty.
        pub fn run_next(&self) -> bool {
            // Release the lock before running: tasks may schedule more tasks
            let task = self.lock().pop_front();
            task.is_some_and(|task| {
                task();
                true
            })
        }

        /// Run the tasks queued at the time of the call
        ///
        /// Tasks they schedule stay queued. Returns the number of tasks run.
        pub fn run_pending(&self) -> usize {
            let queued = self.pending();
            (0..queued).take_while(|_| self.run_next()).count()
        }

        /// Run tasks until the queue is empty
        ///
        /// Returns the number of tasks run.
        pub fn run_until_idle(&self) -> usize {
            let mut ran = 0;
            while self.run_next() {
                ran += 1;
            }
            ran
        }

        fn lock(&self) -> MutexGuard<'_, VecDeque<Task>> {
            self.queue.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    impl Scheduler for ManualScheduler {
        fn schedule(&self, task: Task) {
            self.lock().push_back(task);
        }
    }

    impl std::fmt::Debug for ManualScheduler {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("ManualScheduler")
                .field("pending", &self.pending())
                .finish()
        }
    }
}

/// Test helpers and utilities
pub mod helpers {
    use crate::mocks::ManualScheduler;
    use aredux_core::error::StoreError;
    use aredux_core::reducer::Reducer;
    use aredux_runtime::Store;
    use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

    /// Create a store backed by a [`ManualScheduler`]
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Reducer`] if the initial reducer call fails.
    pub fn test_store<S, A, R>(reducer: R) -> Result<(Store<S, A, R>, ManualScheduler), StoreError>
    where
        R: Reducer<State = S, Action = A> + Send + Sync + 'static,
        S: Send + Sync + 'static,
        A: Default + Send + 'static,
    {
        let scheduler = ManualScheduler::new();
        let store = Store::new(reducer, scheduler.clone())?;
        Ok((store, scheduler))
    }

    /// Install a tracing subscriber that writes through the test harness
    ///
    /// Honors `RUST_LOG`; defaults to `debug` for the aredux crates. Safe to
    /// call from every test, only the first call installs.
    pub fn init_test_tracing() {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("aredux_runtime=debug,aredux_core=debug"));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    }

    /// Observer that records a copy of every state it receives
    ///
    /// Clones share the recorded calls.
    pub struct Recorder<S> {
        calls: Arc<Mutex<Vec<S>>>,
    }

    impl<S: Clone + Send + 'static> Recorder<S> {
        /// Create a recorder with no calls
        #[must_use]
        pub fn new() -> Self {
            Self {
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        /// Observer closure to pass to `Store::subscribe`
        pub fn observer(&self) -> impl Fn(&S) + Send + Sync + 'static {
            let calls = Arc::clone(&self.calls);
            move |state: &S| {
                calls
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(state.clone());
            }
        }

        /// Every recorded state, oldest first
        #[must_use]
        pub fn calls(&self) -> Vec<S> {
            self.lock().clone()
        }

        /// Number of recorded calls
        #[must_use]
        pub fn count(&self) -> usize {
            self.lock().len()
        }

        /// Most recently recorded state
        #[must_use]
        pub fn last(&self) -> Option<S> {
            self.lock().last().cloned()
        }

        /// Forget every recorded call
        pub fn clear(&self) {
            self.lock().clear();
        }

        fn lock(&self) -> MutexGuard<'_, Vec<S>> {
            self.calls.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    impl<S: Clone + Send + 'static> Default for Recorder<S> {
        fn default() -> Self {
            Self::new()
        }
    }

    impl<S> Clone for Recorder<S> {
        fn clone(&self) -> Self {
            Self {
                calls: Arc::clone(&self.calls),
            }
        }
    }

    impl<S: std::fmt::Debug> std::fmt::Debug for Recorder<S> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("Recorder")
                .field("calls", &*self.calls.lock().unwrap_or_else(PoisonError::into_inner))
                .finish()
        }
    }
}
