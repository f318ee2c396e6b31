//! # aredux Runtime
//!
//! Runtime implementation for aredux.
//!
//! This crate provides the Store that owns application state, applies
//! transitions through a reducer, and notifies observers in batches.
//!
//! ## Core Components
//!
//! - **Store**: Holds state, reducer, observers and the dirty flag
//! - **Deferred Notifier**: One-shot task that delivers the latest state to
//!   every observer, coalescing any number of transitions into one pass
//! - **Scheduler**: [`TokioScheduler`] in production, a manual queue in tests
//! - **Connection**: Derived "props" view of a store that skips redundant updates
//!
//! ## Example
//!
//! ```no_run
//! use aredux_core::action::Action;
//! use aredux_core::reducer::reducer_fn;
//! use aredux_runtime::create_store;
//!
//! #[derive(Debug, Default)]
//! struct Add(i64);
//!
//! impl Action for Add {}
//!
//! # async fn example() -> Result<(), aredux_core::StoreError> {
//! let store = create_store(reducer_fn(|state: Option<&i64>, action: &Add| {
//!     Ok(state.copied().unwrap_or(0) + action.0)
//! }))?;
//!
//! let subscription = store.subscribe(|total| println!("total is now {total}"));
//!
//! // Plain actions apply before `dispatch` returns
//! let _ = store.dispatch(Add(2));
//! assert_eq!(*store.get_state(), 2);
//!
//! subscription.unsubscribe()?;
//! # Ok(())
//! # }
//! ```

use aredux_core::{
    action::{Dispatch, IntoDispatch},
    reducer::Reducer,
    scheduler::Scheduler,
};
use std::sync::Arc;

/// Tokio-backed deferred scheduling
pub mod scheduler;

/// Derived views over a store
pub mod connect;

/// Metric names and descriptions
pub mod metrics;

pub use aredux_core::error::{self, StoreError};
pub use connect::Connection;
pub use scheduler::TokioScheduler;
pub use store::{DispatchFuture, Store, Subscription, create_store};

/// What a notification pass does when an observer panics
///
/// The panic is always caught and logged; it never reaches the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObserverFailurePolicy {
    /// Keep notifying the remaining observers
    #[default]
    Continue,

    /// End the pass; remaining observers wait for the next transition
    Abort,
}

/// Configuration for Store behavior
///
/// # Example
///
/// ```
/// use aredux_runtime::{ObserverFailurePolicy, StoreConfig};
///
/// let config = StoreConfig::default()
///     .with_name("session")
///     .with_observer_failure_policy(ObserverFailurePolicy::Abort);
///
/// assert_eq!(config.name, "session");
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Label used in tracing spans and metrics
    pub name: String,
    /// Behavior when an observer panics during a notification pass
    pub observer_failure_policy: ObserverFailurePolicy,
}

impl StoreConfig {
    /// Create a new configuration with custom values
    #[must_use]
    pub fn new(name: impl Into<String>, observer_failure_policy: ObserverFailurePolicy) -> Self {
        Self {
            name: name.into(),
            observer_failure_policy,
        }
    }

    /// Set the store name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the observer failure policy
    #[must_use]
    pub const fn with_observer_failure_policy(mut self, policy: ObserverFailurePolicy) -> Self {
        self.observer_failure_policy = policy;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: "store".to_string(),
            observer_failure_policy: ObserverFailurePolicy::default(),
        }
    }
}

/// Store module - The state container
///
/// Store state machine:
///
/// - `dispatch` applies transitions synchronously, marks the store dirty and
///   schedules the notifier (unconditionally; the dirty flag makes repeats
///   free).
/// - The notifier clears the dirty flag and walks a snapshot of the
///   observer list, reading the current state before each call.
pub mod store {
    use super::{Arc, Dispatch, IntoDispatch, ObserverFailurePolicy, Reducer, Scheduler, StoreConfig};
    use crate::metrics::{self, SharedString, counter, histogram};
    use crate::scheduler::TokioScheduler;
    use aredux_core::action::ActionSequence;
    use aredux_core::error::StoreError;
    use futures::StreamExt;
    use futures::future::{self, BoxFuture, FutureExt};
    use std::marker::PhantomData;
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
    use std::sync::{Mutex, PoisonError, RwLock, Weak};
    use tracing::Instrument;

    /// Completion signal returned by [`Store::dispatch`]
    ///
    /// Resolves once every transition implied by the dispatched value has
    /// been applied. Independent of, and earlier than, any notification.
    pub type DispatchFuture = BoxFuture<'static, Result<(), StoreError>>;

    type Observer<S> = Arc<dyn Fn(&S) + Send + Sync>;

    struct Registration<S> {
        id: u64,
        active: AtomicBool,
        handler: Observer<S>,
    }

    /// Ordered observer list shared between a store and its subscriptions
    struct Observers<S> {
        entries: Mutex<Vec<Arc<Registration<S>>>>,
        next_id: AtomicU64,
    }

    impl<S> Observers<S> {
        fn new() -> Self {
            Self {
                entries: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(0),
            }
        }

        fn add(&self, handler: Observer<S>) -> u64 {
            let id = self.next_id.fetch_add(1, Ordering::Relaxed);
            self.lock().push(Arc::new(Registration {
                id,
                active: AtomicBool::new(true),
                handler,
            }));
            id
        }

        fn snapshot(&self) -> Vec<Arc<Registration<S>>> {
            self.lock().clone()
        }

        fn len(&self) -> usize {
            self.lock().len()
        }

        fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Arc<Registration<S>>>> {
            self.entries.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    /// Type-erased removal, so subscriptions don't carry the state type
    trait Registry: Send + Sync {
        fn remove(&self, id: u64) -> bool;
    }

    impl<S: 'static> Registry for Observers<S> {
        fn remove(&self, id: u64) -> bool {
            let mut entries = self.lock();
            let Some(index) = entries.iter().position(|entry| entry.id == id) else {
                return false;
            };
            let registration = entries.remove(index);
            // A pass already holding a snapshot must skip it from now on
            registration.active.store(false, Ordering::Release);
            true
        }
    }

    struct Shared<S, R> {
        name: String,
        label: SharedString,
        reducer: R,
        state: RwLock<Arc<S>>,
        dirty: AtomicBool,
        observers: Arc<Observers<S>>,
        scheduler: Arc<dyn Scheduler>,
        failure_policy: ObserverFailurePolicy,
    }

    impl<S, A, R> Shared<S, R>
    where
        R: Reducer<State = S, Action = A> + Send + Sync + 'static,
        S: Send + Sync + 'static,
        A: Send + 'static,
    {
        fn current(&self) -> Arc<S> {
            Arc::clone(&self.state.read().unwrap_or_else(PoisonError::into_inner))
        }

        /// Apply one action as a single transition
        fn apply(self: &Arc<Self>, action: &A) -> Result<(), StoreError> {
            {
                let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);

                let start = std::time::Instant::now();
                let next = self.reducer.reduce(Some(&**state), action);
                histogram!(metrics::REDUCER_DURATION_SECONDS, "store" => self.label.clone())
                    .record(start.elapsed().as_secs_f64());

                match next {
                    Ok(next) => *state = Arc::new(next),
                    Err(error) => {
                        counter!(metrics::REDUCER_ERRORS_TOTAL, "store" => self.label.clone())
                            .increment(1);
                        tracing::error!(store = %self.name, error = %error, "Reducer failed, state unchanged");
                        return Err(error.into());
                    },
                }

                self.dirty.store(true, Ordering::Release);
            }

            counter!(metrics::TRANSITIONS_TOTAL, "store" => self.label.clone()).increment(1);
            tracing::trace!(store = %self.name, "Transition applied, scheduling notification");
            self.schedule_notify();
            Ok(())
        }

        fn schedule_notify(self: &Arc<Self>) {
            let shared = Arc::downgrade(self);
            self.scheduler.schedule(Box::new(move || {
                // Store dropped before the notifier fired
                if let Some(shared) = Weak::upgrade(&shared) {
                    shared.notify();
                }
            }));
        }

        /// The deferred notifier body
        fn notify(&self) {
            if !self.dirty.swap(false, Ordering::AcqRel) {
                counter!(metrics::NOTIFY_SKIPPED_TOTAL, "store" => self.label.clone()).increment(1);
                tracing::trace!(store = %self.name, "No pending change, notification coalesced");
                return;
            }

            let observers = self.observers.snapshot();

            counter!(metrics::NOTIFY_PASSES_TOTAL, "store" => self.label.clone()).increment(1);
            tracing::debug!(store = %self.name, observers = observers.len(), "Notifying observers");

            for registration in observers {
                if !registration.active.load(Ordering::Acquire) {
                    continue;
                }

                // Earlier observers in this pass may have dispatched
                let state = self.current();
                let handler = &registration.handler;
                if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| handler(&state))) {
                    counter!(metrics::OBSERVER_PANICS_TOTAL, "store" => self.label.clone())
                        .increment(1);
                    tracing::error!(
                        store = %self.name,
                        observer = registration.id,
                        panic = panic_message(payload.as_ref()),
                        "Observer panicked during notification"
                    );

                    if self.failure_policy == ObserverFailurePolicy::Abort {
                        tracing::warn!(store = %self.name, "Aborting notification pass");
                        break;
                    }
                }
            }
        }

        async fn consume(self: Arc<Self>, mut actions: ActionSequence<A>) -> Result<(), StoreError> {
            let mut applied: u64 = 0;

            while let Some(item) = actions.next().await {
                let action = item.map_err(|error| {
                    counter!(metrics::SEQUENCE_ERRORS_TOTAL, "store" => self.label.clone())
                        .increment(1);
                    tracing::error!(store = %self.name, applied, error = %error, "Action sequence failed");
                    StoreError::from(error)
                })?;

                self.apply(&action)?;
                applied += 1;
            }

            tracing::debug!(store = %self.name, applied, "Action sequence completed");
            Ok(())
        }
    }

    fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
        payload
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
            .unwrap_or("<non-string panic payload>")
    }

    /// The Store - a single cell of application state
    ///
    /// The Store manages:
    /// 1. State (replaced, never mutated, on each transition)
    /// 2. Reducer (the only way state changes)
    /// 3. Observers (notified in registration order)
    /// 4. Deferred notification through an injected [`Scheduler`]
    ///
    /// Clones share the same state and observers.
    ///
    /// # Type Parameters
    ///
    /// - `S`: State type
    /// - `A`: Action type (its `Default` value is the initial action)
    /// - `R`: Reducer implementation
    pub struct Store<S, A, R>
    where
        R: Reducer<State = S, Action = A>,
    {
        shared: Arc<Shared<S, R>>,
        _action: PhantomData<fn(A)>,
    }

    impl<S, A, R> Store<S, A, R>
    where
        R: Reducer<State = S, Action = A> + Send + Sync + 'static,
        S: Send + Sync + 'static,
        A: Send + 'static,
    {
        /// Create a store with the given scheduler and default configuration
        ///
        /// The reducer is called once with `(None, &A::default())` to obtain
        /// the initial state.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::Reducer`] if the initial reducer call fails.
        pub fn new(reducer: R, scheduler: impl Scheduler + 'static) -> Result<Self, StoreError>
        where
            A: Default,
        {
            Self::with_config(reducer, scheduler, StoreConfig::default())
        }

        /// Create a store with custom configuration
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::Reducer`] if the initial reducer call fails.
        pub fn with_config(
            reducer: R,
            scheduler: impl Scheduler + 'static,
            config: StoreConfig,
        ) -> Result<Self, StoreError>
        where
            A: Default,
        {
            let initial = reducer.reduce(None, &A::default()).map_err(|error| {
                tracing::error!(store = %config.name, error = %error, "Initial reducer call failed");
                StoreError::from(error)
            })?;

            tracing::debug!(store = %config.name, "Store created");

            Ok(Self {
                _action: PhantomData,
                shared: Arc::new(Shared {
                    label: SharedString::from(config.name.clone()),
                    name: config.name,
                    reducer,
                    state: RwLock::new(Arc::new(initial)),
                    dirty: AtomicBool::new(false),
                    observers: Arc::new(Observers::new()),
                    scheduler: Arc::new(scheduler),
                    failure_policy: config.observer_failure_policy,
                }),
            })
        }

        /// Dispatch a plain action, an action sequence, or a classified value
        ///
        /// - A plain action is applied **before this method returns**; the
        ///   returned future is already resolved with the outcome.
        /// - Values are classified through [`IntoDispatch`], so a dynamic
        ///   value that is not an action resolves to
        ///   [`StoreError::InvalidAction`] without reaching the reducer.
        /// - A sequence is consumed when the returned future is polled. Each
        ///   action is applied as soon as it arrives.
        /// - [`Dispatch::Invalid`] resolves to [`StoreError::InvalidAction`].
        ///
        /// Observers are notified later, once per burst of transitions.
        ///
        /// # Errors
        ///
        /// The returned future resolves to:
        /// - [`StoreError::Reducer`] when the reducer fails (earlier
        ///   transitions stay applied)
        /// - [`StoreError::Sequence`] when the sequence yields an error
        /// - [`StoreError::InvalidAction`] for invalid values
        ///
        /// # Example
        ///
        /// ```ignore
        /// // Plain action: already applied, awaiting only surfaces the result
        /// store.dispatch(Action::SetFoo(2)).await?;
        ///
        /// // Sequence: applied while awaited
        /// store.dispatch(Dispatch::sequence(stream::iter(actions))).await?;
        /// ```
        #[tracing::instrument(skip(self, action), fields(store = %self.shared.name))]
        pub fn dispatch(&self, action: impl IntoDispatch<A>) -> DispatchFuture {
            counter!(metrics::DISPATCH_TOTAL, "store" => self.shared.label.clone()).increment(1);

            match action.into_dispatch() {
                Dispatch::Action(action) => {
                    tracing::debug!("Applying plain action");
                    future::ready(self.shared.apply(&action)).boxed()
                },
                Dispatch::Sequence(actions) => {
                    tracing::debug!("Dispatching action sequence");
                    let span = tracing::debug_span!("action_sequence", store = %self.shared.name);
                    Arc::clone(&self.shared).consume(actions).instrument(span).boxed()
                },
                Dispatch::Invalid { kind } => {
                    counter!(metrics::DISPATCH_REJECTED_TOTAL, "store" => self.shared.label.clone())
                        .increment(1);
                    tracing::warn!(kind, "Rejected dispatch: neither a plain action nor an action sequence");
                    future::ready(Err(StoreError::InvalidAction { kind })).boxed()
                },
            }
        }

        /// Register an observer
        ///
        /// Observers run in registration order during each notification pass
        /// and each receives the state current at its own call. An observer
        /// registered during a pass is first called in the next pass.
        pub fn subscribe<F>(&self, handler: F) -> Subscription
        where
            F: Fn(&S) + Send + Sync + 'static,
        {
            let id = self.shared.observers.add(Arc::new(handler));
            tracing::debug!(store = %self.shared.name, observer = id, "Observer subscribed");

            let observers: Weak<Observers<S>> = Arc::downgrade(&self.shared.observers);
            let registry: Weak<dyn Registry> = observers;
            Subscription {
                id,
                registry,
                used: AtomicBool::new(false),
            }
        }

        /// Current state
        #[must_use]
        pub fn get_state(&self) -> Arc<S> {
            self.shared.current()
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let count = store.state(|s| s.count);
        /// ```
        pub fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            f(&self.get_state())
        }

        /// Name from the store configuration
        #[must_use]
        pub fn name(&self) -> &str {
            &self.shared.name
        }

        /// Number of registered observers
        #[must_use]
        pub fn observer_count(&self) -> usize {
            self.shared.observers.len()
        }

        /// Whether a transition is waiting for its notification pass
        #[must_use]
        pub fn has_pending_notification(&self) -> bool {
            self.shared.dirty.load(Ordering::Acquire)
        }
    }

    impl<S, A, R> Clone for Store<S, A, R>
    where
        R: Reducer<State = S, Action = A>,
    {
        fn clone(&self) -> Self {
            Self {
                shared: Arc::clone(&self.shared),
                _action: PhantomData,
            }
        }
    }

    impl<S, A, R> std::fmt::Debug for Store<S, A, R>
    where
        R: Reducer<State = S, Action = A>,
        S: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            let state = self.shared.state.read().unwrap_or_else(PoisonError::into_inner);
            f.debug_struct("Store")
                .field("name", &self.shared.name)
                .field("state", &**state)
                .field("dirty", &self.shared.dirty.load(Ordering::Acquire))
                .finish_non_exhaustive()
        }
    }

    /// Create a store notified through the current Tokio runtime
    ///
    /// # Errors
    ///
    /// - [`StoreError::Configuration`] when called outside a Tokio runtime
    /// - [`StoreError::Reducer`] if the initial reducer call fails
    pub fn create_store<S, A, R>(reducer: R) -> Result<Store<S, A, R>, StoreError>
    where
        R: Reducer<State = S, Action = A> + Send + Sync + 'static,
        S: Send + Sync + 'static,
        A: Default + Send + 'static,
    {
        Store::new(reducer, TokioScheduler::current()?)
    }

    /// Handle that removes one observer registration
    ///
    /// Dropping the handle leaves the observer registered.
    #[must_use = "dropping a Subscription leaves the observer registered; keep it to unsubscribe"]
    pub struct Subscription {
        id: u64,
        registry: Weak<dyn Registry>,
        used: AtomicBool,
    }

    impl Subscription {
        /// Remove the observer this handle registered
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::DoubleUnsubscribe`] if called more than once.
        pub fn unsubscribe(&self) -> Result<(), StoreError> {
            if self.used.swap(true, Ordering::AcqRel) {
                tracing::warn!(observer = self.id, "Unsubscribe called multiple times");
                return Err(StoreError::DoubleUnsubscribe);
            }

            if let Some(registry) = self.registry.upgrade() {
                registry.remove(self.id);
            }
            tracing::debug!(observer = self.id, "Observer unsubscribed");
            Ok(())
        }

        /// Whether the observer is still registered with a live store
        #[must_use]
        pub fn is_active(&self) -> bool {
            !self.used.load(Ordering::Acquire) && self.registry.strong_count() > 0
        }

        /// Registration id, unique per store
        #[must_use]
        pub const fn id(&self) -> u64 {
            self.id
        }
    }

    impl std::fmt::Debug for Subscription {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("Subscription")
                .field("id", &self.id)
                .field("active", &self.is_active())
                .finish()
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)] // Test code can use unwrap
    #![allow(clippy::panic)] // Panicking observers are under test

    use super::*;
    use aredux_core::error::ReducerError;
    use aredux_core::reducer::reducer_fn;
    use aredux_testing::ManualScheduler;
    use std::sync::Mutex;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct TestState {
        foo: Option<i32>,
    }

    #[derive(Debug, Clone, Default)]
    enum TestAction {
        #[default]
        Init,
        SetFoo(i32),
        Fail,
    }

    impl aredux_core::action::Action for TestAction {}

    #[derive(Debug, Clone, Copy)]
    struct TestReducer;

    impl Reducer for TestReducer {
        type State = TestState;
        type Action = TestAction;

        fn reduce(
            &self,
            state: Option<&Self::State>,
            action: &Self::Action,
        ) -> Result<Self::State, ReducerError> {
            let state = state.cloned().unwrap_or_default();
            match action {
                TestAction::Init => Ok(state),
                TestAction::SetFoo(foo) => Ok(TestState { foo: Some(*foo) }),
                TestAction::Fail => Err(ReducerError::new("reducer rejected action")),
            }
        }
    }

    fn test_store() -> (Store<TestState, TestAction, TestReducer>, ManualScheduler) {
        let scheduler = ManualScheduler::new();
        let store = Store::new(TestReducer, scheduler.clone()).unwrap();
        (store, scheduler)
    }

    fn recording(store: &Store<TestState, TestAction, TestReducer>) -> (Subscription, Arc<Mutex<Vec<TestState>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let subscription = store.subscribe(move |state: &TestState| sink.lock().unwrap().push(state.clone()));
        (subscription, seen)
    }

    #[test]
    fn test_store_creation_runs_initial_reduce() {
        let (store, scheduler) = test_store();
        assert_eq!(*store.get_state(), TestState::default());
        assert!(!store.has_pending_notification());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_initial_reduce_failure() {
        let failing = reducer_fn(|_: Option<&TestState>, _: &TestAction| Err(ReducerError::new("no initial state")));
        let result = Store::new(failing, ManualScheduler::new());
        assert!(matches!(result, Err(StoreError::Reducer(_))));
    }

    #[test]
    fn test_plain_action_applies_before_dispatch_returns() {
        let (store, _scheduler) = test_store();

        let _pending = store.dispatch(TestAction::SetFoo(2));
        assert_eq!(store.get_state().foo, Some(2));
        assert!(store.has_pending_notification());
    }

    #[test]
    fn test_notification_is_deferred_and_batched() {
        let (store, scheduler) = test_store();
        let (_subscription, seen) = recording(&store);

        let _ = store.dispatch(TestAction::SetFoo(3));
        let _ = store.dispatch(TestAction::SetFoo(4));
        assert!(seen.lock().unwrap().is_empty(), "notification must not be synchronous");

        // One task per transition; the second finds nothing to do
        assert_eq!(scheduler.run_pending(), 2);
        assert_eq!(*seen.lock().unwrap(), vec![TestState { foo: Some(4) }]);
        assert!(!store.has_pending_notification());
    }

    #[test]
    fn test_reducer_error_leaves_state_untouched() {
        let (store, scheduler) = test_store();
        let _ = store.dispatch(TestAction::SetFoo(1));
        scheduler.run_pending();

        let result = futures::executor::block_on(store.dispatch(TestAction::Fail));
        assert!(matches!(result, Err(StoreError::Reducer(ref e)) if e.message() == "reducer rejected action"));
        assert_eq!(store.get_state().foo, Some(1));
        assert!(!store.has_pending_notification());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_invalid_dispatch_is_rejected() {
        let (store, scheduler) = test_store();

        let result = futures::executor::block_on(store.dispatch(Dispatch::<TestAction>::Invalid { kind: "number" }));
        assert!(matches!(result, Err(StoreError::InvalidAction { kind: "number" })));
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_each_observer_reads_current_state() {
        let (store, scheduler) = test_store();
        let dispatcher = store.clone();
        let _first = store.subscribe(move |state: &TestState| {
            if state.foo == Some(1) {
                let _ = dispatcher.dispatch(TestAction::SetFoo(11));
            }
        });
        let (_subscription, seen) = recording(&store);

        let _ = store.dispatch(TestAction::SetFoo(1));
        assert!(scheduler.run_next());

        // Same pass, after the first observer's dispatch
        assert_eq!(*seen.lock().unwrap(), vec![TestState { foo: Some(11) }]);
        assert!(store.has_pending_notification());
    }

    #[test]
    fn test_double_unsubscribe() {
        let (store, _scheduler) = test_store();
        let subscription = store.subscribe(|_| {});

        assert!(subscription.is_active());
        subscription.unsubscribe().unwrap();
        assert!(!subscription.is_active());
        assert_eq!(store.observer_count(), 0);
        assert!(matches!(subscription.unsubscribe(), Err(StoreError::DoubleUnsubscribe)));
    }

    #[test]
    fn test_unsubscribe_removes_only_its_registration() {
        let (store, scheduler) = test_store();
        let calls = Arc::new(Mutex::new(Vec::new()));

        let first_calls = Arc::clone(&calls);
        let first = store.subscribe(move |_| first_calls.lock().unwrap().push("first"));
        let second_calls = Arc::clone(&calls);
        let _second = store.subscribe(move |_| second_calls.lock().unwrap().push("second"));

        first.unsubscribe().unwrap();
        let _ = store.dispatch(TestAction::SetFoo(1));
        scheduler.run_until_idle();

        assert_eq!(*calls.lock().unwrap(), vec!["second"]);
    }

    #[test]
    fn test_pending_notification_after_drop_is_noop() {
        let (store, scheduler) = test_store();
        let (_subscription, seen) = recording(&store);

        let _ = store.dispatch(TestAction::SetFoo(1));
        drop(store);

        assert_eq!(scheduler.run_pending(), 1);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_observer_panic_continues_by_default() {
        let (store, scheduler) = test_store();
        let _boom = store.subscribe(|_| panic!("observer failed"));
        let (_subscription, seen) = recording(&store);

        let _ = store.dispatch(TestAction::SetFoo(5));
        scheduler.run_until_idle();

        assert_eq!(*seen.lock().unwrap(), vec![TestState { foo: Some(5) }]);
    }

    #[test]
    fn test_observer_panic_aborts_pass_when_configured() {
        let scheduler = ManualScheduler::new();
        let config = StoreConfig::default().with_observer_failure_policy(ObserverFailurePolicy::Abort);
        let store = Store::with_config(TestReducer, scheduler.clone(), config).unwrap();
        let _boom = store.subscribe(|_| panic!("observer failed"));
        let (_subscription, seen) = recording(&store);

        let _ = store.dispatch(TestAction::SetFoo(5));
        scheduler.run_until_idle();
        assert!(seen.lock().unwrap().is_empty());

        // The next transition gets a fresh pass
        let _ = store.dispatch(TestAction::SetFoo(6));
        scheduler.run_until_idle();
        assert!(seen.lock().unwrap().is_empty(), "the panicking observer still runs first");
    }

    #[test]
    fn test_store_config_builder() {
        let config = StoreConfig::new("cart", ObserverFailurePolicy::Continue).with_name("checkout");
        assert_eq!(config.name, "checkout");
        assert_eq!(config.observer_failure_policy, ObserverFailurePolicy::Continue);

        let store = Store::with_config(TestReducer, ManualScheduler::new(), config).unwrap();
        assert_eq!(store.name(), "checkout");
    }

    #[test]
    fn test_clones_share_state() {
        let (store, _scheduler) = test_store();
        let other = store.clone();

        let _ = other.dispatch(TestAction::SetFoo(8));
        assert_eq!(store.state(|s| s.foo), Some(8));
        assert!(format!("{store:?}").contains("foo: Some(8)"));
    }
}
