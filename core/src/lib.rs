//! # aredux Core
//!
//! Core traits and types for aredux, a minimal unidirectional state
//! container.
//!
//! ## Core Concepts
//!
//! - **State**: An opaque value owned by a store, replaced on every transition
//! - **Action**: A discrete description of a state change
//! - **Action sequence**: An asynchronous stream of actions, applied one by one
//! - **Reducer**: Pure function `(Option<&State>, &Action) → State`
//! - **Scheduler**: Injected deferred-execution queue used for notifications
//!
//! ## Example
//!
//! ```
//! use aredux_core::reducer::{Reducer, reducer_fn};
//!
//! #[derive(Debug, Clone, Default, PartialEq)]
//! struct CounterState {
//!     count: i64,
//! }
//!
//! #[derive(Debug, Default)]
//! enum CounterAction {
//!     #[default]
//!     Init,
//!     Increment,
//! }
//!
//! let reducer = reducer_fn(|state: Option<&CounterState>, action: &CounterAction| {
//!     let mut next = state.cloned().unwrap_or_default();
//!     if matches!(action, CounterAction::Increment) {
//!         next.count += 1;
//!     }
//!     Ok(next)
//! });
//!
//! let initial = reducer.reduce(None, &CounterAction::Init).unwrap();
//! let next = reducer.reduce(Some(&initial), &CounterAction::Increment).unwrap();
//! assert_eq!(next.count, 1);
//! ```

pub mod action;
pub mod composition;
pub mod error;

pub use action::{Action, ActionSequence, Dispatch, IntoDispatch};
pub use composition::{CombinedReducer, StateMap, combine_reducers};
pub use error::{BoxError, ReducerError, SequenceError, StoreError};
pub use reducer::{BoxedReducer, Reducer, ReducerFn, reducer_fn};
pub use scheduler::{Scheduler, Task};

/// Reducer module - The core trait for state transitions
///
/// Reducers are pure functions: `(Option<&State>, &Action) → State`.
///
/// `None` stands for "no state yet": the store passes it exactly once, at
/// construction, and the combinator passes it for slices that have not been
/// initialised.
pub mod reducer {
    use crate::error::ReducerError;
    use std::marker::PhantomData;
    use std::sync::Arc;

    /// A type-erased reducer, used to mix reducer types in one collection
    pub type BoxedReducer<S, A> = Box<dyn Reducer<State = S, Action = A> + Send + Sync>;

    /// The Reducer trait - core abstraction for state transitions
    ///
    /// # Example
    ///
    /// ```
    /// use aredux_core::reducer::Reducer;
    /// use aredux_core::error::ReducerError;
    ///
    /// struct Total;
    ///
    /// impl Reducer for Total {
    ///     type State = u64;
    ///     type Action = u64;
    ///
    ///     fn reduce(&self, state: Option<&u64>, action: &u64) -> Result<u64, ReducerError> {
    ///         state
    ///             .copied()
    ///             .unwrap_or(0)
    ///             .checked_add(*action)
    ///             .ok_or_else(|| ReducerError::new("total overflowed"))
    ///     }
    /// }
    ///
    /// assert_eq!(Total.reduce(Some(&2), &3).unwrap(), 5);
    /// ```
    pub trait Reducer {
        /// The state type this reducer produces
        type State;

        /// The action type this reducer processes
        type Action;

        /// Compute the next state from the previous state and an action
        ///
        /// Must be pure: the same `(state, action)` pair always yields an
        /// equal result. The store does not enforce this, but batching and
        /// testability rely on it.
        ///
        /// # Errors
        ///
        /// Returns a [`ReducerError`] when the transition cannot be applied.
        /// The store passes it to the dispatcher unmodified.
        fn reduce(
            &self,
            state: Option<&Self::State>,
            action: &Self::Action,
        ) -> Result<Self::State, ReducerError>;

        /// Erase the reducer type
        #[must_use]
        fn boxed(self) -> BoxedReducer<Self::State, Self::Action>
        where
            Self: Sized + Send + Sync + 'static,
        {
            Box::new(self)
        }
    }

    impl<R: Reducer + ?Sized> Reducer for Box<R> {
        type State = R::State;
        type Action = R::Action;

        fn reduce(
            &self,
            state: Option<&Self::State>,
            action: &Self::Action,
        ) -> Result<Self::State, ReducerError> {
            (**self).reduce(state, action)
        }
    }

    impl<R: Reducer + ?Sized> Reducer for Arc<R> {
        type State = R::State;
        type Action = R::Action;

        fn reduce(
            &self,
            state: Option<&Self::State>,
            action: &Self::Action,
        ) -> Result<Self::State, ReducerError> {
            (**self).reduce(state, action)
        }
    }

    /// A reducer backed by a closure
    ///
    /// Created by [`reducer_fn`].
    pub struct ReducerFn<S, A, F> {
        f: F,
        _phantom: PhantomData<fn(&S, &A) -> S>,
    }

    /// Adapt a closure into a [`Reducer`]
    ///
    /// ```
    /// use aredux_core::reducer::{Reducer, reducer_fn};
    ///
    /// let double = reducer_fn(|state: Option<&i32>, _action: &()| Ok(state.map_or(1, |n| n * 2)));
    /// assert_eq!(double.reduce(Some(&4), &()).unwrap(), 8);
    /// ```
    pub const fn reducer_fn<S, A, F>(f: F) -> ReducerFn<S, A, F>
    where
        F: Fn(Option<&S>, &A) -> Result<S, ReducerError>,
    {
        ReducerFn {
            f,
            _phantom: PhantomData,
        }
    }

    impl<S, A, F> Reducer for ReducerFn<S, A, F>
    where
        F: Fn(Option<&S>, &A) -> Result<S, ReducerError>,
    {
        type State = S;
        type Action = A;

        fn reduce(&self, state: Option<&S>, action: &A) -> Result<S, ReducerError> {
            (self.f)(state, action)
        }
    }

    impl<S, A, F: Clone> Clone for ReducerFn<S, A, F> {
        fn clone(&self) -> Self {
            Self {
                f: self.f.clone(),
                _phantom: PhantomData,
            }
        }
    }

    impl<S, A, F: Copy> Copy for ReducerFn<S, A, F> {}

    impl<S, A, F> std::fmt::Debug for ReducerFn<S, A, F> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("ReducerFn").finish_non_exhaustive()
        }
    }
}

/// Scheduler module - Deferred execution, injected into the store
///
/// The store never runs notifications inline. It hands a [`Task`] to its
/// scheduler, which must run it strictly after the current synchronous
/// execution. Production code uses a Tokio-backed scheduler; tests use a
/// manual queue they flush explicitly.
pub mod scheduler {
    use std::sync::Arc;

    /// A one-shot unit of deferred work
    pub type Task = Box<dyn FnOnce() + Send + 'static>;

    /// Scheduler trait - abstracts the deferred task queue
    ///
    /// # Examples
    ///
    /// ```
    /// use aredux_core::scheduler::{Scheduler, Task};
    /// use std::sync::Mutex;
    ///
    /// // Collects tasks; the owner decides when to run them
    /// #[derive(Default)]
    /// struct Queue(Mutex<Vec<Task>>);
    ///
    /// impl Scheduler for Queue {
    ///     fn schedule(&self, task: Task) {
    ///         if let Ok(mut tasks) = self.0.lock() {
    ///             tasks.push(task);
    ///         }
    ///     }
    /// }
    /// ```
    pub trait Scheduler: Send + Sync {
        /// Queue `task` to run after the caller's synchronous execution
        ///
        /// Implementations must never run the task before returning.
        fn schedule(&self, task: Task);
    }

    impl<T: Scheduler + ?Sized> Scheduler for Arc<T> {
        fn schedule(&self, task: Task) {
            (**self).schedule(task);
        }
    }
}
