//! # Counter Demo
//!
//! A simple counter showing an aredux store end to end.
//!
//! This demo showcases:
//! - A reducer implemented as a trait impl
//! - Combining several counters into one keyed state
//! - Plain actions, action sequences and derived views
//!
//! ## Example
//!
//! ```no_run
//! use aredux_runtime::create_store;
//! use counter_demo::{CounterAction, CounterReducer};
//!
//! # async fn example() -> Result<(), aredux_core::StoreError> {
//! let store = create_store(CounterReducer)?;
//!
//! store.dispatch(CounterAction::Increment).await?;
//! assert_eq!(store.state(|s| s.count), 1);
//! # Ok(())
//! # }
//! ```

use aredux_core::{
    action::Action,
    composition::{CombinedReducer, combine_reducers},
    error::{ReducerError, StoreError},
    reducer::Reducer,
};

/// Counter state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CounterState {
    /// Current count value
    pub count: i64,
}

/// Counter actions
#[derive(Debug, Clone, Default)]
pub enum CounterAction {
    /// Store construction
    #[default]
    Init,
    /// Increment the counter by 1
    Increment,
    /// Decrement the counter by 1
    Decrement,
    /// Add an arbitrary amount
    Add(i64),
    /// Reset the counter to 0
    Reset,
}

impl Action for CounterAction {}

/// Counter reducer
///
/// Fails instead of wrapping when the count would overflow.
#[derive(Debug, Clone, Copy, Default)]
pub struct CounterReducer;

impl Reducer for CounterReducer {
    type State = CounterState;
    type Action = CounterAction;

    fn reduce(
        &self,
        state: Option<&Self::State>,
        action: &Self::Action,
    ) -> Result<Self::State, ReducerError> {
        let count = state.map_or(0, |s| s.count);

        let count = match action {
            CounterAction::Init => Some(count),
            CounterAction::Increment => count.checked_add(1),
            CounterAction::Decrement => count.checked_sub(1),
            CounterAction::Add(amount) => count.checked_add(*amount),
            CounterAction::Reset => Some(0),
        }
        .ok_or_else(|| ReducerError::new(format!("counter overflow applying {action:?}")))?;

        Ok(CounterState { count })
    }
}

/// Two independent counters under one keyed state: `"clicks"` and `"views"`
///
/// # Errors
///
/// Never fails in practice; keys are distinct.
pub fn dashboard_reducer() -> Result<CombinedReducer<CounterReducer>, StoreError> {
    combine_reducers([("clicks", CounterReducer), ("views", CounterReducer)])
}
