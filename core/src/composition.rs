//! Reducer composition utilities
//!
//! [`combine_reducers`] builds one reducer over a keyed [`StateMap`] from a
//! set of per-key reducers. Each key's reducer sees only its own slice of the
//! map, and keys the combinator does not own pass through untouched.
//!
//! # Examples
//!
//! ```
//! use aredux_core::composition::{StateMap, combine_reducers};
//! use aredux_core::reducer::{Reducer, reducer_fn};
//!
//! #[derive(Debug, Default)]
//! struct Add(i64);
//!
//! let counter = reducer_fn(|state: Option<&i64>, action: &Add| Ok(state.copied().unwrap_or(0) + action.0));
//! let combined = combine_reducers([("left", counter), ("right", counter)]).unwrap();
//!
//! let state = combined.reduce(None, &Add(2)).unwrap();
//! assert_eq!(state.get("left"), Some(&2));
//! assert_eq!(state.get("right"), Some(&2));
//! ```

use crate::error::{ReducerError, StoreError};
use crate::reducer::Reducer;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

/// An immutable map from string keys to per-slice state.
///
/// Clones share the underlying map. Every update produces a new map and
/// leaves the original untouched.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateMap<V>(Arc<BTreeMap<String, V>>);

impl<V> StateMap<V> {
    /// Create an empty map
    #[must_use]
    pub fn new() -> Self {
        Self(Arc::new(BTreeMap::new()))
    }

    /// Get the slice stored at `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&V> {
        self.0.get(key)
    }

    /// Check whether `key` is present
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of slices
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check whether the map holds no slices
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Iterate over `(key, slice)` pairs in sorted key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Check whether two maps share the same allocation
    ///
    /// A cheap identity check for skipping redundant work when state was
    /// passed through unchanged.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<V: Clone> StateMap<V> {
    /// Return a new map with `key` set to `value`
    #[must_use]
    pub fn with_entry(&self, key: impl Into<String>, value: V) -> Self {
        let mut next = self.to_btree_map();
        next.insert(key.into(), value);
        Self::from(next)
    }

    /// Copy the entries into a mutable `BTreeMap`
    #[must_use]
    pub fn to_btree_map(&self) -> BTreeMap<String, V> {
        (*self.0).clone()
    }
}

impl<V> Default for StateMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> From<BTreeMap<String, V>> for StateMap<V> {
    fn from(map: BTreeMap<String, V>) -> Self {
        Self(Arc::new(map))
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for StateMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect::<BTreeMap<_, _>>(),
        )
    }
}

impl<V: std::fmt::Debug> std::fmt::Debug for StateMap<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.0.iter()).finish()
    }
}

/// Combines per-key reducers into one reducer over a [`StateMap`].
///
/// Accepts anything that iterates `(key, reducer)` pairs: arrays and vectors
/// of pairs, `BTreeMap`, `HashMap`. Keys are applied in iteration order.
/// To mix reducer types, erase them with [`Reducer::boxed`].
///
/// # Errors
///
/// Returns [`StoreError::Configuration`] if the same key appears twice.
pub fn combine_reducers<I, K, R>(reducers: I) -> Result<CombinedReducer<R>, StoreError>
where
    I: IntoIterator<Item = (K, R)>,
    K: Into<String>,
    R: Reducer,
{
    let mut seen = HashSet::new();
    let mut slices = Vec::new();

    for (key, reducer) in reducers {
        let key = key.into();
        if !seen.insert(key.clone()) {
            return Err(StoreError::Configuration(format!(
                "combine_reducers(): duplicate reducer key `{key}`"
            )));
        }
        slices.push((key, reducer));
    }

    Ok(CombinedReducer { slices })
}

/// A reducer that runs one reducer per key of a [`StateMap`].
///
/// Created by [`combine_reducers`].
pub struct CombinedReducer<R> {
    slices: Vec<(String, R)>,
}

impl<R> CombinedReducer<R> {
    /// Keys owned by this reducer, in application order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.slices.iter().map(|(key, _)| key.as_str())
    }
}

impl<R> std::fmt::Debug for CombinedReducer<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombinedReducer")
            .field("keys", &self.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl<R> Reducer for CombinedReducer<R>
where
    R: Reducer,
    R::State: Clone,
{
    type State = StateMap<R::State>;
    type Action = R::Action;

    fn reduce(
        &self,
        state: Option<&Self::State>,
        action: &Self::Action,
    ) -> Result<Self::State, ReducerError> {
        // Copy the existing map so keys we don't own survive
        let mut next = state.map(StateMap::to_btree_map).unwrap_or_default();

        for (key, reducer) in &self.slices {
            let slice = reducer.reduce(next.get(key), action)?;
            next.insert(key.clone(), slice);
        }

        Ok(StateMap::from(next))
    }
}
