//! Action classification.
//!
//! A dispatched value is either a single plain action or an asynchronous,
//! ordered sequence of actions. [`Dispatch`] makes that choice explicit at
//! the call site, and keeps a third variant for values that are neither so
//! the store can reject them with a typed error.
//!
//! Values reach a [`Dispatch`] through [`IntoDispatch`]. Action types opt in
//! with an [`Action`] impl; dynamic types such as [`serde_json::Value`]
//! override [`Action::classify`] so every dispatch path rejects non-actions.
//!
//! # Examples
//!
//! ```
//! use aredux_core::action::{Action, Dispatch, IntoDispatch};
//! use futures::stream;
//! use serde_json::json;
//!
//! #[derive(Debug, Clone, PartialEq)]
//! enum Move {
//!     Add(i32),
//! }
//!
//! impl Action for Move {}
//!
//! let single: Dispatch<Move> = Move::Add(1).into_dispatch();
//! assert_eq!(single.kind(), "action");
//!
//! let many = Dispatch::sequence(stream::iter(vec![Move::Add(1), Move::Add(2)]));
//! assert!(many.is_sequence());
//!
//! let rejected: Dispatch<serde_json::Value> = json!(42).into_dispatch();
//! assert_eq!(rejected.kind(), "number");
//! ```

use crate::error::SequenceError;
use futures::stream::{BoxStream, Stream, StreamExt};
use serde_json::Value;

/// An asynchronously produced, ordered, possibly unbounded stream of actions.
///
/// Each item is awaited in turn; an `Err` item ends the sequence and fails
/// the dispatch that consumes it.
pub type ActionSequence<A> = BoxStream<'static, Result<A, SequenceError>>;

/// A value handed to `Store::dispatch`.
pub enum Dispatch<A> {
    /// One discrete transition
    Action(A),

    /// Lazily produced actions, each applied as soon as it arrives
    Sequence(ActionSequence<A>),

    /// Neither a plain action nor a sequence
    Invalid {
        /// Kind of value that was classified
        kind: &'static str,
    },
}

impl<A> Dispatch<A> {
    /// Wrap an infallible stream of actions
    #[must_use]
    pub fn sequence<S>(actions: S) -> Self
    where
        S: Stream<Item = A> + Send + 'static,
        A: Send + 'static,
    {
        Self::Sequence(actions.map(Ok).boxed())
    }

    /// Wrap a fallible stream of actions
    ///
    /// The first `Err` item stops consumption and becomes the dispatch error.
    #[must_use]
    pub fn try_sequence<S, E>(actions: S) -> Self
    where
        S: Stream<Item = Result<A, E>> + Send + 'static,
        E: Into<SequenceError>,
        A: Send + 'static,
    {
        Self::Sequence(actions.map(|item| item.map_err(Into::into)).boxed())
    }

    /// Short label for logs: `"action"`, `"sequence"` or the invalid kind
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Action(_) => "action",
            Self::Sequence(_) => "sequence",
            Self::Invalid { kind } => *kind,
        }
    }

    /// Whether this is an action sequence
    #[must_use]
    pub const fn is_sequence(&self) -> bool {
        matches!(self, Self::Sequence(_))
    }
}

/// A type whose values can be dispatched as plain actions
///
/// Most action enums need only an empty impl. Types that can also hold
/// values which are not actions override [`Action::classify`].
pub trait Action: Sized {
    /// Decide how this value is dispatched
    fn classify(self) -> Dispatch<Self> {
        Dispatch::Action(self)
    }
}

/// Anything `Store::dispatch` accepts for action type `A`
///
/// Implemented for every [`Action`] (through [`Action::classify`]) and for
/// an already built [`Dispatch<A>`], which passes through unchanged.
pub trait IntoDispatch<A> {
    /// Convert into a dispatch value
    fn into_dispatch(self) -> Dispatch<A>;
}

impl<A> IntoDispatch<A> for Dispatch<A> {
    fn into_dispatch(self) -> Self {
        self
    }
}

impl<A: Action> IntoDispatch<A> for A {
    fn into_dispatch(self) -> Dispatch<A> {
        self.classify()
    }
}

impl Action for Value {
    fn classify(self) -> Dispatch<Self> {
        Dispatch::classify(self)
    }
}

impl Dispatch<Value> {
    /// Classify a dynamic JSON value
    ///
    /// Objects are plain actions. `null`, booleans, numbers, strings and
    /// arrays are not associative records and classify as `Invalid`.
    ///
    /// # Examples
    ///
    /// ```
    /// use aredux_core::action::Dispatch;
    /// use serde_json::json;
    ///
    /// assert_eq!(Dispatch::classify(json!({"type": "SET_FOO"})).kind(), "action");
    /// assert_eq!(Dispatch::classify(json!(42)).kind(), "number");
    /// ```
    #[must_use]
    pub fn classify(value: Value) -> Self {
        match value {
            Value::Object(_) => Self::Action(value),
            Value::Null => Self::Invalid { kind: "null" },
            Value::Bool(_) => Self::Invalid { kind: "boolean" },
            Value::Number(_) => Self::Invalid { kind: "number" },
            Value::String(_) => Self::Invalid { kind: "string" },
            Value::Array(_) => Self::Invalid { kind: "array" },
        }
    }
}

// Manual Debug implementation since the boxed stream doesn't implement Debug
impl<A> std::fmt::Debug for Dispatch<A>
where
    A: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Action(action) => f.debug_tuple("Dispatch::Action").field(action).finish(),
            Self::Sequence(_) => write!(f, "Dispatch::Sequence(<stream>)"),
            Self::Invalid { kind } => f.debug_struct("Dispatch::Invalid").field("kind", kind).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use serde_json::json;

    #[test]
    fn test_classify_accepts_only_objects() {
        assert!(matches!(Dispatch::classify(json!({})), Dispatch::Action(_)));
        assert_eq!(Dispatch::classify(json!(null)).kind(), "null");
        assert_eq!(Dispatch::classify(json!(true)).kind(), "boolean");
        assert_eq!(Dispatch::classify(json!("SET_FOO")).kind(), "string");
        assert_eq!(Dispatch::classify(json!([1, 2])).kind(), "array");
    }

    #[tokio::test]
    async fn test_try_sequence_converts_errors() {
        let items: Vec<Result<i32, &str>> = vec![Ok(1), Err("producer failed")];
        let Dispatch::Sequence(mut seq) = Dispatch::try_sequence(stream::iter(items)) else {
            unreachable!("try_sequence always builds a sequence");
        };

        assert_eq!(seq.next().await.map(Result::ok), Some(Some(1)));
        let err = seq.next().await.and_then(Result::err).map(|e| e.to_string());
        assert_eq!(err.as_deref(), Some("producer failed"));
        assert!(seq.next().await.is_none());
    }

    #[derive(Debug, PartialEq)]
    struct Ping;

    impl Action for Ping {}

    #[test]
    fn test_plain_actions_dispatch_as_actions() {
        let dispatch: Dispatch<Ping> = Ping.into_dispatch();
        assert!(matches!(dispatch, Dispatch::Action(Ping)));
    }

    #[test]
    fn test_json_values_are_classified_on_conversion() {
        let object: Dispatch<Value> = json!({"type": "SET_FOO"}).into_dispatch();
        assert_eq!(object.kind(), "action");

        let null: Dispatch<Value> = json!(null).into_dispatch();
        assert_eq!(null.kind(), "null");

        let number: Dispatch<Value> = json!(42).into_dispatch();
        assert_eq!(number.kind(), "number");
    }

    #[test]
    fn test_built_dispatch_passes_through() {
        let invalid = Dispatch::<Ping>::Invalid { kind: "custom" }.into_dispatch();
        assert_eq!(invalid.kind(), "custom");
    }

    #[test]
    fn test_debug_hides_stream() {
        let seq = Dispatch::sequence(stream::iter(vec![1, 2, 3]));
        assert_eq!(format!("{seq:?}"), "Dispatch::Sequence(<stream>)");
        assert_eq!(format!("{:?}", Dispatch::Action(7)), "Dispatch::Action(7)");
    }
}
