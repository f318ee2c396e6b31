//! Error types for store construction, dispatch and reducer composition.
//!
//! Reducer and sequence failures are carried as-is inside [`StoreError`]
//! (`#[error(transparent)]`), so callers see the message the reducer or the
//! sequence producer raised.

use thiserror::Error;

/// Boxed error used as the source of reducer and sequence failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error raised by a reducer while computing the next state.
///
/// # Examples
///
/// ```
/// use aredux_core::error::ReducerError;
///
/// let err = ReducerError::new("counter overflow");
/// assert_eq!(err.to_string(), "counter overflow");
/// ```
#[derive(Error, Debug)]
#[error("{message}")]
pub struct ReducerError {
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl ReducerError {
    /// Create a reducer error with a message
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Create a reducer error wrapping an underlying cause
    #[must_use]
    pub fn with_source(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// The message the reducer raised
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Error raised by an action sequence while producing its next action.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct SequenceError {
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl SequenceError {
    /// Create a sequence error with a message
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Create a sequence error wrapping an underlying cause
    #[must_use]
    pub fn with_source(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// The message the sequence raised
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for SequenceError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for SequenceError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<BoxError> for SequenceError {
    fn from(source: BoxError) -> Self {
        Self {
            message: source.to_string(),
            source: Some(source),
        }
    }
}

/// Errors surfaced by the store and the reducer combinator.
///
/// Every error is returned to the immediate caller; nothing is retried or
/// swallowed, and transitions applied before a failure stay applied.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Invalid construction input
    ///
    /// Raised for a malformed reducer mapping (duplicate key) or when the
    /// default scheduler cannot find a Tokio runtime.
    #[error("Invalid store configuration: {0}")]
    Configuration(String),

    /// The dispatched value is neither a plain action nor an action sequence
    #[error("Dispatched action is neither a plain action nor an asynchronous action sequence (got {kind})")]
    InvalidAction {
        /// Kind of value that was dispatched
        kind: &'static str,
    },

    /// An unsubscribe handle was used more than once
    #[error("Unsubscribe called multiple times")]
    DoubleUnsubscribe,

    /// The reducer failed while applying a transition
    #[error(transparent)]
    Reducer(#[from] ReducerError),

    /// The action sequence failed while producing an action
    #[error(transparent)]
    Sequence(#[from] SequenceError),
}

impl StoreError {
    /// Short, stable label for logs and metrics
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::InvalidAction { .. } => "invalid_action",
            Self::DoubleUnsubscribe => "double_unsubscribe",
            Self::Reducer(_) => "reducer",
            Self::Sequence(_) => "sequence",
        }
    }
}
