use std::sync::Arc;

/// The result every handler eventually settles to.
///
/// `Ok(None)` is "no value", the result of an exhausted pipeline or an
/// absent continuation.
pub type Outcome<T> = Result<Option<T>, Error>;

/// Failures surfaced by an invocation tree.
///
/// Cloneable, as a selection's outcome may be observed both by the
/// condition that triggered it and by the combinator that owns it.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// A pipeline continuation was invoked a second time.
    #[error("next() is called multiple times")]
    Reentrant {
        /// The position the repeated call tried to advance to
        position: usize,
    },
    /// A composed handler failed
    #[error(transparent)]
    Handler(Arc<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Wraps a handler failure
    ///
    /// ```
    /// use pipeware::Error;
    /// let err = Error::handler("Work correctly!");
    /// assert_eq!(err.to_string(), "Work correctly!");
    /// ```
    pub fn handler<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Error::Handler(Arc::from(err.into()))
    }

    /// True when this is the double-invocation guard tripping
    pub fn is_reentrant(&self) -> bool {
        matches!(self, Error::Reentrant { .. })
    }
}
