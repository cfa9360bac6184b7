//! The uniform result type handed back by every handler.
//!
//! Synchronous handlers produce an already settled value, asynchronous
//! ones a pending future. Both are carried by [`Deferred`], so the
//! combinators can await a handler without caring which kind it was.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::future::{self, BoxFuture};
use futures_util::FutureExt;

use crate::{Error, Outcome};

/// A possibly pending handler result
///
/// ```
/// use futures_util::FutureExt;
/// use pipeware::Deferred;
///
/// let now: Deferred<i32> = Deferred::value(1);
/// assert_eq!(now.now_or_never().unwrap().unwrap(), Some(1));
///
/// let later: Deferred<i32> = Deferred::new(async { Ok(Some(2)) });
/// assert_eq!(later.now_or_never().unwrap().unwrap(), Some(2));
/// ```
#[must_use = "a deferred result does nothing unless awaited"]
pub struct Deferred<T> {
    inner: BoxFuture<'static, Outcome<T>>,
}

impl<T: Send + 'static> Deferred<T> {
    /// Wraps a future producing an outcome
    pub fn new<F>(fut: F) -> Self
    where
        F: Future<Output = Outcome<T>> + Send + 'static,
    {
        let inner = fut.boxed();
        Deferred { inner }
    }

    /// An already settled result
    pub fn ready(value: Option<T>) -> Self {
        Deferred::settled(Ok(value))
    }

    /// An already settled value
    pub fn value(value: T) -> Self {
        Deferred::ready(Some(value))
    }

    /// Settles to no value
    pub fn empty() -> Self {
        Deferred::ready(None)
    }

    /// Settles to a failure
    pub fn failed(err: Error) -> Self {
        Deferred::settled(Err(err))
    }

    fn settled(outcome: Outcome<T>) -> Self {
        let inner = future::ready(outcome).boxed();
        Deferred { inner }
    }
}

impl<T: Send + 'static> From<Outcome<T>> for Deferred<T> {
    fn from(outcome: Outcome<T>) -> Self {
        Deferred::settled(outcome)
    }
}

impl<T> Future for Deferred<T> {
    type Output = Outcome<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.get_mut().inner.as_mut().poll(cx)
    }
}

impl<T> std::fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deferred").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settled_values_are_ready_immediately() {
        let empty: Deferred<u8> = Deferred::empty();
        assert!(matches!(empty.now_or_never(), Some(Ok(None))));

        let value = Deferred::value(7u8);
        assert!(matches!(value.now_or_never(), Some(Ok(Some(7)))));
    }

    #[test]
    fn failures_travel_through_the_same_channel() {
        let failed: Deferred<u8> = Deferred::failed(Error::handler("nope"));
        let outcome = failed.now_or_never().expect("settled");
        assert_eq!(outcome.unwrap_err().to_string(), "nope");
    }

    #[test]
    fn outcomes_convert() {
        let outcome: Outcome<&str> = Ok(Some("hi"));
        let deferred: Deferred<&str> = outcome.into();
        assert!(matches!(deferred.now_or_never(), Some(Ok(Some("hi")))));
    }
}
