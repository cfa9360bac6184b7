//! Continuations handed to handlers as their `next`.
//!
//! A handler only ever sees a [`Next`]. Calling it resumes whatever comes
//! after the handler: the following element of a pipeline, the outer chain
//! of a branch, or nothing at all. The variant is an explicit tag telling
//! combinators which calling convention the continuation expects.

use std::sync::Arc;

use crate::{Deferred, DynHandler};

type BareFn<T> = dyn Fn(Vec<T>) -> Deferred<T> + Send + Sync;

/// A continuation that takes only the forwarded arguments
///
/// ```
/// use futures_util::FutureExt;
/// use pipeware::*;
///
/// let sum = Continuation::new(|args: Vec<i32>| Deferred::value(args.iter().sum()));
/// let outcome = sum.call(vec![1, 2, 3]).now_or_never().unwrap();
/// assert_eq!(outcome.unwrap(), Some(6));
/// ```
pub struct Continuation<T> {
    kind: Kind<T>,
}

enum Kind<T> {
    Noop,
    Bound(Arc<BareFn<T>>),
}

impl<T: Send + 'static> Continuation<T> {
    /// Wraps a closure as a continuation
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Vec<T>) -> Deferred<T> + Send + Sync + 'static,
    {
        let kind = Kind::Bound(Arc::new(f));
        Continuation { kind }
    }

    /// The sentinel continuation
    ///
    /// Accepts any arguments, performs no action, returns no value.
    pub fn noop() -> Self {
        Continuation { kind: Kind::Noop }
    }

    /// Whether this is the [noop](Continuation::noop) sentinel.
    ///
    /// A bound closure that happens to do nothing is not the sentinel.
    pub fn is_noop(&self) -> bool {
        matches!(self.kind, Kind::Noop)
    }

    /// Resumes with the given arguments
    pub fn call(&self, args: Vec<T>) -> Deferred<T> {
        match &self.kind {
            Kind::Noop => Deferred::empty(),
            Kind::Bound(f) => f(args),
        }
    }
}

impl<T> Clone for Continuation<T> {
    fn clone(&self) -> Self {
        let kind = match &self.kind {
            Kind::Noop => Kind::Noop,
            Kind::Bound(f) => Kind::Bound(Arc::clone(f)),
        };
        Continuation { kind }
    }
}

impl<T> std::fmt::Debug for Continuation<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            Kind::Noop => f.write_str("Continuation::Noop"),
            Kind::Bound(_) => f.write_str("Continuation::Bound"),
        }
    }
}

/// What follows a handler
pub enum Next<C, T> {
    /// Nothing follows
    End,
    /// A bare continuation, resumed with the forwarded arguments only.
    ///
    /// Pipelines hand their elements a continuation bound to the following
    /// position; nested combinators use this tag to rejoin that sequence
    /// instead of opening a disconnected one.
    Rejoin(Continuation<T>),
    /// A full handler, resumed with a context and a continuation of its own
    Handler(DynHandler<C, T>),
}

impl<C, T> Next<C, T>
where
    C: Clone + Send + Sync + 'static,
    T: Send + 'static,
{
    /// The [noop](Continuation::noop) sentinel, tagged for rejoining
    pub fn noop() -> Self {
        Next::Rejoin(Continuation::noop())
    }

    /// A full handler continuation
    pub fn handler<H>(handler: H) -> Self
    where
        H: crate::Handler<C, T>,
    {
        Next::Handler(handler.into_dyn())
    }

    /// A bare continuation
    pub fn rejoin(continuation: Continuation<T>) -> Self {
        Next::Rejoin(continuation)
    }

    /// Whether nothing follows
    pub fn is_end(&self) -> bool {
        matches!(self, Next::End)
    }

    /// Whether this is a bare continuation
    pub fn is_rejoin(&self) -> bool {
        matches!(self, Next::Rejoin(_))
    }

    /// Resumes the outer chain with `args`.
    ///
    /// An outer handler is given the no-op continuation, so it cannot in
    /// turn resume anything further out.
    /// ```
    /// use futures_util::FutureExt;
    /// use pipeware::*;
    ///
    /// let echo = from_fn(|_cx: (), next: Next<(), i32>, args: Vec<i32>| {
    ///     assert!(next.is_rejoin());
    ///     Deferred::value(args[0])
    /// });
    /// let next = Next::handler(echo);
    /// let outcome = next.call(&(), vec![5]).now_or_never().unwrap();
    /// assert_eq!(outcome.unwrap(), Some(5));
    /// ```
    pub fn call(&self, cx: &C, args: Vec<T>) -> Deferred<T> {
        match self {
            Next::End => Deferred::empty(),
            Next::Rejoin(continuation) => continuation.call(args),
            Next::Handler(handler) => handler.call(cx.clone(), Next::noop(), args),
        }
    }

    /// The same resumption as [call](Next::call), as a continuation value.
    ///
    /// Lets the caller decide when, or whether, the outer chain resumes.
    pub fn resume(&self, cx: &C) -> Continuation<T> {
        match self {
            Next::End => Continuation::noop(),
            Next::Rejoin(continuation) => continuation.clone(),
            Next::Handler(handler) => {
                let handler = Arc::clone(handler);
                let cx = cx.clone();
                Continuation::new(move |args| handler.call(cx.clone(), Next::noop(), args))
            }
        }
    }
}

impl<C, T> Clone for Next<C, T> {
    fn clone(&self) -> Self {
        match self {
            Next::End => Next::End,
            Next::Rejoin(continuation) => Next::Rejoin(continuation.clone()),
            Next::Handler(handler) => Next::Handler(Arc::clone(handler)),
        }
    }
}

impl<C, T> Default for Next<C, T> {
    fn default() -> Self {
        Next::End
    }
}

impl<C, T> From<Continuation<T>> for Next<C, T> {
    fn from(continuation: Continuation<T>) -> Self {
        Next::Rejoin(continuation)
    }
}

impl<C, T> std::fmt::Debug for Next<C, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Next::End => f.write_str("End"),
            Next::Rejoin(continuation) => f.debug_tuple("Rejoin").field(continuation).finish(),
            Next::Handler(_) => f.write_str("Handler"),
        }
    }
}
