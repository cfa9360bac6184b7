//! The handler calling convention and adapters for closures.
//!
//! Everything composable implements [`Handler`]: the three combinators as
//! well as caller supplied closures wrapped with [`from_fn`] (synchronous)
//! or [`from_async`] (asynchronous).

use std::future::Future;
use std::sync::Arc;

use crate::{Deferred, Next, Outcome};

/// A composable unit of work
///
/// Receives the shared context, the continuation describing what follows
/// it, and the arguments of this invocation. `next` may be called at most
/// once; a pipeline reports a second call as
/// [`Error::Reentrant`](crate::Error::Reentrant).
///
/// The context is expected to be a cheap shared handle (an `Arc` around
/// whatever state the handlers mutate); it is cloned into nested calls,
/// never copied.
pub trait Handler<C, T>: Send + Sync + 'static {
    /// Runs the handler, returning its possibly pending result
    fn call(&self, cx: C, next: Next<C, T>, args: Vec<T>) -> Deferred<T>;

    /// Erases the concrete handler type
    fn into_dyn(self) -> DynHandler<C, T>
    where
        Self: Sized,
    {
        Arc::new(self)
    }
}

/// A type erased, shareable handler
pub type DynHandler<C, T> = Arc<dyn Handler<C, T>>;

impl<C: 'static, T: 'static> Handler<C, T> for DynHandler<C, T> {
    fn call(&self, cx: C, next: Next<C, T>, args: Vec<T>) -> Deferred<T> {
        (**self).call(cx, next, args)
    }

    fn into_dyn(self) -> DynHandler<C, T> {
        self
    }
}

/// A synchronous closure handler, see [from_fn]
#[derive(Clone)]
pub struct FnHandler<F> {
    f: F,
}

/// Wraps a synchronous closure as a handler.
///
/// The closure returns its [`Deferred`] directly: a settled value
/// ([`Deferred::value`], [`Deferred::empty`], [`Deferred::failed`]) or the
/// deferred it got back from `next`.
/// ```
/// use futures_util::FutureExt;
/// use pipeware::*;
///
/// let forward = from_fn(|cx: (), next: Next<(), i32>, args: Vec<i32>| {
///     let doubled = args.iter().map(|a| a * 2).collect();
///     next.call(&cx, doubled)
/// });
/// let last = from_fn(|_cx: (), _next: Next<(), i32>, args: Vec<i32>| {
///     Deferred::value(args.iter().sum())
/// });
///
/// let outcome = pipeline![forward, last]
///     .call((), Next::End, vec![1, 2])
///     .now_or_never()
///     .unwrap();
/// assert_eq!(outcome.unwrap(), Some(6));
/// ```
pub fn from_fn<C, T, F>(f: F) -> FnHandler<F>
where
    F: Fn(C, Next<C, T>, Vec<T>) -> Deferred<T> + Send + Sync + 'static,
{
    FnHandler { f }
}

impl<C, T, F> Handler<C, T> for FnHandler<F>
where
    F: Fn(C, Next<C, T>, Vec<T>) -> Deferred<T> + Send + Sync + 'static,
{
    fn call(&self, cx: C, next: Next<C, T>, args: Vec<T>) -> Deferred<T> {
        (self.f)(cx, next, args)
    }
}

/// An asynchronous closure handler, see [from_async]
#[derive(Clone)]
pub struct AsyncHandler<F> {
    f: F,
}

/// Wraps a closure returning a future as a handler.
/// ```
/// use futures_util::FutureExt;
/// use pipeware::*;
///
/// let handler = from_async(|cx: (), next: Next<(), i32>, args: Vec<i32>| async move {
///     let after = next.call(&cx, args).await?;
///     Outcome::Ok(after.map(|v| v + 1))
/// });
/// let outcome = handler
///     .call((), Next::rejoin(Continuation::new(|_| Deferred::value(41))), vec![])
///     .now_or_never()
///     .unwrap();
/// assert_eq!(outcome.unwrap(), Some(42));
/// ```
pub fn from_async<C, T, F, Fut>(f: F) -> AsyncHandler<F>
where
    F: Fn(C, Next<C, T>, Vec<T>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Outcome<T>> + Send + 'static,
{
    AsyncHandler { f }
}

impl<C, T, F, Fut> Handler<C, T> for AsyncHandler<F>
where
    F: Fn(C, Next<C, T>, Vec<T>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Outcome<T>> + Send + 'static,
    T: Send + 'static,
{
    fn call(&self, cx: C, next: Next<C, T>, args: Vec<T>) -> Deferred<T> {
        Deferred::new((self.f)(cx, next, args))
    }
}
