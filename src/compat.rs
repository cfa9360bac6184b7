//! Compatibility with do-notation
//!
//! Handlers that stitch several deferred steps together quickly drift into
//! nested closures. The `m!` macro flattens them.
//!```
//! use ::do_notation::m;
//! use futures_util::FutureExt;
//! use pipeware::*;
//!
//! let double = Continuation::new(|args: Vec<i32>| Deferred::value(args[0] * 2));
//! let plus_one = Continuation::new(|args: Vec<i32>| Deferred::value(args[0] + 1));
//!
//! let composed: Deferred<i32> = m! {
//!     doubled <- double.call(vec![20]);
//!     plus_one.call(doubled.into_iter().collect())
//! };
//!
//! let outcome = composed.now_or_never().unwrap();
//! assert_eq!(outcome.unwrap(), Some(41));
//!```
use crate::*;
use ::do_notation::Lift;

impl<T: Send + 'static> Lift<Option<T>> for Deferred<T> {
    /// Creates a settled deferred from a value
    ///
    /// see [ready](Deferred::ready)
    fn lift(a: Option<T>) -> Self {
        Deferred::ready(a)
    }
}

impl<T: Send + 'static> Deferred<T> {
    /// Chains deferred results
    ///
    /// Failures short-circuit, `f` only sees a successful result.
    pub fn and_then<F>(self, f: F) -> Deferred<T>
    where
        F: FnOnce(Option<T>) -> Deferred<T> + Send + 'static,
    {
        Deferred::new(async move {
            let value = self.await?;
            f(value).await
        })
    }
}
