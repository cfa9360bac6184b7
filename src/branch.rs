//! Conditional composition where the taken branch ends the chain.

use std::sync::Arc;

use tracing::trace;

use crate::select::{Guard, Selection};
use crate::{Deferred, DynHandler, Handler, Next};

/// Runs a middleware instead of the outer chain when a condition selects it.
///
/// The condition is called with a `select` continuation. Calling it takes
/// the branch: the middleware runs with the no-op continuation, and its
/// result becomes the branch's result whatever the condition itself
/// returns. A condition that settles without selecting falls through to
/// the outer `next`.
///
/// Falling through hands an outer handler the no-op continuation, so it
/// cannot resume anything further out; a bare continuation simply receives
/// the branch's arguments.
/// ```
/// use futures_util::FutureExt;
/// use pipeware::*;
///
/// let is_even = from_fn(|_cx: (), select: Next<(), i32>, args: Vec<i32>| {
///     if args[0] % 2 == 0 {
///         select.call(&(), args)
///     } else {
///         Deferred::empty()
///     }
/// });
/// let halve = from_fn(|_cx: (), _next: Next<(), i32>, args: Vec<i32>| {
///     Deferred::value(args[0] / 2)
/// });
/// let negate = from_fn(|_cx: (), _next: Next<(), i32>, args: Vec<i32>| {
///     Deferred::value(-args[0])
/// });
///
/// let branch = Branch::new(is_even, halve);
/// let run = |n| branch.call((), Next::handler(negate.clone()), vec![n]).now_or_never().unwrap();
/// assert_eq!(run(8).unwrap(), Some(4));
/// assert_eq!(run(7).unwrap(), Some(-7));
/// ```
pub struct Branch<C, T> {
    guard: Arc<Guard<C, T>>,
}

impl<C, T> Branch<C, T> {
    /// A branch running `middleware` when `condition` selects
    pub fn new<H, M>(condition: H, middleware: M) -> Self
    where
        H: Handler<C, T>,
        M: Handler<C, T>,
    {
        Branch::from_parts(Some(condition.into_dyn()), Some(middleware.into_dyn()))
    }

    /// A branch whose selection has no middleware to run
    pub fn when<H>(condition: H) -> Self
    where
        H: Handler<C, T>,
    {
        Branch::from_parts(Some(condition.into_dyn()), None)
    }

    /// A branch from optional parts; without a condition it always falls through
    pub fn from_parts(
        condition: Option<DynHandler<C, T>>,
        middleware: Option<DynHandler<C, T>>,
    ) -> Self {
        let guard = Arc::new(Guard::new(condition, middleware));
        Branch { guard }
    }

    /// The current condition
    pub fn condition(&self) -> Option<DynHandler<C, T>> {
        self.guard.condition()
    }

    /// The current middleware
    pub fn middleware(&self) -> Option<DynHandler<C, T>> {
        self.guard.middleware()
    }

    /// Replaces the condition used by later invocations
    pub fn set_condition(&self, condition: Option<DynHandler<C, T>>) {
        self.guard.set_condition(condition);
    }

    /// Replaces the middleware run by later selections
    pub fn set_middleware(&self, middleware: Option<DynHandler<C, T>>) {
        self.guard.set_middleware(middleware);
    }
}

impl<C, T> Clone for Branch<C, T> {
    fn clone(&self) -> Self {
        Branch {
            guard: Arc::clone(&self.guard),
        }
    }
}

impl<C, T> Default for Branch<C, T> {
    fn default() -> Self {
        Branch::from_parts(None, None)
    }
}

impl<C, T> Handler<C, T> for Branch<C, T>
where
    C: Clone + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    fn call(&self, cx: C, next: Next<C, T>, args: Vec<T>) -> Deferred<T> {
        let Some(condition) = self.guard.condition() else {
            trace!("branch without condition, resuming outer chain");
            return next.call(&cx, args);
        };

        let selection = Selection::new();
        let select = {
            let guard = Arc::clone(&self.guard);
            let cx = cx.clone();
            selection.select(move |args| match guard.middleware() {
                Some(middleware) => middleware.call(cx.clone(), Next::noop(), args),
                None => Deferred::empty(),
            })
        };

        let evaluated = condition.call(cx.clone(), Next::Rejoin(select), args.clone());
        selection.settle(evaluated, move || next.call(&cx, args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{from_fn, Continuation};
    use futures_util::FutureExt;

    fn selects() -> DynHandler<(), i32> {
        from_fn(|cx: (), select: Next<(), i32>, args: Vec<i32>| {
            let _ = select.call(&cx, args);
            Deferred::value(-1)
        })
        .into_dyn()
    }

    fn value(v: i32) -> DynHandler<(), i32> {
        from_fn(move |_cx: (), _next: Next<(), i32>, _args: Vec<i32>| Deferred::value(v)).into_dyn()
    }

    #[test]
    fn empty_branch_resolves_to_nothing() {
        let branch: Branch<(), i32> = Branch::default();
        let outcome = branch.call((), Next::End, vec![]).now_or_never();
        assert!(matches!(outcome, Some(Ok(None))));
        assert!(branch.condition().is_none());
        assert!(branch.middleware().is_none());
    }

    #[test]
    fn selection_without_middleware_is_empty() {
        let branch = Branch::when(selects());
        let outer = Next::rejoin(Continuation::new(|_| Deferred::value(99)));
        let outcome = branch.call((), outer, vec![1]).now_or_never();
        assert!(matches!(outcome, Some(Ok(None))));
    }

    #[test]
    fn middleware_result_beats_condition_result() {
        let branch = Branch::from_parts(Some(selects()), Some(value(5)));
        let outcome = branch.call((), Next::End, vec![]).now_or_never();
        assert!(matches!(outcome, Some(Ok(Some(5)))));
    }

    #[test]
    fn reconfiguration_applies_to_later_calls() {
        let branch = Branch::new(value(0), value(1));
        branch.set_condition(Some(selects()));
        branch.set_middleware(Some(value(2)));
        let outcome = branch.call((), Next::End, vec![]).now_or_never();
        assert!(matches!(outcome, Some(Ok(Some(2)))));
    }
}
