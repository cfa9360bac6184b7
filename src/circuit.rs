//! Conditional composition where the taken branch owns the outer chain.

use std::sync::Arc;

use tracing::trace;

use crate::select::{Guard, Selection};
use crate::{Deferred, DynHandler, Handler, Next};

/// Like [`Branch`](crate::Branch), but the selected middleware is handed the
/// outer continuation.
///
/// When the condition selects, the middleware decides whether the outer
/// chain resumes (by calling its `next`) or is cut short. Without a
/// middleware, selecting resumes the outer chain with the selection's
/// arguments. A condition that never selects resumes it with the
/// circuit's own arguments.
/// ```
/// use futures_util::FutureExt;
/// use pipeware::*;
///
/// let positive = from_fn(|_cx: (), select: Next<(), i32>, args: Vec<i32>| {
///     if args[0] > 0 { select.call(&(), args) } else { Deferred::empty() }
/// });
/// let bump = from_fn(|_cx: (), next: Next<(), i32>, args: Vec<i32>| {
///     next.call(&(), vec![args[0] + 100])
/// });
/// let echo = from_fn(|_cx: (), _next: Next<(), i32>, args: Vec<i32>| Deferred::value(args[0]));
///
/// let circuit = Circuit::new(positive, bump);
/// let run = |n| circuit.call((), Next::handler(echo.clone()), vec![n]).now_or_never().unwrap();
/// assert_eq!(run(1).unwrap(), Some(101));
/// assert_eq!(run(-1).unwrap(), Some(-1));
/// ```
pub struct Circuit<C, T> {
    guard: Arc<Guard<C, T>>,
}

impl<C, T> Circuit<C, T> {
    /// A circuit handing the outer chain to `middleware` when `condition` selects
    pub fn new<H, M>(condition: H, middleware: M) -> Self
    where
        H: Handler<C, T>,
        M: Handler<C, T>,
    {
        Circuit::from_parts(Some(condition.into_dyn()), Some(middleware.into_dyn()))
    }

    /// A circuit whose selection resumes the outer chain directly
    pub fn when<H>(condition: H) -> Self
    where
        H: Handler<C, T>,
    {
        Circuit::from_parts(Some(condition.into_dyn()), None)
    }

    /// A circuit from optional parts; without a condition it always resumes
    pub fn from_parts(
        condition: Option<DynHandler<C, T>>,
        middleware: Option<DynHandler<C, T>>,
    ) -> Self {
        let guard = Arc::new(Guard::new(condition, middleware));
        Circuit { guard }
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

impl<C, T> Clone for Circuit<C, T> {
    fn clone(&self) -> Self {
        Circuit {
            guard: Arc::clone(&self.guard),
        }
    }
}

impl<C, T> Default for Circuit<C, T> {
    fn default() -> Self {
        Circuit::from_parts(None, None)
    }
}

impl<C, T> Handler<C, T> for Circuit<C, T>
where
    C: Clone + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    fn call(&self, cx: C, next: Next<C, T>, args: Vec<T>) -> Deferred<T> {
        let resume = next.resume(&cx);
        let Some(condition) = self.guard.condition() else {
            trace!("circuit without condition, resuming outer chain");
            return resume.call(args);
        };

        let selection = Selection::new();
        let select = {
            let guard = Arc::clone(&self.guard);
            let cx = cx.clone();
            let resume = resume.clone();
            selection.select(move |args| match guard.middleware() {
                Some(middleware) => middleware.call(cx.clone(), Next::Rejoin(resume.clone()), args),
                None => resume.call(args),
            })
        };

        let evaluated = condition.call(cx, Next::Rejoin(select), args.clone());
        selection.settle(evaluated, move || resume.call(args))
    }
}
