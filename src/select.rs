//! Pieces shared by [`Branch`](crate::Branch) and [`Circuit`](crate::Circuit):
//! the reconfigurable condition/middleware pair and the record of a
//! `select` call.

use std::sync::Arc;

use futures_util::future::Shared;
use futures_util::FutureExt;
use parking_lot::{Mutex, RwLock};
use tracing::trace;

use crate::{Continuation, Deferred, DynHandler};

/// Condition and middleware of a conditional combinator
pub(crate) struct Guard<C, T> {
    condition: RwLock<Option<DynHandler<C, T>>>,
    middleware: RwLock<Option<DynHandler<C, T>>>,
}

impl<C, T> Guard<C, T> {
    pub(crate) fn new(
        condition: Option<DynHandler<C, T>>,
        middleware: Option<DynHandler<C, T>>,
    ) -> Self {
        Guard {
            condition: RwLock::new(condition),
            middleware: RwLock::new(middleware),
        }
    }

    pub(crate) fn condition(&self) -> Option<DynHandler<C, T>> {
        self.condition.read().clone()
    }

    pub(crate) fn middleware(&self) -> Option<DynHandler<C, T>> {
        self.middleware.read().clone()
    }

    pub(crate) fn set_condition(&self, condition: Option<DynHandler<C, T>>) {
        *self.condition.write() = condition;
    }

    pub(crate) fn set_middleware(&self, middleware: Option<DynHandler<C, T>>) {
        *self.middleware.write() = middleware;
    }
}

type Taken<T> = Shared<Deferred<T>>;

/// Whether, and with what result, a condition selected its branch
pub(crate) struct Selection<T> {
    taken: Mutex<Vec<Taken<T>>>,
}

impl<T> Selection<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Selection {
            taken: Mutex::new(Vec::new()),
        })
    }

    /// The `select` continuation handed to a condition.
    ///
    /// `take` produces the branch's work from the arguments `select` was
    /// called with. The work is shared: the condition may await it, and
    /// whatever it settles to is also what [settle](Selection::settle)
    /// returns. Every call is kept and eventually driven; the latest one
    /// decides the result.
    pub(crate) fn select<F>(self: &Arc<Self>, take: F) -> Continuation<T>
    where
        F: Fn(Vec<T>) -> Deferred<T> + Send + Sync + 'static,
    {
        let selection = Arc::clone(self);
        Continuation::new(move |args| {
            trace!("branch selected");
            let work = take(args).shared();
            selection.taken.lock().push(work.clone());
            Deferred::new(work)
        })
    }

    /// Settles the combinator once its condition has.
    ///
    /// A failed condition fails the combinator. Otherwise every selection
    /// is driven to completion in the order it was made and the latest one
    /// is the result; `fallback` runs when nothing was selected. Earlier
    /// selections only run for their effects, their outcomes belong to
    /// whoever awaited them.
    pub(crate) fn settle<F>(self: Arc<Self>, condition: Deferred<T>, fallback: F) -> Deferred<T>
    where
        F: FnOnce() -> Deferred<T> + Send + 'static,
    {
        Deferred::new(async move {
            condition.await?;
            let mut taken = std::mem::take(&mut *self.taken.lock());
            let Some(latest) = taken.pop() else {
                trace!("condition did not select, falling through");
                return fallback().await;
            };
            for earlier in taken {
                let _ = earlier.await;
            }
            latest.await
        })
    }
}
