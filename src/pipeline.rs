//! Sequential composition.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, trace};

use crate::{Continuation, Deferred, DynHandler, Error, Handler, Next};

/// Runs handlers in order, each one deciding when the next one starts.
///
/// Every element receives a continuation bound to the following position.
/// Once the last element calls it, the outer `next` of the invocation
/// takes over: a bare continuation is resumed with the forwarded arguments,
/// a full handler is called with a continuation that keeps advancing this
/// pipeline.
///
/// Cloning yields another handle to the same, live list of handlers.
/// ```
/// use futures_util::FutureExt;
/// use pipeware::*;
///
/// let add = |n: i32| from_fn(move |cx: (), next: Next<(), i32>, args: Vec<i32>| {
///     next.call(&cx, args.into_iter().map(|a| a + n).collect())
/// });
/// let total = from_fn(|_cx: (), _next: Next<(), i32>, args: Vec<i32>| {
///     Deferred::value(args.into_iter().sum())
/// });
///
/// let pipeline = pipeline![add(1), add(10)];
/// pipeline.push(total);
///
/// let outcome = pipeline.call((), Next::End, vec![0, 1]).now_or_never().unwrap();
/// assert_eq!(outcome.unwrap(), Some(23));
/// ```
pub struct Pipeline<C, T> {
    handlers: Arc<RwLock<Vec<DynHandler<C, T>>>>,
}

impl<C, T> Pipeline<C, T> {
    /// A pipeline running `handlers` in order
    pub fn new<I>(handlers: I) -> Self
    where
        I: IntoIterator<Item = DynHandler<C, T>>,
    {
        let handlers = handlers.into_iter().collect();
        Pipeline {
            handlers: Arc::new(RwLock::new(handlers)),
        }
    }

    /// A pipeline without handlers; it only ever resumes its outer `next`
    pub fn empty() -> Self {
        Pipeline::new(std::iter::empty())
    }

    /// Appends a handler.
    ///
    /// An invocation that is already running picks it up once it reaches
    /// that position.
    pub fn push<H>(&self, handler: H) -> &Self
    where
        H: Handler<C, T>,
    {
        self.handlers.write().push(handler.into_dyn());
        self
    }

    /// Number of handlers currently in the list
    pub fn len(&self) -> usize {
        self.handlers.read().len()
    }

    /// Whether the list holds no handler
    pub fn is_empty(&self) -> bool {
        self.handlers.read().is_empty()
    }
}

impl<C, T> Clone for Pipeline<C, T> {
    fn clone(&self) -> Self {
        Pipeline {
            handlers: Arc::clone(&self.handlers),
        }
    }
}

impl<C, T> Default for Pipeline<C, T> {
    fn default() -> Self {
        Pipeline::empty()
    }
}

impl<C, T> FromIterator<DynHandler<C, T>> for Pipeline<C, T> {
    fn from_iter<I: IntoIterator<Item = DynHandler<C, T>>>(iter: I) -> Self {
        Pipeline::new(iter)
    }
}

impl<C, T> Extend<DynHandler<C, T>> for Pipeline<C, T> {
    fn extend<I: IntoIterator<Item = DynHandler<C, T>>>(&mut self, iter: I) {
        self.handlers.write().extend(iter);
    }
}

impl<C, T> std::fmt::Debug for Pipeline<C, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline").field("len", &self.len()).finish()
    }
}

impl<C, T> Handler<C, T> for Pipeline<C, T>
where
    C: Clone + Send + Sync + 'static,
    T: Send + 'static,
{
    fn call(&self, cx: C, next: Next<C, T>, args: Vec<T>) -> Deferred<T> {
        let run = Arc::new(Run {
            handlers: Arc::clone(&self.handlers),
            cx,
            next,
            last: Mutex::new(None),
            tripped: Mutex::new(None),
        });
        let advanced = Run::advance(&run, 0, args);
        Deferred::new(async move {
            let outcome = advanced.await;
            // a repeated advance fails the run even if its deferred was dropped
            let tripped = run.tripped.lock().take();
            match tripped {
                Some(err) => Err(err),
                None => outcome,
            }
        })
    }
}

/// State of one pipeline invocation
struct Run<C, T> {
    handlers: Arc<RwLock<Vec<DynHandler<C, T>>>>,
    cx: C,
    next: Next<C, T>,
    /// Highest position advanced to so far
    last: Mutex<Option<usize>>,
    /// First reentrancy failure of this run
    tripped: Mutex<Option<Error>>,
}

impl<C, T> Run<C, T>
where
    C: Clone + Send + Sync + 'static,
    T: Send + 'static,
{
    fn advance(run: &Arc<Self>, position: usize, args: Vec<T>) -> Deferred<T> {
        {
            let mut last = run.last.lock();
            if last.is_some_and(|last| last >= position) {
                debug!(position, "pipeline continuation invoked again");
                let err = Error::Reentrant { position };
                run.tripped.lock().get_or_insert_with(|| err.clone());
                return Deferred::failed(err);
            }
            *last = Some(position);
        }

        // never hold the lock while a handler runs, it may push
        let (handler, len) = {
            let handlers = run.handlers.read();
            (handlers.get(position).cloned(), handlers.len())
        };

        if let Some(handler) = handler {
            trace!(position, len, "advancing pipeline");
            return handler.call(run.cx.clone(), Run::bind(run, position + 1), args);
        }
        if position != len {
            return Deferred::empty();
        }
        match &run.next {
            Next::End => Deferred::empty(),
            Next::Rejoin(continuation) => {
                trace!(len, "pipeline exhausted, rejoining outer sequence");
                continuation.call(args)
            }
            Next::Handler(handler) => {
                trace!(len, "pipeline exhausted, calling outer handler");
                handler.call(run.cx.clone(), Run::bind(run, position + 1), args)
            }
        }
    }

    fn bind(run: &Arc<Self>, position: usize) -> Next<C, T> {
        let run = Arc::clone(run);
        Next::Rejoin(Continuation::new(move |args| {
            Run::advance(&run, position, args)
        }))
    }
}
