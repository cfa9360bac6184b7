//! Test doubles shared by the integration suites.
//!
//! Every double records the arguments it receives into `arr` and a marker
//! into the context. Values of `-1` mark handlers or arguments that must
//! never show up in a log.

#![allow(dead_code)]

use std::sync::Arc;

use parking_lot::Mutex;
use pipeware::*;
use tracing_subscriber::EnvFilter;

pub type Log = Arc<Mutex<Vec<i32>>>;
pub type Ware = DynHandler<Log, i32>;

pub const MSG_RIGHT: &str = "Work correctly!";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn log() -> Log {
    Log::default()
}

pub fn range(from: i32, to: i32) -> Vec<i32> {
    (from..to).collect()
}

pub fn concat(parts: &[Vec<i32>]) -> Vec<i32> {
    parts.concat()
}

pub fn snapshot(log: &Log) -> Vec<i32> {
    log.lock().clone()
}

async fn record(log: &Log, values: impl IntoIterator<Item = i32>) {
    tokio::task::yield_now().await;
    log.lock().extend(values);
}

/// Records its arguments and `enter`, calls `next` with `forward`, records
/// what `next` settled to and `leave`, then replies.
pub fn mid_ware(arr: &Log, forward: &[i32], reply: i32, enter: i32, leave: i32) -> Ware {
    let arr = Arc::clone(arr);
    let forward = forward.to_vec();
    from_async(move |cx: Log, next: Next<Log, i32>, args: Vec<i32>| {
        let arr = Arc::clone(&arr);
        let forward = forward.clone();
        async move {
            record(&arr, args).await;
            record(&cx, [enter]).await;
            let rets = next.call(&cx, forward).await?;
            record(&arr, rets).await;
            record(&cx, [leave]).await;
            Outcome::Ok(Some(reply))
        }
    })
    .into_dyn()
}

/// Records its arguments and `enter`, then replies without calling `next`.
pub fn end_ware(arr: &Log, reply: i32, enter: i32) -> Ware {
    let arr = Arc::clone(arr);
    from_async(move |cx: Log, _next: Next<Log, i32>, args: Vec<i32>| {
        let arr = Arc::clone(&arr);
        async move {
            record(&arr, args).await;
            record(&cx, [enter]).await;
            Outcome::Ok(Some(reply))
        }
    })
    .into_dyn()
}

/// A condition that selects: calls its `select` continuation.
pub fn true_ware(arr: &Log, forward: &[i32], reply: i32, enter: i32, leave: i32) -> Ware {
    mid_ware(arr, forward, reply, enter, leave)
}

/// A condition that settles without selecting.
pub fn false_ware(arr: &Log, reply: i32, enter: i32) -> Ware {
    end_ware(arr, reply, enter)
}

/// A handler that must never run.
pub fn never(arr: &Log) -> Ware {
    mid_ware(arr, &[-1], -1, -1, -1)
}

pub fn err_before_next(arr: &Log, enter: i32) -> Ware {
    let arr = Arc::clone(arr);
    from_async(move |cx: Log, _next: Next<Log, i32>, args: Vec<i32>| {
        let arr = Arc::clone(&arr);
        async move {
            record(&arr, args).await;
            record(&cx, [enter]).await;
            Outcome::Err(Error::handler(MSG_RIGHT))
        }
    })
    .into_dyn()
}

pub fn err_after_next(arr: &Log, forward: &[i32], enter: i32, leave: i32) -> Ware {
    let arr = Arc::clone(arr);
    let forward = forward.to_vec();
    from_async(move |cx: Log, next: Next<Log, i32>, args: Vec<i32>| {
        let arr = Arc::clone(&arr);
        let forward = forward.clone();
        async move {
            record(&arr, args).await;
            record(&cx, [enter]).await;
            let rets = next.call(&cx, forward).await?;
            record(&arr, rets).await;
            record(&cx, [leave]).await;
            Outcome::Err(Error::handler(MSG_RIGHT))
        }
    })
    .into_dyn()
}

/// Calls `next` a second time after the first call settled.
pub fn multi_next(arr: &Log, forward: &[i32], enter: i32, leave: i32) -> Ware {
    let arr = Arc::clone(arr);
    let forward = forward.to_vec();
    from_async(move |cx: Log, next: Next<Log, i32>, args: Vec<i32>| {
        let arr = Arc::clone(&arr);
        let forward = forward.clone();
        async move {
            record(&arr, args).await;
            record(&cx, [enter]).await;
            let rets = next.call(&cx, forward).await?;
            record(&arr, rets).await;
            record(&cx, [leave]).await;
            next.call(&cx, vec![-1]).await?;
            record(&arr, [-1]).await;
            Outcome::Ok(Some(-1))
        }
    })
    .into_dyn()
}

/// Synchronous: records, then hands back whatever `next` defers to.
pub fn mid_sync(arr: &Log, forward: &[i32], enter: i32) -> Ware {
    let arr = Arc::clone(arr);
    let forward = forward.to_vec();
    from_fn(move |cx: Log, next: Next<Log, i32>, args: Vec<i32>| {
        arr.lock().extend(args);
        cx.lock().push(enter);
        next.call(&cx, forward.clone())
    })
    .into_dyn()
}

/// Synchronous: records, then replies immediately.
pub fn end_sync(arr: &Log, reply: i32, enter: i32) -> Ware {
    let arr = Arc::clone(arr);
    from_fn(move |cx: Log, _next: Next<Log, i32>, args: Vec<i32>| {
        arr.lock().extend(args);
        cx.lock().push(enter);
        Deferred::value(reply)
    })
    .into_dyn()
}

/// Records exactly the arguments it receives into `seen`, then stops.
pub fn witness(seen: &Arc<Mutex<Vec<Vec<i32>>>>) -> Ware {
    let seen = Arc::clone(seen);
    from_fn(move |_cx: Log, _next: Next<Log, i32>, args: Vec<i32>| {
        seen.lock().push(args);
        Deferred::empty()
    })
    .into_dyn()
}

/// Runs a top-level invocation and appends its result to `arr`, the way
/// a caller would consume it.
pub async fn run<H>(
    handler: &H,
    arr: &Log,
    cx: &Log,
    next: Next<Log, i32>,
    args: Vec<i32>,
) -> Outcome<i32>
where
    H: Handler<Log, i32>,
{
    let outcome = handler.call(Arc::clone(cx), next, args).await;
    if let Ok(Some(value)) = &outcome {
        arr.lock().push(*value);
    }
    outcome
}
