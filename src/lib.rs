#![doc = include_str!("../README.md")]

mod branch;
mod circuit;
mod compat;
mod deferred;
mod error;
mod handler;
mod next;
mod pipeline;
mod select;

pub use branch::*;
pub use circuit::*;
pub use deferred::*;
pub use error::*;
pub use handler::*;
pub use next::*;
pub use pipeline::*;

/// Builds a [`Pipeline`] from handlers of any type, in order
///
/// ```
/// use pipeware::*;
///
/// let noop = from_fn(|cx: (), next: Next<(), u8>, args: Vec<u8>| next.call(&cx, args));
/// let pipeline = pipeline![noop.clone(), noop, Pipeline::empty()];
/// assert_eq!(pipeline.len(), 3);
/// ```
#[macro_export]
macro_rules! pipeline {
    ($($handler:expr),* $(,)?) => {
        $crate::Pipeline::new(::std::vec![$($crate::Handler::into_dyn($handler)),*])
    };
}
