#![forbid(unsafe_code)]

//! A small pool of worker threads running named tasks.
//!
//! Callers register functions in a [`TaskRegistry`], start a [`Dispatcher`] and submit
//! `(name, arguments)` pairs. Every submission returns a [`TaskHandle`] future that resolves
//! exactly once, with the task's JSON result or a [`DispatchError`].

mod dispatcher;
pub mod error;
mod handle;
mod registry;

pub use dispatcher::{Dispatcher, PoolOptions};
pub use error::{DispatchError, Result};
pub use handle::TaskHandle;
pub use registry::{TaskFn, TaskRegistry};

/// Monotonically increasing id of a submitted task.
pub type TaskId = u64;
