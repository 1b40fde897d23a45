use crate::TaskId;
use crate::error::{DispatchError, Result};
use futures::channel::oneshot;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Future of one submitted task. Resolves exactly once.
#[derive(Debug)]
#[must_use = "a task handle does nothing unless awaited"]
pub struct TaskHandle {
    id: TaskId,
    rx: oneshot::Receiver<Result<Value>>,
}

impl TaskHandle {
    pub(crate) fn new(id: TaskId, rx: oneshot::Receiver<Result<Value>>) -> Self {
        Self { id, rx }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Blocks the current thread until the task resolves.
    pub fn wait(self) -> Result<Value> {
        futures::executor::block_on(self)
    }
}

impl Future for TaskHandle {
    type Output = Result<Value>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        // A dropped sender means the coordinator went away before answering.
        Pin::new(&mut self.get_mut().rx)
            .poll(cx)
            .map(|r| r.unwrap_or_else(|_| Err(DispatchError::Shutdown)))
    }
}
