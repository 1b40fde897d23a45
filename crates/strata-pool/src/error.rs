use crate::TaskId;

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("task {name} failed: {message}")]
    Task { name: String, message: String },
    #[error("task {name} panicked: {message}")]
    WorkerPanicked { name: String, message: String },
    #[error("unknown task: {name}")]
    UnknownTask { name: String },
    #[error("task {id} timed out")]
    TimedOut { id: TaskId },
    #[error("task {id} was cancelled")]
    Cancelled { id: TaskId },
    #[error("dispatcher has shut down")]
    Shutdown,
    #[error("failed to spawn a worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DispatchError>;
