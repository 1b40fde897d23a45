#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Levels(#[from] strata_levels::Error),
    #[error("dense crossing kernels must be initialized before counting")]
    KernelsNotInitialized,
    #[error("failed to start the dense kernel thread pool: {0}")]
    KernelPool(#[from] rayon::ThreadPoolBuildError),
    #[error("unknown fixture: {name}")]
    UnknownFixture { name: String },
    #[error("layout validation failed: {0}")]
    Validation(String),
    #[error(transparent)]
    Dispatch(#[from] strata_pool::DispatchError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
