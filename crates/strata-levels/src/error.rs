#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown node: {id}")]
    UnknownNode { id: String },
    #[error("duplicate node id: {id}")]
    DuplicateNode { id: String },
    #[error("node {id} has a rank span of 0")]
    ZeroRankSpan { id: String },
    #[error("node {id} has an invalid width: {width}")]
    InvalidWidth { id: String, width: f64 },
    #[error("edge {src} -> {dst} does not point to a lower rank ({src_rank} -> {dst_rank})")]
    EdgeNotDownward {
        src: String,
        dst: String,
        src_rank: usize,
        dst_rank: usize,
    },
    #[error("rank {rank}: order is not a permutation of 0..{len}")]
    NotAPermutation { rank: usize, len: usize },
    #[error("expected {expected} ranks, got {actual}")]
    RankCountMismatch { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
