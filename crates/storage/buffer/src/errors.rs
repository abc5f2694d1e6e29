use disk::DiskError;
use thiserror::Error;

/// Buffer pool error.
#[derive(Debug, Error)]
pub enum BufferError {
    /// Every frame is valid and pinned; no victim could be chosen after
    /// sweeping the clock twice around the pool.
    #[error("buffer pool exhausted: every frame is pinned")]
    BufferFull,
    /// The disk manager failed to read or write a page.
    #[error("disk I/O error")]
    Disk(#[from] DiskError),
}
