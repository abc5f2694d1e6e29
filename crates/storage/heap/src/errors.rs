use binary_helpers::BinaryError;
use buffer::BufferError;
use page::PageError;
use thiserror::Error;

/// Heap-file error.
#[derive(Debug, Error)]
pub enum HeapError {
    /// A record cannot fit even on a freshly-allocated, empty page.
    #[error("record of {record_len} bytes exceeds the maximum record size of {max_len} bytes")]
    RecordTooLarge { record_len: usize, max_len: usize },
    /// The requested record does not exist (out-of-range slot or tombstoned).
    #[error("record {0:?} not found")]
    NotFound(crate::rid::Rid),
    #[error(transparent)]
    Buffer(#[from] BufferError),
    #[error(transparent)]
    Page(#[from] PageError),
    #[error(transparent)]
    Binary(#[from] BinaryError),
}

/// Convenience alias for heap-file results.
pub type HeapResult<T> = Result<T, HeapError>;
