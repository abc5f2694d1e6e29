use std::array::TryFromSliceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BinaryError {
    #[error("attempt to read {expected} bytes from offset {from_offset}, but the slice does not contain that range")]
    BytesSliceSizeMismatch { expected: usize, from_offset: usize },
    #[error("error converting a slice")]
    SliceConversionError(#[from] TryFromSliceError),
    #[error("size mismatch writing data: source {src} vs target {target}")]
    WriteErrorSliceSizeMismatch { src: usize, target: usize },
}
