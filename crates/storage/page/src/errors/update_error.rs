use crate::errors::header_error::HeaderError;
use crate::errors::slot_error::SlotError;
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum UpdateError {
    #[error("slot {slot_id} is invalid or deleted")]
    InvalidSlot { slot_id: usize },
    #[error("row of length {row_len} does not fit in existing slot of length {slot_len}")]
    DoesNotFit { row_len: usize, slot_len: usize },
    #[error("Error while accessing slot array")]
    SlotError(#[from] SlotError),
    #[error("Error while accessing header")]
    HeaderError(#[from] HeaderError),
}
