use crate::errors::slot_error::SlotError;
use binary_helpers::le::{read_le, write_le};

/// Fixed size of a slot in bytes.
///
/// Layout: `offset:u16 | len:u16 | deleted:u8 | pad:u8 | _reserved:u16`. The
/// four named fields occupy the first 6 bytes; the page-fill scenario's own
/// arithmetic (`free_start + row_len + 8 > free_end`) fixes the padded total
/// at 8.
pub(crate) const SLOT_SIZE: usize = 8;

const OFFSET_FIELD: usize = 0;
const LEN_FIELD: usize = 2;
const DELETED_FIELD: usize = 4;

/// A zero-copy read-only view into an 8-byte slot entry.
#[derive(Debug)]
pub(crate) struct SlotRef<'a> {
    /// Logical index of the slot within the page.
    slot_index: u32,
    bytes: &'a [u8; SLOT_SIZE],
}

impl<'a> SlotRef<'a> {
    #[inline]
    pub(super) fn from_raw(slot_index: u32, bytes: &'a [u8]) -> Result<Self, SlotError> {
        if bytes.len() != SLOT_SIZE {
            return Err(SlotError::SlotSizeMismatch {
                expected_size: SLOT_SIZE,
                actual_size: bytes.len(),
            });
        }

        let bytes_array: &[u8; SLOT_SIZE] = match bytes.try_into() {
            Ok(arr) => arr,
            Err(_) => unreachable!("bytes.len() == SLOT_SIZE but try_into() failed"),
        };

        Ok(Self {
            slot_index,
            bytes: bytes_array,
        })
    }

    #[inline]
    pub(crate) fn slot_index(&self) -> u32 {
        self.slot_index
    }

    #[inline]
    pub(crate) fn offset(&self) -> Result<u16, SlotError> {
        Ok(read_le::<u16>(self.bytes, OFFSET_FIELD)?)
    }

    #[inline]
    pub(crate) fn length(&self) -> Result<u16, SlotError> {
        Ok(read_le::<u16>(self.bytes, LEN_FIELD)?)
    }

    #[inline]
    pub(crate) fn is_deleted(&self) -> bool {
        self.bytes[DELETED_FIELD] != 0
    }
}

/// A zero-copy mutable view into an 8-byte slot entry.
#[derive(Debug)]
pub(crate) struct SlotMut<'a> {
    slot_index: u32,
    bytes: &'a mut [u8; SLOT_SIZE],
}

impl<'a> SlotMut<'a> {
    #[inline]
    pub(super) fn from_raw(slot_index: u32, bytes: &'a mut [u8]) -> Result<Self, SlotError> {
        if bytes.len() != SLOT_SIZE {
            return Err(SlotError::SlotSizeMismatch {
                expected_size: SLOT_SIZE,
                actual_size: bytes.len(),
            });
        }

        let bytes_array: &mut [u8; SLOT_SIZE] = match bytes.try_into() {
            Ok(arr) => arr,
            Err(_) => unreachable!("bytes.len() == SLOT_SIZE but try_into() failed"),
        };

        Ok(Self {
            slot_index,
            bytes: bytes_array,
        })
    }

    #[inline]
    pub(crate) fn offset(&self) -> Result<u16, SlotError> {
        Ok(read_le::<u16>(self.bytes, OFFSET_FIELD)?)
    }

    #[inline]
    pub(crate) fn length(&self) -> Result<u16, SlotError> {
        Ok(read_le::<u16>(self.bytes, LEN_FIELD)?)
    }

    #[inline]
    pub(crate) fn is_deleted(&self) -> bool {
        self.bytes[DELETED_FIELD] != 0
    }

    #[inline]
    pub(crate) fn set_offset(&mut self, offset: u16) -> Result<(), SlotError> {
        Ok(write_le::<u16>(self.bytes, OFFSET_FIELD, offset)?)
    }

    #[inline]
    pub(crate) fn set_length(&mut self, length: u16) -> Result<(), SlotError> {
        Ok(write_le::<u16>(self.bytes, LEN_FIELD, length)?)
    }

    #[inline]
    pub(crate) fn set_deleted(&mut self, deleted: bool) {
        self.bytes[DELETED_FIELD] = deleted as u8;
    }

    /// Writes a brand-new slot entry: `offset`, `len`, `deleted=false`, padding zeroed.
    pub(crate) fn write_new(&mut self, offset: u16, length: u16) -> Result<(), SlotError> {
        self.set_offset(offset)?;
        self.set_length(length)?;
        self.set_deleted(false);
        self.bytes[5] = 0;
        self.bytes[6] = 0;
        self.bytes[7] = 0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_size_constant_is_eight() {
        assert_eq!(SLOT_SIZE, 8);
    }

    #[test]
    fn write_new_then_read_back() {
        let mut bytes = [0xAAu8; SLOT_SIZE];
        SlotMut::from_raw(3, &mut bytes)
            .unwrap()
            .write_new(96, 100)
            .unwrap();

        let slot = SlotRef::from_raw(3, &bytes).unwrap();
        assert_eq!(slot.slot_index(), 3);
        assert_eq!(slot.offset().unwrap(), 96);
        assert_eq!(slot.length().unwrap(), 100);
        assert!(!slot.is_deleted());
    }

    #[test]
    fn deleted_flag_does_not_disturb_offset_len() {
        let mut bytes = [0u8; SLOT_SIZE];
        let mut slot = SlotMut::from_raw(0, &mut bytes).unwrap();
        slot.write_new(10, 20).unwrap();
        slot.set_deleted(true);

        let slot = SlotRef::from_raw(0, &bytes).unwrap();
        assert!(slot.is_deleted());
        assert_eq!(slot.offset().unwrap(), 10);
        assert_eq!(slot.length().unwrap(), 20);
    }

    #[test]
    fn from_raw_with_invalid_size_returns_size_mismatch() {
        let bytes = [0x01, 0x02, 0x03];
        let res = SlotRef::from_raw(1, &bytes);
        assert!(matches!(
            res,
            Err(SlotError::SlotSizeMismatch {
                expected_size: 8,
                actual_size: 3
            })
        ));
    }
}
