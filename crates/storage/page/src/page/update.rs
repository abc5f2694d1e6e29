use crate::errors::update_error::UpdateError;
use crate::page::api::Page;
use crate::slot_array::SlotArrayMut;
use crate::{HEADER_SIZE, PAGE_SIZE};

impl Page {
    /// Overwrites the record at `slot_id` in place. Only succeeds when
    /// `row.len()` is no larger than the slot's existing length (shrink or
    /// equal-size update); growing a row requires relocating it, which is
    /// the heap layer's responsibility.
    pub(crate) fn update_in_place_internal(
        &mut self,
        slot_id: u16,
        row: &[u8],
    ) -> Result<(), UpdateError> {
        let (slot_region_start, slot_count) = self.slot_region()?;

        let (offset, length) = {
            let mut slot_array =
                SlotArrayMut::new(&mut self.data[slot_region_start..PAGE_SIZE], slot_count)?;
            let slot = slot_array.slot_mut(slot_id as u32)?;
            if slot.is_deleted() {
                return Err(UpdateError::InvalidSlot {
                    slot_id: slot_id as usize,
                });
            }
            (slot.offset()?, slot.length()?)
        };

        if row.len() > length as usize {
            return Err(UpdateError::DoesNotFit {
                row_len: row.len(),
                slot_len: length as usize,
            });
        }

        let record_start = HEADER_SIZE + offset as usize;
        self.data[record_start..record_start + row.len()].copy_from_slice(row);

        let mut slot_array =
            SlotArrayMut::new(&mut self.data[slot_region_start..PAGE_SIZE], slot_count)?;
        slot_array
            .slot_mut(slot_id as u32)?
            .set_length(row.len() as u16)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page_id::PageId;

    #[test]
    fn update_shrinks_in_place() {
        let mut page = Page::new(PageId::new(1));
        let slot = page.insert_internal(b"original").unwrap();

        page.update_in_place_internal(slot, b"new").unwrap();
        assert_eq!(page.read_row_internal(slot).unwrap(), Some(&b"new"[..]));
    }

    #[test]
    fn update_rejects_growing_row() {
        let mut page = Page::new(PageId::new(1));
        let slot = page.insert_internal(b"abc").unwrap();

        let err = page.update_in_place_internal(slot, b"abcdef").unwrap_err();
        assert!(matches!(err, UpdateError::DoesNotFit { .. }));
    }

    #[test]
    fn update_rejects_deleted_slot() {
        let mut page = Page::new(PageId::new(1));
        let slot = page.insert_internal(b"abc").unwrap();
        page.delete_internal(slot).unwrap();

        let err = page.update_in_place_internal(slot, b"ab").unwrap_err();
        assert!(matches!(err, UpdateError::InvalidSlot { .. }));
    }
}
