use crate::errors::read_row_error::ReadRowError;
use crate::page::api::Page;
use crate::slot_array::SlotArrayRef;
use crate::PAGE_SIZE;

impl Page {
    /// Returns the bytes of the record stored at `slot_id`, or `None` if the
    /// slot has been tombstoned. Errors if `slot_id` was never allocated.
    pub(crate) fn read_row_internal(&self, slot_id: u16) -> Result<Option<&[u8]>, ReadRowError> {
        let (slot_region_start, slot_count) = self.slot_region()?;
        let slot_array = SlotArrayRef::new(&self.data[slot_region_start..PAGE_SIZE], slot_count)?;
        let slot = slot_array.slot_ref(slot_id as u32)?;

        if slot.is_deleted() {
            return Ok(None);
        }

        let offset = crate::HEADER_SIZE + slot.offset()? as usize;
        let length = slot.length()? as usize;
        Ok(Some(&self.data[offset..offset + length]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page_id::PageId;

    #[test]
    fn read_row_returns_inserted_bytes() {
        let mut page = Page::new(PageId::new(1));
        let slot = page.insert_internal(b"row-one").unwrap();
        assert_eq!(page.read_row_internal(slot).unwrap(), Some(&b"row-one"[..]));
    }

    #[test]
    fn read_row_on_unallocated_slot_errors() {
        let page = Page::new(PageId::new(1));
        assert!(page.read_row_internal(0).is_err());
    }
}
