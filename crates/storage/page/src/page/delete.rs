use crate::errors::delete_error::DeleteError;
use crate::page::api::Page;
use crate::slot_array::SlotArrayMut;
use crate::PAGE_SIZE;

impl Page {
    /// Tombstones `slot_id`. Returns `false` if the slot was already
    /// deleted (idempotent no-op); errors if `slot_id` was never allocated.
    pub(crate) fn delete_internal(&mut self, slot_id: u16) -> Result<bool, DeleteError> {
        let (slot_region_start, slot_count) = self.slot_region()?;
        let mut slot_array =
            SlotArrayMut::new(&mut self.data[slot_region_start..PAGE_SIZE], slot_count)?;
        let mut slot = slot_array.slot_mut(slot_id as u32)?;

        let was_live = !slot.is_deleted();
        slot.set_deleted(true);
        Ok(was_live)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page_id::PageId;

    #[test]
    fn delete_tombstones_and_is_idempotent() {
        let mut page = Page::new(PageId::new(1));
        let slot = page.insert_internal(b"gone").unwrap();

        assert!(page.delete_internal(slot).unwrap());
        assert!(!page.delete_internal(slot).unwrap());
        assert_eq!(page.read_row_internal(slot).unwrap(), None);
    }
}
