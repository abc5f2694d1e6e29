use crate::errors::insert_error::InsertError;
use crate::page::api::Page;
use crate::slot::SLOT_SIZE;
use crate::slot_array::SlotArrayMut;
use crate::{HEADER_SIZE, PAGE_SIZE};

impl Page {
    pub(crate) fn has_space_internal(&self, row_len: usize) -> Result<bool, InsertError> {
        let header = self.header_ref()?;
        let free_start = header.get_free_start()? as usize;
        let free_end = header.get_free_end()? as usize;
        Ok(row_len + SLOT_SIZE <= free_end.saturating_sub(free_start))
    }

    /// Appends `row` to the record region and allocates a new slot for it.
    /// Never compacts or reuses an existing (tombstoned) slot.
    pub(crate) fn insert_internal(&mut self, row: &[u8]) -> Result<u16, InsertError> {
        let (free_start, free_end, slot_count) = {
            let header = self.header_ref()?;
            (
                header.get_free_start()?,
                header.get_free_end()?,
                header.get_slot_count()?,
            )
        };

        let available = (free_end as usize).saturating_sub(free_start as usize);
        if row.len() + SLOT_SIZE > available {
            return Err(InsertError::NotEnoughSpace {
                row_len: row.len(),
                page_free_space: available,
            });
        }

        let record_start = HEADER_SIZE + free_start as usize;
        self.data[record_start..record_start + row.len()].copy_from_slice(row);

        let new_free_start = free_start + row.len() as u16;
        let new_free_end = free_end - SLOT_SIZE as u16;
        let new_slot_count = slot_count + 1;

        let slot_region_start = HEADER_SIZE + new_free_end as usize;
        SlotArrayMut::new(&mut self.data[slot_region_start..PAGE_SIZE], new_slot_count)?
            .write_new_slot(slot_count as u32, free_start, row.len() as u16)?;

        let mut header = self.header_mut()?;
        header.set_free_start(new_free_start)?;
        header.set_free_end(new_free_end)?;
        header.set_slot_count(new_slot_count)?;

        Ok(slot_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page_id::PageId;

    #[test]
    fn insert_allocates_slots_in_order() {
        let mut page = Page::new(PageId::new(1));
        let s0 = page.insert_internal(b"hello").unwrap();
        let s1 = page.insert_internal(b"world!").unwrap();
        assert_eq!(s0, 0);
        assert_eq!(s1, 1);
        assert_eq!(page.header_ref().unwrap().get_slot_count().unwrap(), 2);
    }

    #[test]
    fn insert_fails_once_the_page_fills_up() {
        let mut page = Page::new(PageId::new(1));
        let row = vec![0xAAu8; 32];
        loop {
            match page.insert_internal(&row) {
                Ok(_) => continue,
                Err(InsertError::NotEnoughSpace { row_len, .. }) => {
                    assert_eq!(row_len, 32);
                    break;
                }
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn has_space_reports_false_once_full() {
        let mut page = Page::new(PageId::new(1));
        let row = vec![0u8; 8168 - SLOT_SIZE];
        assert!(page.has_space_internal(row.len()).unwrap());
        page.insert_internal(&row).unwrap();
        assert!(!page.has_space_internal(1).unwrap());
    }
}
