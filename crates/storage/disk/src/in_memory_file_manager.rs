//! An in-memory `FileManager` double used by tests that exercise the
//! buffer pool and heap file without touching the filesystem.

use crate::api::FileManager;
use crate::disk_error::DiskError;
use page::{PageId, PAGE_SIZE};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct InMemoryFileManager {
    pages: HashMap<PageId, Box<[u8; PAGE_SIZE]>>,
    page_count: u32,
}

impl InMemoryFileManager {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FileManager for InMemoryFileManager {
    fn read_page(&mut self, page_id: PageId, destination: &mut [u8; PAGE_SIZE]) -> Result<(), DiskError> {
        match self.pages.get(&page_id) {
            Some(page) => destination.copy_from_slice(page.as_ref()),
            None => destination.fill(0),
        }
        Ok(())
    }

    fn write_page(&mut self, page_id: PageId, page_data: &[u8; PAGE_SIZE]) -> Result<(), DiskError> {
        self.pages.insert(page_id, Box::new(*page_data));
        if page_id.as_u32() >= self.page_count {
            self.page_count = page_id.as_u32() + 1;
        }
        Ok(())
    }

    fn allocate_page(&mut self) -> Result<PageId, DiskError> {
        let page_id = PageId::new(self.page_count);
        self.write_page(page_id, &[0u8; PAGE_SIZE])?;
        Ok(page_id)
    }

    fn page_count(&self) -> u32 {
        self.page_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwritten_page_reads_as_zeroed() {
        let mut manager = InMemoryFileManager::new();
        let page_id = manager.allocate_page().unwrap();

        let mut destination = [0xAAu8; PAGE_SIZE];
        manager.read_page(page_id, &mut destination).unwrap();
        assert_eq!(destination, [0u8; PAGE_SIZE]);
    }

    #[test]
    fn write_then_read_round_trips() {
        let mut manager = InMemoryFileManager::new();
        let page_id = manager.allocate_page().unwrap();

        let mut page = [0u8; PAGE_SIZE];
        page[10] = 7;
        manager.write_page(page_id, &page).unwrap();

        let mut destination = [0u8; PAGE_SIZE];
        manager.read_page(page_id, &mut destination).unwrap();
        assert_eq!(destination, page);
    }
}
