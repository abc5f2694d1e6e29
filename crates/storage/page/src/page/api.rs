use crate::errors::page_error::{PageResult, WithPageId};
use crate::errors::page_op_error::PageOpError;
use crate::header::NO_NEXT_PAGE;
use crate::page_id::PageId;
use crate::PAGE_SIZE;

/// A fixed-size slotted page: a 24-byte header followed by a two-sided
/// region where records grow forward from the header and the slot
/// directory grows backward from the end of the page.
#[derive(Debug, Clone)]
pub struct Page {
    pub(crate) page_id: PageId,
    pub(crate) data: Box<[u8; PAGE_SIZE]>,
}

impl Page {
    /// Creates a freshly-initialized, empty page for `page_id`.
    pub fn new(page_id: PageId) -> Self {
        let mut page = Page {
            page_id,
            data: Box::new([0u8; PAGE_SIZE]),
        };
        page.init_internal()
            .expect("header slice is exactly HEADER_SIZE bytes by construction");
        page
    }

    /// Wraps an existing page image (e.g. one just read from disk) without
    /// touching its contents.
    pub fn from_bytes(page_id: PageId, data: Box<[u8; PAGE_SIZE]>) -> Self {
        Page { page_id, data }
    }

    /// Whether a row of `row_len` bytes still fits (record bytes plus one
    /// new slot entry), ignoring any space tombstoned slots could free up.
    pub fn has_space(&self, row_len: usize) -> PageResult<bool> {
        self.has_space_internal(row_len)
            .map_err(PageOpError::from)
            .with_page_id(self.page_id)
    }

    /// Appends `row` and returns its newly-allocated slot id.
    pub fn insert(&mut self, row: &[u8]) -> PageResult<u16> {
        self.insert_internal(row)
            .map_err(PageOpError::from)
            .with_page_id(self.page_id)
    }

    /// Returns the bytes of the record at `slot_id`, or `None` if the slot
    /// has been tombstoned.
    pub fn get(&self, slot_id: u16) -> PageResult<Option<&[u8]>> {
        self.read_row_internal(slot_id)
            .map_err(PageOpError::from)
            .with_page_id(self.page_id)
    }

    /// Tombstones `slot_id`. Returns `false` if it was already deleted.
    pub fn delete(&mut self, slot_id: u16) -> PageResult<bool> {
        self.delete_internal(slot_id)
            .map_err(PageOpError::from)
            .with_page_id(self.page_id)
    }

    /// Overwrites the bytes of an existing, non-deleted slot in place.
    /// Only succeeds when `row.len()` does not exceed the slot's current
    /// length; a growing update must be handled by the caller as a
    /// delete-and-reinsert (possibly onto a different page).
    pub fn update_in_place(&mut self, slot_id: u16, row: &[u8]) -> PageResult<()> {
        self.update_in_place_internal(slot_id, row)
            .map_err(PageOpError::from)
            .with_page_id(self.page_id)
    }

    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    pub fn slot_count(&self) -> PageResult<u16> {
        self.header_ref()
            .map_err(PageOpError::from)
            .with_page_id(self.page_id)?
            .get_slot_count()
            .map_err(PageOpError::from)
            .with_page_id(self.page_id)
    }

    /// Next page in this page's heap file chain, if any.
    pub fn next_page_id(&self) -> PageResult<Option<PageId>> {
        let next = self
            .header_ref()
            .map_err(PageOpError::from)
            .with_page_id(self.page_id)?
            .get_next_page_id()
            .map_err(PageOpError::from)
            .with_page_id(self.page_id)?;
        Ok((next != NO_NEXT_PAGE).then(|| PageId::new(next)))
    }

    pub fn set_next_page_id(&mut self, next: Option<PageId>) -> PageResult<()> {
        let value = next.map(PageId::as_u32).unwrap_or(NO_NEXT_PAGE);
        self.header_mut()
            .map_err(PageOpError::from)
            .with_page_id(self.page_id)?
            .set_next_page_id(value)
            .map_err(PageOpError::from)
            .with_page_id(self.page_id)
    }

    /// Returns an immutable reference to the underlying page bytes.
    pub fn data(&self) -> &[u8; PAGE_SIZE] {
        &self.data
    }

    /// Returns a mutable reference to the underlying page bytes.
    pub fn data_mut(&mut self) -> &mut [u8; PAGE_SIZE] {
        &mut self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_page_starts_empty() {
        let page = Page::new(PageId::new(3));
        assert_eq!(page.page_id(), PageId::new(3));
        assert_eq!(page.slot_count().unwrap(), 0);
        assert_eq!(page.next_page_id().unwrap(), None);
    }

    #[test]
    fn insert_get_delete_round_trip() {
        let mut page = Page::new(PageId::new(1));
        let slot = page.insert(b"payload").unwrap();
        assert_eq!(page.get(slot).unwrap(), Some(&b"payload"[..]));

        assert!(page.delete(slot).unwrap());
        assert_eq!(page.get(slot).unwrap(), None);
    }

    #[test]
    fn set_and_get_next_page_id() {
        let mut page = Page::new(PageId::new(1));
        assert_eq!(page.next_page_id().unwrap(), None);

        page.set_next_page_id(Some(PageId::new(2))).unwrap();
        assert_eq!(page.next_page_id().unwrap(), Some(PageId::new(2)));
    }
}
