use crate::errors::header_error::HeaderError;
use crate::header::{HeaderMut, HeaderRef};
use crate::page::api::Page;
use crate::HEADER_SIZE;

/// Accessor methods for the `Page` struct.
impl Page {
    /// Returns a read-only view into the page header.
    pub(crate) fn header_ref(&'_ self) -> Result<HeaderRef<'_>, HeaderError> {
        let slice = &self.data[..HEADER_SIZE];
        HeaderRef::new(slice).ok_or(HeaderError::HeaderSliceSizeMismatch {
            actual: slice.len(),
            expected: HEADER_SIZE,
        })
    }

    /// Returns a mutable view into the page header.
    pub(crate) fn header_mut(&'_ mut self) -> Result<HeaderMut<'_>, HeaderError> {
        let len = self.data[..HEADER_SIZE].len();
        HeaderMut::new(&mut self.data[..HEADER_SIZE]).ok_or(HeaderError::HeaderSliceSizeMismatch {
            actual: len,
            expected: HEADER_SIZE,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page_id::PageId;

    #[test]
    fn header_ref_and_mut_round_trip() {
        let mut page = Page::new(PageId::new(9));
        assert_eq!(page.header_ref().unwrap().get_page_id().unwrap(), 9);

        page.header_mut().unwrap().set_slot_count(3).unwrap();
        assert_eq!(page.header_ref().unwrap().get_slot_count().unwrap(), 3);
    }
}
