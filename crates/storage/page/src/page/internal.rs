use crate::errors::header_error::HeaderError;
use crate::page::api::Page;
use crate::HEADER_SIZE;

impl Page {
    /// Reads `free_end`/`slot_count` from the header and returns the
    /// absolute byte offset at which the slot array region begins, along
    /// with the current slot count.
    pub(crate) fn slot_region(&self) -> Result<(usize, u16), HeaderError> {
        let header = self.header_ref()?;
        let free_end = header.get_free_end()?;
        let slot_count = header.get_slot_count()?;
        Ok((HEADER_SIZE + free_end as usize, slot_count))
    }
}
