use crate::errors::header_error::HeaderError;
use crate::page::api::Page;
use crate::{HEADER_SIZE, PAGE_SIZE};

impl Page {
    /// Resets the header to its freshly-initialized, empty state.
    pub(crate) fn init_internal(&mut self) -> Result<(), HeaderError> {
        let data_region_size = (PAGE_SIZE - HEADER_SIZE) as u16;
        self.header_mut()?.init(self.page_id.as_u32(), data_region_size)
    }
}
