//! Public API for the `disk` crate.

use crate::disk_error::DiskError;
use page::{PageId, PAGE_SIZE};

/// A `FileManager` persists fixed-`PAGE_SIZE` pages addressed by `PageId`
/// in a single backing store. The engine is single-threaded, so
/// implementations take `&mut self` rather than relying on internal
/// synchronization.
pub trait FileManager {
    /// Reads the page identified by `page_id` into `destination`.
    ///
    /// If the backing store is shorter than the requested page (e.g. the
    /// page was allocated but never written), the unread tail of
    /// `destination` is zero-filled rather than treated as an error.
    fn read_page(&mut self, page_id: PageId, destination: &mut [u8; PAGE_SIZE]) -> Result<(), DiskError>;

    /// Writes `page_data` as the full contents of the page for `page_id`.
    fn write_page(&mut self, page_id: PageId, page_data: &[u8; PAGE_SIZE]) -> Result<(), DiskError>;

    /// Allocates a new, zero-filled page and returns its id.
    fn allocate_page(&mut self) -> Result<PageId, DiskError>;

    /// Number of pages currently allocated.
    fn page_count(&self) -> u32;
}
