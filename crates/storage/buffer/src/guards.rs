use crate::buffer::BufferManager;
use crate::frame::FrameId;
use disk::FileManager;
use page::Page;
use std::cell::Cell;
use std::ops::{Deref, DerefMut};

/// Read-only, pinned access to a cached `Page`. Unpins automatically on
/// drop. The page content is a snapshot taken at fetch time; since the
/// engine is single-threaded this is equivalent to a live borrow for the
/// lifetime of the guard.
#[derive(Debug)]
pub struct PageReadGuard<'a, F: FileManager> {
    pub(crate) manager: &'a BufferManager<F>,
    pub(crate) frame_id: FrameId,
    pub(crate) page: Page,
}

impl<'a, F: FileManager> Deref for PageReadGuard<'a, F> {
    type Target = Page;
    fn deref(&self) -> &Page {
        &self.page
    }
}

impl<'a, F: FileManager> Drop for PageReadGuard<'a, F> {
    fn drop(&mut self) {
        self.manager.unpin(self.frame_id, false);
    }
}

/// Mutable, pinned access to a cached `Page`. The page is written back into
/// its frame, and the frame unpinned, when the guard drops. Mutating
/// through `DerefMut` does not by itself mark the frame dirty — callers
/// must call [`mark_dirty`](Self::mark_dirty) once they have made a change
/// that needs to survive eviction.
#[derive(Debug)]
pub struct PageWriteGuard<'a, F: FileManager> {
    pub(crate) manager: &'a BufferManager<F>,
    pub(crate) frame_id: FrameId,
    pub(crate) page: Option<Page>,
    pub(crate) dirty: Cell<bool>,
}

impl<'a, F: FileManager> PageWriteGuard<'a, F> {
    /// Marks the underlying frame dirty, so it is written back to disk
    /// before being evicted or on the next `flush_all`.
    pub fn mark_dirty(&self) {
        self.dirty.set(true);
    }
}

impl<'a, F: FileManager> Deref for PageWriteGuard<'a, F> {
    type Target = Page;
    fn deref(&self) -> &Page {
        self.page.as_ref().expect("page guard accessed after drop")
    }
}

impl<'a, F: FileManager> DerefMut for PageWriteGuard<'a, F> {
    fn deref_mut(&mut self) -> &mut Page {
        self.page.as_mut().expect("page guard accessed after drop")
    }
}

impl<'a, F: FileManager> Drop for PageWriteGuard<'a, F> {
    fn drop(&mut self) {
        if let Some(page) = self.page.take() {
            self.manager.write_back(self.frame_id, page);
        }
        self.manager.unpin(self.frame_id, self.dirty.get());
    }
}
