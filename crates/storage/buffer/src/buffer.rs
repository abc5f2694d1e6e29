//! Single-threaded buffer pool: a bounded frame cache with Clock eviction.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use disk::FileManager;
use page::{Page, PageId, PAGE_SIZE};

use crate::errors::BufferError;
use crate::frame::{BufferFrame, FrameId};
use crate::guards::{PageReadGuard, PageWriteGuard};

/// A fixed-capacity pool of page-sized frames backed by a `FileManager`,
/// evicted with a Clock (second-chance) policy.
///
/// The engine is single-threaded: state lives behind `RefCell`s so that
/// `fetch_*` can take `&self` rather than `&mut self`, letting a caller
/// hold more than one page pinned at a time (e.g. walking a heap file's
/// page chain).
#[derive(Debug)]
pub struct BufferManager<F: FileManager> {
    file_manager: RefCell<F>,
    frames: Vec<RefCell<BufferFrame>>,
    page_table: RefCell<HashMap<PageId, FrameId>>,
    clock_hand: Cell<usize>,
}

impl<F: FileManager> BufferManager<F> {
    /// Creates a pool of `capacity` frames backed by `file_manager`.
    pub fn new(file_manager: F, capacity: usize) -> Self {
        assert!(capacity > 0, "buffer pool must have at least one frame");
        let frames = (0..capacity).map(|_| RefCell::new(BufferFrame::default())).collect();
        Self {
            file_manager: RefCell::new(file_manager),
            frames,
            page_table: RefCell::new(HashMap::new()),
            clock_hand: Cell::new(0),
        }
    }

    /// Number of pages allocated in the backing store, independent of how
    /// many are currently cached. Used at startup to decide whether a
    /// backing file is fresh (needs bootstrapping) or existing (needs
    /// opening).
    pub fn disk_page_count(&self) -> u32 {
        self.file_manager.borrow().page_count()
    }

    /// Number of frames in the pool.
    pub fn capacity(&self) -> usize {
        self.frames.len()
    }

    /// Fetches `page_id`, pinning it for shared (read-only) access.
    pub fn fetch_read(&self, page_id: PageId) -> Result<PageReadGuard<'_, F>, BufferError> {
        let frame_id = self.fetch_internal(page_id)?;
        let page = self.frames[frame_id].borrow().page.clone();
        Ok(PageReadGuard { manager: self, frame_id, page })
    }

    /// Fetches `page_id`, pinning it for exclusive (mutable) access. The
    /// frame is only marked dirty once the caller calls
    /// [`PageWriteGuard::mark_dirty`].
    ///
    /// Callers must not hold two write guards (or a read and a write guard)
    /// for the same page at once; the pool does not detect that misuse,
    /// same as the pin/unpin discipline it mirrors.
    pub fn fetch_write(&self, page_id: PageId) -> Result<PageWriteGuard<'_, F>, BufferError> {
        let frame_id = self.fetch_internal(page_id)?;
        let page = self.frames[frame_id].borrow().page.clone();
        Ok(PageWriteGuard { manager: self, frame_id, page: Some(page), dirty: Cell::new(false) })
    }

    /// Allocates a brand-new page on disk and returns it pinned for
    /// exclusive access. The frame starts dirty: the freshly-initialized
    /// in-memory page has not yet been written back.
    pub fn allocate_page(&self) -> Result<(PageId, PageWriteGuard<'_, F>), BufferError> {
        let page_id = self.file_manager.borrow_mut().allocate_page()?;
        let frame_id = self.claim_frame()?;

        {
            let mut frame = self.frames[frame_id].borrow_mut();
            frame.page = Page::new(page_id);
            frame.page_id = page_id;
            frame.is_valid = true;
            frame.is_dirty = true;
            frame.pin_count = 1;
            frame.ref_bit = true;
        }
        self.page_table.borrow_mut().insert(page_id, frame_id);

        let page = self.frames[frame_id].borrow().page.clone();
        Ok((page_id, PageWriteGuard { manager: self, frame_id, page: Some(page), dirty: Cell::new(true) }))
    }

    /// Writes every dirty, valid frame back to disk.
    pub fn flush_all(&self) -> Result<(), BufferError> {
        for frame_cell in &self.frames {
            let mut frame = frame_cell.borrow_mut();
            if frame.is_valid && frame.is_dirty {
                self.file_manager.borrow_mut().write_page(frame.page_id, frame.page.data())?;
                frame.is_dirty = false;
            }
        }
        Ok(())
    }

    /// Flushes every dirty frame. Panics if any frame is still pinned,
    /// since that means a guard outlives the pool it borrows from.
    pub fn destroy(self) -> Result<(), BufferError> {
        self.flush_all()?;
        for frame_cell in &self.frames {
            let frame = frame_cell.borrow();
            assert_eq!(frame.pin_count, 0, "destroyed buffer pool with a pinned frame outstanding");
        }
        Ok(())
    }

    fn fetch_internal(&self, page_id: PageId) -> Result<FrameId, BufferError> {
        if let Some(&frame_id) = self.page_table.borrow().get(&page_id) {
            let mut frame = self.frames[frame_id].borrow_mut();
            frame.pin_count += 1;
            frame.ref_bit = true;
            return Ok(frame_id);
        }

        let frame_id = self.claim_frame()?;
        let mut raw = [0u8; PAGE_SIZE];
        self.file_manager.borrow_mut().read_page(page_id, &mut raw)?;

        {
            let mut frame = self.frames[frame_id].borrow_mut();
            frame.page = Page::from_bytes(page_id, Box::new(raw));
            frame.page_id = page_id;
            frame.is_valid = true;
            frame.is_dirty = false;
            frame.pin_count = 1;
            frame.ref_bit = true;
        }
        self.page_table.borrow_mut().insert(page_id, frame_id);
        Ok(frame_id)
    }

    /// Picks a victim frame via Clock, writes it back if dirty, and drops
    /// its old page-table entry. Returns the (now-unmapped) frame id,
    /// ready for the caller to repopulate.
    fn claim_frame(&self) -> Result<FrameId, BufferError> {
        let victim = self.pick_victim().ok_or(BufferError::BufferFull)?;

        let evicted_page_id = {
            let frame = self.frames[victim].borrow();
            if frame.is_valid && frame.is_dirty {
                self.file_manager.borrow_mut().write_page(frame.page_id, frame.page.data())?;
            }
            frame.is_valid.then_some(frame.page_id)
        };
        if let Some(old_id) = evicted_page_id {
            self.page_table.borrow_mut().remove(&old_id);
        }
        Ok(victim)
    }

    /// Clock (second-chance) eviction: sweeps frames from `clock_hand`,
    /// clearing reference bits on pinned candidates it passes over, and
    /// returns the first invalid frame, or the first unpinned frame with
    /// its reference bit already clear. Gives up after two full sweeps.
    fn pick_victim(&self) -> Option<FrameId> {
        let capacity = self.frames.len();
        let mut scanned = 0usize;
        loop {
            let i = self.clock_hand.get();
            let next = (i + 1) % capacity;

            {
                let mut frame = self.frames[i].borrow_mut();
                if !frame.is_valid {
                    self.clock_hand.set(next);
                    return Some(i);
                }
                if frame.pin_count == 0 {
                    if frame.ref_bit {
                        frame.ref_bit = false;
                    } else {
                        self.clock_hand.set(next);
                        return Some(i);
                    }
                }
            }

            self.clock_hand.set(next);
            scanned += 1;
            if scanned >= 2 * capacity {
                return None;
            }
        }
    }

    pub(crate) fn unpin(&self, frame_id: FrameId, dirty: bool) {
        let mut frame = self.frames[frame_id].borrow_mut();
        if dirty {
            frame.is_dirty = true;
        }
        if frame.pin_count > 0 {
            frame.pin_count -= 1;
        }
    }

    pub(crate) fn write_back(&self, frame_id: FrameId, page: Page) {
        self.frames[frame_id].borrow_mut().page = page;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use disk::InMemoryFileManager;

    fn pool(capacity: usize) -> BufferManager<InMemoryFileManager> {
        BufferManager::new(InMemoryFileManager::new(), capacity)
    }

    #[test]
    fn allocate_then_flush_then_fetch_round_trips() {
        let bm = pool(2);
        let (page_id, mut guard) = bm.allocate_page().unwrap();
        guard.insert(b"row").unwrap();
        guard.mark_dirty();
        drop(guard);

        bm.flush_all().unwrap();

        let guard = bm.fetch_read(page_id).unwrap();
        assert_eq!(guard.get(0).unwrap(), Some(&b"row"[..]));
    }

    #[test]
    fn eviction_writes_back_dirty_pages() {
        let bm = pool(1);
        let (first_id, mut guard) = bm.allocate_page().unwrap();
        guard.insert(b"first").unwrap();
        guard.mark_dirty();
        drop(guard);

        let (second_id, guard) = bm.allocate_page().unwrap();
        drop(guard);
        assert_ne!(first_id, second_id);

        let guard = bm.fetch_read(first_id).unwrap();
        assert_eq!(guard.get(0).unwrap(), Some(&b"first"[..]));
    }

    #[test]
    fn fetching_an_already_cached_page_does_not_evict() {
        let bm = pool(2);
        let (page_id, guard) = bm.allocate_page().unwrap();
        drop(guard);

        let a = bm.fetch_read(page_id).unwrap();
        let b = bm.fetch_read(page_id).unwrap();
        assert_eq!(a.page_id(), b.page_id());
    }

    #[test]
    fn buffer_full_when_every_frame_stays_pinned() {
        let bm = pool(1);
        let (_id, guard) = bm.allocate_page().unwrap();
        let err = bm.allocate_page();
        assert!(err.is_err());
        drop(guard);
    }

    #[test]
    fn destroy_flushes_dirty_frames() {
        let bm = pool(1);
        let (_page_id, mut guard) = bm.allocate_page().unwrap();
        guard.insert(b"payload").unwrap();
        guard.mark_dirty();
        drop(guard);

        bm.destroy().unwrap();
    }
}
