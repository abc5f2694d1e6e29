use std::cell::Cell;
use std::rc::Rc;

use binary_helpers::{read_le, write_le};
use buffer::guards::PageReadGuard;
use buffer::BufferManager;
use disk::FileManager;
use page::{PageId, HEADER_SIZE, PAGE_SIZE};

use crate::errors::{HeapError, HeapResult};
use crate::rid::Rid;

const NONE_PID: PageId = PageId(page::page_id::NONE);

/// Resumption point for a heap scan. `ScanCursor::start()` begins at the
/// first live record; each successful `scan_next` leaves the cursor at the
/// record it just returned, ready to resume from the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanCursor {
    page_id: PageId,
    slot_id: u16,
}

impl ScanCursor {
    pub fn start() -> Self {
        Self { page_id: NONE_PID, slot_id: 0 }
    }
}

impl Default for ScanCursor {
    fn default() -> Self {
        Self::start()
    }
}

/// A heap file: a singly-linked chain of slotted data pages rooted at a
/// header page that persists `{first_data_pid, last_data_pid}` in its data
/// region (two little-endian `u32`s at offsets 0 and 4).
///
/// `first_data_pid` never changes after bootstrap; `last_data_pid` grows as
/// the chain is extended, so it lives behind a `Cell` to let `insert` take
/// `&self` like the rest of the buffer-pool-backed stack.
#[derive(Debug)]
pub struct HeapFile<F: FileManager> {
    buffer: Rc<BufferManager<F>>,
    header_pid: PageId,
    first_data_pid: PageId,
    last_data_pid: Cell<PageId>,
}

impl<F: FileManager> HeapFile<F> {
    /// Initializes a brand-new heap file. `first_data_pid` must already be
    /// an allocated, freshly-initialized (empty) page — `bootstrap` only
    /// records the chain's bookkeeping, it does not allocate pages itself.
    pub fn bootstrap(buffer: Rc<BufferManager<F>>, header_pid: PageId, first_data_pid: PageId) -> HeapResult<Self> {
        let heap = Self {
            buffer,
            header_pid,
            first_data_pid,
            last_data_pid: Cell::new(first_data_pid),
        };
        heap.persist_header()?;
        Ok(heap)
    }

    /// Recovers an existing heap file's bookkeeping from its header page.
    pub fn open(buffer: Rc<BufferManager<F>>, header_pid: PageId) -> HeapResult<Self> {
        let guard = buffer.fetch_read(header_pid)?;
        let first: u32 = read_le(guard.data(), HEADER_SIZE)?;
        let last: u32 = read_le(guard.data(), HEADER_SIZE + 4)?;
        drop(guard);

        Ok(Self {
            buffer,
            header_pid,
            first_data_pid: PageId::new(first),
            last_data_pid: Cell::new(PageId::new(last)),
        })
    }

    pub fn header_pid(&self) -> PageId {
        self.header_pid
    }

    /// Appends `record` to the heap, extending the page chain if the
    /// current last page has no room. Returns the new record's `Rid`.
    pub fn insert(&self, record: &[u8]) -> HeapResult<Rid> {
        let mut current_pid = self.last_data_pid.get();

        loop {
            let mut guard = self.buffer.fetch_write(current_pid)?;

            if let Ok(slot_id) = guard.insert(record) {
                guard.mark_dirty();
                return Ok(Rid::new(current_pid, slot_id));
            }

            if let Some(next_pid) = guard.next_page_id()? {
                drop(guard);
                current_pid = next_pid;
                continue;
            }

            // Chain exhausted: extend it with a fresh page.
            let (new_pid, mut new_guard) = self.buffer.allocate_page()?;
            if !new_guard.has_space(record.len())? {
                return Err(HeapError::RecordTooLarge {
                    record_len: record.len(),
                    max_len: PAGE_SIZE - HEADER_SIZE,
                });
            }

            guard.set_next_page_id(Some(new_pid))?;
            guard.mark_dirty();
            drop(guard);

            self.last_data_pid.set(new_pid);
            self.persist_header()?;

            let slot_id = new_guard.insert(record)?;
            new_guard.mark_dirty();
            return Ok(Rid::new(new_pid, slot_id));
        }
    }

    /// Fetches the page holding `rid`, pinned for shared access, if the
    /// record is still live. Callers read the bytes via
    /// `guard.get(rid.slot_id)` and drop the guard (unpinning) once done.
    pub fn get(&self, rid: Rid) -> HeapResult<Option<PageReadGuard<'_, F>>> {
        let guard = self.buffer.fetch_read(rid.page_id)?;
        if guard.get(rid.slot_id)?.is_some() {
            Ok(Some(guard))
        } else {
            Ok(None)
        }
    }

    /// Tombstones `rid`'s slot. Returns `false` if it was already deleted.
    pub fn delete(&self, rid: Rid) -> HeapResult<bool> {
        let mut guard = self.buffer.fetch_write(rid.page_id)?;
        let was_live = guard.delete(rid.slot_id)?;
        if was_live {
            guard.mark_dirty();
        }
        Ok(was_live)
    }

    /// Overwrites `rid`'s record in place. Only succeeds if `record` is no
    /// longer than the slot's current length — a growing update is the
    /// caller's job (delete-then-insert), matching `Page::update_in_place`.
    pub fn update_in_place(&self, rid: Rid, record: &[u8]) -> HeapResult<()> {
        let mut guard = self.buffer.fetch_write(rid.page_id)?;
        guard.update_in_place(rid.slot_id, record)?;
        guard.mark_dirty();
        Ok(())
    }

    /// Advances `cursor` to the next live record in (page-ascending,
    /// slot-ascending) order, returning its `Rid` and the page pinned for
    /// shared access so the caller can read its bytes before unpinning.
    pub fn scan_next(&self, cursor: &mut ScanCursor) -> HeapResult<Option<(Rid, PageReadGuard<'_, F>)>> {
        let resuming = cursor.page_id != NONE_PID;
        let mut pid = if resuming { cursor.page_id } else { self.first_data_pid };
        let mut slot_start = if resuming { cursor.slot_id + 1 } else { 0 };

        loop {
            let guard = self.buffer.fetch_read(pid)?;
            let slot_count = guard.slot_count()?;

            let mut slot = slot_start;
            while slot < slot_count {
                if guard.get(slot)?.is_some() {
                    cursor.page_id = pid;
                    cursor.slot_id = slot;
                    return Ok(Some((Rid::new(pid, slot), guard)));
                }
                slot += 1;
            }

            match guard.next_page_id()? {
                Some(next) => {
                    drop(guard);
                    pid = next;
                    slot_start = 0;
                }
                None => return Ok(None),
            }
        }
    }

    fn persist_header(&self) -> HeapResult<()> {
        let mut guard = self.buffer.fetch_write(self.header_pid)?;
        write_le::<u32>(guard.data_mut(), HEADER_SIZE, self.first_data_pid.as_u32())?;
        write_le::<u32>(guard.data_mut(), HEADER_SIZE + 4, self.last_data_pid.get().as_u32())?;
        guard.mark_dirty();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use disk::InMemoryFileManager;

    fn new_heap() -> HeapFile<InMemoryFileManager> {
        let buffer = Rc::new(BufferManager::new(InMemoryFileManager::new(), 8));
        let (header_pid, header_guard) = buffer.allocate_page().unwrap();
        drop(header_guard);
        let (first_pid, first_guard) = buffer.allocate_page().unwrap();
        drop(first_guard);
        HeapFile::bootstrap(buffer, header_pid, first_pid).unwrap()
    }

    #[test]
    fn insert_then_get_round_trips() {
        let heap = new_heap();
        let rid = heap.insert(b"hello").unwrap();
        let guard = heap.get(rid).unwrap().unwrap();
        assert_eq!(guard.get(rid.slot_id).unwrap(), Some(&b"hello"[..]));
    }

    #[test]
    fn scan_next_visits_every_live_record_in_order() {
        let heap = new_heap();
        let a = heap.insert(b"a").unwrap();
        let b = heap.insert(b"b").unwrap();
        let c = heap.insert(b"c").unwrap();
        heap.delete(b).unwrap();

        let mut cursor = ScanCursor::start();
        let mut seen = Vec::new();
        while let Some((rid, guard)) = heap.scan_next(&mut cursor).unwrap() {
            seen.push(rid);
            drop(guard);
        }
        assert_eq!(seen, vec![a, c]);
    }

    #[test]
    fn insert_extends_the_chain_once_a_page_fills_up() {
        let heap = new_heap();
        let row = vec![0u8; 200];
        let mut rids = Vec::new();
        for _ in 0..200 {
            rids.push(heap.insert(&row).unwrap());
        }
        // Records spilled onto at least a second page.
        assert!(rids.iter().any(|r| r.page_id != heap.first_data_pid));
    }

    #[test]
    fn update_in_place_shrinks_without_changing_rid() {
        let heap = new_heap();
        let rid = heap.insert(b"hello world").unwrap();
        heap.update_in_place(rid, b"hi").unwrap();
        let guard = heap.get(rid).unwrap().unwrap();
        assert_eq!(guard.get(rid.slot_id).unwrap(), Some(&b"hi"[..]));
    }

    #[test]
    fn reopening_recovers_first_and_last_pids() {
        let buffer = Rc::new(BufferManager::new(InMemoryFileManager::new(), 8));
        let (header_pid, guard) = buffer.allocate_page().unwrap();
        drop(guard);
        let (first_pid, guard) = buffer.allocate_page().unwrap();
        drop(guard);
        let heap = HeapFile::bootstrap(Rc::clone(&buffer), header_pid, first_pid).unwrap();
        heap.insert(b"row").unwrap();
        buffer.flush_all().unwrap();

        let reopened = HeapFile::open(buffer, header_pid).unwrap();
        assert_eq!(reopened.first_data_pid, first_pid);
        assert_eq!(reopened.last_data_pid.get(), first_pid);
    }
}
