use page::page_id::NONE;
use page::{Page, PageId};

/// The ID of a frame is its index in the buffer's frame vector.
pub(crate) type FrameId = usize;

/// A buffer frame holds one page's worth of bytes plus the bookkeeping the
/// Clock replacement policy and pin discipline need.
///
/// `is_valid ⇒ page_id` is a persistent page id; `pin_count >= 0`; the frame
/// is evictable iff `is_valid ∧ pin_count == 0`.
#[derive(Debug)]
pub(crate) struct BufferFrame {
    pub(crate) page: Page,
    pub(crate) page_id: PageId,
    pub(crate) is_valid: bool,
    pub(crate) is_dirty: bool,
    pub(crate) pin_count: i32,
    pub(crate) ref_bit: bool,
}

impl Default for BufferFrame {
    fn default() -> Self {
        Self {
            page: Page::new(PageId::new(NONE)),
            page_id: PageId::new(NONE),
            is_valid: false,
            is_dirty: false,
            pin_count: 0,
            ref_bit: false,
        }
    }
}
