//! Heap files: a singly-linked chain of slotted data pages rooted at a
//! header page, giving insert/get/scan/update over variable-length records.

pub mod errors;
pub mod heap_file;
pub mod rid;

pub use errors::{HeapError, HeapResult};
pub use heap_file::{HeapFile, ScanCursor};
pub use rid::Rid;
