//! Module defining a fixed-size slotted page structure with its associated methods.
//!
//! # Memory Layout Overview
//!
//! ```text
//!   +-----------------------------------------------------------------+
//!   | Page Header (24B: page_id, lsn, free_start, free_end,           |
//!   |              slot_count, flags, next_page_id)                   |
//!   +-----------------------------------------------------------------+
//!   | Record Region (grows forward from the end of the header)        |
//!   +-----------------------------------------------------------------+
//!   | Free Space                                                       |
//!   +-----------------------------------------------------------------+
//!   | Slot Array Region (grows backward from the end of the page,     |
//!   |   fixed-size 8-byte entries, indexed left-to-right,              |
//!   |   stored physically right-to-left)                               |
//!   +-----------------------------------------------------------------+
//! ```
//!
//! Insertion is pure append: a new record is always placed at `free_start`
//! and a new slot is always allocated at the next `slot_count`. There is no
//! page-internal compaction or slot reuse; deleted slots are tombstoned in
//! place and their space is only reclaimed when the whole page is rewritten
//! by the heap layer.

pub(crate) mod accessors;
pub(crate) mod ctors;
pub(crate) mod delete;
pub(crate) mod insert;
pub(crate) mod internal;
pub(crate) mod read_row;
pub(crate) mod update;

/// Public API for the `Page` struct.
pub mod api;
