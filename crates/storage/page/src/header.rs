//! Module defining the layout and accessors for the page header in a slotted page.
//!
//! # Page Header Layout
//!
//! The page header occupies the first **24 bytes** of every slotted page.
//! All fields are stored in **little-endian** binary format.
//!
//! | Field          | Type  | Offset | Description |
//! |----------------|-------|--------|-------------|
//! | `page_id`      | u32   | [`PAGE_ID`]       | This page's own id. |
//! | `lsn`          | u32   | [`LSN`]           | Reserved, unused. |
//! | `free_start`   | u16   | [`FREE_START`]    | Low-water mark of the record heap, relative to the data region. |
//! | `free_end`     | u16   | [`FREE_END`]      | High-water mark of the slot directory, relative to the data region. |
//! | `slot_count`   | u16   | [`SLOT_COUNT`]    | Number of slots ever allocated on this page. |
//! | `flags`        | u16   | [`FLAGS`]         | Reserved. |
//! | `next_page_id` | u32   | [`NEXT_PAGE_ID`]  | Next page in a heap file's page chain, `0xFFFFFFFF` = none. |
//!
//! Bytes 20..24 are reserved padding.
//!
//! ```text
//! +----------------------+-------------------+----------------------+
//! |      Header          |     Data Area     |      Slot Array      |
//! |       (24B)          |   (variable)      |     (grows left)     |
//! +----------------------+-------------------+----------------------+
//! ```

use crate::errors::header_error::HeaderError;
use binary_helpers::le::{read_le, write_le};
use paste::paste;

/// Size of the header in bytes.
pub const HEADER_SIZE: usize = 24;

/// Sentinel value for `next_page_id` meaning "no next page".
pub const NO_NEXT_PAGE: u32 = 0xFFFF_FFFF;

/// The `HeaderRef` struct provides an immutable view into the header of a page.
#[derive(Debug)]
pub struct HeaderRef<'a> {
    bytes: &'a [u8; HEADER_SIZE],
}

impl<'a> HeaderRef<'a> {
    /// Creates a new `HeaderRef` from a slice of bytes if it matches the required size.
    pub fn new(bytes: &'a [u8]) -> Option<Self> {
        (bytes.len() == HEADER_SIZE).then(|| HeaderRef {
            bytes: bytes.try_into().unwrap(),
        })
    }
}

/// The `HeaderMut` struct provides a mutable view into the header of a page.
#[derive(Debug)]
pub struct HeaderMut<'a> {
    bytes: &'a mut [u8; HEADER_SIZE],
}

impl<'a> HeaderMut<'a> {
    /// Creates a new `HeaderMut` instance if the provided byte slice's length matches the expected `HEADER_SIZE`.
    pub fn new(bytes: &'a mut [u8]) -> Option<Self> {
        (bytes.len() == HEADER_SIZE).then(|| HeaderMut {
            bytes: bytes.try_into().unwrap(),
        })
    }

    /// Resets the header to its freshly-initialized state for `page_id`.
    pub fn init(&mut self, page_id: u32, data_region_size: u16) -> Result<(), HeaderError> {
        self.set_page_id(page_id)?;
        self.set_lsn(0)?;
        self.set_free_start(0)?;
        self.set_free_end(data_region_size)?;
        self.set_slot_count(0)?;
        self.set_flags(0)?;
        self.set_next_page_id(NO_NEXT_PAGE)?;
        Ok(())
    }
}

/// Defines header field constants and getter/setter methods.
///
/// Pattern: `field_id(identifier): field_type(type) = field_offset(usize)`
macro_rules! impl_header_accessors {
    ( $( $field_name:ident : $field_type:ty = $field_offset:expr ; )* ) => {
        paste! {
            $(
                #[doc = concat!("Offset of ", stringify!($field_name), " — type ", stringify!($field_type))]
                pub const [<$field_name:upper>] : usize = $field_offset;

                impl<'a> HeaderRef<'a> {
                    #[doc = concat!("Getter for field `", stringify!($field_name), "`.")]
                    pub fn [<get_ $field_name>](&self)
                        -> Result<$field_type, HeaderError>
                    {
                        Ok(read_le::<$field_type>(self.bytes, $field_offset)?)
                    }
                }

                impl<'a> HeaderMut<'a> {
                    #[doc = concat!("Setter for field `", stringify!($field_name), "`.")]
                    pub fn [<set_ $field_name>](&mut self, val: $field_type)
                        -> Result<(), HeaderError>
                    {
                        write_le::<$field_type>(self.bytes, $field_offset, val)?;
                        Ok(())
                    }
                }
            )*
        }
    };
}

impl_header_accessors! {
    page_id : u32 = 0;
    lsn : u32 = 4;
    free_start : u16 = 8;
    free_end : u16 = 10;
    slot_count : u16 = 12;
    flags : u16 = 14;
    next_page_id : u32 = 16;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_sets_expected_fields() {
        let mut bytes = [0xAAu8; HEADER_SIZE];
        let mut header = HeaderMut::new(&mut bytes).unwrap();
        header.init(7, 8168).unwrap();

        let header = HeaderRef::new(&bytes).unwrap();
        assert_eq!(header.get_page_id().unwrap(), 7);
        assert_eq!(header.get_lsn().unwrap(), 0);
        assert_eq!(header.get_free_start().unwrap(), 0);
        assert_eq!(header.get_free_end().unwrap(), 8168);
        assert_eq!(header.get_slot_count().unwrap(), 0);
        assert_eq!(header.get_flags().unwrap(), 0);
        assert_eq!(header.get_next_page_id().unwrap(), NO_NEXT_PAGE);
    }

    #[test]
    fn rejects_wrong_size_slice() {
        let bytes = [0u8; HEADER_SIZE - 1];
        assert!(HeaderRef::new(&bytes).is_none());
    }
}
