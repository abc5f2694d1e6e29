//! Catalog: table/column bookkeeping persisted on the fixed catalog page
//! (`spec.md` §4.6). Table metadata lives in a "tables" heap, one
//! `CatalogEntry` row per table; column metadata lives in a parallel
//! "columns" heap, one `ColumnEntry` row per column.

use std::rc::Rc;

use disk::FileManager;
use heap::{HeapFile, Rid, ScanCursor};
use page::PageId;
use thiserror::Error;

use crate::row::{ColumnType, Schema};

/// The catalog page is always page 0.
pub const CATALOG_PID: PageId = PageId(0);

const MAGIC: &[u8; 8] = b"MARQDB1\0";
const NAME_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("not a database file: missing or corrupt magic header")]
    BadMagic,
    #[error("table name {0:?} is longer than 31 bytes")]
    NameTooLong(String),
    #[error("table must have at least one column")]
    EmptySchema,
    #[error("table {0:?} already exists")]
    AlreadyExists(String),
    #[error("unknown table {0:?}")]
    UnknownTable(String),
    #[error(transparent)]
    Heap(#[from] heap::HeapError),
    #[error(transparent)]
    Buffer(#[from] buffer::BufferError),
    #[error(transparent)]
    Page(#[from] page::PageError),
}

fn encode_fixed_name(name: &str) -> Result<[u8; NAME_LEN], CatalogError> {
    if name.len() >= NAME_LEN {
        return Err(CatalogError::NameTooLong(name.to_string()));
    }
    let mut buf = [0u8; NAME_LEN];
    buf[..name.len()].copy_from_slice(name.as_bytes());
    Ok(buf)
}

fn decode_fixed_name(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

/// A row in the tables heap: `{name[32], heap_header_pid:u32}`.
struct CatalogEntry {
    name: String,
    heap_header_pid: PageId,
}

impl CatalogEntry {
    fn encode(name: &str, heap_header_pid: PageId) -> Result<Vec<u8>, CatalogError> {
        let mut bytes = Vec::with_capacity(NAME_LEN + 4);
        bytes.extend_from_slice(&encode_fixed_name(name)?);
        bytes.extend_from_slice(&heap_header_pid.as_u32().to_le_bytes());
        Ok(bytes)
    }

    fn decode(bytes: &[u8]) -> Self {
        let name = decode_fixed_name(&bytes[..NAME_LEN]);
        let heap_header_pid = PageId::new(u32::from_le_bytes(bytes[NAME_LEN..NAME_LEN + 4].try_into().unwrap()));
        Self { name, heap_header_pid }
    }
}

/// A row in the columns heap: `{table[32], col[32], type:u8, ordinal:u8}`.
struct ColumnEntry {
    table: String,
    col: String,
    col_type: ColumnType,
    ordinal: u8,
}

impl ColumnEntry {
    fn encode(table: &str, col: &str, col_type: ColumnType, ordinal: u8) -> Result<Vec<u8>, CatalogError> {
        let mut bytes = Vec::with_capacity(NAME_LEN * 2 + 2);
        bytes.extend_from_slice(&encode_fixed_name(table)?);
        bytes.extend_from_slice(&encode_fixed_name(col)?);
        bytes.push(match col_type {
            ColumnType::Int => 0,
            ColumnType::Text => 1,
        });
        bytes.push(ordinal);
        Ok(bytes)
    }

    fn decode(bytes: &[u8]) -> Self {
        let table = decode_fixed_name(&bytes[..NAME_LEN]);
        let col = decode_fixed_name(&bytes[NAME_LEN..NAME_LEN * 2]);
        let col_type = if bytes[NAME_LEN * 2] == 0 { ColumnType::Int } else { ColumnType::Text };
        let ordinal = bytes[NAME_LEN * 2 + 1];
        Self { table, col, col_type, ordinal }
    }
}

/// The catalog: table/column metadata plus the heaps that store it.
#[derive(Debug)]
pub struct Catalog<F: FileManager> {
    buffer: Rc<buffer::BufferManager<F>>,
    tables_heap_header_pid: PageId,
    columns_heap_header_pid: PageId,
}

impl<F: FileManager> Catalog<F> {
    /// Opens an existing database, or bootstraps a fresh one if the
    /// backing store has no pages allocated yet.
    pub fn open_or_bootstrap(buffer: Rc<buffer::BufferManager<F>>) -> Result<Self, CatalogError> {
        if buffer.disk_page_count() == 0 {
            Self::bootstrap(buffer)
        } else {
            Self::open(buffer)
        }
    }

    fn bootstrap(buffer: Rc<buffer::BufferManager<F>>) -> Result<Self, CatalogError> {
        let (catalog_pid, mut catalog_guard) = buffer.allocate_page()?;
        debug_assert_eq!(catalog_pid, CATALOG_PID, "catalog page must be the first page allocated");

        let (tables_header_pid, guard) = buffer.allocate_page()?;
        drop(guard);
        let (tables_first_pid, guard) = buffer.allocate_page()?;
        drop(guard);
        HeapFile::bootstrap(Rc::clone(&buffer), tables_header_pid, tables_first_pid)?;

        let (columns_header_pid, guard) = buffer.allocate_page()?;
        drop(guard);
        let (columns_first_pid, guard) = buffer.allocate_page()?;
        drop(guard);
        HeapFile::bootstrap(Rc::clone(&buffer), columns_header_pid, columns_first_pid)?;

        let data = catalog_guard.data_mut();
        data[0..8].copy_from_slice(MAGIC);
        data[8..12].copy_from_slice(&tables_header_pid.as_u32().to_le_bytes());
        data[12..16].copy_from_slice(&columns_header_pid.as_u32().to_le_bytes());
        catalog_guard.mark_dirty();
        drop(catalog_guard);

        tracing::info!(%tables_header_pid, %columns_header_pid, "bootstrapped fresh catalog");

        Ok(Self { buffer, tables_heap_header_pid: tables_header_pid, columns_heap_header_pid: columns_header_pid })
    }

    fn open(buffer: Rc<buffer::BufferManager<F>>) -> Result<Self, CatalogError> {
        let guard = buffer.fetch_read(CATALOG_PID)?;
        let data = guard.data();
        if &data[0..8] != MAGIC {
            return Err(CatalogError::BadMagic);
        }
        let tables_heap_header_pid = PageId::new(u32::from_le_bytes(data[8..12].try_into().unwrap()));
        let columns_heap_header_pid = PageId::new(u32::from_le_bytes(data[12..16].try_into().unwrap()));
        drop(guard);

        Ok(Self { buffer, tables_heap_header_pid, columns_heap_header_pid })
    }

    fn tables_heap(&self) -> Result<HeapFile<F>, CatalogError> {
        Ok(HeapFile::open(Rc::clone(&self.buffer), self.tables_heap_header_pid)?)
    }

    fn columns_heap(&self) -> Result<HeapFile<F>, CatalogError> {
        Ok(HeapFile::open(Rc::clone(&self.buffer), self.columns_heap_header_pid)?)
    }

    /// Linear scan of the tables heap for `name`.
    pub fn find_table(&self, name: &str) -> Result<Option<PageId>, CatalogError> {
        let heap = self.tables_heap()?;
        let mut cursor = ScanCursor::start();
        while let Some((rid, guard)) = heap.scan_next(&mut cursor)? {
            let bytes = guard.get(rid.slot_id)?.expect("scan only yields live slots");
            let entry = CatalogEntry::decode(bytes);
            if entry.name == name {
                return Ok(Some(entry.heap_header_pid));
            }
        }
        Ok(None)
    }

    /// Creates a table: allocates its heap, records a `CatalogEntry`, and a
    /// `ColumnEntry` per column in schema order.
    pub fn create_table(&self, name: &str, schema: &Schema) -> Result<PageId, CatalogError> {
        if name.len() > 31 {
            return Err(CatalogError::NameTooLong(name.to_string()));
        }
        if schema.columns.is_empty() {
            return Err(CatalogError::EmptySchema);
        }
        if self.find_table(name)?.is_some() {
            return Err(CatalogError::AlreadyExists(name.to_string()));
        }

        let (header_pid, guard) = self.buffer.allocate_page()?;
        drop(guard);
        let (first_pid, guard) = self.buffer.allocate_page()?;
        drop(guard);
        HeapFile::bootstrap(Rc::clone(&self.buffer), header_pid, first_pid)?;

        let tables_heap = self.tables_heap()?;
        tables_heap.insert(&CatalogEntry::encode(name, header_pid)?)?;

        let columns_heap = self.columns_heap()?;
        for (ordinal, (col_name, col_type)) in schema.columns.iter().enumerate() {
            columns_heap.insert(&ColumnEntry::encode(name, col_name, *col_type, ordinal as u8)?)?;
        }

        tracing::info!(table = name, %header_pid, "created table");
        Ok(header_pid)
    }

    /// Rewrites `name`'s `CatalogEntry` to point at `new_header_pid` (used
    /// by `VACUUM`).
    pub fn rebind_table(&self, name: &str, new_header_pid: PageId) -> Result<(), CatalogError> {
        let tables_heap = self.tables_heap()?;
        let mut cursor = ScanCursor::start();
        let mut found: Option<Rid> = None;
        while let Some((rid, guard)) = tables_heap.scan_next(&mut cursor)? {
            let bytes = guard.get(rid.slot_id)?.expect("scan only yields live slots");
            if CatalogEntry::decode(bytes).name == name {
                found = Some(rid);
                break;
            }
        }
        let rid = found.ok_or_else(|| CatalogError::UnknownTable(name.to_string()))?;
        tables_heap.update_in_place(rid, &CatalogEntry::encode(name, new_header_pid)?)?;
        Ok(())
    }

    /// Collects `name`'s columns from the columns heap, ordered by ordinal.
    pub fn load_schema(&self, name: &str) -> Result<Schema, CatalogError> {
        let columns_heap = self.columns_heap()?;
        let mut by_ordinal: Vec<Option<(String, ColumnType)>> = Vec::new();

        let mut cursor = ScanCursor::start();
        while let Some((rid, guard)) = columns_heap.scan_next(&mut cursor)? {
            let bytes = guard.get(rid.slot_id)?.expect("scan only yields live slots");
            let entry = ColumnEntry::decode(bytes);
            if entry.table != name {
                continue;
            }
            let idx = entry.ordinal as usize;
            if by_ordinal.len() <= idx {
                by_ordinal.resize(idx + 1, None);
            }
            by_ordinal[idx] = Some((entry.col, entry.col_type));
        }

        if by_ordinal.is_empty() {
            return Err(CatalogError::UnknownTable(name.to_string()));
        }

        let columns = by_ordinal.into_iter().take_while(Option::is_some).map(Option::unwrap).collect();
        Ok(Schema { columns })
    }

    pub fn buffer(&self) -> Rc<buffer::BufferManager<F>> {
        Rc::clone(&self.buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use disk::InMemoryFileManager;

    fn new_catalog() -> Catalog<InMemoryFileManager> {
        let buffer = Rc::new(buffer::BufferManager::new(InMemoryFileManager::new(), 16));
        Catalog::open_or_bootstrap(buffer).unwrap()
    }

    fn schema(cols: &[(&str, ColumnType)]) -> Schema {
        Schema { columns: cols.iter().map(|(n, t)| (n.to_string(), *t)).collect() }
    }

    #[test]
    fn create_then_find_table_round_trips() {
        let catalog = new_catalog();
        let schema = schema(&[("id", ColumnType::Int), ("name", ColumnType::Text)]);
        let header_pid = catalog.create_table("t", &schema).unwrap();
        assert_eq!(catalog.find_table("t").unwrap(), Some(header_pid));
    }

    #[test]
    fn create_table_twice_fails() {
        let catalog = new_catalog();
        let schema = schema(&[("id", ColumnType::Int)]);
        catalog.create_table("t", &schema).unwrap();
        assert!(matches!(catalog.create_table("t", &schema), Err(CatalogError::AlreadyExists(_))));
    }

    #[test]
    fn load_schema_recovers_columns_in_order() {
        let catalog = new_catalog();
        let schema_in = schema(&[("id", ColumnType::Int), ("name", ColumnType::Text)]);
        catalog.create_table("t", &schema_in).unwrap();

        let schema_out = catalog.load_schema("t").unwrap();
        assert_eq!(schema_out.columns, schema_in.columns);
    }

    #[test]
    fn reopening_an_existing_catalog_recovers_tables() {
        let buffer = Rc::new(buffer::BufferManager::new(InMemoryFileManager::new(), 16));
        let catalog = Catalog::open_or_bootstrap(Rc::clone(&buffer)).unwrap();
        let schema = schema(&[("id", ColumnType::Int)]);
        let header_pid = catalog.create_table("t", &schema).unwrap();
        buffer.flush_all().unwrap();

        let reopened = Catalog::open_or_bootstrap(buffer).unwrap();
        assert_eq!(reopened.find_table("t").unwrap(), Some(header_pid));
    }
}
