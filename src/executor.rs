//! Executor: dispatches parsed statements (`spec.md` §4.7) against the
//! catalog and heap files, and renders results for the REPL.

use std::rc::Rc;

use disk::FileManager;
use heap::{HeapFile, ScanCursor};
use thiserror::Error;

use crate::catalog::{Catalog, CatalogError};
use crate::row::{self, ColumnType, DecodedValue, RowCodecError, Schema, Value};
use crate::sql::{CompareOp, Filter, Statement};

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("unknown table {0:?}")]
    UnknownTable(String),
    #[error("unknown column {0:?}")]
    UnknownColumn(String),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Heap(#[from] heap::HeapError),
    #[error(transparent)]
    RowCodec(#[from] RowCodecError),
    #[error(transparent)]
    Page(#[from] page::PageError),
}

/// What a statement produced, for the REPL to render.
#[derive(Debug)]
pub enum ExecResult {
    Ok,
    RowsAffected(usize),
    Rows(Vec<String>),
    Vacuumed { table: String, old_header_pid: String, new_header_pid: String },
}

pub struct Executor<F: FileManager> {
    catalog: Catalog<F>,
}

impl<F: FileManager> Executor<F> {
    pub fn new(catalog: Catalog<F>) -> Self {
        Self { catalog }
    }

    pub fn execute(&self, statement: Statement) -> Result<ExecResult, ExecError> {
        match statement {
            Statement::CreateTable { table, columns } => self.create_table(&table, columns),
            Statement::Insert { table, values } => self.insert(&table, values),
            Statement::Select { table, filter } => self.select(&table, filter),
            Statement::Update { table, column, value, filter } => self.update(&table, &column, value, filter),
            Statement::Delete { table, filter } => self.delete(&table, filter),
            Statement::Vacuum { table } => self.vacuum(&table),
        }
    }

    fn heap_for(&self, table: &str) -> Result<HeapFile<F>, ExecError> {
        let header_pid = self.catalog.find_table(table)?.ok_or_else(|| ExecError::UnknownTable(table.to_string()))?;
        Ok(HeapFile::open(self.catalog.buffer(), header_pid)?)
    }

    fn create_table(&self, table: &str, columns: Vec<(String, ColumnType)>) -> Result<ExecResult, ExecError> {
        let schema = Schema { columns };
        self.catalog.create_table(table, &schema)?;
        tracing::info!(table, "created table");
        Ok(ExecResult::Ok)
    }

    fn insert(&self, table: &str, values: Vec<Value>) -> Result<ExecResult, ExecError> {
        let schema = self.catalog.load_schema(table)?;
        let heap = self.heap_for(table)?;
        let bytes = row::encode(&schema, &values)?;
        heap.insert(&bytes)?;
        tracing::info!(table, "inserted row");
        Ok(ExecResult::RowsAffected(1))
    }

    fn select(&self, table: &str, filter: Option<Filter>) -> Result<ExecResult, ExecError> {
        let schema = self.catalog.load_schema(table)?;
        let heap = self.heap_for(table)?;

        let mut rows = Vec::new();
        let mut cursor = ScanCursor::start();
        while let Some((rid, guard)) = heap.scan_next(&mut cursor)? {
            let bytes = match guard.get(rid.slot_id) {
                Ok(Some(bytes)) => bytes,
                _ => continue,
            };
            let values = match row::decode_to_values(&schema, bytes) {
                Ok(values) => values,
                Err(err) => {
                    tracing::warn!(table, page_id = %rid.page_id, slot_id = rid.slot_id, %err, "skipping row that failed to decode");
                    continue;
                }
            };
            drop(guard);

            if matches_filter(&schema, &values, filter.as_ref()) {
                rows.push(row::render_values(&schema, &values)?);
            }
        }

        Ok(ExecResult::Rows(rows))
    }

    fn update(
        &self,
        table: &str,
        column: &str,
        new_value: Value,
        filter: Option<Filter>,
    ) -> Result<ExecResult, ExecError> {
        let schema = self.catalog.load_schema(table)?;
        let col_index = schema.column_index(column).ok_or_else(|| ExecError::UnknownColumn(column.to_string()))?;
        let heap = self.heap_for(table)?;

        // Phase 1: collect matching RIDs so mutation does not disturb the scan.
        let mut matches = Vec::new();
        let mut cursor = ScanCursor::start();
        while let Some((rid, guard)) = heap.scan_next(&mut cursor)? {
            let bytes = match guard.get(rid.slot_id) {
                Ok(Some(bytes)) => bytes,
                _ => continue,
            };
            let Ok(values) = row::decode_to_values(&schema, bytes) else { continue };
            drop(guard);
            if matches_filter(&schema, &values, filter.as_ref()) {
                matches.push(rid);
            }
        }

        // Phase 2: re-decode, substitute, re-encode, write back.
        let mut affected = 0usize;
        for rid in matches {
            let Some(guard) = heap.get(rid)? else { continue };
            let bytes = guard.get(rid.slot_id)?.expect("rid from scan_next names a live slot");
            let mut values = row::decode_to_values(&schema, bytes)?;
            let old_len = bytes.len();
            drop(guard);

            values[col_index] = match &schema.columns[col_index].1 {
                ColumnType::Int => match &new_value {
                    Value::Int(v) => DecodedValue::Int(*v),
                    Value::Text(s) if s.eq_ignore_ascii_case("null") => DecodedValue::Null,
                    Value::Text(s) => DecodedValue::Int(s.trim().parse().unwrap_or(0)),
                    Value::Null => DecodedValue::Null,
                },
                ColumnType::Text => match &new_value {
                    Value::Text(s) if s.eq_ignore_ascii_case("null") => DecodedValue::Null,
                    Value::Text(s) => DecodedValue::Text(s.clone()),
                    Value::Int(v) => DecodedValue::Text(v.to_string()),
                    Value::Null => DecodedValue::Null,
                },
            };

            let new_bytes = row::encode(&schema, &to_encodable(&values))?;
            if new_bytes.len() <= old_len {
                heap.update_in_place(rid, &new_bytes)?;
            } else {
                heap.delete(rid)?;
                heap.insert(&new_bytes)?;
            }
            affected += 1;
        }

        tracing::info!(table, affected, "updated rows");
        Ok(ExecResult::RowsAffected(affected))
    }

    fn delete(&self, table: &str, filter: Filter) -> Result<ExecResult, ExecError> {
        let schema = self.catalog.load_schema(table)?;
        let heap = self.heap_for(table)?;

        let mut matches = Vec::new();
        let mut cursor = ScanCursor::start();
        while let Some((rid, guard)) = heap.scan_next(&mut cursor)? {
            let bytes = match guard.get(rid.slot_id) {
                Ok(Some(bytes)) => bytes,
                _ => continue,
            };
            let Ok(values) = row::decode_to_values(&schema, bytes) else { continue };
            drop(guard);
            if matches_filter(&schema, &values, Some(&filter)) {
                matches.push(rid);
            }
        }

        let affected = matches.len();
        for rid in matches {
            heap.delete(rid)?;
        }

        tracing::info!(table, affected, "deleted rows");
        Ok(ExecResult::RowsAffected(affected))
    }

    fn vacuum(&self, table: &str) -> Result<ExecResult, ExecError> {
        let old_heap = self.heap_for(table)?;
        let old_header_pid = old_heap.header_pid();

        let buffer = self.catalog.buffer();
        let (new_header_pid, guard) = buffer.allocate_page()?;
        drop(guard);
        let (new_first_pid, guard) = buffer.allocate_page()?;
        drop(guard);
        let new_heap = HeapFile::bootstrap(Rc::clone(&buffer), new_header_pid, new_first_pid)?;

        let mut cursor = ScanCursor::start();
        while let Some((rid, guard)) = old_heap.scan_next(&mut cursor)? {
            if let Ok(Some(bytes)) = guard.get(rid.slot_id) {
                new_heap.insert(bytes)?;
            }
        }

        self.catalog.rebind_table(table, new_header_pid)?;

        tracing::info!(table, %old_header_pid, %new_header_pid, "vacuumed table");
        Ok(ExecResult::Vacuumed {
            table: table.to_string(),
            old_header_pid: old_header_pid.to_string(),
            new_header_pid: new_header_pid.to_string(),
        })
    }
}

/// Converts decoded values back to encodable `Value`s, preserving `NULL`.
fn to_encodable(values: &[DecodedValue]) -> Vec<Value> {
    values
        .iter()
        .map(|v| match v {
            DecodedValue::Int(n) => Value::Int(*n),
            DecodedValue::Text(s) => Value::Text(s.clone()),
            DecodedValue::Null => Value::Null,
        })
        .collect()
}

/// Evaluates `filter` against already-decoded typed values (`spec.md` §9's
/// resolved open question: typed comparison, not textual).
fn matches_filter(schema: &Schema, values: &[DecodedValue], filter: Option<&Filter>) -> bool {
    let Some(filter) = filter else { return true };
    let Some(col_index) = schema.column_index(&filter.column) else { return false };
    let decoded = &values[col_index];

    match (decoded, &filter.value, filter.op) {
        (DecodedValue::Null, _, _) => false,
        (DecodedValue::Int(a), Value::Int(b), op) => compare(*a, *b, op),
        (DecodedValue::Int(a), Value::Text(s), op) => match s.trim().parse::<i32>() {
            Ok(b) => compare(*a, b, op),
            Err(_) => false,
        },
        (DecodedValue::Text(a), Value::Text(b), CompareOp::Eq) => a == b,
        (DecodedValue::Text(a), Value::Text(b), op) => compare(a.as_str(), b.as_str(), op),
        (DecodedValue::Text(a), Value::Int(b), op) => compare(a.as_str(), b.to_string().as_str(), op),
        (_, Value::Null, _) => false,
    }
}

fn compare<T: PartialEq + PartialOrd>(a: T, b: T, op: CompareOp) -> bool {
    match op {
        CompareOp::Eq => a == b,
        CompareOp::Lt => a < b,
        CompareOp::Gt => a > b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use disk::InMemoryFileManager;

    fn executor() -> Executor<InMemoryFileManager> {
        let buffer = Rc::new(buffer::BufferManager::new(InMemoryFileManager::new(), 32));
        let catalog = Catalog::open_or_bootstrap(buffer).unwrap();
        Executor::new(catalog)
    }

    fn run(exec: &Executor<InMemoryFileManager>, sql: &str) -> ExecResult {
        exec.execute(crate::sql::parse(sql).unwrap()).unwrap()
    }

    #[test]
    fn create_insert_select_round_trips() {
        let exec = executor();
        run(&exec, "CREATE TABLE t (id INT, name TEXT)");
        run(&exec, "INSERT INTO t VALUES (1, 'alice')");
        run(&exec, "INSERT INTO t VALUES (2, 'bob')");

        match run(&exec, "SELECT * FROM t") {
            ExecResult::Rows(rows) => {
                assert_eq!(rows.len(), 2);
                assert!(rows.contains(&"id=1 | name=alice".to_string()));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn select_with_where_filters_rows() {
        let exec = executor();
        run(&exec, "CREATE TABLE t (id INT, name TEXT)");
        run(&exec, "INSERT INTO t VALUES (1, 'a')");
        run(&exec, "INSERT INTO t VALUES (2, 'b')");

        match run(&exec, "SELECT * FROM t WHERE id = 2") {
            ExecResult::Rows(rows) => assert_eq!(rows, vec!["id=2 | name=b".to_string()]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn update_grow_preserves_visibility() {
        let exec = executor();
        run(&exec, "CREATE TABLE u (id INT, name TEXT)");
        run(&exec, "INSERT INTO u VALUES (1, 'a')");
        run(&exec, "UPDATE u SET name = 'aaaaaaaaaaaaaaaaaaaa' WHERE id = 1");

        match run(&exec, "SELECT * FROM u") {
            ExecResult::Rows(rows) => assert_eq!(rows, vec!["id=1 | name=aaaaaaaaaaaaaaaaaaaa".to_string()]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn vacuum_drops_tombstones_and_rebinds_catalog() {
        let exec = executor();
        run(&exec, "CREATE TABLE u (id INT, name TEXT)");
        run(&exec, "INSERT INTO u VALUES (1, 'a')");
        run(&exec, "UPDATE u SET name = 'aaaaaaaaaaaaaaaaaaaa' WHERE id = 1");
        run(&exec, "VACUUM u");

        match run(&exec, "SELECT * FROM u") {
            ExecResult::Rows(rows) => assert_eq!(rows, vec!["id=1 | name=aaaaaaaaaaaaaaaaaaaa".to_string()]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn delete_removes_matching_rows() {
        let exec = executor();
        run(&exec, "CREATE TABLE t (id INT)");
        run(&exec, "INSERT INTO t VALUES (1)");
        run(&exec, "INSERT INTO t VALUES (2)");
        run(&exec, "DELETE FROM t WHERE id = 1");

        match run(&exec, "SELECT * FROM t") {
            ExecResult::Rows(rows) => assert_eq!(rows, vec!["id=2".to_string()]),
            other => panic!("unexpected {other:?}"),
        }
    }
}
