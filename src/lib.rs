//! # marqdb
//!
//! A small single-node relational storage engine: paginated storage of
//! variable-length records, a fixed-capacity buffer pool, catalog/heap
//! abstractions above it, and a tiny executor supporting `CREATE TABLE`,
//! `INSERT`, `SELECT`, `UPDATE`, `DELETE`, and `VACUUM`.
//!
//! The crate is organized around the dependency order of its storage
//! stack (leaves first), mirrored by the workspace's `/crates` split:
//!
//! - `page`, `disk`, `buffer`, `heap`: independently publishable storage
//!   layers.
//! - [`row`]: the on-disk tuple codec.
//! - [`catalog`]: table/column metadata stored as rows in two heap files.
//! - [`sql`]: a minimal ad-hoc tokenizer/parser for the supported statements.
//! - [`executor`]: dispatches parsed statements against the catalog.
//! - [`config`], [`logging`]: ambient engine setup.

pub mod catalog;
pub mod config;
pub mod executor;
pub mod logging;
pub mod row;
pub mod sql;

pub use catalog::Catalog;
pub use config::EngineConfig;
pub use executor::{ExecError, ExecResult, Executor};
