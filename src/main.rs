//! Synchronous REPL: prompt `marqdb> `, statements terminated by newline,
//! meta-commands `.exit`/`.quit`/`.help`. A local, single-threaded driver:
//! logging is initialized once up front, then one designated entry point
//! reads a line, parses it, and dispatches it to the executor.

use std::io::{self, Write};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::rc::Rc;

use marqdb::executor::ExecResult;
use marqdb::{Catalog, EngineConfig, Executor};

const DEFAULT_DB_PATH: &str = "test.db";
const DEFAULT_LOGS_DIR: &str = "./logs";
const DEFAULT_BUFFER_PAGES: usize = 64;
const CONFIG_PATH: &str = "marqdb.toml";

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let db_path_arg = args.first().cloned();

    let config = EngineConfig::load_from_file(CONFIG_PATH).ok();

    let db_path = db_path_arg
        .map(PathBuf::from)
        .or_else(|| config.as_ref().map(|c| c.storage.db_path.clone()))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));
    let logs_dir = config.as_ref().map(|c| c.storage.logs_dir.clone()).unwrap_or_else(|| PathBuf::from(DEFAULT_LOGS_DIR));
    let buffer_pages = config
        .as_ref()
        .map(|c| c.storage.buffer_pages)
        .unwrap_or_else(|| NonZeroUsize::new(DEFAULT_BUFFER_PAGES).expect("64 is non-zero"));

    let _logging_guard = match marqdb::logging::init_logging(&logs_dir) {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("warning: failed to initialize logging: {err}");
            None
        }
    };

    let file_manager = match disk::DiskFileManager::open(&db_path) {
        Ok(fm) => fm,
        Err(err) => {
            eprintln!("fatal: could not open database file {}: {err}", db_path.display());
            std::process::exit(1);
        }
    };
    let buffer = Rc::new(buffer::BufferManager::new(file_manager, buffer_pages.get()));

    let catalog = match Catalog::open_or_bootstrap(buffer) {
        Ok(catalog) => catalog,
        Err(err) => {
            eprintln!("fatal: {err}");
            std::process::exit(1);
        }
    };
    let executor = Executor::new(catalog);

    tracing::info!(db_path = %db_path.display(), "marqdb ready");
    run_repl(&executor);
}

fn run_repl(executor: &Executor<disk::DiskFileManager>) {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("marqdb> ");
        if stdout.flush().is_err() {
            break;
        }

        let mut line = String::new();
        let bytes_read = stdin.read_line(&mut line);
        match bytes_read {
            Ok(0) => break, // EOF (Ctrl-D)
            Ok(_) => {}
            Err(err) => {
                eprintln!("error reading input: {err}");
                break;
            }
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line.to_ascii_lowercase().as_str() {
            ".exit" | ".quit" => break,
            ".help" => {
                print_help();
                continue;
            }
            _ => {}
        }

        let statement = match marqdb::sql::parse(line) {
            Ok(statement) => statement,
            Err(err) => {
                println!("parse error: {err}");
                continue;
            }
        };

        match executor.execute(statement) {
            Ok(ExecResult::Ok) => println!("OK"),
            Ok(ExecResult::RowsAffected(n)) => println!("OK, {n} row(s)"),
            Ok(ExecResult::Rows(rows)) => {
                for row in &rows {
                    println!("{row}");
                }
                println!("marqdb: {} row(s)", rows.len());
            }
            Ok(ExecResult::Vacuumed { table, old_header_pid, new_header_pid }) => {
                println!("VACUUM {table}: heap header {old_header_pid} -> {new_header_pid}");
            }
            Err(err) => println!("error: {err}"),
        }
    }

    println!("bye");
}

fn print_help() {
    println!("statements:");
    println!("  CREATE TABLE name (col TYPE, ...)   TYPE is INT or TEXT");
    println!("  INSERT INTO name VALUES (v, ...)");
    println!("  SELECT * FROM name [WHERE col OP val]   OP is =, <, >");
    println!("  UPDATE name SET col = val [WHERE col OP val]");
    println!("  DELETE FROM name WHERE col OP val");
    println!("  VACUUM name");
    println!("meta-commands:");
    println!("  .help    show this message");
    println!("  .exit    quit (also .quit, Ctrl-D)");
}
