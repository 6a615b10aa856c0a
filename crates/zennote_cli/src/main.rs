//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `zennote_core` linkage.
//! - Optionally report how many notes a store file holds.
//!
//! Usage: `zennote [DB_PATH]`

use std::process::ExitCode;
use zennote_core::{NoteStore, SqliteKvStore};

fn main() -> ExitCode {
    println!("zennote_core ping={}", zennote_core::ping());
    println!("zennote_core version={}", zennote_core::core_version());

    let Some(db_path) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };
    match SqliteKvStore::open(&db_path) {
        Ok(backend) => {
            let store = NoteStore::load(backend);
            println!("zennote_core notes={} theme={}", store.len(), store.theme());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("zennote_core store_open=error path={db_path} error={err}");
            ExitCode::FAILURE
        }
    }
}
