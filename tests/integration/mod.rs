//! Integration tests for db-xl-dump.
//!
//! The mock and SQLite tests run everywhere. PostgreSQL tests require a
//! running server; set DATABASE_URL to run them.

pub mod export_test;
pub mod postgres_test;
pub mod sqlite_test;

use std::io::Read;
use std::path::Path;

/// Reads one part of a written XLSX package as text.
pub fn read_part(path: &Path, name: &str) -> String {
    let file = std::fs::File::open(path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let mut part = archive.by_name(name).unwrap();
    let mut content = String::new();
    part.read_to_string(&mut content).unwrap();
    content
}
