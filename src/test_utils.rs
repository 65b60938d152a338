//! Helpers to build test fixtures.

use std::{
    fs::{self, File},
    io::{Cursor, Write},
    path::Path,
};
use zip::{write::FileOptions, ZipWriter};

/// Builds a ZIP archive in memory with the given files.
pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, contents) in entries {
        writer.start_file(*name, FileOptions::default()).unwrap();
        writer.write_all(contents).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Writes a ZIP archive with the given files at `path`.
pub fn write_zip<P: AsRef<Path>>(path: P, entries: &[(&str, &[u8])]) {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    File::create(path)
        .unwrap()
        .write_all(&zip_bytes(entries))
        .unwrap();
}
