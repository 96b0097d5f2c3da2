//! Store snapshots in `MessagePack` format.
//!
//! A snapshot file holds a format version and the whole store. Files are
//! written to a sibling temporary file first and renamed into place, so a
//! reader never observes a half-written snapshot.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use junction_foundation::{Error, ErrorKind, Result};
use junction_storage::Store;
use serde::{Deserialize, Serialize};

/// Version written into every snapshot.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    store: &'a Store,
}

#[derive(Deserialize)]
struct Snapshot {
    version: u32,
    store: Store,
}

fn io_error(action: &str, path: &Path, e: &std::io::Error) -> Error {
    Error::new(ErrorKind::Io(format!(
        "failed to {action} '{}': {e}",
        path.display()
    )))
}

/// Serializes a store to bytes.
///
/// Uses named serialization to preserve struct field names.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_bytes(store: &Store) -> Result<Vec<u8>> {
    let snapshot = SnapshotRef {
        version: FORMAT_VERSION,
        store,
    };
    rmp_serde::to_vec_named(&snapshot).map_err(|e| Error::new(ErrorKind::Serialization(e.to_string())))
}

/// Deserializes a store from bytes.
///
/// # Errors
///
/// Returns an error if the bytes are not a snapshot or were written by an
/// unsupported format version.
pub fn from_bytes(bytes: &[u8]) -> Result<Store> {
    let snapshot: Snapshot =
        rmp_serde::from_slice(bytes).map_err(|e| Error::new(ErrorKind::Serialization(e.to_string())))?;

    if snapshot.version != FORMAT_VERSION {
        return Err(Error::new(ErrorKind::Serialization(format!(
            "unsupported snapshot version {} (expected {FORMAT_VERSION})",
            snapshot.version
        ))));
    }

    Ok(snapshot.store)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Saves a store to a file, replacing any previous snapshot.
///
/// # Errors
///
/// Returns an error if the file cannot be written or if serialization fails.
/// The previous snapshot, if any, is left intact on error.
pub fn save_to_file<P: AsRef<Path>>(store: &Store, path: P) -> Result<()> {
    let path = path.as_ref();
    let bytes = to_bytes(store)?;
    let tmp = temp_path(path);

    let file = File::create(&tmp).map_err(|e| io_error("create file", &tmp, &e))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(&bytes)
        .map_err(|e| io_error("write to file", &tmp, &e))?;
    writer.flush().map_err(|e| io_error("flush file", &tmp, &e))?;
    drop(writer);

    fs::rename(&tmp, path).map_err(|e| io_error("replace file", path, &e))
}

/// Loads a store from a file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or if deserialization fails.
pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Store> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| io_error("open file", path, &e))?;

    let mut reader = BufReader::new(file);
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| io_error("read file", path, &e))?;

    from_bytes(&bytes)
}
