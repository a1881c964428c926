//! File I/O primitives with consistent error handling.

use crate::error::{Error, Result};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Read file contents with standardized error handling.
///
/// Wraps `fs::read_to_string` with consistent `Error::internal_io` formatting.
pub fn read_file(path: &Path, operation: &str) -> Result<String> {
    fs::read_to_string(path)
        .map_err(|e| Error::internal_io(e.to_string(), Some(operation.to_string())))
}

/// Create a directory and all of its parents.
pub fn ensure_dir(dir: &Path, operation: &str) -> Result<()> {
    fs::create_dir_all(dir)
        .map_err(|e| Error::internal_io(e.to_string(), Some(operation.to_string())))
}

/// Write content to a file that must not exist yet, creating parent directories.
///
/// Returns `Ok(false)` without touching the file when it already exists.
pub fn write_new_file(path: &Path, content: &str, operation: &str) -> Result<bool> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_dir(parent, operation)?;
        }
    }

    let mut file = match fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
    {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(Error::internal_io(e.to_string(), Some(operation.to_string()))),
    };

    file.write_all(content.as_bytes())
        .map_err(|e| Error::internal_io(e.to_string(), Some(operation.to_string())))?;

    Ok(true)
}
