//! I/O utility functions

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Sibling path used while a file is being replaced (`report.csv.tmp`).
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("output"));
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write `content` to `path` atomically: write a temp file next to it, then
/// rename over the target. Readers never observe a half-written file.
pub fn atomic_write(path: &Path, content: &str) -> io::Result<()> {
    atomic_write_bytes(path, content.as_bytes())
}

/// Byte variant of [`atomic_write`].
pub fn atomic_write_bytes(path: &Path, content: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let temp = temp_path(path);
    fs::write(&temp, content)?;
    fs::rename(&temp, path)?;
    Ok(())
}
