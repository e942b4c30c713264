pub mod sheet;
pub mod state;

pub use sheet::{LinkRow, LinkSheet, SHEET_HEADERS, STATUS_CHOICES};
pub use state::ProcessedIds;

use crate::error::StoreError;
use std::fs;
use std::path::Path;

/// Write through a sibling temp file so a crash never leaves a torn file.
pub(crate) fn write_atomic(
    path: &Path,
    contents: impl AsRef<[u8]>,
) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    fs::write(&tmp, contents).map_err(|e| StoreError::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| StoreError::io(path, e))
}

/// Remove `path` if present.
pub fn remove_if_exists(path: &Path) -> Result<bool, StoreError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(StoreError::io(path, e)),
    }
}
