use std::{fs, io, path::Path};

use anyhow::{Context, Result};

/// Reads the persisted payload from the save slot file.
///
/// A missing file and a file holding only whitespace both mean no session
/// has been persisted yet, so the caller sees `None` rather than an error.
pub(crate) fn read_slot(path: &Path) -> Result<Option<String>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(error) => {
            return Err(error)
                .with_context(|| format!("failed to read save slot at {}", path.display()))
        }
    };

    let trimmed = contents.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    Ok(Some(trimmed.to_owned()))
}

/// Replaces the save slot file with the provided payload.
pub(crate) fn write_slot(path: &Path, payload: &str) -> Result<()> {
    fs::write(path, payload)
        .with_context(|| format!("failed to write save slot at {}", path.display()))
}
