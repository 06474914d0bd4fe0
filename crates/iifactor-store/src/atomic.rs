//! Atomic file replacement shared by every on-disk writer.

use std::fs;
use std::path::{Path, PathBuf};

/// Write `contents` to `{dir}/{file_name}` via a `.tmp` sibling and rename,
/// so readers never observe a partial file.
///
/// On Unix the file is restricted to the owner (it may hold key URIs).
pub(crate) fn write_atomic(dir: &Path, file_name: &str, contents: &str) -> std::io::Result<PathBuf> {
    let path = dir.join(file_name);
    let tmp = dir.join(format!(".{file_name}.tmp"));

    fs::write(&tmp, contents)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&tmp, fs::Permissions::from_mode(0o600))?;
    }

    fs::rename(&tmp, &path)?;

    Ok(path)
}
