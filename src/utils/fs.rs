//! File system utilities.

use crate::generators::linkname::SIDECAR_EXTENSION;
use crate::{Error, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Create a directory and all parents.
///
/// Existing directories are fine, including ones created concurrently by
/// another link job. An existing non-directory is an error.
pub fn ensure_dir(path: &Path) -> Result<()> {
    match fs::create_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        Err(_) if path.exists() && !path.is_dir() => Err(Error::NotADirectory(path.to_path_buf())),
        Err(e) => Err(e.into()),
    }
}

/// Check if a path names a sidecar file.
pub fn is_sidecar(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(SIDECAR_EXTENSION))
        .unwrap_or(false)
}

/// Check if a path is a symbolic link, without following it.
pub fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false)
}

/// Point `dest` at `source`, replacing an existing link.
///
/// Anything other than a symlink at `dest` is left alone and reported.
pub fn replace_link(source: &Path, dest: &Path) -> Result<()> {
    match fs::symlink_metadata(dest) {
        Ok(meta) if meta.file_type().is_symlink() => {
            fs::remove_file(dest)?;
            tracing::debug!("Removed old link: {:?}", dest);
        }
        Ok(_) => return Err(Error::ForeignFile(dest.to_path_buf())),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    symlink(source, dest)?;
    tracing::debug!("Linked: {:?} -> {:?}", dest, source);
    Ok(())
}

#[cfg(unix)]
fn symlink(source: &Path, dest: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(source, dest)
}

#[cfg(windows)]
fn symlink(source: &Path, dest: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_file(source, dest)
}
