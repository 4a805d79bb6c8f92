//! Relocation of processed originals into an archive directory.
//!
//! After a successful conversion the ROH file and its sidecars are moved
//! into a subdirectory next to the input so a directory of measurements
//! ends up holding only the converted reports. A failed move degrades to
//! a warning; the report has already been written at that point.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::warn;

/// Sidecar extensions moved along with the ROH file.
const SIDECAR_EXTENSIONS: [&str; 2] = ["RCM", "trt"];

/// Move a processed ROH file and its sidecars into the archive directory.
///
/// The archive directory is created next to the input if it does not
/// exist. Sidecars that are absent are skipped silently; sidecars that
/// fail to move produce a warning but do not fail the call.
///
/// # Arguments
///
/// * `roh_path` - The processed input file
/// * `archive_dir_name` - Archive subdirectory name (e.g. "orig")
///
/// # Returns
///
/// The destination paths of every file that was moved.
///
/// # Errors
///
/// Returns an error only if the archive directory cannot be created or
/// the ROH file itself cannot be moved.
pub fn archive_originals(roh_path: &Path, archive_dir_name: &str) -> io::Result<Vec<PathBuf>> {
    let parent = roh_path.parent().unwrap_or_else(|| Path::new("."));
    let archive_dir = parent.join(archive_dir_name);
    fs::create_dir_all(&archive_dir)?;

    let file_name = roh_path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "input has no file name"))?;

    let mut moved = Vec::new();

    let dest = archive_dir.join(file_name);
    fs::rename(roh_path, &dest)?;
    moved.push(dest);

    for ext in SIDECAR_EXTENSIONS {
        let sidecar = roh_path.with_extension(ext);
        if !sidecar.exists() {
            continue;
        }
        let sidecar_name = match sidecar.file_name() {
            Some(name) => name.to_os_string(),
            None => continue,
        };
        let dest = archive_dir.join(sidecar_name);
        match fs::rename(&sidecar, &dest) {
            Ok(()) => moved.push(dest),
            Err(e) => warn!("could not archive sidecar {}: {}", sidecar.display(), e),
        }
    }

    Ok(moved)
}
