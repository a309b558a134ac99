use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::warn;
use walkdir::WalkDir;

use crate::config::LibrarySettings;
use crate::error::{Result, SpindleError};

use super::ingest::is_audio;

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Enumerate the audio files under `root` (the "open folder" action).
///
/// The root itself must be a readable directory: a missing or non-directory
/// root is reported as an unavailable capability, a refused one as
/// [`SpindleError::PermissionDenied`]. Unreadable entries below the root are
/// skipped with a warning.
pub fn pick_directory(root: &Path, settings: &LibrarySettings) -> Result<Vec<PathBuf>> {
    if let Err(e) = std::fs::read_dir(root) {
        return Err(match e.kind() {
            ErrorKind::PermissionDenied => SpindleError::PermissionDenied(root.to_path_buf()),
            ErrorKind::NotFound => SpindleError::CapabilityUnavailable(format!(
                "no such directory: {}",
                root.display()
            )),
            _ => SpindleError::CapabilityUnavailable(format!(
                "cannot open {}: {e}",
                root.display()
            )),
        });
    }

    let mut walker = WalkDir::new(root).follow_links(settings.follow_links);
    // Non-recursive = only the root directory.
    if !settings.recursive {
        walker = walker.max_depth(1);
    }

    let mut files: Vec<PathBuf> = Vec::new();
    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("scan: skipping unreadable entry: {e}");
                continue;
            }
        };
        let path = entry.path();
        let is_file = entry.file_type().is_file() || (settings.follow_links && path.is_file());
        if is_file && is_audio(path) {
            files.push(path.to_path_buf());
        }
    }

    if files.is_empty() {
        return Err(SpindleError::EmptySelection);
    }
    files.sort();
    Ok(files)
}
