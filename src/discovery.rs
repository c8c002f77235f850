use crate::constants::SUPPORTED_IMAGE_EXTENSIONS;
use crate::error::{Result, ShrinkError};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Recursively collects candidate images under `folder`.
///
/// Entries are visited in file-name order so the result is deterministic.
/// Symlinks are followed. Hidden files and directories below the root are
/// skipped, and link cycles are logged and skipped. The root itself
/// must exist and be listable, otherwise a fatal [`ShrinkError::Discovery`]
/// is returned; unreadable subdirectories are logged and skipped.
pub fn collect_image_files(folder: &Path) -> Result<Vec<PathBuf>> {
    let metadata = fs::metadata(folder).map_err(|source| ShrinkError::Discovery {
        path: folder.to_path_buf(),
        source,
    })?;
    if !metadata.is_dir() {
        return Err(ShrinkError::Discovery {
            path: folder.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::Other, "not a directory"),
        });
    }
    fs::read_dir(folder).map_err(|source| ShrinkError::Discovery {
        path: folder.to_path_buf(),
        source,
    })?;

    let mut image_files = Vec::new();
    let walker = WalkDir::new(folder)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        if entry.file_type().is_file() && is_image_file(entry.path()) {
            image_files.push(entry.into_path());
        }
    }

    debug!(
        "Discovered {} image files under {}",
        image_files.len(),
        folder.display()
    );
    Ok(image_files)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

/// True when the extension is one of the supported image extensions
/// (case-insensitive).
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| SUPPORTED_IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}
