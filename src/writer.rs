//! Transactional replace of one image.
//!
//! Effects run in a fixed order so every failure leaves a known state:
//!
//! 1. optional backup copy to `<source>.backup`
//! 2. encode and write `<output>.tmp` next to the final output
//! 3. delete the source (in-place mode only)
//! 4. rename the temp file to the output path
//!
//! Before step 3 the source is untouched. A failure in step 4 after step 3
//! succeeded is reported as [`ShrinkError::ReplaceInconsistency`] and the
//! temp file is left on disk for recovery.

use crate::codec::ImageCodec;
use crate::constants::{BACKUP_SUFFIX, TEMP_SUFFIX};
use crate::error::{Result, ShrinkError};
use crate::planner::TransformPlan;
use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Removes the temp file on drop unless disarmed.
struct TempFileGuard {
    path: PathBuf,
    armed: bool,
}

impl TempFileGuard {
    fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if self.armed {
            let _ = fs::remove_file(&self.path);
        }
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

pub fn backup_path_for(source: &Path) -> PathBuf {
    with_suffix(source, BACKUP_SUFFIX)
}

pub fn temp_path_for(output: &Path) -> PathBuf {
    with_suffix(output, TEMP_SUFFIX)
}

/// Runs the full backup/encode/replace sequence for `source`.
///
/// Returns the byte size of the file at the plan's output path.
pub fn write_transformed(
    source: &Path,
    plan: &TransformPlan,
    create_backup: bool,
    codec: &dyn ImageCodec,
) -> Result<u64> {
    write_transformed_with(source, plan, create_backup, codec, |from, to| {
        fs::rename(from, to)
    })
}

fn write_transformed_with<R>(
    source: &Path,
    plan: &TransformPlan,
    create_backup: bool,
    codec: &dyn ImageCodec,
    rename: R,
) -> Result<u64>
where
    R: Fn(&Path, &Path) -> io::Result<()>,
{
    let backup = if create_backup {
        let backup = backup_path_for(source);
        fs::copy(source, &backup).map_err(|e| ShrinkError::Backup {
            path: backup.clone(),
            source: e,
        })?;
        debug!("Backed up {} to {}", source.display(), backup.display());
        Some(backup)
    } else {
        None
    };

    let bytes = codec.transform(source, plan)?;

    let temp = temp_path_for(&plan.output_path);
    let temp_write_error = |e: io::Error| ShrinkError::TempWrite {
        path: temp.clone(),
        source: e,
    };
    // A leftover temp file may be the only copy from an earlier failed run
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&temp)
        .map_err(temp_write_error)?;
    let mut guard = TempFileGuard::new(temp.clone());
    file.write_all(&bytes).map_err(temp_write_error)?;
    drop(file);
    debug!("Wrote {} bytes to {}", bytes.len(), temp.display());

    match commit_replace_with(
        source,
        &temp,
        &plan.output_path,
        plan.in_place,
        backup.as_deref(),
        rename,
    ) {
        Ok(()) => guard.disarm(),
        Err(e @ ShrinkError::ReplaceInconsistency { .. }) => {
            guard.disarm();
            return Err(e);
        }
        Err(e) => return Err(e),
    }

    Ok(fs::metadata(&plan.output_path)?.len())
}

/// Moves an already-encoded temp file into place.
///
/// In-place mode deletes `source` first; once that succeeds the temp file is
/// the only copy of the image besides `backup`, so a failed rename becomes
/// [`ShrinkError::ReplaceInconsistency`]. Mirror mode never deletes the source.
pub fn commit_replace(
    source: &Path,
    temp: &Path,
    output: &Path,
    in_place: bool,
    backup: Option<&Path>,
) -> Result<()> {
    commit_replace_with(source, temp, output, in_place, backup, |from, to| {
        fs::rename(from, to)
    })
}

fn commit_replace_with<R>(
    source: &Path,
    temp: &Path,
    output: &Path,
    in_place: bool,
    backup: Option<&Path>,
    rename: R,
) -> Result<()>
where
    R: Fn(&Path, &Path) -> io::Result<()>,
{
    if !in_place {
        rename(temp, output)?;
        return Ok(());
    }

    fs::remove_file(source).map_err(|e| ShrinkError::RemoveSource {
        path: source.to_path_buf(),
        source: e,
    })?;

    rename(temp, output).map_err(|e| ShrinkError::ReplaceInconsistency {
        source_path: source.to_path_buf(),
        temp: temp.to_path_buf(),
        output: output.to_path_buf(),
        backup: backup.map(Path::to_path_buf),
        source: e,
    })
}
