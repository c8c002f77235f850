//! Per-file transform planning.
//!
//! [`plan_transform`] is pure: the same record and configuration always give
//! the same plan. Creating the mirrored output directory is a separate step,
//! [`prepare_output_location`].

use crate::codec::ImageMetadata;
use crate::config::Config;
use crate::error::{Result, ShrinkError};
use crate::formats::ImageFormat;
use std::fs;
use std::path::{Path, PathBuf};

/// One discovered file, alive only while that file is processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    pub source: PathBuf,
    pub original_size: u64,
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
}

impl ImageRecord {
    pub fn new(source: PathBuf, original_size: u64, metadata: ImageMetadata) -> Self {
        Self {
            source,
            original_size,
            width: metadata.width,
            height: metadata.height,
            format: metadata.format,
        }
    }
}

/// Fully resolved decisions for transforming one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformPlan {
    pub width: u32,
    pub height: u32,
    /// True when the target dimensions differ from the source
    pub resize: bool,
    pub format: ImageFormat,
    pub quality: u8,
    pub output_path: PathBuf,
    /// The output replaces the source file (no output folder configured)
    pub in_place: bool,
}

/// Computes the plan for `record` under `config`.
pub fn plan_transform(record: &ImageRecord, config: &Config) -> TransformPlan {
    let (width, height) = fit_within(
        (record.width, record.height),
        (config.max_width, config.max_height),
    );

    let format = if config.convert_to_webp {
        ImageFormat::WebP
    } else {
        record.format
    };

    let output_path = match &config.output_folder {
        None => record.source.clone(),
        Some(output_folder) => mirror_path(&record.source, &config.folder, output_folder),
    };

    TransformPlan {
        width,
        height,
        resize: (width, height) != (record.width, record.height),
        format,
        quality: config.quality,
        output_path,
        in_place: config.is_in_place(),
    }
}

/// Scales `source` down to fit inside `bounds`, keeping the aspect ratio.
///
/// Dimensions already inside the box come back unchanged; nothing is ever
/// enlarged. The derived side is rounded half up and never drops below 1.
///
/// # Examples
/// ```
/// use img_shrink::planner::fit_within;
///
/// assert_eq!(fit_within((3000, 2000), (1920, 1080)), (1620, 1080));
/// assert_eq!(fit_within((800, 600), (1920, 1080)), (800, 600));
/// ```
pub fn fit_within(source: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let (width, height) = source;
    let (max_width, max_height) = bounds;

    if width <= max_width && height <= max_height {
        return source;
    }
    if width == 0 || height == 0 {
        return source;
    }

    let (w, h) = (width as u64, height as u64);
    let (mw, mh) = (max_width as u64, max_height as u64);

    if w * mh >= h * mw {
        // width is the binding side
        let scaled = (h * mw * 2 + w) / (2 * w);
        (max_width, (scaled as u32).max(1))
    } else {
        let scaled = (w * mh * 2 + h) / (2 * h);
        ((scaled as u32).max(1), max_height)
    }
}

/// Maps `source` under `folder` to the same relative location under `output_folder`.
pub fn mirror_path(source: &Path, folder: &Path, output_folder: &Path) -> PathBuf {
    match source.strip_prefix(folder) {
        Ok(relative) => output_folder.join(relative),
        // Discovery always yields paths under `folder`; fall back to a flat layout.
        Err(_) => output_folder.join(source.file_name().unwrap_or(source.as_os_str())),
    }
}

/// Creates every missing directory above the plan's output path.
///
/// A no-op for in-place plans. Existing directories are not an error.
pub fn prepare_output_location(plan: &TransformPlan) -> Result<()> {
    if plan.in_place {
        return Ok(());
    }
    if let Some(parent) = plan.output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ShrinkError::DirectoryCreationFailed {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}
