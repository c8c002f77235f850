use crate::codec::ImageCodec;
use crate::config::Config;
use crate::discovery::collect_image_files;
use crate::error::{Result, ShrinkError};
use crate::planner::{plan_transform, prepare_output_location, ImageRecord};
use crate::utils::{bytes_to_megabytes, calculate_compression_ratio, format_file_size, round_to};
use crate::writer::write_transformed;
use indicatif::ProgressBar;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// Sizes of one successfully processed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileOutcome {
    pub original_size: u64,
    pub final_size: u64,
}

/// A file that was discovered but not processed.
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: ShrinkError,
}

/// Aggregate statistics over successfully processed files.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchStats {
    pub processed: usize,
    /// Megabytes saved, rounded to two decimals (negative if outputs grew)
    pub size_saved_mb: f64,
    /// Percentage of original bytes removed, rounded to one decimal
    pub average_compression: f64,
}

impl BatchStats {
    /// Computes the statistics from the successful outcomes only.
    pub fn from_outcomes(outcomes: &[FileOutcome]) -> Self {
        let total_before: u64 = outcomes.iter().map(|o| o.original_size).sum();
        let total_after: u64 = outcomes.iter().map(|o| o.final_size).sum();
        let saved = total_before as f64 - total_after as f64;

        Self {
            processed: outcomes.len(),
            size_saved_mb: round_to(bytes_to_megabytes(saved), 2),
            average_compression: round_to(
                calculate_compression_ratio(total_before, total_after),
                1,
            ),
        }
    }
}

/// Everything a batch run produced.
#[derive(Debug)]
pub struct BatchReport {
    pub stats: BatchStats,
    pub discovered: usize,
    pub total_original_bytes: u64,
    pub total_final_bytes: u64,
    pub failures: Vec<FileFailure>,
}

impl BatchReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Failures that left a file without its original and need manual recovery.
    pub fn inconsistent(&self) -> impl Iterator<Item = &FileFailure> {
        self.failures
            .iter()
            .filter(|f| matches!(f.error, ShrinkError::ReplaceInconsistency { .. }))
    }
}

/// Runs the whole batch described by `config`.
///
/// Only discovery errors are returned; per-file errors are logged and
/// collected into the report.
pub fn process_images(config: &Config, codec: &dyn ImageCodec) -> Result<BatchReport> {
    process_images_with_progress(config, codec, &ProgressBar::hidden())
}

pub fn process_images_with_progress(
    config: &Config,
    codec: &dyn ImageCodec,
    progress: &ProgressBar,
) -> Result<BatchReport> {
    let image_files = collect_image_files(&config.folder)?;
    let discovered = image_files.len();
    debug!("Processing {} files", discovered);

    let results: Vec<(PathBuf, Result<FileOutcome>)> = image_files
        .into_iter()
        .enumerate()
        .map(|(index, path)| {
            progress.set_message(format!(
                "Processing images... [{}/{}] {}",
                index + 1,
                discovered,
                path.display()
            ));
            let result = process_single_image(&path, config, codec);
            if let Err(e) = &result {
                error!("Failed to process {}: {}", path.display(), e);
            }
            progress.tick();
            (path, result)
        })
        .collect();

    let mut outcomes = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for (path, result) in results {
        match result {
            Ok(outcome) => outcomes.push(outcome),
            Err(error) => failures.push(FileFailure { path, error }),
        }
    }

    Ok(BatchReport {
        stats: BatchStats::from_outcomes(&outcomes),
        discovered,
        total_original_bytes: outcomes.iter().map(|o| o.original_size).sum(),
        total_final_bytes: outcomes.iter().map(|o| o.final_size).sum(),
        failures,
    })
}

/// Decode, plan and write one file.
fn process_single_image(
    path: &Path,
    config: &Config,
    codec: &dyn ImageCodec,
) -> Result<FileOutcome> {
    let original_size = fs::metadata(path)?.len();
    let metadata = codec.read_metadata(path)?;
    let record = ImageRecord::new(path.to_path_buf(), original_size, metadata);

    let plan = plan_transform(&record, config);
    debug!(
        "{}: {}x{} {} -> {}x{} {} at {}",
        path.display(),
        record.width,
        record.height,
        record.format,
        plan.width,
        plan.height,
        plan.format,
        plan.output_path.display()
    );
    prepare_output_location(&plan)?;

    let final_size = write_transformed(path, &plan, config.create_backup, codec)?;
    debug!(
        "{}: {} -> {}",
        plan.output_path.display(),
        format_file_size(original_size),
        format_file_size(final_size)
    );
    Ok(FileOutcome {
        original_size,
        final_size,
    })
}
