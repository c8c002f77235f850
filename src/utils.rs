//! Helpers shared by the pipeline and the command-line front end.

use crate::batch::{BatchReport, FileFailure};
use crate::constants::{
    BYTES_PER_MEGABYTE, ERROR_PREFIX, PROGRESS_SPINNER_TEMPLATE, STATS_PREFIX, SUCCESS_PREFIX,
    WARNING_PREFIX,
};
use crate::error::ShrinkError;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Format file size in human-readable format
///
/// # Arguments
/// * `bytes` - Size in bytes
///
/// # Returns
/// * Human-readable size string (e.g., "1.2 MB", "512 B")
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    const THRESHOLD: f64 = 1024.0;

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= THRESHOLD && unit_index < UNITS.len() - 1 {
        size /= THRESHOLD;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

/// Calculate compression ratio as a percentage
///
/// Positive means the output is smaller. Zero original bytes give 0.
pub fn calculate_compression_ratio(original_size: u64, compressed_size: u64) -> f64 {
    if original_size == 0 {
        return 0.0;
    }
    ((original_size as f64 - compressed_size as f64) / original_size as f64) * 100.0
}

pub fn bytes_to_megabytes(bytes: f64) -> f64 {
    bytes / BYTES_PER_MEGABYTE
}

/// Rounds half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    let rounded = (value * factor).round() / factor;
    // avoid reporting -0
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Create a progress spinner with consistent styling
pub fn create_progress_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template(PROGRESS_SPINNER_TEMPLATE) {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Stdout lines of the end-of-run summary, including any failed files.
pub fn summary_lines(report: &BatchReport) -> Vec<String> {
    let mut lines = vec![
        String::new(),
        format!("{} Stats:", STATS_PREFIX),
        format!("- Images processed: {}", report.stats.processed),
        format!("- Total size reduced: {:.2} MB", report.stats.size_saved_mb),
        format!(
            "- Average compression: {:.1}%",
            report.stats.average_compression
        ),
        format!(
            "- Size before/after: {} -> {}",
            format_file_size(report.total_original_bytes),
            format_file_size(report.total_final_bytes)
        ),
    ];

    if report.failed() > 0 {
        lines.push(String::new());
        lines.push(format!(
            "{}  Failed files: {} of {}",
            WARNING_PREFIX,
            report.failed(),
            report.discovered
        ));
        for failure in &report.failures {
            lines.push(format!("  - {}: {}", failure.path.display(), failure.error));
        }
    }

    lines
}

/// Recovery instructions for a file whose original was deleted but whose
/// encoded replacement never reached its final path.
pub fn inconsistency_alert(failure: &FileFailure) -> Option<String> {
    let ShrinkError::ReplaceInconsistency {
        temp,
        output,
        backup,
        ..
    } = &failure.error
    else {
        return None;
    };

    let recovery = match backup {
        Some(backup) => format!("The original can be restored from {}", backup.display()),
        None => "No backup was made for this file".to_string(),
    };
    Some(format!(
        "{} ATTENTION: {} no longer exists. The encoded image is at {}\n   {}",
        ERROR_PREFIX,
        output.display(),
        temp.display(),
        recovery
    ))
}

pub fn print_batch_summary(report: &BatchReport) {
    for line in summary_lines(report) {
        println!("{}", line);
    }
    for alert in report.inconsistent().filter_map(inconsistency_alert) {
        eprintln!("{}", alert);
    }
}

/// One-line completion message for the spinner.
pub fn completion_message(report: &BatchReport) -> String {
    if report.failed() == 0 {
        format!("{} Image compression completed!", SUCCESS_PREFIX)
    } else {
        format!(
            "{}  Image compression completed with {} failed file(s)",
            WARNING_PREFIX,
            report.failed()
        )
    }
}
