pub mod batch;
pub mod cli;
pub mod codec;
pub mod config;
pub mod constants;
pub mod discovery;
pub mod error;
pub mod formats;
pub mod logger;
pub mod planner;
pub mod utils;
pub mod writer;

pub use batch::{
    process_images, process_images_with_progress, BatchReport, BatchStats, FileFailure,
    FileOutcome,
};
pub use codec::{encode_image, ImageCodec, ImageMetadata, NativeCodec};
pub use config::Config;
pub use discovery::{collect_image_files, is_image_file};
pub use error::{Result, ShrinkError};
pub use formats::ImageFormat;
pub use planner::{fit_within, plan_transform, prepare_output_location, ImageRecord, TransformPlan};
pub use writer::{backup_path_for, commit_replace, temp_path_for, write_transformed};
