use crate::constants::CONFIG_FILE_NAME;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "img-shrink",
    about = "Compress, resize and optionally convert every image in a folder",
    long_about = "img-shrink walks the configured image folder, shrinks every JPEG, PNG and WebP \
                  that exceeds the configured maximum dimensions, re-encodes it at the configured \
                  quality and replaces the original (or writes a mirrored copy to an output folder). \
                  Settings are read from img.config.json in the current directory.",
    version,
    after_help = "CONFIGURATION (img.config.json, all keys optional):\n  \
    {\n    \
      \"quality\": 80,\n    \
      \"maxWidth\": 1920,\n    \
      \"maxHeight\": 1080,\n    \
      \"convertToWebp\": false,\n    \
      \"folder\": \"./images\",\n    \
      \"skipExisting\": true,\n    \
      \"createBackup\": true,\n    \
      \"outputFolder\": null\n  \
    }"
)]
pub struct Args {
    #[arg(
        short = 'c',
        long,
        value_name = "PATH",
        default_value = CONFIG_FILE_NAME,
        help = "Configuration file",
        long_help = "Path of the JSON configuration file. A missing file is not an error: \
                     the built-in defaults are used instead."
    )]
    pub config: PathBuf,

    #[arg(
        short = 'v',
        long,
        help = "Show per-file debug output",
        conflicts_with = "quiet"
    )]
    pub verbose: bool,

    #[arg(short = 'q', long, help = "Only print errors and the final summary")]
    pub quiet: bool,
}
