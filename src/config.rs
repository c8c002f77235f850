//! Run configuration.
//!
//! A [`Config`] is built once at startup by merging an optional
//! `img.config.json` over the built-in defaults, validated, and then passed
//! by reference through every stage of the batch. Keys in the JSON file are
//! camelCase and any subset may be given.

use crate::constants::{
    DEFAULT_FOLDER, DEFAULT_MAX_HEIGHT, DEFAULT_MAX_WIDTH, DEFAULT_QUALITY, MAX_QUALITY,
    MIN_QUALITY,
};
use crate::error::{Result, ShrinkError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Encoder quality (1-100), applied to every output
    pub quality: u8,
    /// Maximum output width in pixels
    pub max_width: u32,
    /// Maximum output height in pixels
    pub max_height: u32,
    /// Re-encode everything as WebP
    pub convert_to_webp: bool,
    /// Root folder scanned for images
    pub folder: PathBuf,
    /// Accepted for compatibility; does not change processing
    pub skip_existing: bool,
    /// Copy each source to `<file>.backup` before touching it
    pub create_backup: bool,
    /// Mirror outputs under this folder instead of replacing in place
    pub output_folder: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            max_width: DEFAULT_MAX_WIDTH,
            max_height: DEFAULT_MAX_HEIGHT,
            convert_to_webp: false,
            folder: PathBuf::from(DEFAULT_FOLDER),
            skip_existing: true,
            create_backup: true,
            output_folder: None,
        }
    }
}

impl Config {
    /// Loads the configuration file at `path`.
    ///
    /// A missing file is not an error: defaults are returned and a notice is
    /// logged. Unreadable or malformed files are fatal.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(
                    "No {} found, using default settings",
                    path.file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| path.display().to_string())
                );
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ShrinkError::ConfigRead {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let config = Self::parse(&content, path)?;
        debug!("Loaded configuration from {}: {:?}", path.display(), config);
        Ok(config)
    }

    /// Parses a JSON document and merges it over the defaults.
    pub fn from_json_str(content: &str) -> Result<Self> {
        Self::parse(content, Path::new("<inline>"))
    }

    fn parse(content: &str, origin: &Path) -> Result<Self> {
        let config: Config =
            serde_json::from_str(content).map_err(|source| ShrinkError::ConfigParse {
                path: origin.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(MIN_QUALITY..=MAX_QUALITY).contains(&self.quality) {
            return Err(ShrinkError::InvalidConfig(format!(
                "quality must be between {} and {}, got {}",
                MIN_QUALITY, MAX_QUALITY, self.quality
            )));
        }
        if self.max_width == 0 {
            return Err(ShrinkError::InvalidConfig(
                "maxWidth must be a positive number of pixels".to_string(),
            ));
        }
        if self.max_height == 0 {
            return Err(ShrinkError::InvalidConfig(
                "maxHeight must be a positive number of pixels".to_string(),
            ));
        }
        Ok(())
    }

    /// True when outputs replace their sources.
    pub fn is_in_place(&self) -> bool {
        self.output_folder.is_none()
    }
}
