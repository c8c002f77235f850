//! Image format tags understood by the pipeline
//!
//! The set is closed: every codec operation matches on it exhaustively
//! instead of dispatching on a format name.

use crate::error::{Result, ShrinkError};
use std::fmt;

/// Formats the pipeline can read and write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    /// JPEG, lossy
    Jpeg,
    /// PNG, lossless with oxipng optimization
    Png,
    /// WebP, lossy
    WebP,
}

impl ImageFormat {
    /// Convert to the image crate's ImageFormat
    pub fn to_image_format(&self) -> image::ImageFormat {
        match self {
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::WebP => image::ImageFormat::WebP,
        }
    }
}

impl TryFrom<image::ImageFormat> for ImageFormat {
    type Error = ShrinkError;

    fn try_from(format: image::ImageFormat) -> Result<Self> {
        match format {
            image::ImageFormat::Jpeg => Ok(ImageFormat::Jpeg),
            image::ImageFormat::Png => Ok(ImageFormat::Png),
            image::ImageFormat::WebP => Ok(ImageFormat::WebP),
            other => Err(ShrinkError::UnsupportedFormat(format!("{:?}", other))),
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImageFormat::Jpeg => "JPEG",
            ImageFormat::Png => "PNG",
            ImageFormat::WebP => "WebP",
        };
        write!(f, "{}", name)
    }
}
