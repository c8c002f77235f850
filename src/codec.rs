//! Image codec seam.
//!
//! The pipeline never touches pixels itself. It asks an [`ImageCodec`] for
//! an image's dimensions and format, and for the encoded bytes of a planned
//! transform. [`NativeCodec`] is the production implementation: decoding
//! and JPEG encoding through `image`, PNG optimization through `oxipng`,
//! lossy WebP through `webp`.

use crate::constants::{
    LIBDEFLATER_HIGH_LEVEL, LIBDEFLATER_HIGH_QUALITY_THRESHOLD, LIBDEFLATER_LOW_LEVEL,
    OXIPNG_PRESET, ZOPFLI_ITERATIONS, ZOPFLI_QUALITY_THRESHOLD,
};
use crate::error::{Result, ShrinkError};
use crate::formats::ImageFormat;
use crate::planner::TransformPlan;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use oxipng::{Deflaters, Options};
use std::io::Cursor;
use std::num::NonZeroU8;
use std::path::Path;
use tracing::debug;

/// Header-level facts about an image file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
}

/// Decode/encode capability consumed by the batch pipeline.
pub trait ImageCodec {
    /// Reads dimensions and format without producing output.
    fn read_metadata(&self, path: &Path) -> Result<ImageMetadata>;

    /// Decodes `path`, applies the plan's resize, and encodes to the plan's
    /// format and quality.
    fn transform(&self, path: &Path, plan: &TransformPlan) -> Result<Vec<u8>>;
}

/// Pure Rust codec backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeCodec;

impl NativeCodec {
    pub fn new() -> Self {
        Self
    }
}

fn open_reader(path: &Path) -> Result<ImageReader<std::io::BufReader<std::fs::File>>> {
    ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| ShrinkError::Codec(format!("cannot open {}: {}", path.display(), e)))
}

impl ImageCodec for NativeCodec {
    fn read_metadata(&self, path: &Path) -> Result<ImageMetadata> {
        let reader = open_reader(path)?;
        let format = reader.format().ok_or_else(|| {
            ShrinkError::UnsupportedFormat(format!("unrecognized image data in {}", path.display()))
        })?;
        let format = ImageFormat::try_from(format)?;
        let (width, height) = reader.into_dimensions()?;
        if width == 0 || height == 0 {
            return Err(ShrinkError::InvalidDimensions(width, height));
        }

        Ok(ImageMetadata {
            width,
            height,
            format,
        })
    }

    fn transform(&self, path: &Path, plan: &TransformPlan) -> Result<Vec<u8>> {
        let mut img = open_reader(path)?.decode()?;

        if plan.resize {
            debug!(
                "Resizing {} from {}x{} to {}x{}",
                path.display(),
                img.width(),
                img.height(),
                plan.width,
                plan.height
            );
            img = img.resize_exact(plan.width, plan.height, FilterType::Lanczos3);
        }

        encode_image(&img, plan.format, plan.quality)
    }
}

/// Encodes `img` as `format` at `quality`.
pub fn encode_image(img: &DynamicImage, format: ImageFormat, quality: u8) -> Result<Vec<u8>> {
    match format {
        ImageFormat::Jpeg => encode_jpeg(img, quality),
        ImageFormat::Png => encode_png(img, quality),
        ImageFormat::WebP => encode_webp(img, quality),
    }
}

fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    // JPEG has no alpha channel
    DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder)?;
    Ok(buffer)
}

fn encode_png(img: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let mut raw = Cursor::new(Vec::new());
    img.write_to(&mut raw, ImageFormat::Png.to_image_format())?;

    oxipng::optimize_from_memory(raw.get_ref(), &png_options(quality))
        .map_err(|e| ShrinkError::Codec(format!("PNG optimization failed: {}", e)))
}

fn png_options(quality: u8) -> Options {
    let mut options = Options::from_preset(OXIPNG_PRESET);

    options.deflate = if quality >= ZOPFLI_QUALITY_THRESHOLD {
        match NonZeroU8::new(ZOPFLI_ITERATIONS) {
            Some(iterations) => Deflaters::Zopfli { iterations },
            None => Deflaters::Libdeflater {
                compression: LIBDEFLATER_HIGH_LEVEL,
            },
        }
    } else if quality >= LIBDEFLATER_HIGH_QUALITY_THRESHOLD {
        Deflaters::Libdeflater {
            compression: LIBDEFLATER_HIGH_LEVEL,
        }
    } else {
        Deflaters::Libdeflater {
            compression: LIBDEFLATER_LOW_LEVEL,
        }
    };

    options
}

fn encode_webp(img: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let rgba = img.to_rgba8();
    let encoder = webp::Encoder::from_rgba(rgba.as_raw(), rgba.width(), rgba.height());
    let encoded = encoder
        .encode_simple(false, quality as f32)
        .map_err(|e| ShrinkError::Codec(format!("WebP encoding failed: {:?}", e)))?;
    Ok(encoded.to_vec())
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use image::{GenericImageView, RgbImage};
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Codec double that serves canned metadata and records transforms.
    #[derive(Default)]
    pub struct MockCodec {
        pub metadata: HashMap<PathBuf, ImageMetadata>,
        pub output_len: usize,
        pub fail_transform: bool,
        pub transforms: RefCell<Vec<(PathBuf, TransformPlan)>>,
    }

    impl MockCodec {
        pub fn new(output_len: usize) -> Self {
            Self {
                output_len,
                ..Self::default()
            }
        }

        pub fn with_image(mut self, path: PathBuf, width: u32, height: u32, format: ImageFormat) -> Self {
            self.metadata.insert(
                path,
                ImageMetadata {
                    width,
                    height,
                    format,
                },
            );
            self
        }

        pub fn failing(mut self) -> Self {
            self.fail_transform = true;
            self
        }
    }

    impl ImageCodec for MockCodec {
        fn read_metadata(&self, path: &Path) -> Result<ImageMetadata> {
            self.metadata
                .get(path)
                .copied()
                .ok_or_else(|| ShrinkError::Codec(format!("no mock metadata for {}", path.display())))
        }

        fn transform(&self, path: &Path, plan: &TransformPlan) -> Result<Vec<u8>> {
            self.transforms
                .borrow_mut()
                .push((path.to_path_buf(), plan.clone()));
            if self.fail_transform {
                return Err(ShrinkError::Codec("mock encode failure".to_string()));
            }
            Ok(vec![0xAB; self.output_len])
        }
    }

    fn create_test_jpeg(path: &Path, width: u32, height: u32) {
        let img = RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        img.save(path).unwrap();
    }

    fn plan_for(width: u32, height: u32, format: ImageFormat, quality: u8) -> TransformPlan {
        TransformPlan {
            width,
            height,
            resize: true,
            format,
            quality,
            output_path: PathBuf::from("unused"),
            in_place: true,
        }
    }

    #[test]
    fn test_read_metadata_jpeg() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("photo.jpg");
        create_test_jpeg(&path, 200, 150);

        let metadata = NativeCodec::new().read_metadata(&path).unwrap();
        assert_eq!(
            metadata,
            ImageMetadata {
                width: 200,
                height: 150,
                format: ImageFormat::Jpeg
            }
        );
    }

    #[test]
    fn test_read_metadata_sniffs_content_not_extension() {
        let temp_dir = TempDir::new().unwrap();
        let png = temp_dir.path().join("really_png.png");
        RgbImage::new(32, 16).save(&png).unwrap();
        let misnamed = temp_dir.path().join("misnamed.jpg");
        std::fs::rename(&png, &misnamed).unwrap();

        let metadata = NativeCodec::new().read_metadata(&misnamed).unwrap();
        assert_eq!(metadata.format, ImageFormat::Png);
        assert_eq!((metadata.width, metadata.height), (32, 16));
    }

    #[test]
    fn test_read_metadata_rejects_garbage() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("fake.jpg");
        std::fs::write(&path, b"fake image data").unwrap();

        let result = NativeCodec::new().read_metadata(&path);
        assert!(matches!(result, Err(ShrinkError::Codec(_))));
    }

    #[test]
    fn test_read_metadata_missing_file() {
        let result = NativeCodec::new().read_metadata(Path::new("/nonexistent/file.jpg"));
        assert!(matches!(result, Err(ShrinkError::Codec(_))));
    }

    #[test]
    fn test_transform_resizes_and_encodes_jpeg() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("photo.jpg");
        create_test_jpeg(&path, 300, 200);

        let bytes = NativeCodec::new()
            .transform(&path, &plan_for(150, 100, ImageFormat::Jpeg, 70))
            .unwrap();

        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (150, 100));
        assert_eq!(
            image::guess_format(&bytes).unwrap(),
            image::ImageFormat::Jpeg
        );
    }

    #[test]
    fn test_transform_without_resize_keeps_dimensions() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("photo.jpg");
        create_test_jpeg(&path, 300, 200);
        let plan = TransformPlan {
            resize: false,
            ..plan_for(300, 200, ImageFormat::Png, 80)
        };

        let bytes = NativeCodec::new().transform(&path, &plan).unwrap();

        assert_eq!(image::guess_format(&bytes).unwrap(), image::ImageFormat::Png);
        assert_eq!(image::load_from_memory(&bytes).unwrap().dimensions(), (300, 200));
    }

    #[test]
    fn test_encode_webp_and_png() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_fn(64, 48, |x, y| {
            image::Rgb([(x * 4) as u8, (y * 5) as u8, 64])
        }));

        let webp = encode_image(&img, ImageFormat::WebP, 75).unwrap();
        assert_eq!(image::guess_format(&webp).unwrap(), image::ImageFormat::WebP);

        let png = encode_image(&img, ImageFormat::Png, 60).unwrap();
        assert_eq!(image::guess_format(&png).unwrap(), image::ImageFormat::Png);
        assert_eq!(image::load_from_memory(&png).unwrap().dimensions(), (64, 48));
    }

    #[test]
    fn test_encode_jpeg_drops_alpha() {
        let img = DynamicImage::new_rgba8(20, 20);
        let bytes = encode_image(&img, ImageFormat::Jpeg, 80).unwrap();
        assert_eq!(image::guess_format(&bytes).unwrap(), image::ImageFormat::Jpeg);
    }

    #[test]
    fn test_png_options_follow_quality() {
        assert!(matches!(png_options(95).deflate, Deflaters::Zopfli { .. }));
        assert!(matches!(
            png_options(80).deflate,
            Deflaters::Libdeflater { compression: 12 }
        ));
        assert!(matches!(
            png_options(40).deflate,
            Deflaters::Libdeflater { compression: 8 }
        ));
    }
}
