pub const DEFAULT_QUALITY: u8 = 80;
pub const MIN_QUALITY: u8 = 1;
pub const MAX_QUALITY: u8 = 100;

pub const DEFAULT_MAX_WIDTH: u32 = 1920;
pub const DEFAULT_MAX_HEIGHT: u32 = 1080;
pub const DEFAULT_FOLDER: &str = "./images";

pub const CONFIG_FILE_NAME: &str = "img.config.json";

pub const SUPPORTED_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

pub const BACKUP_SUFFIX: &str = ".backup";
pub const TEMP_SUFFIX: &str = ".tmp";

// oxipng deflater tuning, chosen by quality
pub const ZOPFLI_QUALITY_THRESHOLD: u8 = 90;
pub const LIBDEFLATER_HIGH_QUALITY_THRESHOLD: u8 = 70;
pub const ZOPFLI_ITERATIONS: u8 = 15;
pub const LIBDEFLATER_HIGH_LEVEL: u8 = 12;
pub const LIBDEFLATER_LOW_LEVEL: u8 = 8;
pub const OXIPNG_PRESET: u8 = 4;

pub const BYTES_PER_MEGABYTE: f64 = 1024.0 * 1024.0;

pub const PROGRESS_SPINNER_TEMPLATE: &str = "{spinner:.green} {msg}";

// Common output message prefixes
pub const SUCCESS_PREFIX: &str = "✅";
pub const WARNING_PREFIX: &str = "⚠️";
pub const ERROR_PREFIX: &str = "❌";
pub const STATS_PREFIX: &str = "📊";
