//! Atlas configuration.
//!
//! Every option comes from the command line; there is no config file. The
//! defaults are applied here, at the boundary, and the pipeline only ever
//! sees a complete [`AtlasConfig`].
//!
//! ## Options
//!
//! ```text
//! --width           1024        # Output atlas side in pixels, at most 16384
//! --quality         80          # Encode quality (JPEG/AVIF), 1-100
//! --pattern         **/*.jpg    # Glob for source files, relative to --root
//! --file-name       atlas.jpg   # Output file; never picked up as a source
//! --max-file-size   3145728     # Sources above this size get a warning
//! --min-file-size   3072        # Sources below this size get a warning
//! ```
//!
//! ## Lenient numbers
//!
//! Numeric options are read the forgiving way: the leading integer of the
//! value counts (`800px` → 800), and anything that yields no positive
//! integer (`abc`, `0`, `-5`, empty) falls back to the default instead of
//! failing the run.

use crate::filter::SizeBounds;
use crate::imaging::{Quality, max_output_side, supported_output_extensions};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_WIDTH: u32 = 1024;
pub const DEFAULT_QUALITY: u32 = 80;
pub const DEFAULT_PATTERN: &str = "**/*.jpg";
pub const DEFAULT_FILE_NAME: &str = "atlas.jpg";
pub const DEFAULT_MAX_FILE_SIZE: u64 = 3 * 1024 * 1024;
pub const DEFAULT_MIN_FILE_SIZE: u64 = 3 * 1024;

/// Widest atlas for any format. The canvas is held in memory as RGBA, so
/// this is already a 1 GiB buffer.
pub const MAX_WIDTH: u32 = 16_384;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Option values exactly as they were typed, before defaults apply.
#[derive(Debug, Clone, Default)]
pub struct RawOptions {
    pub width: Option<String>,
    pub quality: Option<String>,
    pub pattern: Option<String>,
    pub file_name: Option<String>,
    pub max_file_size: Option<String>,
    pub min_file_size: Option<String>,
}

/// Fully resolved settings for one atlas run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AtlasConfig {
    /// Directory the pattern and output path are resolved against.
    pub root: PathBuf,
    pub width: u32,
    pub quality: Quality,
    pub pattern: String,
    pub file_name: PathBuf,
    pub max_file_size: u64,
    pub min_file_size: u64,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            width: DEFAULT_WIDTH,
            quality: Quality::new(DEFAULT_QUALITY),
            pattern: DEFAULT_PATTERN.to_string(),
            file_name: PathBuf::from(DEFAULT_FILE_NAME),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            min_file_size: DEFAULT_MIN_FILE_SIZE,
        }
    }
}

impl AtlasConfig {
    /// Apply defaults to raw option strings.
    pub fn from_raw(root: &Path, raw: &RawOptions) -> Self {
        let quality = parse_lenient(raw.quality.as_deref())
            .and_then(|q| u32::try_from(q).ok())
            .unwrap_or(DEFAULT_QUALITY);

        Self {
            root: root.to_path_buf(),
            width: parse_lenient(raw.width.as_deref())
                .and_then(|w| u32::try_from(w).ok())
                .unwrap_or(DEFAULT_WIDTH),
            quality: Quality::new(quality),
            pattern: non_empty(raw.pattern.as_deref())
                .unwrap_or(DEFAULT_PATTERN)
                .to_string(),
            file_name: PathBuf::from(
                non_empty(raw.file_name.as_deref()).unwrap_or(DEFAULT_FILE_NAME),
            ),
            max_file_size: parse_lenient(raw.max_file_size.as_deref())
                .unwrap_or(DEFAULT_MAX_FILE_SIZE),
            min_file_size: parse_lenient(raw.min_file_size.as_deref())
                .unwrap_or(DEFAULT_MIN_FILE_SIZE),
        }
    }

    /// Validate settings that would otherwise only fail after compositing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ext = self
            .file_name
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        if !supported_output_extensions().contains(&ext.as_str()) {
            return Err(ConfigError::Validation(format!(
                "cannot write {}: output extension must be one of {}",
                self.file_name.display(),
                supported_output_extensions().join(", ")
            )));
        }
        let limit = max_output_side(&self.file_name)
            .unwrap_or(MAX_WIDTH)
            .min(MAX_WIDTH);
        if self.width > limit {
            return Err(ConfigError::Validation(format!(
                "width {} is larger than the {limit}px limit for {}",
                self.width,
                self.file_name.display()
            )));
        }
        if self.min_file_size > self.max_file_size {
            return Err(ConfigError::Validation(format!(
                "min file size {} is larger than max file size {}",
                self.min_file_size, self.max_file_size
            )));
        }
        Ok(())
    }

    /// Where the atlas is written.
    pub fn output_path(&self) -> PathBuf {
        self.root.join(&self.file_name)
    }

    pub fn size_bounds(&self) -> SizeBounds {
        SizeBounds {
            min: self.min_file_size,
            max: self.max_file_size,
        }
    }
}

/// Read the leading positive integer of `raw`.
///
/// Leading whitespace and a `+` sign are skipped; parsing stops at the first
/// non-digit. Returns `None` for missing, non-numeric, zero, negative or
/// overflowing input so callers can fall back to their default.
pub fn parse_lenient(raw: Option<&str>) -> Option<u64> {
    let trimmed = raw?.trim_start();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits_end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    unsigned[..digits_end]
        .parse::<u64>()
        .ok()
        .filter(|&n| n > 0)
}

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.filter(|s| !s.trim().is_empty())
}
