//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations the atlas needs from
//! an image library: turn a source file into a cell-sized tile, and write the
//! finished atlas to disk.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests use the `MockBackend` below, which never touches pixels on disk.

use super::params::EncodeParams;
use image::RgbaImage;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),
}

/// Trait for image processing backends.
///
/// Both operations are called strictly one at a time by the pipeline.
pub trait ImageBackend {
    /// Decode `path` and contain-resize it onto a transparent
    /// `cell_size × cell_size` tile.
    fn load_cell(&self, path: &Path, cell_size: u32) -> Result<RgbaImage, BackendError>;

    /// Encode `atlas` (already at its final size) to `params.output`,
    /// replacing any existing file.
    fn encode(&self, atlas: &RgbaImage, params: &EncodeParams) -> Result<(), BackendError>;
}
