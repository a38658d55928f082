//! High-level image operations.
//!
//! These functions combine the pure [`calculations`](super::calculations)
//! with pixel work and backend execution.

use super::backend::{BackendError, ImageBackend};
use super::calculations::contain_fit;
use super::params::{EncodeParams, Quality};
use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, RgbaImage};
use std::path::Path;
use tracing::debug;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Contain-resize `img` onto a transparent `cell_size × cell_size` tile.
///
/// The image keeps its aspect ratio and is centered; the uncovered part of
/// the tile stays fully transparent.
pub fn fit_to_cell(img: &DynamicImage, cell_size: u32) -> RgbaImage {
    let placement = contain_fit(img.dimensions(), cell_size);
    let scaled = imageops::resize(
        &img.to_rgba8(),
        placement.width,
        placement.height,
        FilterType::Lanczos3,
    );

    let mut tile = RgbaImage::new(cell_size, cell_size);
    imageops::replace(
        &mut tile,
        &scaled,
        i64::from(placement.x),
        i64::from(placement.y),
    );
    tile
}

/// Resize the finished canvas to exactly `width × width` and hand it to the
/// backend for encoding.
///
/// The canvas is consumed: once encoding starts nothing else may touch it.
pub fn encode_atlas(
    backend: &impl ImageBackend,
    canvas: RgbaImage,
    output: &Path,
    width: u32,
    quality: Quality,
) -> Result<EncodeParams> {
    let atlas = if canvas.dimensions() == (width, width) {
        canvas
    } else {
        debug!(
            from = canvas.width(),
            to = width,
            "resizing canvas to target width"
        );
        imageops::resize(&canvas, width, width, FilterType::Lanczos3)
    };

    let params = EncodeParams {
        output: output.to_path_buf(),
        width,
        quality,
    };
    backend.encode(&atlas, &params)?;
    Ok(params)
}
