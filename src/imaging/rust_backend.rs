//! Pure Rust image backend on top of the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP) | `image::ImageReader` with content sniffing |
//! | Contain-resize | [`operations::fit_to_cell`](super::operations::fit_to_cell), Lanczos3 |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` with quality |
//! | Encode → AVIF | `image::codecs::avif::AvifEncoder` (rav1e, speed 6) |
//! | Encode → PNG / WebP / TIFF | lossless encoders, quality ignored |

use super::backend::{BackendError, ImageBackend};
use super::operations::fit_to_cell;
use super::params::EncodeParams;
use image::buffer::ConvertBuffer;
use image::codecs::avif::AvifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, ImageReader, RgbImage, RgbaImage};
use std::io::Cursor;
use std::path::Path;
use std::sync::LazyLock;

/// Output extensions the atlas writer knows how to encode.
const OUTPUT_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("webp", ImageFormat::WebP),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("avif", ImageFormat::Avif),
];

static SUPPORTED_OUTPUT_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    OUTPUT_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.writing_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the output file extensions that have an encoder compiled in.
pub fn supported_output_extensions() -> &'static [&'static str] {
    &SUPPORTED_OUTPUT_EXTENSIONS
}

/// Resolve the encoder format for an output path from its extension.
pub fn output_format(path: &Path) -> Option<ImageFormat> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    OUTPUT_CANDIDATES
        .iter()
        .find(|(candidate, fmt)| *candidate == ext && fmt.writing_enabled())
        .map(|(_, fmt)| *fmt)
}

/// Largest square side the encoder for `path` can write.
pub fn max_output_side(path: &Path) -> Option<u32> {
    output_format(path).map(|fmt| match fmt {
        ImageFormat::Jpeg => 65_535,
        ImageFormat::WebP => 16_383,
        _ => u32::MAX,
    })
}

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Load and decode an image from disk.
///
/// The format is sniffed from the file contents, so a PNG named `.jpg`
/// still decodes; a file that matches no decoder is an error.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

/// Encode the atlas into memory in the format implied by `path`.
///
/// Encoding completes before anything touches the filesystem, so a failed
/// encode never leaves a truncated atlas behind.
fn encode_image(atlas: &RgbaImage, path: &Path, quality: u8) -> Result<Vec<u8>, BackendError> {
    let format = output_format(path).ok_or_else(|| {
        BackendError::UnsupportedFormat(
            path.extension()
                .map(|e| e.to_string_lossy().into_owned())
                .unwrap_or_default(),
        )
    })?;

    let mut bytes = Cursor::new(Vec::new());
    let result = match format {
        // JPEG has no alpha channel: transparent padding flattens to black.
        ImageFormat::Jpeg => {
            let flattened: RgbImage = atlas.convert();
            DynamicImage::ImageRgb8(flattened)
                .write_with_encoder(JpegEncoder::new_with_quality(&mut bytes, quality))
        }
        ImageFormat::Avif => DynamicImage::ImageRgba8(atlas.clone())
            .write_with_encoder(AvifEncoder::new_with_speed_quality(&mut bytes, 6, quality)),
        lossless => atlas.write_to(&mut bytes, lossless),
    };
    result.map_err(|e| BackendError::ProcessingFailed(format!("{format:?} encode failed: {e}")))?;
    Ok(bytes.into_inner())
}

impl ImageBackend for RustBackend {
    fn load_cell(&self, path: &Path, cell_size: u32) -> Result<RgbaImage, BackendError> {
        let img = load_image(path)?;
        Ok(fit_to_cell(&img, cell_size))
    }

    fn encode(&self, atlas: &RgbaImage, params: &EncodeParams) -> Result<(), BackendError> {
        let quality = params.quality.value() as u8;
        let bytes = encode_image(atlas, &params.output, quality)?;
        std::fs::write(&params.output, bytes)?;
        Ok(())
    }
}
