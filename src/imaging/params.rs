//! Parameter types for atlas encoding.
//!
//! These structs describe *what* to write, not *how*. The
//! [`operations`](super::operations) module fills them in and the
//! [`backend`](super::backend) does the pixel work, which lets tests swap in
//! a mock backend without touching the pipeline.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100, default 80). Clamped on construction.
//! - [`EncodeParams`]: Output path, final square side and quality for the atlas.

use serde::Serialize;
use std::path::PathBuf;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(80)
    }
}

/// Parameters for writing the finished atlas.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeParams {
    pub output: PathBuf,
    /// Side of the square output; the canvas is resized to exactly this.
    pub width: u32,
    pub quality: Quality,
}
