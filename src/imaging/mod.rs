//! Image processing in pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Grid planning** | pure integer math ([`plan_grid`]) |
//! | **Decode + contain** | `image::ImageReader` + Lanczos3 resize |
//! | **Encode** | JPEG / AVIF with quality, PNG / WebP / TIFF lossless |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for grid and fit math (unit testable)
//! - **Parameters**: Data structures describing the encode step
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend};
pub use calculations::{GridSpec, Placement, contain_fit, plan_grid};
pub use operations::{encode_atlas, fit_to_cell};
pub use params::{EncodeParams, Quality};
pub use rust_backend::{RustBackend, max_output_side, supported_output_extensions};
