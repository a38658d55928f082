//! # Atlasgen
//!
//! Packs a folder tree full of images into one square contact-sheet image.
//! Point it at a music library and it finds every cover, shuffles them, and
//! tiles as many as fit a perfect square grid into a single JPEG (or PNG,
//! WebP, TIFF, AVIF) of exactly the requested width.
//!
//! # Architecture: One Linear Pipeline
//!
//! ```text
//! 1. Discover   root + glob    →  shuffled path list
//! 2. Filter     path list      →  working set + corrupt list
//! 3. Plan       working set    →  grid (side, cell, canvas)
//! 4. Composite  grid + images  →  canvas
//! 5. Encode     canvas         →  output file
//! ```
//!
//! Each stage is a plain function or small struct with no shared state, so
//! the pieces are tested on their own and the whole run is tested with a
//! mock image backend that never touches pixels on disk.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`discover`] | Walks the root, matches the glob, excludes the output file, shuffles |
//! | [`filter`] | Stats each candidate, warns on odd sizes, collects stat failures |
//! | [`imaging`] | Grid arithmetic, cell fitting, and the `image`-crate backend |
//! | [`compose`] | Places tiles row-major on the canvas, skipping undecodable files |
//! | [`pipeline`] | Runs the stages in order and reports events and the final tally |
//! | [`config`] | Option parsing with lenient numbers and defaults |
//! | [`output`] | CLI output formatting for events and the summary |
//!
//! # Design Decisions
//!
//! ## Perfect Squares Only
//!
//! The grid side is `floor(sqrt(n))`, so ten images give a 3×3 grid and one
//! image is left out. Because the order is shuffled first, a different
//! image is left out each run. The canvas is built at `side × cell` pixels
//! (which can overshoot the target by a few pixels when the width does not
//! divide evenly) and then resized once, so the output is always exactly
//! `width × width`.
//!
//! ## No Holes
//!
//! A file that passes the stat check but fails to decode does not consume a
//! cell. The cursor stays put and the next image takes the slot, so only
//! trailing cells can end up empty.
//!
//! ## Size Limits Warn, They Don't Reject
//!
//! `--min-file-size` and `--max-file-size` flag suspicious files (tiny
//! placeholder thumbnails, huge scans) but still use them. Only files that
//! cannot be stat'd or decoded are dropped.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, Lanczos3 resampling, and every encoder come from the `image`
//! crate. No ImageMagick, no system libraries.

pub mod compose;
pub mod config;
pub mod discover;
pub mod filter;
pub mod imaging;
pub mod output;
pub mod pipeline;
