//! Grid compositing.
//!
//! The [`Compositor`] owns the canvas for the whole run. It walks the working
//! set in order, turns each file into a cell-sized tile through the backend,
//! and pastes it at the row-major cursor. A file that fails to decode is
//! recorded and skipped without moving the cursor, so the next good image
//! takes its slot and the grid never has a hole in the middle.
//!
//! Only the first `side * side` entries are visited; the rest were already
//! reported as left out by the planner.

use crate::filter::{SkipReason, Skipped, WorkingSet};
use crate::imaging::{GridSpec, ImageBackend};
use crate::pipeline::{AtlasEvent, Reporter};
use image::RgbaImage;
use image::imageops;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Row-major grid position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    pub col: u32,
    pub row: u32,
}

impl Cursor {
    /// Move to the next cell, wrapping to a new row after `side` columns.
    pub fn advance(&mut self, side: u32) {
        self.col += 1;
        if self.col >= side {
            self.col = 0;
            self.row += 1;
        }
    }

    /// Pixel offset of this cell's top-left corner.
    pub fn offset(self, cell_size: u32) -> (u32, u32) {
        (self.col * cell_size, self.row * cell_size)
    }
}

/// The in-memory atlas before its final resize.
#[derive(Debug)]
pub struct Canvas {
    image: RgbaImage,
    cell_size: u32,
}

impl Canvas {
    /// A fully transparent `canvas_size × canvas_size` buffer.
    pub fn new(grid: &GridSpec) -> Self {
        Self {
            image: RgbaImage::new(grid.canvas_size, grid.canvas_size),
            cell_size: grid.cell_size,
        }
    }

    /// Paste `tile` at the cell under `cursor`. Pixels falling outside the
    /// canvas are clipped.
    pub fn paste(&mut self, tile: &RgbaImage, cursor: Cursor) {
        let (x, y) = cursor.offset(self.cell_size);
        imageops::replace(&mut self.image, tile, i64::from(x), i64::from(y));
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Hand the buffer over to the encoder.
    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}

/// What compositing produced.
#[derive(Debug)]
pub struct CompositeOutcome {
    pub canvas: Canvas,
    /// Paths that ended up on the canvas, in cell order.
    pub placed: Vec<PathBuf>,
    /// Decode failures, in the order they happened.
    pub failed: Vec<Skipped>,
}

pub struct Compositor<'a, B: ImageBackend> {
    backend: &'a B,
    grid: GridSpec,
    canvas: Canvas,
    cursor: Cursor,
}

impl<'a, B: ImageBackend> Compositor<'a, B> {
    pub fn new(backend: &'a B, grid: GridSpec) -> Self {
        Self {
            backend,
            grid,
            canvas: Canvas::new(&grid),
            cursor: Cursor::default(),
        }
    }

    /// Fill the grid from `working_set`, resolving paths against `root`.
    pub fn composite(
        mut self,
        root: &Path,
        working_set: &WorkingSet,
        reporter: &Reporter,
    ) -> CompositeOutcome {
        let total = working_set.len().min(self.grid.capacity());
        let mut placed = Vec::with_capacity(total);
        let mut failed = Vec::new();

        for (index, path) in working_set.iter().take(total).enumerate() {
            if self.cursor.row >= self.grid.side {
                break;
            }
            reporter.emit(AtlasEvent::Processing {
                path: path.clone(),
                index: index + 1,
                total,
            });

            match self.backend.load_cell(&root.join(path), self.grid.cell_size) {
                Ok(tile) => {
                    debug!(path = %path.display(), col = self.cursor.col, row = self.cursor.row, "pasting tile");
                    self.canvas.paste(&tile, self.cursor);
                    self.cursor.advance(self.grid.side);
                    placed.push(path.clone());
                }
                Err(e) => {
                    reporter.emit(AtlasEvent::DecodeFailed {
                        path: path.clone(),
                        reason: e.to_string(),
                    });
                    failed.push(Skipped {
                        path: path.clone(),
                        reason: SkipReason::Decode(e.to_string()),
                    });
                }
            }
        }

        CompositeOutcome {
            canvas: self.canvas,
            placed,
            failed,
        }
    }
}
