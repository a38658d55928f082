//! Pure calculation functions for atlas geometry.
//!
//! All functions here are pure and testable without any I/O or images.

use serde::Serialize;

/// Square grid derived from the number of usable images and the target width.
///
/// `side` is the floor of the square root of the image count, `cell_size`
/// the ceiling of `target_width / side`, and `canvas_size` is `cell_size * side`.
/// The canvas can be a few pixels wider than the target; the encoder resizes
/// it back down at the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridSpec {
    pub side: u32,
    pub cell_size: u32,
    pub canvas_size: u32,
}

impl GridSpec {
    /// Number of cells in the grid.
    pub fn capacity(&self) -> usize {
        self.side as usize * self.side as usize
    }

    /// A zero-sided grid means there is nothing to composite.
    pub fn is_empty(&self) -> bool {
        self.side == 0
    }

    /// How many of `count` images do not fit into the grid.
    pub fn left_out(&self, count: usize) -> usize {
        count.saturating_sub(self.capacity())
    }
}

/// Plan the grid for `count` images and a square output of `target_width` pixels.
///
/// # Examples
/// ```
/// # use atlasgen::imaging::plan_grid;
/// let grid = plan_grid(10, 1000);
/// assert_eq!((grid.side, grid.cell_size, grid.canvas_size), (3, 334, 1002));
/// assert_eq!(grid.left_out(10), 1);
/// ```
pub fn plan_grid(count: usize, target_width: u32) -> GridSpec {
    let side = u32::try_from(count.isqrt()).unwrap_or(u32::MAX);
    if side == 0 {
        return GridSpec {
            side: 0,
            cell_size: 0,
            canvas_size: 0,
        };
    }
    let cell_size = target_width.div_ceil(side);
    GridSpec {
        side,
        cell_size,
        canvas_size: cell_size.saturating_mul(side),
    }
}

/// Where a contain-resized image sits inside its cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub width: u32,
    pub height: u32,
    /// Offset of the scaled image inside the cell (centered).
    pub x: u32,
    pub y: u32,
}

/// Scale `source` to fit entirely inside a `cell × cell` box, preserving
/// aspect ratio, and center it. The remainder of the cell is padding.
///
/// # Arguments
/// * `source` - Source image dimensions (width, height)
/// * `cell` - Side of the square cell in pixels
pub fn contain_fit(source: (u32, u32), cell: u32) -> Placement {
    let (src_w, src_h) = (source.0.max(1), source.1.max(1));
    let scale = (cell as f64 / src_w as f64).min(cell as f64 / src_h as f64);

    let width = ((src_w as f64 * scale).round() as u32).clamp(1, cell.max(1));
    let height = ((src_h as f64 * scale).round() as u32).clamp(1, cell.max(1));

    Placement {
        width,
        height,
        x: cell.saturating_sub(width) / 2,
        y: cell.saturating_sub(height) / 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // plan_grid
    // =========================================================================

    #[test]
    fn ten_images_at_1000_wide() {
        let grid = plan_grid(10, 1000);
        assert_eq!(grid.side, 3);
        assert_eq!(grid.cell_size, 334);
        assert_eq!(grid.canvas_size, 1002);
        assert_eq!(grid.capacity(), 9);
        assert_eq!(grid.left_out(10), 1);
    }

    #[test]
    fn zero_images_is_empty_grid() {
        let grid = plan_grid(0, 1024);
        assert!(grid.is_empty());
        assert_eq!(grid.capacity(), 0);
        assert_eq!(grid.canvas_size, 0);
    }

    #[test]
    fn single_image_fills_whole_width() {
        let grid = plan_grid(1, 1024);
        assert_eq!(grid.side, 1);
        assert_eq!(grid.cell_size, 1024);
        assert_eq!(grid.canvas_size, 1024);
        assert_eq!(grid.left_out(1), 0);
    }

    #[test]
    fn perfect_square_leaves_nothing_out() {
        let grid = plan_grid(16, 1024);
        assert_eq!(grid.side, 4);
        assert_eq!(grid.cell_size, 256);
        assert_eq!(grid.left_out(16), 0);
    }

    #[test]
    fn one_short_of_square_drops_a_row_and_column() {
        let grid = plan_grid(15, 1024);
        assert_eq!(grid.side, 3);
        assert_eq!(grid.left_out(15), 6);
    }

    #[test]
    fn side_is_floor_sqrt_and_cell_is_ceiling() {
        for n in 0..=400usize {
            let grid = plan_grid(n, 777);
            let side = (n as f64).sqrt().floor() as u32;
            assert_eq!(grid.side, side, "n={n}");
            if side > 0 {
                assert_eq!(grid.cell_size, (777f64 / side as f64).ceil() as u32, "n={n}");
                assert_eq!(grid.canvas_size, grid.cell_size * side);
                assert!(grid.canvas_size >= 777);
            }
        }
    }

    #[test]
    fn planning_is_a_pure_function() {
        assert_eq!(plan_grid(42, 640), plan_grid(42, 640));
    }

    #[test]
    fn tiny_target_still_gets_one_pixel_cells() {
        let grid = plan_grid(100, 5);
        assert_eq!(grid.side, 10);
        assert_eq!(grid.cell_size, 1);
        assert_eq!(grid.canvas_size, 10);
    }

    // =========================================================================
    // contain_fit
    // =========================================================================

    #[test]
    fn landscape_is_letterboxed_vertically() {
        let p = contain_fit((400, 200), 100);
        assert_eq!((p.width, p.height), (100, 50));
        assert_eq!((p.x, p.y), (0, 25));
    }

    #[test]
    fn portrait_is_pillarboxed_horizontally() {
        let p = contain_fit((300, 600), 100);
        assert_eq!((p.width, p.height), (50, 100));
        assert_eq!((p.x, p.y), (25, 0));
    }

    #[test]
    fn square_fills_cell() {
        let p = contain_fit((64, 64), 334);
        assert_eq!((p.width, p.height, p.x, p.y), (334, 334, 0, 0));
    }

    #[test]
    fn small_source_is_scaled_up() {
        let p = contain_fit((10, 5), 100);
        assert_eq!((p.width, p.height), (100, 50));
    }

    #[test]
    fn extreme_aspect_keeps_at_least_one_pixel() {
        let p = contain_fit((10_000, 1), 50);
        assert_eq!(p.width, 50);
        assert_eq!(p.height, 1);
        assert_eq!(p.y, 24);
    }
}
