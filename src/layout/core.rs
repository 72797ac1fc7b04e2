use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geometry::{AspectRatio, Container};

/// Container axis that bounds the tile size for a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LimitingDimension {
    Width,
    Height,
}

/// Best grid for a tile count inside a container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub columns: usize,
    pub rows: usize,
    pub limiting: LimitingDimension,
    pub tile_width: f64,
}

impl Layout {
    /// Number of cells in the grid; at least the tile count it was solved for.
    pub fn capacity(&self) -> usize {
        self.columns * self.rows
    }

    pub fn tile_height(&self, aspect: AspectRatio) -> f64 {
        self.tile_width / aspect.get()
    }
}

/// Solve the best grid for `tile_count` tiles.
///
/// Returns `Ok(None)` when there is nothing to place. Geometry is validated
/// first, so an unmeasured container is an error even for zero tiles.
///
/// Searches a bracket of column counts around the continuous optimum. The
/// bracket holds a constant number of columns for bounded container-to-tile
/// ratios and is bisected, so very wide or very tall containers cost
/// O(log n). Always agrees with [`compute_layout_exhaustive`], including its
/// smallest-column tie-break.
pub fn compute_layout(
    tile_count: usize,
    container: Container,
    aspect: AspectRatio,
) -> Result<Option<Layout>> {
    container.validate()?;
    if tile_count == 0 {
        return Ok(None);
    }

    let grid = Grid::new(tile_count, container, aspect);
    let columns = grid.best_columns();
    Ok(Some(grid.layout(columns)))
}

/// Reference solver: scans every column count from 1 to `tile_count`.
///
/// The first column count reaching the maximum tile width wins.
pub fn compute_layout_exhaustive(
    tile_count: usize,
    container: Container,
    aspect: AspectRatio,
) -> Result<Option<Layout>> {
    container.validate()?;
    if tile_count == 0 {
        return Ok(None);
    }

    let grid = Grid::new(tile_count, container, aspect);
    let mut best = grid.layout(1);
    for columns in 2..=tile_count {
        let candidate = grid.layout(columns);
        if candidate.tile_width > best.tile_width {
            best = candidate;
        }
    }
    Ok(Some(best))
}

/// Candidate evaluation shared by both solvers so they round identically.
#[derive(Debug, Clone, Copy)]
struct Grid {
    tiles: usize,
    width: f64,
    height: f64,
    aspect: f64,
}

impl Grid {
    fn new(tiles: usize, container: Container, aspect: AspectRatio) -> Self {
        Self {
            tiles,
            width: container.width,
            height: container.height,
            aspect: aspect.get(),
        }
    }

    fn rows(&self, columns: usize) -> usize {
        self.tiles.div_ceil(columns)
    }

    /// Tile width allowed by the container width alone. Non-increasing in `columns`.
    fn width_bound(&self, columns: usize) -> f64 {
        self.width / columns as f64
    }

    /// Tile width allowed by the container height alone. Non-decreasing in `columns`.
    fn height_bound(&self, columns: usize) -> f64 {
        (self.height / self.rows(columns) as f64) * self.aspect
    }

    fn width_limited(&self, columns: usize) -> bool {
        self.width_bound(columns) <= self.height_bound(columns)
    }

    fn tile_width(&self, columns: usize) -> f64 {
        self.width_bound(columns).min(self.height_bound(columns))
    }

    fn layout(&self, columns: usize) -> Layout {
        let limiting = if self.width_limited(columns) {
            LimitingDimension::Width
        } else {
            LimitingDimension::Height
        };
        Layout {
            columns,
            rows: self.rows(columns),
            limiting,
            tile_width: self.tile_width(columns),
        }
    }

    /// Height is the binding constraint or the two bounds tie.
    fn height_binds(&self, columns: usize) -> bool {
        self.width_bound(columns) >= self.height_bound(columns)
    }

    /// Column count picked by the ascending scan, without the scan.
    ///
    /// `height_binds` holds on a prefix `1..=c0` of column counts. Inside the
    /// prefix the tile width is the height bound, so the best there is the first
    /// column count of `c0`'s row class. Past the prefix it is the width bound,
    /// so only `c0 + 1` can compete.
    fn best_columns(&self) -> usize {
        let Some(boundary) = self.height_boundary() else {
            return 1;
        };

        let first_in_class = self.tiles.div_ceil(self.rows(boundary));
        if boundary < self.tiles
            && self.tile_width(boundary + 1) > self.tile_width(first_in_class)
        {
            boundary + 1
        } else {
            first_in_class
        }
    }

    /// Largest column count for which the height still binds, or `None` when
    /// even a single column is width-bound.
    fn height_boundary(&self) -> Option<usize> {
        let n = self.tiles;
        // Container-to-tile ratio; c* = sqrt(n * k) is the continuous optimum.
        let k = self.width / (self.height * self.aspect);
        let estimate = (n as f64 * k).sqrt();

        let mut lo = clamp_columns(estimate.floor(), n);
        while lo > 1 && !self.height_binds(lo) {
            lo -= 1;
        }
        if !self.height_binds(lo) {
            return None;
        }

        // rows(c) < n/c + 1, so the height stops binding once c^2/k - c >= n.
        let upper = (k / 2.0) * (1.0 + (1.0 + 4.0 * n as f64 / k).sqrt());
        let mut hi = clamp_columns(upper.ceil() + 1.0, n).max(lo);
        while lo < hi {
            let mid = lo + (hi - lo).div_ceil(2);
            if self.height_binds(mid) {
                lo = mid;
            } else {
                hi = mid - 1;
            }
        }
        // Rounding in `upper` can only understate the bracket by a step or two.
        while lo < n && self.height_binds(lo + 1) {
            lo += 1;
        }
        Some(lo)
    }
}

/// Clamp a real column estimate into `1..=tiles`. NaN lands on 1.
fn clamp_columns(value: f64, tiles: usize) -> usize {
    if value >= tiles as f64 {
        tiles
    } else if value >= 1.0 {
        value as usize
    } else {
        1
    }
}
