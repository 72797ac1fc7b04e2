//! Renderer-facing view of a solved [`Layout`].
//!
//! The optimizer only answers "how many columns and rows". Renderers also need
//! to know how to size a tile relative to the container and where each tile
//! lands. This module provides both:
//! - [`TrackSizing`]: percentage sizing for CSS-like renderers
//! - [`place_tiles`]: absolute rectangles for a centered, wrapping grid
//!
//! # Example
//! ```
//! use tilefit::{AspectRatio, Container, compute_layout};
//! use tilefit::layout::grid::place_tiles;
//!
//! let container = Container::new(1600.0, 900.0);
//! let layout = compute_layout(5, container, AspectRatio::WIDESCREEN)?.unwrap();
//! let rects = place_tiles(&layout, container, AspectRatio::WIDESCREEN, 5)?;
//! assert_eq!(rects.len(), 5);
//! # Ok::<(), tilefit::LayoutError>(())
//! ```

use serde::{Deserialize, Serialize};

use super::core::{Layout, LimitingDimension};
use crate::error::{LayoutError, Result};
use crate::geometry::{AspectRatio, Container, Rect};

/// Percent-of-container sizing for one tile.
///
/// The bound axis gets a fixed track size and the other axis is only capped,
/// leaving the tile aspect ratio to fill it in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "limiting", rename_all = "lowercase")]
pub enum TrackSizing {
    Width { width: f64, max_height: f64 },
    Height { height: f64, max_width: f64 },
}

impl TrackSizing {
    pub fn for_layout(layout: &Layout) -> Self {
        let column_share = 100.0 / layout.columns as f64;
        let row_share = 100.0 / layout.rows as f64;
        match layout.limiting {
            LimitingDimension::Width => Self::Width {
                width: column_share,
                max_height: row_share,
            },
            LimitingDimension::Height => Self::Height {
                height: row_share,
                max_width: column_share,
            },
        }
    }

    /// Inline style declarations, e.g. `width: 50%; max-height: 50%;`.
    pub fn css(&self) -> String {
        match self {
            Self::Width { width, max_height } => {
                format!("width: {width}%; max-height: {max_height}%;")
            }
            Self::Height { height, max_width } => {
                format!("height: {height}%; max-width: {max_width}%;")
            }
        }
    }
}

impl Layout {
    pub fn track_sizing(&self) -> TrackSizing {
        TrackSizing::for_layout(self)
    }

    /// Grid cell for the tile at `index` in reading order.
    pub fn cell(&self, index: usize) -> Option<GridCell> {
        (index < self.capacity()).then(|| GridCell {
            row: index / self.columns,
            column: index % self.columns,
        })
    }
}

/// Zero-based cell coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCell {
    pub row: usize,
    pub column: usize,
}

/// Lay out `tile_count` tiles the way a centered flex-wrap container would.
///
/// Tiles fill rows left to right. Every row, including a short last row, is
/// centered horizontally and the occupied rows are centered vertically.
/// `container` is normally the one the layout was solved for; a stale layout
/// placed into a smaller container keeps its tile size and anchors at the
/// top-left edge instead of going negative.
pub fn place_tiles(
    layout: &Layout,
    container: Container,
    aspect: AspectRatio,
    tile_count: usize,
) -> Result<Vec<Rect>> {
    container.validate()?;
    if tile_count > layout.capacity() {
        return Err(LayoutError::CapacityExceeded {
            tiles: tile_count,
            columns: layout.columns,
            rows: layout.rows,
        });
    }
    if tile_count == 0 {
        return Ok(Vec::new());
    }

    let tile_width = layout.tile_width;
    let tile_height = layout.tile_height(aspect);
    let used_rows = tile_count.div_ceil(layout.columns);
    let top = centered_offset(container.height, used_rows as f64 * tile_height);

    let mut rects = Vec::with_capacity(tile_count);
    for row in 0..used_rows {
        let in_row = layout.columns.min(tile_count - row * layout.columns);
        let left = centered_offset(container.width, in_row as f64 * tile_width);
        let y0 = top + row as f64 * tile_height;
        let y1 = top + (row + 1) as f64 * tile_height;
        for column in 0..in_row {
            let x0 = left + column as f64 * tile_width;
            let x1 = left + (column + 1) as f64 * tile_width;
            rects.push(Rect::new(x0, y0, span(x0, x1), span(y0, y1)));
        }
    }
    Ok(rects)
}

/// Length from `start` to `end` such that `start + len` never passes `end`,
/// so neighbours sharing a boundary touch without overlapping.
fn span(start: f64, end: f64) -> f64 {
    let mut len = end - start;
    while len > 0.0 && start + len > end {
        len = f64::from_bits(len.to_bits() - 1);
    }
    len
}

fn centered_offset(available: f64, used: f64) -> f64 {
    ((available - used) / 2.0).max(0.0)
}
