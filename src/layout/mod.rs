//! Layout module orchestrator.
//!
//! Callers import the optimizer from here while its internals live in the
//! private `core` module. `grid` turns a solved layout into renderer input.

mod core;
pub mod grid;

pub use self::core::{Layout, LimitingDimension, compute_layout, compute_layout_exhaustive};
pub use grid::{GridCell, TrackSizing, place_tiles};
