use thiserror::Error;

/// Unified result type for the tilefit crate.
pub type Result<T> = std::result::Result<T, LayoutError>;

/// Errors surfaced by the layout optimizer and controller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("container must have positive, finite dimensions (got {width}x{height})")]
    InvalidContainer { width: f64, height: f64 },
    #[error("tile aspect ratio must be positive and finite (got {0})")]
    InvalidAspectRatio(f64),
    #[error("cannot parse aspect ratio `{0}`")]
    ParseAspectRatio(String),
    #[error("{tiles} tiles do not fit a {columns}x{rows} grid")]
    CapacityExceeded {
        tiles: usize,
        columns: usize,
        rows: usize,
    },
}
