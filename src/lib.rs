//! Optimal grid arrangement for equally sized tiles.
//!
//! Given a container and a number of tiles sharing one aspect ratio (video
//! feeds in a call, thumbnails in a gallery), [`compute_layout`] finds the
//! column/row split that renders every tile as large as possible.
//! [`LayoutController`] caches the result for one grid and supports marking it
//! stale without dropping it.
//!
//! ```
//! use tilefit::{LayoutController, LimitingDimension, Recompute};
//!
//! let mut grid = LayoutController::new();
//! assert_eq!(grid.recompute(1000.0, 1000.0, 4)?, Recompute::Updated { changed: true });
//!
//! let layout = grid.layout().copied().unwrap();
//! assert_eq!((layout.columns, layout.rows), (2, 2));
//! assert_eq!(layout.limiting, LimitingDimension::Width);
//!
//! grid.invalidate();
//! assert!(!grid.is_valid());
//! assert!(grid.layout().is_some());
//! # Ok::<(), tilefit::LayoutError>(())
//! ```

pub mod controller;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod logging;
pub mod metrics;

pub use controller::{
    ControllerConfig, LayoutAudit, LayoutAuditEvent, LayoutAuditStage, LayoutController,
    LayoutState, NullLayoutAudit, Recompute,
};
pub use error::{LayoutError, Result};
pub use geometry::{AspectRatio, Container, Rect};
pub use layout::{
    GridCell, Layout, LimitingDimension, TrackSizing, compute_layout, compute_layout_exhaustive,
    place_tiles,
};
pub use logging::{
    FileSink, LogEvent, LogFields, LogLevel, LogSink, Logger, LoggingError, LoggingResult,
    MemorySink, NullSink,
};
pub use metrics::{LayoutMetrics, MetricSnapshot};
