//! Layout cache for a single rendered grid.
//!
//! The controller owns the last solved [`Layout`](crate::Layout) and whether
//! it still matches the container. Invalidation keeps the layout around so a
//! renderer always has something to draw.

pub mod audit;
mod core;

pub use self::core::{ControllerConfig, LayoutController, LayoutState, Recompute};
pub use audit::{
    LayoutAudit, LayoutAuditEvent, LayoutAuditEventBuilder, LayoutAuditStage, NullLayoutAudit,
};
