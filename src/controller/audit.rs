//! State-transition audit hooks for [`LayoutController`](super::LayoutController).
//!
//! Every call that reaches the controller produces one record: the stage it
//! ended in plus structured details, so callers can buffer or visualize how a
//! grid evolved without wrapping the controller.

use std::time::SystemTime;

use serde_json::Value;

/// Outcome of a single controller operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutAuditStage {
    /// A layout was solved and is now the valid current layout.
    Recomputed,
    /// Recompute with zero tiles; the previous layout was kept as is.
    SkippedEmpty,
    /// The current layout was marked stale.
    Invalidated,
    /// Recompute refused invalid geometry; state untouched.
    Rejected,
}

#[derive(Debug, Clone)]
pub struct LayoutAuditEvent {
    pub timestamp: SystemTime,
    pub stage: LayoutAuditStage,
    pub details: Vec<(String, Value)>,
}

impl LayoutAuditEvent {
    fn new(stage: LayoutAuditStage) -> Self {
        Self {
            timestamp: SystemTime::now(),
            stage,
            details: Vec::new(),
        }
    }

    pub fn detail(&self, key: &str) -> Option<&Value> {
        self.details
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }
}

pub struct LayoutAuditEventBuilder {
    event: LayoutAuditEvent,
}

impl LayoutAuditEventBuilder {
    pub fn new(stage: LayoutAuditStage) -> Self {
        Self {
            event: LayoutAuditEvent::new(stage),
        }
    }

    pub fn detail(&mut self, key: impl Into<String>, value: Value) -> &mut Self {
        self.event.details.push((key.into(), value));
        self
    }

    pub fn finish(self) -> LayoutAuditEvent {
        self.event
    }
}

/// Implemented by anything that wants to observe controller transitions.
pub trait LayoutAudit: Send + Sync {
    fn record(&self, event: LayoutAuditEvent);
}

/// Default sink when auditing is off.
#[derive(Debug, Default)]
pub struct NullLayoutAudit;

impl LayoutAudit for NullLayoutAudit {
    fn record(&self, _event: LayoutAuditEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builder_collects_details_in_order() {
        let mut builder = LayoutAuditEventBuilder::new(LayoutAuditStage::Recomputed);
        builder.detail("columns", json!(3)).detail("rows", json!(2));
        let event = builder.finish();

        assert_eq!(event.stage, LayoutAuditStage::Recomputed);
        assert_eq!(event.details.len(), 2);
        assert_eq!(event.details[0].0, "columns");
        assert_eq!(event.detail("rows"), Some(&json!(2)));
        assert_eq!(event.detail("missing"), None);
    }
}
