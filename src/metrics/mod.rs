use crate::logging::{LogEvent, LogFields, LogLevel};
use serde::Serialize;
use serde_json::json;

/// Counters describing how a controller has been driven.
#[derive(Debug, Default, Clone)]
pub struct LayoutMetrics {
    recomputes: u64,
    layout_changes: u64,
    empty_skips: u64,
    invalidations: u64,
    rejected: u64,
}

impl LayoutMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_recompute(&mut self, changed: bool) {
        self.recomputes = self.recomputes.saturating_add(1);
        if changed {
            self.layout_changes = self.layout_changes.saturating_add(1);
        }
    }

    pub fn record_empty_skip(&mut self) {
        self.empty_skips = self.empty_skips.saturating_add(1);
    }

    pub fn record_invalidation(&mut self) {
        self.invalidations = self.invalidations.saturating_add(1);
    }

    pub fn record_rejected(&mut self) {
        self.rejected = self.rejected.saturating_add(1);
    }

    pub fn snapshot(&self) -> MetricSnapshot {
        MetricSnapshot {
            recomputes: self.recomputes,
            layout_changes: self.layout_changes,
            empty_skips: self.empty_skips,
            invalidations: self.invalidations,
            rejected: self.rejected,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricSnapshot {
    pub recomputes: u64,
    pub layout_changes: u64,
    pub empty_skips: u64,
    pub invalidations: u64,
    pub rejected: u64,
}

impl MetricSnapshot {
    pub fn to_log_event(&self, target: &str) -> LogEvent {
        LogEvent::with_fields(LogLevel::Info, target, "layout_metrics", self.as_fields())
    }

    pub fn as_fields(&self) -> LogFields {
        let mut map = LogFields::new();
        map.insert("recomputes".to_string(), json!(self.recomputes));
        map.insert("layout_changes".to_string(), json!(self.layout_changes));
        map.insert("empty_skips".to_string(), json!(self.empty_skips));
        map.insert("invalidations".to_string(), json!(self.invalidations));
        map.insert("rejected".to_string(), json!(self.rejected));
        map
    }
}
