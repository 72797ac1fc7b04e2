use std::fmt;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde_json::Value;

use super::audit::{LayoutAudit, LayoutAuditEventBuilder, LayoutAuditStage, NullLayoutAudit};
use crate::error::{LayoutError, Result};
use crate::geometry::{AspectRatio, Container};
use crate::layout::{Layout, LimitingDimension, compute_layout};
use crate::logging::{LogLevel, Logger, event_with_fields, json_kv, lock};
use crate::metrics::LayoutMetrics;

/// Configuration knobs for a [`LayoutController`].
#[derive(Clone)]
pub struct ControllerConfig {
    /// Aspect ratio shared by every tile in the grid.
    pub aspect_ratio: AspectRatio,
    /// Optional structured logger for state transitions.
    pub logger: Option<Logger>,
    /// Metrics accumulator, shared so a diagnostics thread can read it.
    pub metrics: Option<Arc<Mutex<LayoutMetrics>>>,
    /// Target field used on emitted log events.
    pub log_target: String,
    /// Receives one audit record per operation.
    pub audit: Arc<dyn LayoutAudit>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            aspect_ratio: AspectRatio::WIDESCREEN,
            logger: None,
            metrics: None,
            log_target: "tilefit::controller".to_string(),
            audit: Arc::new(NullLayoutAudit),
        }
    }
}

impl ControllerConfig {
    /// Enable metrics collection if it has not already been configured.
    pub fn enable_metrics(&mut self) {
        if self.metrics.is_none() {
            self.metrics = Some(Arc::new(Mutex::new(LayoutMetrics::new())));
        }
    }

    pub fn disable_metrics(&mut self) {
        self.metrics = None;
    }

    pub fn metrics_handle(&self) -> Option<Arc<Mutex<LayoutMetrics>>> {
        self.metrics.as_ref().map(Arc::clone)
    }
}

impl fmt::Debug for ControllerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerConfig")
            .field("aspect_ratio", &self.aspect_ratio)
            .field("logger", &self.logger)
            .field("metrics", &self.metrics.is_some())
            .field("log_target", &self.log_target)
            .finish_non_exhaustive()
    }
}

/// Snapshot of the cached layout.
///
/// `layout` stays populated after [`LayoutController::invalidate`]; only
/// `is_valid` drops, so a renderer can keep showing the stale grid.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct LayoutState {
    pub layout: Option<Layout>,
    pub is_valid: bool,
}

/// What a call to [`LayoutController::recompute`] did to the cached state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recompute {
    /// A layout was solved and stored. `changed` is false when it equals the
    /// previous one, even if the previous one was stale.
    Updated { changed: bool },
    /// Zero tiles: nothing was solved and the state is untouched.
    SkippedEmpty,
}

/// Caches the last solved layout for one grid.
///
/// One controller per rendered grid; wrap it in a mutex if several threads
/// drive the same grid.
pub struct LayoutController {
    state: LayoutState,
    config: ControllerConfig,
}

impl Default for LayoutController {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutController {
    pub fn new() -> Self {
        Self::with_config(ControllerConfig::default())
    }

    pub fn with_config(config: ControllerConfig) -> Self {
        Self {
            state: LayoutState::default(),
            config,
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ControllerConfig {
        &mut self.config
    }

    pub fn aspect_ratio(&self) -> AspectRatio {
        self.config.aspect_ratio
    }

    /// Solve for new dimensions or a new tile count.
    ///
    /// Invalid geometry is returned as an error and leaves the state as it was.
    pub fn recompute(&mut self, width: f64, height: f64, tile_count: usize) -> Result<Recompute> {
        let container = Container::new(width, height);
        let solved = match compute_layout(tile_count, container, self.config.aspect_ratio) {
            Ok(solved) => solved,
            Err(err) => {
                self.on_rejected(container, tile_count, &err);
                return Err(err);
            }
        };

        let Some(layout) = solved else {
            self.on_skipped_empty(container);
            return Ok(Recompute::SkippedEmpty);
        };

        let changed = self.state.layout != Some(layout);
        self.state = LayoutState {
            layout: Some(layout),
            is_valid: true,
        };
        self.on_recomputed(container, tile_count, &layout, changed);
        Ok(Recompute::Updated { changed })
    }

    /// Mark the cached layout stale ahead of a resize whose size is not known yet.
    pub fn invalidate(&mut self) {
        let was_valid = self.state.is_valid;
        self.state.is_valid = false;

        self.with_metrics(LayoutMetrics::record_invalidation);
        let fields = [
            json_kv("was_valid", was_valid),
            json_kv("has_layout", self.state.layout.is_some()),
        ];
        self.audit(LayoutAuditStage::Invalidated, &fields);
        self.emit(LogLevel::Debug, "layout.invalidated", fields);
    }

    pub fn current_state(&self) -> LayoutState {
        self.state
    }

    pub fn layout(&self) -> Option<&Layout> {
        self.state.layout.as_ref()
    }

    pub fn is_valid(&self) -> bool {
        self.state.is_valid
    }

    fn on_recomputed(
        &self,
        container: Container,
        tile_count: usize,
        layout: &Layout,
        changed: bool,
    ) {
        self.with_metrics(|metrics| metrics.record_recompute(changed));
        let fields = [
            json_kv("tile_count", tile_count),
            json_kv("width", container.width),
            json_kv("height", container.height),
            json_kv("columns", layout.columns),
            json_kv("rows", layout.rows),
            json_kv("limiting", limiting_name(layout.limiting)),
            json_kv("tile_width", layout.tile_width),
            json_kv("changed", changed),
        ];
        self.audit(LayoutAuditStage::Recomputed, &fields);
        self.emit(LogLevel::Debug, "layout.recomputed", fields);
    }

    fn on_skipped_empty(&self, container: Container) {
        self.with_metrics(LayoutMetrics::record_empty_skip);
        let fields = [
            json_kv("width", container.width),
            json_kv("height", container.height),
            json_kv("kept_layout", self.state.layout.is_some()),
        ];
        self.audit(LayoutAuditStage::SkippedEmpty, &fields);
        self.emit(LogLevel::Debug, "layout.skipped_empty", fields);
    }

    fn on_rejected(&self, container: Container, tile_count: usize, err: &LayoutError) {
        self.with_metrics(LayoutMetrics::record_rejected);
        let fields = [
            json_kv("tile_count", tile_count),
            json_kv("width", container.width),
            json_kv("height", container.height),
            json_kv("error", err.to_string()),
        ];
        self.audit(LayoutAuditStage::Rejected, &fields);
        self.emit(LogLevel::Warn, "layout.rejected", fields);
    }

    fn with_metrics(&self, record: impl FnOnce(&mut LayoutMetrics)) {
        if let Some(metrics) = &self.config.metrics {
            record(&mut lock(metrics));
        }
    }

    fn audit(&self, stage: LayoutAuditStage, fields: &[(String, Value)]) {
        let mut builder = LayoutAuditEventBuilder::new(stage);
        for (key, value) in fields {
            builder.detail(key.clone(), value.clone());
        }
        self.config.audit.record(builder.finish());
    }

    fn emit(&self, level: LogLevel, message: &str, fields: impl IntoIterator<Item = (String, Value)>) {
        if let Some(logger) = &self.config.logger {
            let event = event_with_fields(level, &self.config.log_target, message, fields);
            let _ = logger.log_event(event);
        }
    }
}

fn limiting_name(limiting: LimitingDimension) -> &'static str {
    match limiting {
        LimitingDimension::Width => "width",
        LimitingDimension::Height => "height",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::audit::LayoutAuditEvent;
    use crate::logging::MemorySink;
    use serde_json::json;

    #[derive(Default)]
    struct RecordingAudit {
        events: Mutex<Vec<LayoutAuditEvent>>,
    }

    impl RecordingAudit {
        fn stages(&self) -> Vec<LayoutAuditStage> {
            self.events
                .lock()
                .unwrap()
                .iter()
                .map(|event| event.stage)
                .collect()
        }
    }

    impl LayoutAudit for RecordingAudit {
        fn record(&self, event: LayoutAuditEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    #[test]
    fn starts_absent_and_invalid() {
        let controller = LayoutController::new();
        assert_eq!(controller.current_state(), LayoutState::default());
        assert!(controller.layout().is_none());
        assert!(!controller.is_valid());
        assert_eq!(controller.aspect_ratio(), AspectRatio::WIDESCREEN);
    }

    #[test]
    fn first_recompute_makes_state_valid() {
        let mut controller = LayoutController::new();
        let outcome = controller.recompute(1000.0, 1000.0, 4).unwrap();
        assert_eq!(outcome, Recompute::Updated { changed: true });

        let state = controller.current_state();
        assert!(state.is_valid);
        let layout = state.layout.unwrap();
        assert_eq!((layout.columns, layout.rows), (2, 2));
    }

    #[test]
    fn recompute_is_idempotent() {
        let mut controller = LayoutController::new();
        controller.recompute(1600.0, 900.0, 5).unwrap();
        let first = controller.current_state();
        let outcome = controller.recompute(1600.0, 900.0, 5).unwrap();
        assert_eq!(outcome, Recompute::Updated { changed: false });
        assert_eq!(controller.current_state(), first);
    }

    #[test]
    fn invalidate_keeps_the_stale_layout() {
        let mut controller = LayoutController::new();
        controller.recompute(1600.0, 900.0, 5).unwrap();
        let before = controller.current_state().layout;

        controller.invalidate();
        let state = controller.current_state();
        assert!(!state.is_valid);
        assert_eq!(state.layout, before);

        controller.recompute(1300.0, 900.0, 5).unwrap();
        assert!(controller.is_valid());
    }

    #[test]
    fn invalidate_before_any_layout_stays_absent() {
        let mut controller = LayoutController::new();
        controller.invalidate();
        assert_eq!(controller.current_state(), LayoutState::default());
    }

    #[test]
    fn zero_tiles_leave_state_untouched() {
        let mut controller = LayoutController::new();
        assert_eq!(
            controller.recompute(800.0, 600.0, 0).unwrap(),
            Recompute::SkippedEmpty
        );
        assert_eq!(controller.current_state(), LayoutState::default());

        controller.recompute(800.0, 600.0, 3).unwrap();
        let valid = controller.current_state();
        assert_eq!(
            controller.recompute(800.0, 600.0, 0).unwrap(),
            Recompute::SkippedEmpty
        );
        assert_eq!(controller.current_state(), valid);

        controller.invalidate();
        let stale = controller.current_state();
        controller.recompute(800.0, 600.0, 0).unwrap();
        assert_eq!(controller.current_state(), stale);
    }

    #[test]
    fn invalid_geometry_is_an_error_and_keeps_state() {
        let mut controller = LayoutController::new();
        controller.recompute(800.0, 600.0, 3).unwrap();
        let before = controller.current_state();

        let err = controller.recompute(0.0, 600.0, 3).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidContainer { .. }));
        assert_eq!(controller.current_state(), before);
    }

    #[test]
    fn configured_aspect_ratio_is_used() {
        let config = ControllerConfig {
            aspect_ratio: AspectRatio::SQUARE,
            ..ControllerConfig::default()
        };
        let mut controller = LayoutController::with_config(config);
        controller.recompute(1000.0, 1000.0, 1).unwrap();
        let layout = controller.layout().copied().unwrap();
        assert_eq!(layout.tile_width, 1000.0);
        assert_eq!(layout.tile_height(controller.aspect_ratio()), 1000.0);
    }

    #[test]
    fn transitions_are_logged_and_counted() {
        let sink = MemorySink::new();
        let mut controller = LayoutController::new();
        let metrics = {
            let config = controller.config_mut();
            config.logger = Some(Logger::new(sink.clone()));
            config.enable_metrics();
            config.metrics_handle().unwrap()
        };

        controller.recompute(800.0, 600.0, 2).unwrap();
        controller.recompute(800.0, 600.0, 2).unwrap();
        controller.recompute(800.0, 600.0, 0).unwrap();
        controller.invalidate();
        let _ = controller.recompute(-5.0, 600.0, 2);

        assert_eq!(
            sink.messages(),
            vec![
                "layout.recomputed",
                "layout.recomputed",
                "layout.skipped_empty",
                "layout.invalidated",
                "layout.rejected",
            ]
        );
        let events = sink.events();
        assert_eq!(events[0].target, "tilefit::controller");
        assert_eq!(events[0].fields["changed"], true);
        assert_eq!(events[1].fields["changed"], false);
        assert!(matches!(events[4].level, LogLevel::Warn));

        let snapshot = metrics.lock().unwrap().snapshot();
        assert_eq!(snapshot.recomputes, 2);
        assert_eq!(snapshot.layout_changes, 1);
        assert_eq!(snapshot.empty_skips, 1);
        assert_eq!(snapshot.invalidations, 1);
        assert_eq!(snapshot.rejected, 1);
    }

    #[test]
    fn metrics_survive_a_poisoned_handle() {
        let mut controller = LayoutController::new();
        controller.config_mut().enable_metrics();
        let metrics = controller.config().metrics_handle().unwrap();

        let poisoner = Arc::clone(&metrics);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("poison the metrics mutex");
        })
        .join();
        assert!(metrics.is_poisoned());

        controller.recompute(800.0, 600.0, 3).unwrap();
        controller.invalidate();

        let snapshot = lock(&metrics).snapshot();
        assert_eq!(snapshot.recomputes, 1);
        assert_eq!(snapshot.invalidations, 1);
    }

    #[test]
    fn audit_sees_every_operation() {
        let audit = Arc::new(RecordingAudit::default());
        let config = ControllerConfig {
            audit: audit.clone(),
            ..ControllerConfig::default()
        };
        let mut controller = LayoutController::with_config(config);

        controller.recompute(1600.0, 900.0, 5).unwrap();
        controller.invalidate();
        controller.recompute(1600.0, 900.0, 0).unwrap();
        let _ = controller.recompute(1600.0, f64::NAN, 5);

        assert_eq!(
            audit.stages(),
            vec![
                LayoutAuditStage::Recomputed,
                LayoutAuditStage::Invalidated,
                LayoutAuditStage::SkippedEmpty,
                LayoutAuditStage::Rejected,
            ]
        );
        let events = audit.events.lock().unwrap();
        assert_eq!(events[0].detail("columns"), Some(&json!(3)));
        assert_eq!(events[0].detail("limiting"), Some(&json!("width")));
        assert_eq!(events[1].detail("was_valid"), Some(&json!(true)));
    }

    #[test]
    fn controller_can_move_across_threads() {
        fn assert_send<T: Send>() {}
        assert_send::<LayoutController>();

        let shared = Arc::new(Mutex::new(LayoutController::new()));
        let worker = {
            let shared = Arc::clone(&shared);
            std::thread::spawn(move || {
                shared.lock().unwrap().recompute(1920.0, 1080.0, 9).unwrap();
            })
        };
        worker.join().unwrap();
        let state = shared.lock().unwrap().current_state();
        assert!(state.is_valid);
        assert_eq!(state.layout.map(|l| (l.columns, l.rows)), Some((3, 3)));
    }
}
