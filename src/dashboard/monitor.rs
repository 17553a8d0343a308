//! Monitoring hooks for widget lifecycle events.
//!
//! The controller reports every applied create/edit/delete/duplicate to a
//! [`WidgetMonitor`], and reports failed lookups through
//! [`WidgetMonitor::record_error`]. Monitors are best-effort: an `Err` is
//! logged by the caller and never undoes the state change it describes.

use crate::dashboard::error::MonitorError;
use crate::dashboard::model::WidgetType;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetOperation {
    Create,
    Edit,
    Delete,
    Duplicate,
}

impl fmt::Display for WidgetOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WidgetOperation::Create => "create",
            WidgetOperation::Edit => "edit",
            WidgetOperation::Delete => "delete",
            WidgetOperation::Duplicate => "duplicate",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WidgetEvent {
    pub widget_id: String,
    pub widget_type: WidgetType,
    pub operation: WidgetOperation,
    pub timestamp: DateTime<Utc>,
    /// Free-form detail, e.g. the source id of a duplicate.
    pub context: String,
}

impl WidgetEvent {
    pub fn new(
        widget_id: impl Into<String>,
        widget_type: WidgetType,
        operation: WidgetOperation,
        context: impl Into<String>,
    ) -> Self {
        Self {
            widget_id: widget_id.into(),
            widget_type,
            operation,
            timestamp: Utc::now(),
            context: context.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorEvent {
    pub operation: WidgetOperation,
    pub widget_id: Option<String>,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ErrorEvent {
    pub fn new(operation: WidgetOperation, widget_id: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            operation,
            widget_id: widget_id.map(str::to_string),
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

pub trait WidgetMonitor {
    fn record(&mut self, event: &WidgetEvent) -> Result<(), MonitorError>;
    fn record_error(&mut self, event: &ErrorEvent) -> Result<(), MonitorError>;
}

/// Emits events as structured `tracing` records.
#[derive(Debug, Default)]
pub struct TracingMonitor;

impl WidgetMonitor for TracingMonitor {
    fn record(&mut self, event: &WidgetEvent) -> Result<(), MonitorError> {
        info!(
            widget_id = %event.widget_id,
            widget_type = %event.widget_type,
            operation = %event.operation,
            context = %event.context,
            "widget operation"
        );
        Ok(())
    }

    fn record_error(&mut self, event: &ErrorEvent) -> Result<(), MonitorError> {
        warn!(
            operation = %event.operation,
            widget_id = event.widget_id.as_deref().unwrap_or("-"),
            "{}",
            event.message
        );
        Ok(())
    }
}

/// Forwards to several monitors; every monitor sees every event even if an
/// earlier one fails. The first failure is returned.
#[derive(Default)]
pub struct MonitorSet {
    monitors: Vec<Box<dyn WidgetMonitor>>,
}

impl MonitorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, monitor: impl WidgetMonitor + 'static) -> Self {
        self.monitors.push(Box::new(monitor));
        self
    }

    pub fn len(&self) -> usize {
        self.monitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }
}

impl WidgetMonitor for MonitorSet {
    fn record(&mut self, event: &WidgetEvent) -> Result<(), MonitorError> {
        let mut first_err = None;
        for m in self.monitors.iter_mut() {
            if let Err(e) = m.record(event) {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    fn record_error(&mut self, event: &ErrorEvent) -> Result<(), MonitorError> {
        let mut first_err = None;
        for m in self.monitors.iter_mut() {
            if let Err(e) = m.record_error(event) {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Captures events for assertions.
    #[derive(Clone, Default)]
    pub struct RecordingMonitor {
        pub events: Rc<RefCell<Vec<WidgetEvent>>>,
        pub errors: Rc<RefCell<Vec<ErrorEvent>>>,
    }

    impl WidgetMonitor for RecordingMonitor {
        fn record(&mut self, event: &WidgetEvent) -> Result<(), MonitorError> {
            self.events.borrow_mut().push(event.clone());
            Ok(())
        }

        fn record_error(&mut self, event: &ErrorEvent) -> Result<(), MonitorError> {
            self.errors.borrow_mut().push(event.clone());
            Ok(())
        }
    }

    /// Fails every call.
    pub struct FailingMonitor;

    impl WidgetMonitor for FailingMonitor {
        fn record(&mut self, _event: &WidgetEvent) -> Result<(), MonitorError> {
            Err(MonitorError::Unavailable("collector offline".into()))
        }

        fn record_error(&mut self, _event: &ErrorEvent) -> Result<(), MonitorError> {
            Err(MonitorError::Unavailable("collector offline".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{FailingMonitor, RecordingMonitor};
    use super::*;

    #[test]
    fn test_monitor_set_reaches_all_monitors_despite_failure() {
        let recorder = RecordingMonitor::default();
        let mut set = MonitorSet::new().with(FailingMonitor).with(recorder.clone());
        let event = WidgetEvent::new("w1", WidgetType::Kpi, WidgetOperation::Create, "");
        assert!(set.record(&event).is_err());
        assert_eq!(recorder.events.borrow().len(), 1);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_operation_serializes_snake_case() {
        let v = serde_json::to_value(WidgetOperation::Duplicate).unwrap();
        assert_eq!(v, "duplicate");
    }
}
