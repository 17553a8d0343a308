//! Diagnostic logging setup and the widget audit log.
//!
//! [`init_tracing`] installs the global `tracing` subscriber. [`AuditLog`] is
//! a [`WidgetMonitor`] that appends widget lifecycle events to daily files
//! named `<dashboard>_<date>.log` in the configured audit directory
//! (default: `~/.local/share/dashgrid/audit/`).

use crate::config::{expand_home, model::LoggingConfig};
use crate::dashboard::monitor::{ErrorEvent, WidgetEvent, WidgetMonitor};
use crate::dashboard::MonitorError;
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Install a stderr `fmt` subscriber. `RUST_LOG` overrides the configured
/// level. Calling this twice is harmless; the second call is ignored.
pub fn init_tracing(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Appends widget events to per-dashboard daily log files.
///
/// File handles are cached for the lifetime of the logger to avoid repeated
/// opens.
pub struct AuditLog {
    enabled: bool,
    audit_dir: PathBuf,
    dashboard: String,
    file_handles: HashMap<String, fs::File>,
}

impl AuditLog {
    pub fn new(config: &LoggingConfig, dashboard: &str) -> Self {
        Self {
            enabled: config.audit_enabled,
            audit_dir: expand_home(&config.audit_dir),
            dashboard: dashboard.to_string(),
            file_handles: HashMap::new(),
        }
    }

    fn write_line(&mut self, line: &str) -> Result<(), MonitorError> {
        if !self.enabled {
            return Ok(());
        }

        // Sanitize dashboard name for filename
        let safe_name: String = self
            .dashboard
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' { c } else { '_' })
            .collect();
        let date = chrono::Local::now().format("%Y-%m-%d").to_string();
        let filename = format!("{}_{}.log", safe_name, date);

        if !self.file_handles.contains_key(&filename) {
            fs::create_dir_all(&self.audit_dir)?;
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(self.audit_dir.join(&filename))?;
            self.file_handles.insert(filename.clone(), file);
        }

        if let Some(handle) = self.file_handles.get_mut(&filename) {
            writeln!(handle, "{}", line)?;
        }
        Ok(())
    }
}

impl WidgetMonitor for AuditLog {
    fn record(&mut self, event: &WidgetEvent) -> Result<(), MonitorError> {
        let line = format!(
            "[{}] {} {} ({}) {}",
            event.timestamp.format("%H:%M:%S%.3f"),
            event.operation,
            event.widget_id,
            event.widget_type,
            event.context
        );
        self.write_line(line.trim_end())
    }

    fn record_error(&mut self, event: &ErrorEvent) -> Result<(), MonitorError> {
        let line = format!(
            "[{}] !!! {} {}: {}",
            event.timestamp.format("%H:%M:%S%.3f"),
            event.operation,
            event.widget_id.as_deref().unwrap_or("-"),
            event.message
        );
        self.write_line(&line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::{WidgetOperation, WidgetType};
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn test_audit_log_writes_daily_file() {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("dashgrid_audit_test_{suffix}"));
        let config = LoggingConfig {
            level: "info".into(),
            audit_enabled: true,
            audit_dir: dir.display().to_string(),
        };

        let mut log = AuditLog::new(&config, "Sales / EMEA");
        log.record(&WidgetEvent::new("w1", WidgetType::Kpi, WidgetOperation::Create, ""))
            .unwrap();
        log.record_error(&ErrorEvent::new(WidgetOperation::Delete, Some("w9"), "widget 'w9' not found"))
            .unwrap();

        let date = chrono::Local::now().format("%Y-%m-%d").to_string();
        let text = fs::read_to_string(dir.join(format!("Sales___EMEA_{}.log", date))).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("create w1 (kpi)"));
        assert!(lines[1].contains("!!! delete w9"));

        fs::remove_dir_all(dir).expect("cleanup");
    }

    #[test]
    fn test_disabled_audit_log_touches_nothing() {
        let config = LoggingConfig {
            audit_dir: "/nonexistent/dashgrid/audit".into(),
            ..LoggingConfig::default()
        };
        let mut log = AuditLog::new(&config, "x");
        let event = WidgetEvent::new("w1", WidgetType::Bar, WidgetOperation::Edit, "");
        assert!(log.record(&event).is_ok());
    }
}
