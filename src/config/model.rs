//! Configuration data model.
//!
//! All structs derive `Serialize`/`Deserialize` for TOML persistence.
//! Every field has a sensible default so the application works out of the box.

use crate::dashboard::{GridSpec, HistoryConfig};
use rand::RngExt;
use serde::{Deserialize, Serialize};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_name")]
    pub dashboard_name: String,
    #[serde(default)]
    pub grid: GridSpec,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub demo: DemoConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dashboard_name: default_name(),
            grid: GridSpec::default(),
            history: HistoryConfig::default(),
            demo: DemoConfig::default(),
            logging: LoggingConfig::default(),
            persistence: PersistenceConfig::default(),
        }
    }
}

/// Demo-data seeding for first-time users.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Delay before the seed effect fires, in milliseconds.
    #[serde(default = "default_init_delay")]
    pub init_delay_ms: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            init_delay_ms: default_init_delay(),
        }
    }
}

/// Diagnostic logging and the widget audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter directive; `RUST_LOG` takes precedence.
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub audit_enabled: bool,
    #[serde(default = "default_audit_dir")]
    pub audit_dir: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            audit_enabled: false,
            audit_dir: default_audit_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    #[serde(default = "default_document_path")]
    pub document_path: String,
    /// Load `document_path` on startup when it exists.
    #[serde(default = "default_true")]
    pub load_on_start: bool,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            document_path: default_document_path(),
            load_on_start: true,
        }
    }
}

/// `Dashboard 3f9a`. The suffix keeps audit-log files of unnamed dashboards
/// apart, so it is drawn once and then persisted with the config.
fn default_name() -> String {
    let tag: u16 = rand::rng().random_range(0x1000..=0xffff);
    format!("Dashboard {:04x}", tag)
}
fn default_true() -> bool {
    true
}
fn default_init_delay() -> u64 {
    250
}
fn default_level() -> String {
    "info".to_string()
}
fn default_audit_dir() -> String {
    "~/.local/share/dashgrid/audit".to_string()
}
fn default_document_path() -> String {
    "~/.local/share/dashgrid/dashboard.json".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_fills_defaults() {
        let cfg: AppConfig = toml::from_str(
            r#"
            dashboard_name = "Ops"

            [history]
            max_depth = 20

            [[grid.breakpoints]]
            name = "lg"
            columns = 24
            "#,
        )
        .unwrap();
        assert_eq!(cfg.dashboard_name, "Ops");
        assert_eq!(cfg.history.max_depth, 20);
        assert_eq!(cfg.grid.breakpoints.len(), 1);
        assert!(cfg.demo.enabled);
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn test_default_name_has_hex_tag() {
        let name = AppConfig::default().dashboard_name;
        let tag = name.strip_prefix("Dashboard ").unwrap();
        assert_eq!(tag.len(), 4);
        assert!(u16::from_str_radix(tag, 16).is_ok());
    }
}
