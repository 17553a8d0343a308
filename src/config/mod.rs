pub mod model;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub use model::AppConfig;

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("dashgrid")
        .join("config.toml")
}

pub fn load_config() -> Result<AppConfig> {
    load_config_from(&config_path())
}

pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    let config: AppConfig =
        toml::from_str(&contents).with_context(|| "Failed to parse config file")?;
    Ok(config)
}

pub fn save_config(config: &AppConfig) -> Result<()> {
    save_config_to(config, &config_path())
}

pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory {}", parent.display()))?;
    }
    let contents = toml::to_string_pretty(config).with_context(|| "Failed to serialize config")?;
    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;
    Ok(())
}

/// Expand a leading `~/` against the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::layout::is_consistent;
    use crate::dashboard::WidgetStore;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn test_missing_file_yields_defaults() {
        let cfg = load_config_from(Path::new("/nonexistent/dashgrid/config.toml")).unwrap();
        assert_eq!(cfg.history.max_depth, 50);
    }

    #[test]
    fn test_save_and_reload() {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("dashgrid_config_test_{suffix}"));
        let path = dir.join("config.toml");

        let mut cfg = AppConfig::default();
        cfg.history.max_depth = 7;
        cfg.demo.enabled = false;
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.history.max_depth, 7);
        assert!(!loaded.demo.enabled);
        assert_eq!(loaded.grid, cfg.grid);

        std::fs::remove_dir_all(dir).expect("cleanup");
    }

    #[test]
    fn test_zero_column_breakpoint_is_usable() {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("dashgrid_config_cols_{suffix}"));
        let path = dir.join("config.toml");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            &path,
            "[[grid.breakpoints]]\nname = \"lg\"\ncolumns = 0\n",
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.grid.columns_for("lg"), 1);

        let mut store = WidgetStore::new(cfg.grid.clone(), cfg.history.clone());
        assert!(store.initialize_demo_data());
        assert!(is_consistent(store.layouts(), store.widgets()));
        assert!(store.layouts()["lg"].iter().all(|e| e.x == 0 && e.w == 1));

        std::fs::remove_dir_all(dir).expect("cleanup");
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("/var/log"), PathBuf::from("/var/log"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/x"), home.join("x"));
        }
    }
}
