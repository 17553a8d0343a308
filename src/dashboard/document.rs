//! Saved-dashboard document handed to the persistence collaborator.

use crate::dashboard::error::DashboardError;
use crate::dashboard::model::{Layouts, Widget};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DOCUMENT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardDocument {
    #[serde(default = "default_version")]
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub widgets: Vec<Widget>,
    #[serde(default)]
    pub layouts: Layouts,
    #[serde(default = "Utc::now")]
    pub saved_at: DateTime<Utc>,
}

fn default_version() -> u32 {
    DOCUMENT_VERSION
}

impl DashboardDocument {
    pub fn new(name: impl Into<String>, widgets: &[Widget], layouts: &Layouts) -> Self {
        Self {
            version: DOCUMENT_VERSION,
            name: name.into(),
            widgets: widgets.to_vec(),
            layouts: layouts.clone(),
            saved_at: Utc::now(),
        }
    }

    pub fn save_json_file(&self, path: impl AsRef<Path>) -> Result<(), DashboardError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| DashboardError::DocumentWrite {
                path: parent.display().to_string(),
                source,
            })?;
        }
        fs::write(path, json).map_err(|source| DashboardError::DocumentWrite {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn load_json_file(path: impl AsRef<Path>) -> Result<Self, DashboardError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| DashboardError::DocumentRead {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_json::from_str(&text)?)
    }
}
