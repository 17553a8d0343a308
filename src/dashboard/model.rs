//! Dashboard data model: widgets, layout entries, and history snapshots.
//!
//! Everything here is plain owned data deriving `Serialize`/`Deserialize`, so
//! cloning a [`Snapshot`] always yields a structurally independent copy.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

pub type WidgetId = String;
pub type Breakpoint = String;

/// Breakpoint name -> ordered layout entries for that breakpoint.
pub type Layouts = BTreeMap<Breakpoint, Vec<LayoutEntry>>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetType {
    #[default]
    Line,
    Bar,
    Area,
    Pie,
    Kpi,
    Table,
}

impl WidgetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WidgetType::Line => "line",
            WidgetType::Bar => "bar",
            WidgetType::Area => "area",
            WidgetType::Pie => "pie",
            WidgetType::Kpi => "kpi",
            WidgetType::Table => "table",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "line" => Some(WidgetType::Line),
            "bar" => Some(WidgetType::Bar),
            "area" => Some(WidgetType::Area),
            "pie" => Some(WidgetType::Pie),
            "kpi" => Some(WidgetType::Kpi),
            "table" => Some(WidgetType::Table),
            _ => None,
        }
    }

    /// Title given to a freshly created widget when the submit omits one.
    pub fn default_title(&self) -> &'static str {
        match self {
            WidgetType::Line => "New Line Chart",
            WidgetType::Bar => "New Bar Chart",
            WidgetType::Area => "New Area Chart",
            WidgetType::Pie => "New Pie Chart",
            WidgetType::Kpi => "New KPI",
            WidgetType::Table => "New Table",
        }
    }
}

impl fmt::Display for WidgetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    pub id: WidgetId,
    #[serde(rename = "type")]
    pub widget_type: WidgetType,
    pub title: String,
    /// Opaque per-type settings, interpreted only by the chart renderer.
    #[serde(default = "empty_config")]
    pub config: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<String>,
}

impl Widget {
    pub fn new(id: impl Into<WidgetId>, widget_type: WidgetType, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            widget_type,
            title: title.into(),
            config: empty_config(),
            data_source: None,
        }
    }

    pub fn with_config(mut self, config: Value) -> Self {
        self.config = config;
        self
    }

    pub fn with_data_source(mut self, source: impl Into<String>) -> Self {
        self.data_source = Some(source.into());
        self
    }

    /// Overwrite only the fields present in `patch`.
    pub fn apply_patch(&mut self, patch: &WidgetPatch) {
        if let Some(t) = patch.widget_type {
            self.widget_type = t;
        }
        if let Some(ref title) = patch.title {
            self.title = title.clone();
        }
        if let Some(ref config) = patch.config {
            self.config = config.clone();
        }
        if let Some(ref source) = patch.data_source {
            self.data_source = Some(source.clone());
        }
    }
}

pub(crate) fn empty_config() -> Value {
    Value::Object(Default::default())
}

/// Partial widget data as produced by the create/edit modal.
///
/// `None` means "not provided": on edit the existing value is kept, on create
/// the per-type default is used.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WidgetPatch {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub widget_type: Option<WidgetType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<String>,
}

impl WidgetPatch {
    pub fn is_empty(&self) -> bool {
        self.widget_type.is_none()
            && self.title.is_none()
            && self.config.is_none()
            && self.data_source.is_none()
    }
}

impl From<&Widget> for WidgetPatch {
    fn from(w: &Widget) -> Self {
        Self {
            widget_type: Some(w.widget_type),
            title: Some(w.title.clone()),
            config: Some(w.config.clone()),
            data_source: w.data_source.clone(),
        }
    }
}

/// Position and size of one widget in one breakpoint's grid, in grid units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutEntry {
    pub widget_id: WidgetId,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_w: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_h: Option<u32>,
}

impl LayoutEntry {
    pub fn new(widget_id: impl Into<WidgetId>, x: u32, y: u32, w: u32, h: u32) -> Self {
        Self {
            widget_id: widget_id.into(),
            x,
            y,
            w,
            h,
            min_w: None,
            min_h: None,
        }
    }

    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.h)
    }
}

/// Deep copy of the undoable part of the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub widgets: Vec<Widget>,
    pub layouts: Layouts,
}

impl Snapshot {
    pub fn new(widgets: Vec<Widget>, layouts: Layouts) -> Self {
        Self { widgets, layouts }
    }
}

pub fn widget_ids(widgets: &[Widget]) -> BTreeSet<&str> {
    widgets.iter().map(|w| w.id.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_apply_patch_keeps_unmentioned_fields() {
        let mut w = Widget::new("w1", WidgetType::Bar, "Sales")
            .with_config(json!({"stacked": true}))
            .with_data_source("sales_api");
        let patch = WidgetPatch {
            title: Some("Sales by Region".into()),
            ..Default::default()
        };
        w.apply_patch(&patch);
        assert_eq!(w.title, "Sales by Region");
        assert_eq!(w.widget_type, WidgetType::Bar);
        assert_eq!(w.config, json!({"stacked": true}));
        assert_eq!(w.data_source.as_deref(), Some("sales_api"));
    }

    #[test]
    fn test_widget_type_parse() {
        assert_eq!(WidgetType::parse("KPI"), Some(WidgetType::Kpi));
        assert_eq!(WidgetType::parse("pie"), Some(WidgetType::Pie));
        assert_eq!(WidgetType::parse("gauge"), None);
    }

    #[test]
    fn test_widget_json_uses_type_key() {
        let w = Widget::new("w1", WidgetType::Kpi, "Revenue");
        let v = serde_json::to_value(&w).unwrap();
        assert_eq!(v["type"], "kpi");
        assert!(v.get("data_source").is_none());
    }
}
