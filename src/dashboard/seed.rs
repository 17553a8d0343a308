//! Demo dashboard shown to first-time users.

use crate::dashboard::layout::{reconcile_layouts, GridSpec};
use crate::dashboard::model::{LayoutEntry, Layouts, Snapshot, Widget, WidgetType};
use serde_json::json;

pub fn demo_widgets() -> Vec<Widget> {
    vec![
        Widget::new("demo-revenue", WidgetType::Kpi, "Total Revenue")
            .with_config(json!({"format": "currency", "currency": "USD", "comparison": "previous_period"}))
            .with_data_source("metrics.revenue"),
        Widget::new("demo-users", WidgetType::Kpi, "Active Users")
            .with_config(json!({"format": "number", "comparison": "previous_period"}))
            .with_data_source("metrics.active_users"),
        Widget::new("demo-conversion", WidgetType::Kpi, "Conversion Rate")
            .with_config(json!({"format": "percent", "precision": 1}))
            .with_data_source("metrics.conversion"),
        Widget::new("demo-trend", WidgetType::Line, "Revenue Trend")
            .with_config(json!({"x": "date", "y": ["revenue"], "smooth": true}))
            .with_data_source("series.revenue_daily"),
        Widget::new("demo-sources", WidgetType::Pie, "Traffic Sources")
            .with_config(json!({"label": "channel", "value": "sessions", "donut": true}))
            .with_data_source("series.traffic_sources"),
        Widget::new("demo-regions", WidgetType::Bar, "Sales by Region")
            .with_config(json!({"x": "region", "y": ["sales"], "stacked": false}))
            .with_data_source("series.sales_by_region"),
    ]
}

/// Hand-placed `lg` arrangement; other breakpoints are derived.
fn demo_lg_layout() -> Vec<LayoutEntry> {
    vec![
        LayoutEntry::new("demo-revenue", 0, 0, 8, 2),
        LayoutEntry::new("demo-users", 8, 0, 8, 2),
        LayoutEntry::new("demo-conversion", 16, 0, 8, 2),
        LayoutEntry::new("demo-trend", 0, 2, 16, 5),
        LayoutEntry::new("demo-sources", 16, 2, 8, 5),
        LayoutEntry::new("demo-regions", 0, 7, 24, 4),
    ]
}

pub fn demo_snapshot(grid: &GridSpec) -> Snapshot {
    let widgets = demo_widgets();
    let seeded = Layouts::from([("lg".to_string(), demo_lg_layout())]);
    let layouts = reconcile_layouts(grid, &seeded, &widgets);
    Snapshot::new(widgets, layouts)
}
