//! Per-breakpoint layout generation and reconciliation.
//!
//! Every function here is pure: it takes layouts by reference and returns a
//! new [`Layouts`] value. Entries belonging to widgets other than the one
//! being operated on are cloned through untouched.

use crate::dashboard::model::{widget_ids, LayoutEntry, Layouts, Widget, WidgetType};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;

/// Column count that the per-type default sizes are expressed in.
pub const BASE_COLUMNS: u32 = 24;

/// One named responsive grid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakpointSpec {
    pub name: String,
    #[serde(deserialize_with = "at_least_one_column")]
    pub columns: u32,
}

fn at_least_one_column<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(u32::deserialize(deserializer)?.max(1))
}

impl BreakpointSpec {
    pub fn new(name: impl Into<String>, columns: u32) -> Self {
        Self {
            name: name.into(),
            columns: columns.max(1),
        }
    }
}

/// The set of breakpoints a dashboard is laid out for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSpec {
    #[serde(default = "default_breakpoints")]
    pub breakpoints: Vec<BreakpointSpec>,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            breakpoints: default_breakpoints(),
        }
    }
}

impl GridSpec {
    pub fn columns_for(&self, breakpoint: &str) -> u32 {
        self.breakpoints
            .iter()
            .find(|bp| bp.name == breakpoint)
            .map(|bp| bp.columns)
            .unwrap_or(BASE_COLUMNS)
    }
}

fn default_breakpoints() -> Vec<BreakpointSpec> {
    vec![
        BreakpointSpec::new("lg", 24),
        BreakpointSpec::new("md", 20),
        BreakpointSpec::new("sm", 12),
        BreakpointSpec::new("xs", 6),
    ]
}

/// Default (w, h, min_w, min_h) for a widget type on a [`BASE_COLUMNS`] grid.
fn default_size(widget_type: WidgetType) -> (u32, u32, u32, u32) {
    match widget_type {
        WidgetType::Kpi => (6, 2, 3, 2),
        WidgetType::Line | WidgetType::Bar | WidgetType::Area => (12, 4, 4, 3),
        WidgetType::Pie => (8, 4, 4, 3),
        WidgetType::Table => (24, 5, 6, 3),
    }
}

fn scale(units: u32, columns: u32) -> u32 {
    let columns = columns.max(1);
    let scaled = (units * columns + BASE_COLUMNS / 2) / BASE_COLUMNS;
    scaled.clamp(1, columns)
}

/// One default entry per breakpoint for a new widget, anchored at the origin.
///
/// Use [`place_below`] to move the result under existing content before
/// merging.
pub fn generate_default_layouts(grid: &GridSpec, widget_id: &str, widget_type: WidgetType) -> Layouts {
    let (w, h, min_w, min_h) = default_size(widget_type);
    grid.breakpoints
        .iter()
        .map(|bp| {
            let width = scale(w, bp.columns);
            let mut entry = LayoutEntry::new(widget_id, 0, 0, width, h);
            entry.min_w = Some(scale(min_w, bp.columns).min(width));
            entry.min_h = Some(min_h.min(h));
            (bp.name.clone(), vec![entry])
        })
        .collect()
}

/// Union merge: `additional` entries are appended per breakpoint.
pub fn merge_layouts(existing: &Layouts, additional: &Layouts) -> Layouts {
    let mut merged = existing.clone();
    for (bp, entries) in additional {
        merged.entry(bp.clone()).or_default().extend(entries.iter().cloned());
    }
    merged
}

/// Drop every entry referencing `widget_id`, in every breakpoint.
pub fn remove_widget_from_layouts(layouts: &Layouts, widget_id: &str) -> Layouts {
    layouts
        .iter()
        .map(|(bp, entries)| {
            let kept = entries
                .iter()
                .filter(|e| e.widget_id != widget_id)
                .cloned()
                .collect();
            (bp.clone(), kept)
        })
        .collect()
}

/// Lowest occupied row in one breakpoint (0 when empty).
pub fn bottom_of(entries: &[LayoutEntry]) -> u32 {
    entries.iter().map(LayoutEntry::bottom).max().unwrap_or(0)
}

/// Shift `additional` entries so they start below the content already in
/// `existing`, per breakpoint. Existing entries are not touched.
pub fn place_below(existing: &Layouts, additional: &Layouts) -> Layouts {
    additional
        .iter()
        .map(|(bp, entries)| {
            let mut y = existing.get(bp).map(|e| bottom_of(e)).unwrap_or(0);
            let placed = entries
                .iter()
                .map(|e| {
                    let mut e = e.clone();
                    e.y = y;
                    y = e.bottom();
                    e
                })
                .collect();
            (bp.clone(), placed)
        })
        .collect()
}

fn clamp_entry(entry: &mut LayoutEntry, columns: u32) {
    let columns = columns.max(1);
    entry.w = entry.w.clamp(1, columns);
    entry.h = entry.h.max(1);
    entry.x = entry.x.min(columns - entry.w);
    if let Some(min_w) = entry.min_w {
        entry.min_w = Some(min_w.min(entry.w));
    }
    if let Some(min_h) = entry.min_h {
        entry.min_h = Some(min_h.min(entry.h));
    }
}

/// Bring `layouts` in line with `widgets`: orphan and duplicate entries are
/// dropped, positions clamped to each breakpoint's columns, and widgets
/// without an entry get a default one placed at the bottom.
///
/// Breakpoints present in `layouts` but unknown to `grid` are kept and
/// clamped to [`BASE_COLUMNS`].
pub fn reconcile_layouts(grid: &GridSpec, layouts: &Layouts, widgets: &[Widget]) -> Layouts {
    let ids = widget_ids(widgets);
    let mut out = Layouts::new();

    let names = grid
        .breakpoints
        .iter()
        .map(|bp| bp.name.clone())
        .chain(layouts.keys().cloned());

    for bp in names {
        if out.contains_key(&bp) {
            continue;
        }
        let columns = grid.columns_for(&bp);
        let mut seen = HashSet::new();
        let mut entries: Vec<LayoutEntry> = layouts
            .get(&bp)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
            .iter()
            .filter(|e| ids.contains(e.widget_id.as_str()) && seen.insert(e.widget_id.clone()))
            .cloned()
            .collect();
        for e in entries.iter_mut() {
            clamp_entry(e, columns);
        }

        for w in widgets {
            if !seen.insert(w.id.clone()) {
                continue;
            }
            let spec = GridSpec {
                breakpoints: vec![BreakpointSpec::new(bp.clone(), columns)],
            };
            let generated = generate_default_layouts(&spec, &w.id, w.widget_type);
            let current = Layouts::from([(bp.clone(), entries.clone())]);
            let placed = place_below(&current, &generated);
            entries.extend(placed.into_values().flatten());
        }
        out.insert(bp, entries);
    }
    out
}

/// Whether every breakpoint holds exactly one entry per widget and nothing
/// else.
pub fn is_consistent(layouts: &Layouts, widgets: &[Widget]) -> bool {
    let ids = widget_ids(widgets);
    layouts.values().all(|entries| {
        let mut seen = HashSet::new();
        entries.len() == ids.len()
            && entries
                .iter()
                .all(|e| ids.contains(e.widget_id.as_str()) && seen.insert(e.widget_id.as_str()))
    })
}
