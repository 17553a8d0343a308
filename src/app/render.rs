//! Plain-text rendering of the dashboard for the headless driver.

use crate::app::state::{AppState, Message, MessageKind};
use crate::dashboard::DashboardController;

/// Widgets in `lg` layout order (top-to-bottom, left-to-right), one per line.
pub fn render_dashboard(controller: &DashboardController, breakpoint: &str) -> Vec<String> {
    let mut entries = controller
        .layouts()
        .get(breakpoint)
        .cloned()
        .unwrap_or_default();
    entries.sort_by_key(|e| (e.y, e.x));

    let mut lines = Vec::with_capacity(entries.len());
    for e in &entries {
        let Some(w) = controller.store().widget(&e.widget_id) else {
            continue;
        };
        lines.push(format!(
            "  [{:>2},{:>2} {:>2}x{:<2}] {:<6} {:<28} {}",
            e.x, e.y, e.w, e.h, w.widget_type, w.title, w.id
        ));
    }
    if lines.is_empty() {
        lines.push("  (empty dashboard)".to_string());
    }
    lines
}

pub fn render_frame(state: &AppState) -> Vec<String> {
    let mut lines = vec![format!("== {}", state.status_line())];
    lines.extend(render_dashboard(&state.controller, "lg"));
    lines
}

pub fn format_message(msg: &Message) -> String {
    match msg.kind {
        MessageKind::Info => format!("[{}] {}", msg.timestamp, msg.text),
        MessageKind::System => format!("[{}] *** {}", msg.timestamp, msg.text),
        MessageKind::Error => format!("[{}] !!! {}", msg.timestamp, msg.text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::WidgetStore;

    #[test]
    fn test_render_orders_by_position() {
        let mut store = WidgetStore::default();
        store.initialize_demo_data();
        let c = DashboardController::new(store);
        let lines = render_dashboard(&c, "lg");
        assert_eq!(lines.len(), 6);
        assert!(lines[0].contains("Total Revenue"));
        assert!(lines[5].contains("Sales by Region"));
    }

    #[test]
    fn test_render_empty() {
        let c = DashboardController::new(WidgetStore::default());
        assert_eq!(render_dashboard(&c, "lg"), vec!["  (empty dashboard)"]);
    }
}
