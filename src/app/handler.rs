use crate::app::action::Action;
use crate::app::commands::{self, ParsedCommand, HELP_LINES};
use crate::app::event::AppEvent;
use crate::app::render;
use crate::app::state::AppState;
use crate::dashboard::{EditModeChange, LayoutEntry, Outcome};
use tracing::debug;

pub fn handle_event(state: &mut AppState, event: AppEvent) -> Vec<Action> {
    match event {
        AppEvent::Input(line) => handle_input(state, &line),
        AppEvent::InputClosed => {
            debug!("input closed");
            vec![Action::Quit]
        }
        AppEvent::DemoDataReady => {
            if state.controller.initialize_demo_data() {
                state.system_message("Demo dashboard loaded.".to_string());
            } else {
                debug!("demo data skipped");
            }
            vec![]
        }
    }
}

fn handle_input(state: &mut AppState, line: &str) -> Vec<Action> {
    let line = line.trim();
    if line.is_empty() {
        return vec![];
    }
    let Some(cmd) = commands::parse_command(line) else {
        state.error_message(format!("Unknown or malformed command: {} (try /help)", line));
        return vec![];
    };
    handle_command(state, cmd)
}

fn handle_command(state: &mut AppState, cmd: ParsedCommand) -> Vec<Action> {
    let c = &mut state.controller;
    match cmd {
        ParsedCommand::Edit => match c.toggle_edit_mode() {
            EditModeChange::Entered => {
                state.system_message("Edit mode on.".to_string());
                vec![]
            }
            EditModeChange::Exited { save_requested } => {
                state.system_message("Edit mode off.".to_string());
                if save_requested {
                    vec![Action::SaveDocument]
                } else {
                    vec![]
                }
            }
        },
        ParsedCommand::Add => {
            if !c.is_edit_mode() {
                state.error_message("Enter edit mode first (/edit).".to_string());
                return vec![];
            }
            c.add_widget();
            state.system_message("Create form open: /submit type=<t> title=\"...\"".to_string());
            vec![]
        }
        ParsedCommand::Change { id } => {
            if !c.is_edit_mode() {
                state.error_message("Enter edit mode first (/edit).".to_string());
                return vec![];
            }
            let outcome = c.edit_widget(&id);
            if outcome.is_applied() {
                let draft = c
                    .modal()
                    .and_then(|m| m.draft.as_ref())
                    .and_then(|d| serde_json::to_string(d).ok())
                    .unwrap_or_default();
                state.system_message(format!("Editing {}: {}", id, draft));
            } else {
                report(state, outcome, &id);
            }
            vec![]
        }
        ParsedCommand::Submit { patch } => {
            let outcome = c.submit_widget_modal(patch);
            match outcome {
                Outcome::Applied => state.info_message("Widget saved.".to_string()),
                Outcome::Ignored => state.error_message("No form is open.".to_string()),
                Outcome::NotFound => {
                    state.error_message("The widget being edited no longer exists.".to_string())
                }
            }
            vec![]
        }
        ParsedCommand::Close => {
            c.close_widget_modal();
            vec![]
        }
        ParsedCommand::Delete { id } => {
            let outcome = c.delete_widget(&id);
            report(state, outcome, &id);
            vec![]
        }
        ParsedCommand::Duplicate { id } => {
            let outcome = c.duplicate_widget(&id);
            report(state, outcome, &id);
            vec![]
        }
        ParsedCommand::Move {
            id,
            breakpoint,
            x,
            y,
            w,
            h,
        } => {
            let mut all = c.layouts().clone();
            let Some(entries) = all.get_mut(&breakpoint) else {
                state.error_message(format!("Unknown breakpoint: {}", breakpoint));
                return vec![];
            };
            let Some(entry) = entries.iter_mut().find(|e| e.widget_id == id) else {
                state.error_message(format!("No widget {} in {}", id, breakpoint));
                return vec![];
            };
            *entry = LayoutEntry {
                x,
                y,
                w,
                h,
                ..entry.clone()
            };
            let current = entries.clone();
            c.handle_layout_change(&current, all);
            vec![]
        }
        ParsedCommand::Undo => {
            if !c.undo().is_applied() {
                state.info_message("Nothing to undo.".to_string());
            }
            vec![]
        }
        ParsedCommand::Redo => {
            if !c.redo().is_applied() {
                state.info_message("Nothing to redo.".to_string());
            }
            vec![]
        }
        ParsedCommand::List => {
            for line in render::render_dashboard(c, "lg") {
                state.info_message(line);
            }
            vec![]
        }
        ParsedCommand::Save => vec![Action::SaveDocument],
        ParsedCommand::Help => {
            for line in HELP_LINES {
                state.system_message(line.to_string());
            }
            vec![]
        }
        ParsedCommand::Quit => vec![Action::Quit],
    }
}

fn report(state: &mut AppState, outcome: Outcome, id: &str) {
    if outcome == Outcome::NotFound {
        state.error_message(format!("No widget with id {}", id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::dashboard::{DashboardController, WidgetStore};

    fn app() -> AppState {
        let cfg = AppConfig::default();
        let store = WidgetStore::new(cfg.grid.clone(), cfg.history.clone());
        AppState::new(cfg, DashboardController::new(store))
    }

    fn input(state: &mut AppState, line: &str) -> Vec<Action> {
        handle_event(state, AppEvent::Input(line.to_string()))
    }

    #[test]
    fn test_demo_event_after_user_edit_is_ignored() {
        let mut state = app();
        input(&mut state, "/edit");
        input(&mut state, "/add");
        input(&mut state, "/submit type=kpi title=Churn");
        assert_eq!(state.controller.widgets().len(), 1);

        handle_event(&mut state, AppEvent::DemoDataReady);
        assert_eq!(state.controller.widgets().len(), 1);
    }

    #[test]
    fn test_leaving_edit_mode_with_changes_requests_save() {
        let mut state = app();
        handle_event(&mut state, AppEvent::DemoDataReady);
        input(&mut state, "/edit");
        input(&mut state, "/delete demo-users");
        assert_eq!(input(&mut state, "/edit"), vec![Action::SaveDocument]);
        assert!(input(&mut state, "/edit").is_empty());
    }

    #[test]
    fn test_move_goes_through_layout_change() {
        let mut state = app();
        handle_event(&mut state, AppEvent::DemoDataReady);
        state.take_dirty();
        input(&mut state, "/move demo-regions lg 0 20 12 4");
        let lg = &state.controller.layouts()["lg"];
        let e = lg.iter().find(|e| e.widget_id == "demo-regions").unwrap();
        assert_eq!((e.x, e.y, e.w, e.h), (0, 20, 12, 4));
        assert!(state.take_dirty());
        assert!(!state.controller.can_undo());
    }

    #[test]
    fn test_unknown_command_reports_error() {
        let mut state = app();
        input(&mut state, "/frobnicate");
        input(&mut state, "/delete ghost");
        let errors = state
            .new_messages
            .iter()
            .filter(|m| m.kind == crate::app::state::MessageKind::Error)
            .count();
        assert_eq!(errors, 2);
    }

    #[test]
    fn test_input_closed_quits() {
        let mut state = app();
        assert_eq!(handle_event(&mut state, AppEvent::InputClosed), vec![Action::Quit]);
    }
}
