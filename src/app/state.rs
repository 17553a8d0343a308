use crate::config::AppConfig;
use crate::dashboard::DashboardController;
use chrono::Local;
use std::cell::Cell;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub enum MessageKind {
    Info,
    System,
    Error,
}

#[derive(Debug, Clone)]
pub struct Message {
    pub timestamp: String,
    pub text: String,
    pub kind: MessageKind,
}

pub struct AppState {
    pub config: AppConfig,
    pub controller: DashboardController,
    /// Messages produced since the main loop last drained them.
    pub new_messages: Vec<Message>,
    pub should_quit: bool,
    /// Set by the store subscriber whenever dashboard state changes.
    pub dirty: Rc<Cell<bool>>,
}

impl AppState {
    pub fn new(config: AppConfig, mut controller: DashboardController) -> Self {
        let dirty = Rc::new(Cell::new(true));
        let flag = dirty.clone();
        controller.subscribe(move |_, _| flag.set(true));
        Self {
            config,
            controller,
            new_messages: Vec::new(),
            should_quit: false,
            dirty,
        }
    }

    fn push_message(&mut self, text: String, kind: MessageKind) {
        self.new_messages.push(Message {
            timestamp: Local::now().format("%H:%M:%S").to_string(),
            text,
            kind,
        });
    }

    pub fn info_message(&mut self, text: String) {
        self.push_message(text, MessageKind::Info);
    }

    pub fn system_message(&mut self, text: String) {
        self.push_message(text, MessageKind::System);
    }

    pub fn error_message(&mut self, text: String) {
        self.push_message(text, MessageKind::Error);
    }

    /// Returns and clears the dirty flag.
    pub fn take_dirty(&self) -> bool {
        self.dirty.replace(false)
    }

    pub fn status_line(&self) -> String {
        let c = &self.controller;
        let mut s = format!(
            "{} | {} widgets | {}",
            self.config.dashboard_name,
            c.widgets().len(),
            if c.is_edit_mode() { "EDIT" } else { "VIEW" }
        );
        if c.has_changes() {
            s.push_str(" | unsaved");
        }
        if c.can_undo() {
            s.push_str(" | undo");
        }
        if c.can_redo() {
            s.push_str(" | redo");
        }
        if let Some(modal) = c.modal() {
            s.push_str(&format!(" | form: {:?}", modal.mode));
        }
        s
    }
}
