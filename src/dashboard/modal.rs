//! Create/edit modal state. Lives outside undo history.

use crate::dashboard::model::{WidgetId, WidgetPatch};

#[derive(Debug, Clone, PartialEq)]
pub enum ModalMode {
    Create,
    Edit { widget_id: WidgetId },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModalState {
    pub mode: ModalMode,
    /// Pre-fill data for the form (the widget's current fields on edit).
    pub draft: Option<WidgetPatch>,
}

#[derive(Debug, Default)]
pub struct ModalController {
    state: Option<ModalState>,
}

impl ModalController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_create(&mut self) {
        self.state = Some(ModalState {
            mode: ModalMode::Create,
            draft: None,
        });
    }

    pub fn open_edit(&mut self, widget_id: WidgetId, draft: WidgetPatch) {
        self.state = Some(ModalState {
            mode: ModalMode::Edit { widget_id },
            draft: Some(draft),
        });
    }

    pub fn close(&mut self) {
        self.state = None;
    }

    pub fn is_open(&self) -> bool {
        self.state.is_some()
    }

    pub fn state(&self) -> Option<&ModalState> {
        self.state.as_ref()
    }

    pub fn mode(&self) -> Option<&ModalMode> {
        self.state.as_ref().map(|s| &s.mode)
    }
}
