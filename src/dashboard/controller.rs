//! User-intent orchestration over a [`WidgetStore`].
//!
//! Every mutating action runs inside one store batch in a fixed order:
//! mark modified, push the pre-mutation snapshot, clear redo, then widgets,
//! then layouts, then the dirty flag. Subscribers therefore only ever see
//! the state before or after a whole action.
//!
//! Lookups always go through the store's current state. Acting on an id
//! that no longer exists is a logged no-op, never an error.

use crate::dashboard::document::DashboardDocument;
use crate::dashboard::layout::{
    generate_default_layouts, merge_layouts, place_below, reconcile_layouts,
    remove_widget_from_layouts,
};
use crate::dashboard::modal::{ModalController, ModalMode, ModalState};
use crate::dashboard::model::{
    empty_config, LayoutEntry, Layouts, Snapshot, Widget, WidgetId, WidgetPatch,
};
use crate::dashboard::monitor::{
    ErrorEvent, TracingMonitor, WidgetEvent, WidgetMonitor, WidgetOperation,
};
use crate::dashboard::store::{StateUpdate, StoreChange, SubscriptionId, WidgetStore};
use chrono::Utc;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Result of a user action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// State changed (or the modal opened).
    Applied,
    /// The target widget does not exist; nothing changed.
    NotFound,
    /// Nothing to do (empty history, no modal open).
    Ignored,
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditModeChange {
    Entered,
    /// `save_requested` is set when unsaved changes were pending; the dirty
    /// flag has been cleared and the caller should persist the dashboard.
    Exited { save_requested: bool },
}

pub struct DashboardController {
    store: WidgetStore,
    modal: ModalController,
    monitor: Box<dyn WidgetMonitor>,
}

impl DashboardController {
    pub fn new(store: WidgetStore) -> Self {
        Self::with_monitor(store, TracingMonitor)
    }

    pub fn with_monitor(store: WidgetStore, monitor: impl WidgetMonitor + 'static) -> Self {
        Self {
            store,
            modal: ModalController::new(),
            monitor: Box::new(monitor),
        }
    }

    // ---- reads ----

    pub fn store(&self) -> &WidgetStore {
        &self.store
    }

    pub fn widgets(&self) -> &[Widget] {
        self.store.widgets()
    }

    pub fn layouts(&self) -> &Layouts {
        self.store.layouts()
    }

    pub fn is_edit_mode(&self) -> bool {
        self.store.is_edit_mode()
    }

    pub fn has_changes(&self) -> bool {
        self.store.has_changes()
    }

    pub fn can_undo(&self) -> bool {
        self.store.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.store.can_redo()
    }

    pub fn modal(&self) -> Option<&ModalState> {
        self.modal.state()
    }

    pub fn subscribe(
        &mut self,
        callback: impl FnMut(StoreChange, &WidgetStore) + 'static,
    ) -> SubscriptionId {
        self.store.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    // ---- lifecycle ----

    /// Deferred demo-data effect. Inert once the user has changed anything.
    pub fn initialize_demo_data(&mut self) -> bool {
        self.store.initialize_demo_data()
    }

    /// Adopt a saved dashboard. History is dropped and the dashboard counts
    /// as modified, so a late demo initialization cannot overwrite it.
    ///
    /// Widgets repeating an earlier id are dropped; the first one wins.
    pub fn load_document(&mut self, doc: DashboardDocument) {
        let mut seen = HashSet::new();
        let widgets: Vec<Widget> = doc
            .widgets
            .into_iter()
            .filter(|w| {
                let fresh = seen.insert(w.id.clone());
                if !fresh {
                    warn!(widget_id = %w.id, "dropping widget with duplicate id from document");
                }
                fresh
            })
            .collect();
        let layouts = reconcile_layouts(self.store.grid(), &doc.layouts, &widgets);
        let snapshot = Snapshot::new(widgets, layouts);
        self.store.batch(|store| {
            store.mark_as_modified();
            store.replace_all(snapshot);
            store.set_has_changes(false);
        });
        self.modal.close();
        info!(widgets = self.store.widgets().len(), "dashboard document loaded");
    }

    pub fn document(&self, name: &str) -> DashboardDocument {
        DashboardDocument::new(name, self.store.widgets(), self.store.layouts())
    }

    // ---- actions ----

    pub fn toggle_edit_mode(&mut self) -> EditModeChange {
        let entering = !self.store.is_edit_mode();
        let save_requested = self.store.batch(|store| {
            store.set_edit_mode(entering);
            if !entering && store.has_changes() {
                store.set_has_changes(false);
                return true;
            }
            false
        });
        if entering {
            debug!("entered edit mode");
            EditModeChange::Entered
        } else {
            self.modal.close();
            debug!(save_requested, "left edit mode");
            EditModeChange::Exited { save_requested }
        }
    }

    /// Called by the grid on every drag/resize. Not undoable.
    pub fn handle_layout_change(&mut self, current: &[LayoutEntry], all: Layouts) {
        debug!(moved = current.len(), breakpoints = all.len(), "layout change");
        let reconciled = reconcile_layouts(self.store.grid(), &all, self.store.widgets());
        self.store.batch(|store| {
            store.mark_as_modified();
            store.set_layouts(reconciled);
            store.set_has_changes(true);
        });
    }

    pub fn add_widget(&mut self) -> Outcome {
        self.modal.open_create();
        Outcome::Applied
    }

    pub fn edit_widget(&mut self, widget_id: &str) -> Outcome {
        let Some(widget) = self.store.widget(widget_id) else {
            return self.not_found(WidgetOperation::Edit, widget_id);
        };
        let draft = WidgetPatch::from(widget);
        self.modal.open_edit(widget_id.to_string(), draft);
        Outcome::Applied
    }

    pub fn close_widget_modal(&mut self) {
        self.modal.close();
    }

    pub fn delete_widget(&mut self, widget_id: &str) -> Outcome {
        let Some(widget_type) = self.store.widget(widget_id).map(|w| w.widget_type) else {
            return self.not_found(WidgetOperation::Delete, widget_id);
        };

        self.store.batch(|store| {
            begin_mutation(store);
            store.set_widgets(StateUpdate::with(|prev: &Vec<Widget>| {
                prev.iter().filter(|w| w.id != widget_id).cloned().collect()
            }));
            store.set_layouts(StateUpdate::with(|prev: &Layouts| {
                remove_widget_from_layouts(prev, widget_id)
            }));
            store.set_has_changes(true);
        });

        info!(widget_id, "widget deleted");
        self.report(WidgetEvent::new(widget_id, widget_type, WidgetOperation::Delete, ""));
        Outcome::Applied
    }

    pub fn duplicate_widget(&mut self, widget_id: &str) -> Outcome {
        let Some(source) = self.store.widget(widget_id).cloned() else {
            return self.not_found(WidgetOperation::Duplicate, widget_id);
        };

        let new_id = self.next_widget_id();
        let copy = Widget {
            id: new_id.clone(),
            title: format!("{} (Copy)", source.title),
            ..source
        };
        let widget_type = copy.widget_type;
        self.insert_widget(copy);

        info!(widget_id = %new_id, source = widget_id, "widget duplicated");
        self.report(WidgetEvent::new(
            &new_id,
            widget_type,
            WidgetOperation::Duplicate,
            format!("source={}", widget_id),
        ));
        Outcome::Applied
    }

    pub fn undo(&mut self) -> Outcome {
        let restored = self.store.batch(|store| {
            let restored = store.undo();
            if restored {
                store.set_has_changes(true);
            }
            restored
        });
        if restored {
            debug!("undo applied");
            Outcome::Applied
        } else {
            Outcome::Ignored
        }
    }

    pub fn redo(&mut self) -> Outcome {
        let restored = self.store.batch(|store| {
            let restored = store.redo();
            if restored {
                store.set_has_changes(true);
            }
            restored
        });
        if restored {
            debug!("redo applied");
            Outcome::Applied
        } else {
            Outcome::Ignored
        }
    }

    /// Apply the modal's form data: create a widget, or patch the one being
    /// edited. The modal is closed afterwards.
    pub fn submit_widget_modal(&mut self, data: WidgetPatch) -> Outcome {
        let Some(mode) = self.modal.mode().cloned() else {
            warn!("widget modal submitted while closed");
            return Outcome::Ignored;
        };

        let outcome = match mode {
            ModalMode::Create => self.create_from(data),
            ModalMode::Edit { widget_id } => self.patch_widget(&widget_id, data),
        };
        self.modal.close();
        outcome
    }

    // ---- internals ----

    fn create_from(&mut self, data: WidgetPatch) -> Outcome {
        let widget_type = data.widget_type.unwrap_or_default();
        let widget = Widget {
            id: self.next_widget_id(),
            widget_type,
            title: non_blank(data.title)
                .unwrap_or_else(|| widget_type.default_title().to_string()),
            config: data.config.unwrap_or_else(empty_config),
            data_source: data.data_source,
        };
        let id = widget.id.clone();
        self.insert_widget(widget);

        info!(widget_id = %id, widget_type = %widget_type, "widget created");
        self.report(WidgetEvent::new(&id, widget_type, WidgetOperation::Create, ""));
        Outcome::Applied
    }

    fn patch_widget(&mut self, widget_id: &str, mut data: WidgetPatch) -> Outcome {
        if self.store.widget(widget_id).is_none() {
            return self.not_found(WidgetOperation::Edit, widget_id);
        }
        data.title = non_blank(data.title);

        self.store.batch(|store| {
            begin_mutation(store);
            store.set_widgets(StateUpdate::with(|prev: &Vec<Widget>| {
                prev.iter()
                    .map(|w| {
                        let mut w = w.clone();
                        if w.id == widget_id {
                            w.apply_patch(&data);
                        }
                        w
                    })
                    .collect()
            }));
            store.set_has_changes(true);
        });

        let widget_type = self
            .store
            .widget(widget_id)
            .map(|w| w.widget_type)
            .unwrap_or_default();
        info!(widget_id, "widget updated");
        self.report(WidgetEvent::new(widget_id, widget_type, WidgetOperation::Edit, ""));
        Outcome::Applied
    }

    /// Append `widget` and give it default layout entries below existing
    /// content in every breakpoint.
    fn insert_widget(&mut self, widget: Widget) {
        let generated = generate_default_layouts(self.store.grid(), &widget.id, widget.widget_type);
        self.store.batch(|store| {
            begin_mutation(store);
            store.set_widgets(StateUpdate::with(|prev: &Vec<Widget>| {
                let mut next = prev.clone();
                next.push(widget);
                next
            }));
            store.set_layouts(StateUpdate::with(|prev: &Layouts| {
                merge_layouts(prev, &place_below(prev, &generated))
            }));
            store.set_has_changes(true);
        });
    }

    /// `widget-<unix millis>`, suffixed until it collides with nothing.
    fn next_widget_id(&self) -> WidgetId {
        let base = format!("widget-{}", Utc::now().timestamp_millis());
        let mut candidate = base.clone();
        let mut n = 1;
        while self.store.widget(&candidate).is_some() {
            candidate = format!("{}-{}", base, n);
            n += 1;
        }
        candidate
    }

    fn not_found(&mut self, operation: WidgetOperation, widget_id: &str) -> Outcome {
        warn!(widget_id, %operation, "widget not found; ignoring");
        let event = ErrorEvent::new(operation, Some(widget_id), format!("widget '{}' not found", widget_id));
        if let Err(e) = self.monitor.record_error(&event) {
            warn!(error = %e, "monitor rejected error event");
        }
        Outcome::NotFound
    }

    fn report(&mut self, event: WidgetEvent) {
        if let Err(e) = self.monitor.record(&event) {
            warn!(error = %e, widget_id = %event.widget_id, "monitor rejected widget event");
        }
    }
}

fn begin_mutation(store: &mut WidgetStore) {
    store.mark_as_modified();
    store.push_undo_state(store.snapshot());
    store.clear_redo_stack();
}

fn non_blank(title: Option<String>) -> Option<String> {
    title.filter(|t| !t.trim().is_empty())
}
