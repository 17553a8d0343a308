//! Authoritative dashboard state container.
//!
//! [`WidgetStore`] owns the widget collection, the per-breakpoint layouts,
//! the edit-mode and dirty flags, the demo-data initialization guard, and the
//! undo/redo history. It is an ordinary value: construct one per dashboard
//! and hand it to a [`DashboardController`](crate::dashboard::DashboardController).
//!
//! Mutators accept either a replacement value or an updater closure
//! ([`StateUpdate::with`]). Updaters always receive the value held by the
//! store at the moment they run, so two updates issued back to back compose
//! instead of the second overwriting the first with stale data.
//!
//! Subscribers are notified synchronously after each change, except inside
//! [`WidgetStore::batch`], where notifications are deferred until the
//! outermost batch closes and each distinct change is reported once.

use crate::dashboard::history::{HistoryConfig, UndoRedoManager};
use crate::dashboard::layout::GridSpec;
use crate::dashboard::model::{Layouts, Snapshot, Widget};
use crate::dashboard::seed;
use std::fmt;
use tracing::debug;

/// A pending state write: a plain value or a function of the current value.
pub enum StateUpdate<'a, T> {
    Replace(T),
    With(Box<dyn FnOnce(&T) -> T + 'a>),
}

impl<'a, T> StateUpdate<'a, T> {
    pub fn with(f: impl FnOnce(&T) -> T + 'a) -> Self {
        StateUpdate::With(Box::new(f))
    }

    fn resolve(self, current: &T) -> T {
        match self {
            StateUpdate::Replace(value) => value,
            StateUpdate::With(f) => f(current),
        }
    }
}

impl<T> From<T> for StateUpdate<'_, T> {
    fn from(value: T) -> Self {
        StateUpdate::Replace(value)
    }
}

/// Which part of the store changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreChange {
    Widgets,
    Layouts,
    EditMode,
    HasChanges,
    History,
    Initialized,
}

pub type SubscriptionId = usize;

type Subscriber = Box<dyn FnMut(StoreChange, &WidgetStore)>;

pub struct WidgetStore {
    widgets: Vec<Widget>,
    layouts: Layouts,
    is_edit_mode: bool,
    has_changes: bool,
    has_been_modified: bool,
    demo_initialized: bool,
    history: UndoRedoManager,
    grid: GridSpec,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription_id: SubscriptionId,
    batch_depth: u32,
    pending: Vec<StoreChange>,
}

impl fmt::Debug for WidgetStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetStore")
            .field("widgets", &self.widgets.len())
            .field("is_edit_mode", &self.is_edit_mode)
            .field("has_changes", &self.has_changes)
            .field("has_been_modified", &self.has_been_modified)
            .field("history", &self.history)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl Default for WidgetStore {
    fn default() -> Self {
        Self::new(GridSpec::default(), HistoryConfig::default())
    }
}

impl WidgetStore {
    pub fn new(grid: GridSpec, history: HistoryConfig) -> Self {
        Self {
            widgets: Vec::new(),
            layouts: Layouts::new(),
            is_edit_mode: false,
            has_changes: false,
            has_been_modified: false,
            demo_initialized: false,
            history: UndoRedoManager::new(history),
            grid,
            subscribers: Vec::new(),
            next_subscription_id: 0,
            batch_depth: 0,
            pending: Vec::new(),
        }
    }

    // ---- reads ----

    pub fn widgets(&self) -> &[Widget] {
        &self.widgets
    }

    pub fn layouts(&self) -> &Layouts {
        &self.layouts
    }

    pub fn widget(&self, id: &str) -> Option<&Widget> {
        self.widgets.iter().find(|w| w.id == id)
    }

    pub fn is_edit_mode(&self) -> bool {
        self.is_edit_mode
    }

    pub fn has_changes(&self) -> bool {
        self.has_changes
    }

    pub fn has_been_modified(&self) -> bool {
        self.has_been_modified
    }

    pub fn grid(&self) -> &GridSpec {
        &self.grid
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history(&self) -> &UndoRedoManager {
        &self.history
    }

    /// Owned copy of the undoable state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.widgets.clone(), self.layouts.clone())
    }

    // ---- writes ----

    pub fn set_widgets<'a>(&mut self, update: impl Into<StateUpdate<'a, Vec<Widget>>>) {
        let next = update.into().resolve(&self.widgets);
        if next != self.widgets {
            self.widgets = next;
            self.notify(StoreChange::Widgets);
        }
    }

    pub fn set_layouts<'a>(&mut self, update: impl Into<StateUpdate<'a, Layouts>>) {
        let next = update.into().resolve(&self.layouts);
        if next != self.layouts {
            self.layouts = next;
            self.notify(StoreChange::Layouts);
        }
    }

    pub fn set_edit_mode(&mut self, on: bool) {
        if self.is_edit_mode != on {
            self.is_edit_mode = on;
            self.notify(StoreChange::EditMode);
        }
    }

    pub fn set_has_changes(&mut self, dirty: bool) {
        if self.has_changes != dirty {
            self.has_changes = dirty;
            self.notify(StoreChange::HasChanges);
        }
    }

    /// Permanently disables demo-data initialization for this store.
    pub fn mark_as_modified(&mut self) {
        if !self.has_been_modified {
            debug!("dashboard marked as modified; demo initialization disabled");
            self.has_been_modified = true;
        }
    }

    /// Populate the demo dashboard, at most once and never after the user
    /// has modified anything. Returns whether data was populated.
    pub fn initialize_demo_data(&mut self) -> bool {
        if self.has_been_modified {
            debug!("skipping demo initialization: dashboard already modified");
            return false;
        }
        if self.demo_initialized {
            return false;
        }
        let demo = seed::demo_snapshot(&self.grid);
        self.batch(|store| {
            store.set_widgets(demo.widgets);
            store.set_layouts(demo.layouts);
            store.demo_initialized = true;
            store.notify(StoreChange::Initialized);
        });
        debug!(widgets = self.widgets.len(), "demo data initialized");
        true
    }

    /// Adopt `snapshot` as the whole dashboard and drop all history.
    pub fn replace_all(&mut self, snapshot: Snapshot) {
        self.batch(|store| {
            store.set_widgets(snapshot.widgets);
            store.set_layouts(snapshot.layouts);
            store.history.clear();
            store.notify(StoreChange::History);
        });
    }

    pub fn push_undo_state(&mut self, snapshot: Snapshot) {
        self.history.push_undo_state(snapshot);
        self.notify(StoreChange::History);
    }

    pub fn clear_redo_stack(&mut self) {
        if self.history.can_redo() {
            self.history.clear_redo_stack();
            self.notify(StoreChange::History);
        }
    }

    /// Restore the previous snapshot. Returns `false` when there is nothing
    /// to undo.
    pub fn undo(&mut self) -> bool {
        if !self.history.can_undo() {
            return false;
        }
        let current = self.snapshot();
        match self.history.undo(current) {
            Some(previous) => {
                self.restore(previous);
                true
            }
            None => false,
        }
    }

    /// Re-apply the most recently undone snapshot.
    pub fn redo(&mut self) -> bool {
        if !self.history.can_redo() {
            return false;
        }
        let current = self.snapshot();
        match self.history.redo(current) {
            Some(next) => {
                self.restore(next);
                true
            }
            None => false,
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.batch(|store| {
            store.set_widgets(snapshot.widgets);
            store.set_layouts(snapshot.layouts);
            store.notify(StoreChange::History);
        });
    }

    // ---- observers ----

    pub fn subscribe(&mut self, callback: impl FnMut(StoreChange, &WidgetStore) + 'static) -> SubscriptionId {
        let id = self.next_subscription_id;
        self.next_subscription_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Run `f` with notifications deferred until the outermost batch ends.
    pub fn batch<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.batch_depth += 1;
        let result = f(self);
        self.batch_depth -= 1;
        if self.batch_depth == 0 {
            let pending = std::mem::take(&mut self.pending);
            for change in pending {
                self.dispatch(change);
            }
        }
        result
    }

    fn notify(&mut self, change: StoreChange) {
        if self.batch_depth > 0 {
            if !self.pending.contains(&change) {
                self.pending.push(change);
            }
        } else {
            self.dispatch(change);
        }
    }

    fn dispatch(&mut self, change: StoreChange) {
        let mut subscribers = std::mem::take(&mut self.subscribers);
        for (_, callback) in subscribers.iter_mut() {
            callback(change, self);
        }
        self.subscribers = subscribers;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::layout::{is_consistent, remove_widget_from_layouts};
    use crate::dashboard::model::{LayoutEntry, WidgetType};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn two_widgets() -> Vec<Widget> {
        vec![
            Widget::new("a", WidgetType::Line, "A"),
            Widget::new("b", WidgetType::Kpi, "B"),
        ]
    }

    #[test]
    fn test_updaters_see_latest_value() {
        let mut store = WidgetStore::default();
        store.set_widgets(two_widgets());
        store.set_widgets(StateUpdate::with(|prev: &Vec<Widget>| {
            prev.iter().filter(|w| w.id != "a").cloned().collect()
        }));
        store.set_widgets(StateUpdate::with(|prev: &Vec<Widget>| {
            let mut next = prev.clone();
            next.push(Widget::new("c", WidgetType::Pie, "C"));
            next
        }));
        let ids: Vec<_> = store.widgets().iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[test]
    fn test_demo_init_runs_once() {
        let mut store = WidgetStore::default();
        assert!(store.initialize_demo_data());
        let first = store.snapshot();
        store.set_widgets(Vec::new());
        assert!(!store.initialize_demo_data());
        assert!(store.widgets().is_empty());
        assert!(is_consistent(&first.layouts, &first.widgets));
    }

    #[test]
    fn test_demo_init_inert_after_modification() {
        let mut store = WidgetStore::default();
        store.mark_as_modified();
        for _ in 0..3 {
            assert!(!store.initialize_demo_data());
        }
        assert!(store.widgets().is_empty());
        assert!(store.layouts().is_empty());
    }

    #[test]
    fn test_batch_defers_and_coalesces_notifications() {
        let mut store = WidgetStore::default();
        let seen: Rc<RefCell<Vec<(StoreChange, bool)>>> = Rc::default();
        let sink = seen.clone();
        store.subscribe(move |change, s| {
            sink.borrow_mut()
                .push((change, is_consistent(s.layouts(), s.widgets())));
        });

        store.batch(|s| {
            s.set_widgets(two_widgets());
            s.set_layouts(Layouts::from([(
                "lg".to_string(),
                vec![LayoutEntry::new("a", 0, 0, 8, 4), LayoutEntry::new("b", 8, 0, 4, 3)],
            )]));
            s.set_widgets(StateUpdate::with(|prev: &Vec<Widget>| {
                prev.iter().filter(|w| w.id != "a").cloned().collect()
            }));
            s.set_layouts(StateUpdate::with(|prev: &Layouts| remove_widget_from_layouts(prev, "a")));
        });

        let seen = seen.borrow();
        assert_eq!(
            seen.iter().map(|(c, _)| *c).collect::<Vec<_>>(),
            vec![StoreChange::Widgets, StoreChange::Layouts]
        );
        assert!(seen.iter().all(|(_, consistent)| *consistent));
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let mut store = WidgetStore::default();
        let count = Rc::new(RefCell::new(0));
        let c = count.clone();
        let id = store.subscribe(move |_, _| *c.borrow_mut() += 1);
        store.set_edit_mode(true);
        assert!(store.unsubscribe(id));
        store.set_edit_mode(false);
        assert_eq!(*count.borrow(), 1);
        assert!(!store.unsubscribe(id));
    }

    #[test]
    fn test_undo_redo_restore_snapshots() {
        let mut store = WidgetStore::default();
        store.set_widgets(two_widgets());
        store.push_undo_state(store.snapshot());
        store.set_widgets(Vec::new());

        assert!(store.undo());
        assert_eq!(store.widgets().len(), 2);
        assert!(store.can_redo());
        assert!(store.redo());
        assert!(store.widgets().is_empty());
        assert!(!store.redo());
    }
}
