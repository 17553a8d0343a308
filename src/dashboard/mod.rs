//! Dashboard widget/layout state engine.
//!
//! Leaves first: [`layout`] (pure layout reconciliation), [`history`]
//! (bounded undo/redo), [`store`] (state container), [`controller`]
//! (user intents), with [`modal`] holding the ephemeral create/edit form
//! state.

pub mod controller;
pub mod document;
pub mod error;
pub mod history;
pub mod layout;
pub mod modal;
pub mod model;
pub mod monitor;
pub mod seed;
pub mod store;

pub use controller::{DashboardController, EditModeChange, Outcome};
pub use document::DashboardDocument;
pub use error::{DashboardError, MonitorError};
pub use history::{HistoryConfig, UndoRedoManager};
pub use layout::{BreakpointSpec, GridSpec};
pub use modal::{ModalController, ModalMode, ModalState};
pub use model::{LayoutEntry, Layouts, Snapshot, Widget, WidgetId, WidgetPatch, WidgetType};
pub use monitor::{MonitorSet, TracingMonitor, WidgetEvent, WidgetMonitor, WidgetOperation};
pub use store::{StateUpdate, StoreChange, WidgetStore};
