use thiserror::Error;

/// Failures surfaced by the dashboard engine.
///
/// Missing widgets are not errors at the controller surface (actions on an
/// unknown id are no-ops); this type is what gets reported to monitoring and
/// what document I/O returns.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("widget '{0}' not found")]
    WidgetNotFound(String),

    #[error("no widget modal is open")]
    NoModalOpen,

    #[error("failed to read dashboard document {path}: {source}")]
    DocumentRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write dashboard document {path}: {source}")]
    DocumentWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid dashboard document: {0}")]
    DocumentFormat(#[from] serde_json::Error),
}

/// A monitoring collaborator could not accept an event.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("monitor unavailable: {0}")]
    Unavailable(String),

    #[error("audit log write failed: {0}")]
    Io(#[from] std::io::Error),
}
