//! dashgrid: widget and layout state engine for customizable analytics
//! dashboards, plus the configuration and logging used by the `dashgrid`
//! driver binary.

pub mod app;
pub mod config;
pub mod dashboard;
pub mod logging;
