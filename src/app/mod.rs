//! Driver application logic: state, event handling, and action dispatch.

pub mod action;
pub mod commands;
pub mod event;
pub mod handler;
pub mod render;
pub mod state;
