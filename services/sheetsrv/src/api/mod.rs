//! HTTP handlers

pub mod health_handlers;
pub mod settings_handlers;
pub mod sync_handlers;
