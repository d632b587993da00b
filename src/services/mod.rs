//! services/mod.rs
//! Módulo que agrupa distintos "servicios" o "capas de negocio" de la app.

pub mod browser_setup_service;
pub mod delivery_log_service;
pub mod reminder_service;
pub mod spreadsheet_service;
pub mod status_engine;
pub mod template_service;
pub mod whatsapp_service;
