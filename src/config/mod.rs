//! config/mod.rs
//! Configuración de la aplicación y plantilla de mensajes.

pub mod app_config;
pub mod message_config;
