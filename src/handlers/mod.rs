//! handlers/mod.rs
//! Módulo que agrupa los handlers de cada opción del menú.
pub mod list_handler;
pub mod preview_handler;
pub mod send_handler;
pub mod table;
pub mod verify_handler;
