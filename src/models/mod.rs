//! models/mod.rs
//! Módulo raíz para modelos/estructuras compartidas.

pub mod delivery_model;
pub mod recipient_model;
