//! models/recipient_model.rs
//! Registro de destinatario tal como vive en la planilla.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Estado de envío de un registro. Se compara sin distinguir mayúsculas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SendStatus {
    Unset,
    Send,
    Error,
    Correct,
    /// Cualquier otro texto de la celda (p.e. "nan"), se conserva tal cual
    Other(String),
}

impl SendStatus {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.to_lowercase().as_str() {
            "" => SendStatus::Unset,
            "send" => SendStatus::Send,
            "error" => SendStatus::Error,
            "correct" => SendStatus::Correct,
            _ => SendStatus::Other(trimmed.to_string()),
        }
    }

    /// Texto que se escribe de vuelta en la celda `status`
    pub fn as_cell(&self) -> &str {
        match self {
            SendStatus::Unset => "",
            SendStatus::Send => "Send",
            SendStatus::Error => "Error",
            SendStatus::Correct => "Correct",
            SendStatus::Other(s) => s.as_str(),
        }
    }

    pub fn lowercase(&self) -> String {
        self.as_cell().to_lowercase()
    }
}

impl fmt::Display for SendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_cell())
    }
}

/// Cómo se abre el chat en WhatsApp Web
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatKind {
    /// Se escribe el número en el buscador y se presiona Enter
    #[default]
    Contact,
    /// Se hace click en el chat cuyo título coincide
    Group,
}

impl ChatKind {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "group" | "grupo" => ChatKind::Group,
            _ => ChatKind::Contact,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChatKind::Contact => "contact",
            ChatKind::Group => "group",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientRecord {
    pub surname: String,
    pub name: String,
    /// Número de teléfono o título del grupo. Es la clave de búsqueda.
    pub whatsapp_number: String,
    pub expire_date: NaiveDate,
    pub vehicle_license: String,
    pub model_vehicle: String,
    pub status: SendStatus,
    /// Fecha de la última escritura de `status`
    pub timestep: Option<NaiveDate>,
    pub chat_type: ChatKind,
    /// Columnas desconocidas, alineadas con `RecipientSheet::extra_columns`
    pub extra: Vec<String>,
}

impl RecipientRecord {
    /// Fila de prueba que se genera cuando no existe la planilla
    pub fn template_row(today: NaiveDate) -> Self {
        Self {
            surname: "Rosas".to_string(),
            name: "Nahuel".to_string(),
            whatsapp_number: "3510000000".to_string(),
            expire_date: today + chrono::Duration::days(2),
            vehicle_license: "AE325CB".to_string(),
            model_vehicle: "cronos".to_string(),
            status: SendStatus::Unset,
            timestep: Some(today),
            chat_type: ChatKind::Contact,
            extra: Vec::new(),
        }
    }
}

/// Fila que no se pudo interpretar (número vacío o vencimiento ilegible).
/// No participa de ningún flujo; se reescribe tal cual al guardar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnparsedRow {
    /// Cantidad de registros válidos que la preceden en la hoja
    pub position: usize,
    /// Texto de cada celda: columnas conocidas y luego las extra
    pub cells: Vec<String>,
    pub reason: String,
}

/// Contenido completo de la hoja: registros más columnas extra preservadas.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipientSheet {
    pub extra_columns: Vec<String>,
    pub records: Vec<RecipientRecord>,
    pub unparsed: Vec<UnparsedRow>,
}

impl RecipientSheet {
    pub fn find(&self, whatsapp_number: &str) -> Option<&RecipientRecord> {
        self.records
            .iter()
            .find(|r| r.whatsapp_number == whatsapp_number)
    }

    pub fn find_mut(&mut self, whatsapp_number: &str) -> Option<&mut RecipientRecord> {
        self.records
            .iter_mut()
            .find(|r| r.whatsapp_number == whatsapp_number)
    }
}
