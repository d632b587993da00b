#[cfg(test)]
use chrono::{DateTime, Utc};
#[cfg(test)]
use serde::{Deserialize, Serialize};

/// Resultado de entregar un mensaje por WhatsApp Web.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    /// Algún localizador de la UI no apareció a tiempo
    NotFound(String),
    Failed(String),
}

impl DeliveryOutcome {
    pub fn error_message(&self) -> Option<&str> {
        match self {
            DeliveryOutcome::Delivered => None,
            DeliveryOutcome::NotFound(msg) | DeliveryOutcome::Failed(msg) => Some(msg),
        }
    }
}

/// Resultado de procesar un destinatario en el flujo de envío.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendAttempt {
    Sent,
    Failed(String),
    /// El registro ya tenía un estado terminal para el envío
    Skipped(String),
    /// La sesión no estuvo lista; no se tocó el registro
    Aborted,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendSummary {
    pub sent: usize,
    pub failed: usize,
    pub skipped: usize,
    pub aborted: usize,
    /// (destinatario, resultado) en el orden en que se procesaron
    pub attempts: Vec<(String, SendAttempt)>,
}

impl SendSummary {
    pub fn record(&mut self, recipient: &str, attempt: SendAttempt) {
        match attempt {
            SendAttempt::Sent => self.sent += 1,
            SendAttempt::Failed(_) => self.failed += 1,
            SendAttempt::Skipped(_) => self.skipped += 1,
            SendAttempt::Aborted => self.aborted += 1,
        }
        self.attempts.push((recipient.to_string(), attempt));
    }
}

/// Fila de la tabla `deliveries` (historial de intentos). Sólo se lee en pruebas.
#[cfg(test)]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryRecord {
    pub id: String,
    pub whatsapp_number: String,
    pub status: String, // "delivered", "not_found", "failed", "aborted"
    pub error_message: Option<String>,
    pub metadata: Option<String>, // JSON adicional
    pub created_at: DateTime<Utc>,
}
