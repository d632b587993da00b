//! services/status_engine.rs
//! Reglas de vencimiento y de elegibilidad por estado.

use chrono::{Duration, NaiveDate};

use crate::models::{
    delivery_model::DeliveryOutcome,
    recipient_model::{RecipientRecord, SendStatus},
};

/// Días antes del vencimiento en que se envía el recordatorio
pub const REMINDER_LEAD_DAYS: i64 = 2;

/// Estados que el flujo de envío no vuelve a procesar
const SEND_EXCLUDED: [&str; 2] = ["send", "error"];
/// Estados que verificación/preview consideran ya resueltos
const REVIEW_EXCLUDED: [&str; 2] = ["correct", "error"];

/// `expire_date - 2 días == today`, sin ventana de tolerancia.
pub fn is_due(today: NaiveDate, expire_date: NaiveDate) -> bool {
    expire_date - Duration::days(REMINDER_LEAD_DAYS) == today
}

pub fn is_eligible_for_send(status: &SendStatus) -> bool {
    !SEND_EXCLUDED.contains(&status.lowercase().as_str())
}

/// Compuerta de las vistas de verificación y preview (y del filtro de pendientes).
pub fn is_eligible_for_review(status: &SendStatus) -> bool {
    !REVIEW_EXCLUDED.contains(&status.lowercase().as_str())
}

pub fn is_pending_today(record: &RecipientRecord, today: NaiveDate) -> bool {
    is_eligible_for_review(&record.status) && is_due(today, record.expire_date)
}

/// Aplica el efecto de un intento de entrega sobre el registro.
pub fn apply_outcome(record: &mut RecipientRecord, outcome: &DeliveryOutcome, today: NaiveDate) {
    record.status = match outcome {
        DeliveryOutcome::Delivered => SendStatus::Correct,
        DeliveryOutcome::NotFound(_) | DeliveryOutcome::Failed(_) => SendStatus::Error,
    };
    record.timestep = Some(today);
}
