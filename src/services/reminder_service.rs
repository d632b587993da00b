//! services/reminder_service.rs
//! Flujo de verificación, preview y envío de recordatorios.

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use std::collections::HashSet;

use crate::{
    config::{app_config::LoginPolicy, message_config::MessageTemplate},
    models::{
        delivery_model::{DeliveryOutcome, SendAttempt, SendSummary},
        recipient_model::{RecipientRecord, RecipientSheet},
    },
    services::{
        delivery_log_service::DeliveryLogService,
        spreadsheet_service::XlsxStore,
        status_engine::{
            apply_outcome, is_eligible_for_review, is_eligible_for_send, is_pending_today,
        },
        template_service::render_message,
        whatsapp_service::{wait_for_login, Messenger},
    },
};

/// Mensaje listo para mostrar en la vista previa
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub whatsapp_number: String,
    pub message: Result<String, String>,
}

pub struct ReminderService<M: Messenger> {
    store: XlsxStore,
    messenger: M,
    template: MessageTemplate,
    login: LoginPolicy,
    delivery_log: Option<DeliveryLogService>,
    sheet: RecipientSheet,
}

impl<M: Messenger> ReminderService<M> {
    pub fn new(
        store: XlsxStore,
        sheet: RecipientSheet,
        messenger: M,
        template: MessageTemplate,
        login: LoginPolicy,
    ) -> Self {
        Self {
            store,
            messenger,
            template,
            login,
            delivery_log: None,
            sheet,
        }
    }

    pub fn with_delivery_log(mut self, delivery_log: DeliveryLogService) -> Self {
        self.delivery_log = Some(delivery_log);
        self
    }

    pub fn store(&self) -> &XlsxStore {
        &self.store
    }

    pub fn sheet(&self) -> &RecipientSheet {
        &self.sheet
    }

    #[cfg(test)]
    pub fn messenger(&self) -> &M {
        &self.messenger
    }

    pub fn into_messenger(self) -> M {
        self.messenger
    }

    /// Vuelve a leer la planilla (cambios hechos a mano mientras corre).
    pub fn reload(&mut self) -> Result<()> {
        self.sheet = self.store.load()?;
        Ok(())
    }

    /// Hay registros sin estado terminal, sin importar la fecha.
    pub fn has_pending(&self) -> bool {
        self.sheet
            .records
            .iter()
            .any(|r| is_eligible_for_review(&r.status))
    }

    /// Pendientes de hoy. Con identificadores repetidos sólo cuenta la primera fila.
    pub fn pending_today(&self, today: NaiveDate) -> Vec<&RecipientRecord> {
        let mut seen = HashSet::new();
        self.sheet
            .records
            .iter()
            .filter(|r| seen.insert(r.whatsapp_number.clone()))
            .filter(|r| is_pending_today(r, today))
            .collect()
    }

    pub fn preview(&self, today: NaiveDate) -> Vec<Preview> {
        self.pending_today(today)
            .into_iter()
            .map(|r| Preview {
                whatsapp_number: r.whatsapp_number.clone(),
                message: render_message(&self.template, r).map_err(|e| e.to_string()),
            })
            .collect()
    }

    /// Sondea la sesión una sola vez (aviso previo del menú).
    pub async fn session_ready(&self) -> bool {
        self.messenger.probe_session().await
    }

    /// Envía a todos los pendientes cuyo recordatorio vence hoy.
    pub async fn send_due(&mut self, today: NaiveDate) -> Result<SendSummary> {
        let targets: Vec<String> = self
            .pending_today(today)
            .into_iter()
            .map(|r| r.whatsapp_number.clone())
            .collect();

        let mut summary = SendSummary::default();
        for recipient in targets {
            let attempt = self.send_one(&recipient, today).await?;
            log::info!("(send_due) {} -> {:?}", recipient, attempt);
            summary.record(&recipient, attempt);
        }
        Ok(summary)
    }

    /// Procesa un destinatario: login, compuerta de estado, render, entrega y guardado.
    pub async fn send_one(&mut self, recipient: &str, today: NaiveDate) -> Result<SendAttempt> {
        if !wait_for_login(&self.messenger, &self.login).await {
            log::error!(
                "(send_one) Sesión de WhatsApp no iniciada; se omite {}",
                recipient
            );
            self.log_attempt(recipient, "aborted", Some("login timeout"))
                .await;
            return Ok(SendAttempt::Aborted);
        }

        let record = self
            .sheet
            .find(recipient)
            .ok_or_else(|| anyhow!("No existe el destinatario {}", recipient))?
            .clone();

        if !is_eligible_for_send(&record.status) {
            log::warn!(
                "(send_one) Mensaje para {} ya procesado con estado: {}",
                recipient,
                record.status
            );
            return Ok(SendAttempt::Skipped(record.status.to_string()));
        }

        let outcome = match render_message(&self.template, &record) {
            Ok(text) => {
                self.messenger
                    .deliver(&record.whatsapp_number, record.chat_type, &text)
                    .await
            }
            Err(e) => DeliveryOutcome::Failed(format!("{:#}", e)),
        };

        let status = match &outcome {
            DeliveryOutcome::Delivered => "delivered",
            DeliveryOutcome::NotFound(_) => "not_found",
            DeliveryOutcome::Failed(_) => "failed",
        };
        let Some(rec) = self.sheet.find_mut(recipient) else {
            return Err(anyhow!("No existe el destinatario {}", recipient));
        };
        apply_outcome(rec, &outcome, today);
        let written = rec.status.to_string();

        // El estado queda en memoria y se persiste en el próximo guardado
        if let Err(e) = self.store.save(&self.sheet) {
            log::error!(
                "(send_one) No se pudo guardar la planilla tras procesar {}: {:?}",
                recipient,
                e
            );
            self.log_attempt(recipient, status, Some("save failed")).await;
            return Ok(SendAttempt::Failed(format!(
                "Estado '{}' sin guardar en la planilla: {:#}",
                written, e
            )));
        }

        self.log_attempt(recipient, status, outcome.error_message())
            .await;

        Ok(match outcome {
            DeliveryOutcome::Delivered => SendAttempt::Sent,
            DeliveryOutcome::NotFound(msg) | DeliveryOutcome::Failed(msg) => {
                log::error!("(send_one) Error enviando a {}: {}", recipient, msg);
                SendAttempt::Failed(msg)
            }
        })
    }

    /// Un error del historial no afecta al registro de la planilla.
    async fn log_attempt(&self, recipient: &str, status: &str, error: Option<&str>) {
        let (Some(history), Some(record)) = (&self.delivery_log, self.sheet.find(recipient)) else {
            return;
        };
        if let Err(e) = history.record_attempt(record, status, error).await {
            log::error!(
                "(log_attempt) No se pudo guardar el historial de {}: {:?}",
                recipient,
                e
            );
        }
    }
}
