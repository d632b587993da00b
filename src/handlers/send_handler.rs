//! handlers/send_handler.rs
//! Opción 3: envía los recordatorios que vencen hoy.

use anyhow::Result;
use chrono::NaiveDate;
use colored::Colorize;
use std::io::Write;

use crate::{
    models::delivery_model::SendAttempt,
    services::{reminder_service::ReminderService, whatsapp_service::Messenger},
};

pub async fn send_messages<M: Messenger, W: Write>(
    service: &mut ReminderService<M>,
    today: NaiveDate,
    out: &mut W,
) -> Result<()> {
    // Sólo avisa; cada envío vuelve a esperar el login
    if !service.session_ready().await {
        writeln!(
            out,
            "{}",
            "WhatsApp session not logged in. Please log in to WhatsApp Web.".red()
        )?;
    }

    if !service.has_pending() {
        writeln!(out, "{}", "No pending messages to send.".green())?;
        return Ok(());
    }

    let summary = service.send_due(today).await?;
    for (recipient, attempt) in &summary.attempts {
        let line = match attempt {
            SendAttempt::Sent => format!("Message sent to {}", recipient).green(),
            SendAttempt::Failed(e) => format!("Error sending message to {}: {}", recipient, e).red(),
            SendAttempt::Skipped(status) => format!(
                "Message for {} already processed with status: {}",
                recipient, status
            )
            .yellow(),
            SendAttempt::Aborted => format!(
                "WhatsApp session not logged in. Message to {} not sent, please log in and retry.",
                recipient
            )
            .red(),
        };
        writeln!(out, "{}", line)?;
    }
    let line = format!(
        "Sent: {}, failed: {}, skipped: {}, aborted: {}",
        summary.sent, summary.failed, summary.skipped, summary.aborted
    );
    if summary.failed > 0 || summary.aborted > 0 {
        writeln!(out, "{}", line.yellow())?;
    } else {
        writeln!(out, "{}", line.green())?;
    }
    Ok(())
}
