//! handlers/preview_handler.rs
//! Opción 4: muestra el mensaje que recibiría cada destinatario de hoy.

use anyhow::Result;
use chrono::NaiveDate;
use colored::Colorize;
use std::io::Write;

use crate::services::{reminder_service::ReminderService, whatsapp_service::Messenger};

pub fn preview_messages<M: Messenger, W: Write>(
    service: &ReminderService<M>,
    today: NaiveDate,
    out: &mut W,
) -> Result<()> {
    if !service.has_pending() {
        writeln!(out, "{}", "No pending messages to preview.".green())?;
        return Ok(());
    }

    for preview in service.preview(today) {
        match preview.message {
            Ok(text) => writeln!(
                out,
                "{}\n{}\n",
                format!("Preview message for {}:", preview.whatsapp_number).blue(),
                text
            )?,
            Err(e) => writeln!(
                out,
                "{}",
                format!(
                    "Error: Missing key in Excel data for {}: {}",
                    preview.whatsapp_number, e
                )
                .red()
            )?,
        }
    }
    Ok(())
}
