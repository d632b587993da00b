//! handlers/verify_handler.rs
//! Opción 2: recarga la planilla y muestra lo pendiente para hoy.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use colored::Colorize;
use std::io::Write;

use crate::{
    handlers::table::render_records,
    services::{reminder_service::ReminderService, whatsapp_service::Messenger},
};

pub fn verify_pending<M: Messenger, W: Write>(
    service: &mut ReminderService<M>,
    today: NaiveDate,
    out: &mut W,
) -> Result<()> {
    if !service.has_pending() {
        writeln!(out, "{}", "No pending messages to verify.".green())?;
        return Ok(());
    }

    writeln!(
        out,
        "{}",
        "Reloading the Excel file to check for changes...".cyan()
    )?;
    service
        .reload()
        .context("Failed to reload the Excel file")?;

    let pending = service.pending_today(today);
    if pending.is_empty() {
        writeln!(
            out,
            "{}",
            "No messages need to be sent today or all messages already sent.".green()
        )?;
    } else {
        writeln!(out, "{}", "Pending messages to be sent:".yellow())?;
        write!(out, "{}", render_records(pending))?;
    }
    Ok(())
}
