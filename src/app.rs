//! app.rs
//! Menú interactivo: lee la opción y la despacha al handler correspondiente.

use anyhow::Result;
use chrono::{Local, NaiveDate};
use colored::Colorize;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::{
    handlers::{list_handler, preview_handler, send_handler, verify_handler},
    services::{reminder_service::ReminderService, whatsapp_service::Messenger},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    ListAll,
    Verify,
    Send,
    Preview,
    Exit,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(MenuChoice::ListAll),
            "2" => Some(MenuChoice::Verify),
            "3" => Some(MenuChoice::Send),
            "4" => Some(MenuChoice::Preview),
            "5" => Some(MenuChoice::Exit),
            _ => None,
        }
    }
}

fn print_menu<W: Write>(out: &mut W) -> Result<()> {
    writeln!(out, "\n{}", "Menu:".cyan())?;
    writeln!(out, "{}", "1. View the table of users to send messages".cyan())?;
    writeln!(out, "{}", "2. Verify messages".cyan())?;
    writeln!(out, "{}", "3. Send messages".cyan())?;
    writeln!(out, "{}", "4. Preview messages".cyan())?;
    writeln!(out, "{}", "5. Exit".cyan())?;
    write!(out, "Enter your choice (1-5): ")?;
    out.flush()?;
    Ok(())
}

/// Corre el menú hasta "5" o fin de entrada. La fecha de hoy se pide en cada opción.
pub async fn run_menu<M, R, W, C>(
    service: &mut ReminderService<M>,
    input: &mut R,
    out: &mut W,
    today: C,
) -> Result<()>
where
    M: Messenger,
    R: AsyncBufRead + Unpin,
    W: Write,
    C: Fn() -> NaiveDate,
{
    let mut line = String::new();
    loop {
        print_menu(out)?;
        line.clear();
        if input.read_line(&mut line).await? == 0 {
            writeln!(out)?;
            break;
        }

        let result = match MenuChoice::parse(&line) {
            Some(MenuChoice::ListAll) => list_handler::show_all_sheets(service.store(), out),
            Some(MenuChoice::Verify) => verify_handler::verify_pending(service, today(), out),
            Some(MenuChoice::Send) => send_handler::send_messages(service, today(), out).await,
            Some(MenuChoice::Preview) => preview_handler::preview_messages(service, today(), out),
            Some(MenuChoice::Exit) => break,
            None => {
                writeln!(out, "{}", "Invalid choice. Please try again.".red())?;
                Ok(())
            }
        };

        // Los errores de cada opción no cortan el menú
        if let Err(e) = result {
            log::error!("(run_menu) Error en la opción '{}': {:?}", line.trim(), e);
            writeln!(out, "{}", format!("Error: {:#}", e).red())?;
        }
    }
    Ok(())
}

pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}
