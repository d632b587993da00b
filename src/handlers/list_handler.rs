//! handlers/list_handler.rs
//! Opción 1: muestra todas las hojas del libro.

use anyhow::Result;
use colored::Colorize;
use std::io::Write;

use crate::{handlers::table::render_table, services::spreadsheet_service::XlsxStore};

pub fn show_all_sheets<W: Write>(store: &XlsxStore, out: &mut W) -> Result<()> {
    for sheet in store.dump_sheets()? {
        writeln!(out, "{}", format!("Sheet: {}", sheet.name).blue())?;
        write!(out, "{}", render_table(&sheet.rows))?;
        writeln!(out, "{}", "=".repeat(80))?;
    }
    Ok(())
}
