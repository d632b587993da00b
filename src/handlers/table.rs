//! handlers/table.rs
//! Tabla de texto alineada para mostrar filas en consola.

use crate::models::recipient_model::RecipientRecord;

pub const RECORD_HEADERS: [&str; 9] = [
    "surname",
    "name",
    "whatsapp_number",
    "expire_date",
    "vehicle_license",
    "model_vehicle",
    "status",
    "timestep",
    "chat_type",
];

pub fn record_row(record: &RecipientRecord) -> Vec<String> {
    vec![
        record.surname.clone(),
        record.name.clone(),
        record.whatsapp_number.clone(),
        record.expire_date.format("%d/%m/%Y").to_string(),
        record.vehicle_license.clone(),
        record.model_vehicle.clone(),
        record.status.to_string(),
        record
            .timestep
            .map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_default(),
        record.chat_type.as_str().to_string(),
    ]
}

/// Alinea las columnas al ancho de su celda más larga.
pub fn render_table(rows: &[Vec<String>]) -> String {
    let cols = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![0usize; cols];
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut out = String::new();
    for row in rows {
        let line: Vec<String> = (0..cols)
            .map(|i| {
                let cell = row.get(i).map(String::as_str).unwrap_or("");
                let pad = widths[i] - cell.chars().count();
                format!("{}{}", cell, " ".repeat(pad))
            })
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    }
    out
}

pub fn render_records<'a>(records: impl IntoIterator<Item = &'a RecipientRecord>) -> String {
    let mut rows = vec![RECORD_HEADERS.iter().map(|h| h.to_string()).collect()];
    rows.extend(records.into_iter().map(record_row));
    render_table(&rows)
}
