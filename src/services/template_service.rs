//! services/template_service.rs
//! Renderiza el recordatorio de un registro a partir de la plantilla.

use anyhow::{anyhow, Result};

use crate::{config::message_config::MessageTemplate, models::recipient_model::RecipientRecord};

pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Rellena la plantilla y limpia el texto a BMP.
pub fn render_message(template: &MessageTemplate, record: &RecipientRecord) -> Result<String> {
    let text = template.text();
    let mut out = String::with_capacity(text.len() + 64);
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut key = String::new();
                let mut closed = false;
                for k in chars.by_ref() {
                    if k == '}' {
                        closed = true;
                        break;
                    }
                    key.push(k);
                }
                if !closed {
                    return Err(anyhow!("Llave sin cerrar en la plantilla: '{{{}'", key));
                }
                out.push_str(&field_value(record, key.trim())?);
            }
            other => out.push(other),
        }
    }

    Ok(clean_to_bmp(&out))
}

fn field_value(record: &RecipientRecord, key: &str) -> Result<String> {
    let value = match key {
        "name" => record.name.to_uppercase(),
        "surname" => record.surname.to_uppercase(),
        "vehicle_license" => record.vehicle_license.to_uppercase(),
        "model_vehicle" => record.model_vehicle.to_uppercase(),
        "expire_date" => record.expire_date.format(DATE_FORMAT).to_string(),
        "whatsapp_number" => record.whatsapp_number.clone(),
        other => return Err(anyhow!("Falta el campo '{}' para la plantilla", other)),
    };
    Ok(value)
}

/// Quita todo carácter fuera del plano multilingüe básico (U+0000..U+FFFF).
pub fn clean_to_bmp(text: &str) -> String {
    text.chars().filter(|c| (*c as u32) <= 0xFFFF).collect()
}
