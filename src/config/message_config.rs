//! config/message_config.rs
//! Plantilla del recordatorio. Se pasa explícitamente al renderizador.

use serde::{Deserialize, Serialize};

pub const DEFAULT_TEMPLATE: &str = "_¡Hola {name}!_\n\n\
_*Recordatorio Importante*_\n\n\
_Queremos recordarte que tu seguro para el vehículo {model_vehicle} con patente {vehicle_license} vence el {expire_date}._\n\n\
_Desde ya, muchas gracias por confiar en nosotros._\n\n\
_No olvides que puedes pagar de manera sencilla y segura *por este medio.*_\n\n\
_Si ya realizaste el pago, *ignora este mensaje*._\n\
_Para dejar de recibir estos recordatorios, simplemente envíanos un mensaje con la palabra *cancelar*._";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageTemplate {
    text: String,
}

impl MessageTemplate {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Default for MessageTemplate {
    fn default() -> Self {
        MessageTemplate::new(DEFAULT_TEMPLATE)
    }
}
