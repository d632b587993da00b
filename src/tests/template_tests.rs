//! tests/template_tests.rs

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use crate::config::message_config::MessageTemplate;
    use crate::services::template_service::{clean_to_bmp, render_message};
    use crate::tests::{record, today};

    #[test]
    fn default_template_fills_fields() {
        let rec = record("111", today() + Duration::days(2), "");
        let msg = render_message(&MessageTemplate::default(), &rec).unwrap();

        assert!(msg.starts_with("_¡Hola LUCÍA!_"));
        assert!(msg.contains("vehículo CRONOS con patente AB123CD vence el 18/10/2026"));
        assert!(msg.contains("*cancelar*"));
        assert!(!msg.contains('{'));
    }

    #[test]
    fn render_is_idempotent() {
        let rec = record("111", today(), "");
        let template = MessageTemplate::default();
        let first = render_message(&template, &rec).unwrap();
        let second = render_message(&template, &rec).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn bmp_filter_strips_only_astral_chars() {
        assert_eq!(clean_to_bmp("hola 🚗 ñandú €"), "hola  ñandú €");
        assert_eq!(clean_to_bmp("\u{FFFF}\u{10000}"), "\u{FFFF}");
        let plain = "Línea 1\nLínea 2 — ok";
        assert_eq!(clean_to_bmp(plain), plain);
    }

    #[test]
    fn rendered_text_is_bmp_clean() {
        let mut rec = record("111", today(), "");
        rec.name = "Ana 😀".to_string();
        let template = MessageTemplate::new("Hola {name} 👋");
        assert_eq!(render_message(&template, &rec).unwrap(), "Hola ANA  ");
    }

    #[test]
    fn custom_template_with_escaped_braces() {
        let rec = record("351", today(), "");
        let template = MessageTemplate::new("{{{surname}}} {whatsapp_number} {expire_date}");
        assert_eq!(
            render_message(&template, &rec).unwrap(),
            "{PÉREZ} 351 16/10/2026"
        );
    }

    #[test]
    fn unknown_placeholder_is_a_lookup_fault() {
        let rec = record("111", today(), "");
        let err = render_message(&MessageTemplate::new("Hola {apodo}"), &rec).unwrap_err();
        assert!(err.to_string().contains("apodo"));

        assert!(render_message(&MessageTemplate::new("Hola {name"), &rec).is_err());
    }
}
