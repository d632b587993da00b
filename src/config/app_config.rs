//! config/app_config.rs
//! Configuración global de la aplicación, leída de variables de entorno (.env)

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, str::FromStr, time::Duration};

use crate::config::message_config::MessageTemplate;

/// Política de espera del login de WhatsApp Web
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginPolicy {
    pub max_attempts: u32,
    /// Pausa entre intentos
    pub retry_interval: Duration,
    /// Cuánto espera cada intento al buscador de chats
    pub probe_timeout: Duration,
}

impl Default for LoginPolicy {
    fn default() -> Self {
        LoginPolicy {
            max_attempts: 24,
            retry_interval: Duration::from_secs(5),
            probe_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub data_file: PathBuf,
    pub sheet_name: String,
    pub chrome_profile_dir: PathBuf,
    /// Si es None se busca Chrome en el sistema
    pub chrome_path: Option<PathBuf>,
    pub auto_install_chrome: bool,
    pub whatsapp_url: String,
    pub login: LoginPolicy,
    pub page_load_timeout: Duration,
    pub chat_settle: Duration,
    /// Base SQLite del historial; None lo deshabilita
    pub delivery_log_db: Option<PathBuf>,
    pub template: MessageTemplate,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            data_file: PathBuf::from("data.xlsx"),
            sheet_name: "Sheet1".to_string(),
            chrome_profile_dir: PathBuf::from("chrome_user_data"),
            chrome_path: None,
            auto_install_chrome: true,
            whatsapp_url: "https://web.whatsapp.com/".to_string(),
            login: LoginPolicy::default(),
            page_load_timeout: Duration::from_secs(30),
            chat_settle: Duration::from_secs(3),
            delivery_log_db: Some(PathBuf::from("data").join("deliveries.db")),
            template: MessageTemplate::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Construye la configuración a partir de cualquier fuente clave -> valor.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AppConfig::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string());

        let template = match get("MESSAGE_TEMPLATE_FILE").filter(|v| !v.is_empty()) {
            Some(path) => {
                let text = std::fs::read_to_string(&path)
                    .with_context(|| format!("No se pudo leer la plantilla en {}", path))?;
                MessageTemplate::new(text)
            }
            None => defaults.template,
        };

        let delivery_log_db = match get("DELIVERY_LOG_DB") {
            Some(v) if v.is_empty() => None,
            Some(v) => Some(PathBuf::from(v)),
            None => defaults.delivery_log_db,
        };

        Ok(AppConfig {
            data_file: get("DATA_FILE")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.data_file),
            sheet_name: get("DATA_SHEET")
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.sheet_name),
            chrome_profile_dir: get("CHROME_PROFILE_DIR")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.chrome_profile_dir),
            chrome_path: get("CHROME_PATH")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            auto_install_chrome: parse_bool(
                "AUTO_INSTALL_CHROME",
                get("AUTO_INSTALL_CHROME"),
                defaults.auto_install_chrome,
            )?,
            whatsapp_url: get("WHATSAPP_WEB_URL")
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.whatsapp_url),
            login: LoginPolicy {
                max_attempts: parse_or(
                    "LOGIN_MAX_ATTEMPTS",
                    get("LOGIN_MAX_ATTEMPTS"),
                    defaults.login.max_attempts,
                )?,
                retry_interval: secs_or(
                    "LOGIN_RETRY_SECS",
                    get("LOGIN_RETRY_SECS"),
                    defaults.login.retry_interval,
                )?,
                probe_timeout: secs_or(
                    "LOGIN_PROBE_SECS",
                    get("LOGIN_PROBE_SECS"),
                    defaults.login.probe_timeout,
                )?,
            },
            page_load_timeout: secs_or(
                "PAGE_LOAD_TIMEOUT_SECS",
                get("PAGE_LOAD_TIMEOUT_SECS"),
                defaults.page_load_timeout,
            )?,
            chat_settle: secs_or(
                "CHAT_SETTLE_SECS",
                get("CHAT_SETTLE_SECS"),
                defaults.chat_settle,
            )?,
            delivery_log_db,
            template,
        })
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(v) if v.is_empty() => Ok(default),
        Some(v) => v
            .parse::<T>()
            .map_err(|e| anyhow!("Valor inválido para {}='{}': {}", key, v, e)),
    }
}

fn secs_or(key: &str, raw: Option<String>, default: Duration) -> Result<Duration> {
    parse_or(key, raw, default.as_secs()).map(Duration::from_secs)
}

fn parse_bool(key: &str, raw: Option<String>, default: bool) -> Result<bool> {
    match raw.as_deref().map(str::to_lowercase).as_deref() {
        None | Some("") => Ok(default),
        Some("1" | "true" | "yes" | "si" | "sí") => Ok(true),
        Some("0" | "false" | "no") => Ok(false),
        Some(other) => Err(anyhow!("Valor inválido para {}='{}'", key, other)),
    }
}
