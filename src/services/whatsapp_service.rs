//! services/whatsapp_service.rs
//! Envío por WhatsApp Web manejando Chrome vía DevTools (chromiumoxide).

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chromiumoxide::{
    browser::{Browser, BrowserConfig},
    cdp::browser_protocol::input::{DispatchKeyEventParams, DispatchKeyEventType},
    element::Element,
    error::CdpError,
    page::Page,
};
use futures_util::StreamExt;
use std::{
    path::{Path, PathBuf},
    time::Duration,
};
use tokio::{task::JoinHandle, time::Instant};

use crate::{
    config::app_config::{AppConfig, LoginPolicy},
    models::{delivery_model::DeliveryOutcome, recipient_model::ChatKind},
};

/// Buscador de chats; su presencia indica sesión iniciada
pub const SEARCH_BOX_XPATH: &str = r#"//div[@contenteditable="true"][@data-tab="3"]"#;
/// Caja de texto del chat abierto
pub const MESSAGE_BOX_XPATH: &str = r#"//footer//div[@contenteditable="true"]"#;

const POLL_STEP: Duration = Duration::from_millis(250);
/// Modificador Shift en Input.dispatchKeyEvent
const SHIFT_MODIFIER: i64 = 8;

/// Actor de mensajería. El núcleo sólo depende del resultado de `deliver`.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Un único chequeo de sesión (espera acotada al marcador de la UI).
    async fn probe_session(&self) -> bool;

    async fn deliver(&self, recipient: &str, chat: ChatKind, text: &str) -> DeliveryOutcome;
}

/// Sondea la sesión hasta `max_attempts` veces.
pub async fn wait_for_login<M: Messenger + ?Sized>(messenger: &M, policy: &LoginPolicy) -> bool {
    for attempt in 1..=policy.max_attempts {
        if messenger.probe_session().await {
            return true;
        }
        log::warn!(
            "(wait_for_login) Intento {}: la sesión de WhatsApp todavía no inició. Reintentando...",
            attempt
        );
        if attempt < policy.max_attempts {
            tokio::time::sleep(policy.retry_interval).await;
        }
    }
    log::error!("(wait_for_login) Máximo de intentos alcanzado. Sesión no iniciada.");
    false
}

/// Tiempos que usa el driver al interactuar con la página
#[derive(Debug, Clone)]
pub struct DriverTimings {
    pub probe_timeout: Duration,
    pub page_load_timeout: Duration,
    pub chat_settle: Duration,
}

impl From<&AppConfig> for DriverTimings {
    fn from(config: &AppConfig) -> Self {
        Self {
            probe_timeout: config.login.probe_timeout,
            page_load_timeout: config.page_load_timeout,
            chat_settle: config.chat_settle,
        }
    }
}

pub struct WhatsAppWebDriver {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
    url: String,
    timings: DriverTimings,
}

impl WhatsAppWebDriver {
    /// Lanza Chrome con perfil persistente y abre WhatsApp Web.
    pub async fn launch(config: &AppConfig, chrome_path: &Path) -> Result<Self> {
        let profile_dir = absolute(&config.chrome_profile_dir)?;
        std::fs::create_dir_all(&profile_dir)
            .with_context(|| format!("No se pudo crear el perfil en {:?}", profile_dir))?;

        let browser_config = BrowserConfig::builder()
            .with_head()
            .chrome_executable(chrome_path)
            .user_data_dir(&profile_dir)
            .args(vec![
                "--disable-dev-shm-usage",
                "--disable-blink-features=AutomationControlled",
                "--disable-extensions",
                "--disable-plugins",
                "--start-maximized",
                "--no-sandbox",
                "--disable-infobars",
                "--disable-notifications",
                "--disable-popup-blocking",
            ])
            .build()
            .map_err(|e| anyhow!("Configuración de Chrome inválida: {}", e))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .context("No se pudo lanzar Chrome")?;

        // Los eventos de DevTools se consumen en un task aparte
        let handler_task = tokio::spawn(async move {
            while let Some(evt) = handler.next().await {
                if let Err(e) = evt {
                    log::debug!("(handler) Evento de DevTools con error: {:?}", e);
                }
            }
        });

        let page = browser
            .new_page(config.whatsapp_url.as_str())
            .await
            .context("No se pudo abrir WhatsApp Web")?;

        log::info!(
            "(launch) Chrome iniciado con perfil {:?}, abriendo {}",
            profile_dir,
            config.whatsapp_url
        );

        Ok(Self {
            browser,
            page,
            handler_task,
            url: config.whatsapp_url.clone(),
            timings: DriverTimings::from(config),
        })
    }

    /// Cierra el navegador y espera al task de eventos.
    pub async fn shutdown(mut self) -> Result<()> {
        if let Err(e) = self.browser.close().await {
            log::warn!("(shutdown) Error cerrando Chrome: {:?}", e);
        }
        let _ = self.browser.wait().await;
        self.handler_task.abort();
        log::info!("(shutdown) Navegador cerrado");
        Ok(())
    }

    async fn wait_for_xpath(&self, xpath: &str, timeout: Duration) -> Result<Element, CdpError> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.page.find_xpath(xpath).await {
                Ok(el) => return Ok(el),
                Err(CdpError::NotFound) if Instant::now() < deadline => {
                    tokio::time::sleep(POLL_STEP).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn shift_enter(&self) -> Result<(), CdpError> {
        for kind in [DispatchKeyEventType::KeyDown, DispatchKeyEventType::KeyUp] {
            let params = DispatchKeyEventParams::builder()
                .r#type(kind)
                .modifiers(SHIFT_MODIFIER)
                .key("Enter")
                .code("Enter")
                .windows_virtual_key_code(13)
                .native_virtual_key_code(13)
                .build()
                .map_err(CdpError::msg)?;
            self.page.execute(params).await?;
        }
        Ok(())
    }

    async fn clear(&self, element: &Element) -> Result<(), CdpError> {
        element
            .call_js_fn("function() { this.focus(); this.textContent = ''; }", false)
            .await?;
        Ok(())
    }

    async fn try_deliver(&self, recipient: &str, chat: ChatKind, text: &str) -> Result<(), CdpError> {
        let current = self.page.url().await?.unwrap_or_default();
        if current != self.url {
            self.page.goto(self.url.as_str()).await?;
        }

        let search = self
            .wait_for_xpath(SEARCH_BOX_XPATH, self.timings.page_load_timeout)
            .await?;

        match chat {
            ChatKind::Group => {
                let xpath = format!("//span[@title={}]", xpath_literal(recipient));
                let group = self
                    .wait_for_xpath(&xpath, self.timings.page_load_timeout)
                    .await?;
                group.click().await?;
            }
            ChatKind::Contact => {
                search.click().await?;
                self.clear(&search).await?;
                search.type_str(recipient).await?;
                search.press_key("Enter").await?;
            }
        }

        tokio::time::sleep(self.timings.chat_settle).await;

        let input = self
            .wait_for_xpath(MESSAGE_BOX_XPATH, self.timings.page_load_timeout)
            .await?;
        input.click().await?;
        self.clear(&input).await?;

        for line in text.lines() {
            if !line.is_empty() {
                input.type_str(line).await?;
            }
            self.shift_enter().await?;
        }
        input.press_key("Enter").await?;
        Ok(())
    }
}

#[async_trait]
impl Messenger for WhatsAppWebDriver {
    async fn probe_session(&self) -> bool {
        self.wait_for_xpath(SEARCH_BOX_XPATH, self.timings.probe_timeout)
            .await
            .is_ok()
    }

    async fn deliver(&self, recipient: &str, chat: ChatKind, text: &str) -> DeliveryOutcome {
        log::info!(
            "(deliver) Enviando a '{}' ({}) {} caracteres",
            recipient,
            chat.as_str(),
            text.chars().count()
        );
        match self.try_deliver(recipient, chat, text).await {
            Ok(()) => DeliveryOutcome::Delivered,
            Err(CdpError::NotFound) => {
                DeliveryOutcome::NotFound(format!("Elemento no encontrado enviando a {}", recipient))
            }
            Err(e) => DeliveryOutcome::Failed(format!("{:?}", e)),
        }
    }
}

impl Drop for WhatsAppWebDriver {
    fn drop(&mut self) {
        self.handler_task.abort();
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    Ok(std::env::current_dir()?.join(path))
}

/// Literal XPath para un texto arbitrario (maneja comillas simples y dobles).
pub fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{}'", value);
    }
    if !value.contains('"') {
        return format!("\"{}\"", value);
    }
    let parts: Vec<String> = value
        .split('\'')
        .map(|p| format!("'{}'", p))
        .collect();
    format!("concat({})", parts.join(", \"'\", "))
}
