use colored::Colorize;
use dotenv::dotenv;
use tokio::io::BufReader;

use crate::app::{local_today, run_menu};
use crate::config::app_config::AppConfig;
use crate::logger::init_logger;
use crate::services::browser_setup_service::BrowserSetupService;
use crate::services::delivery_log_service::DeliveryLogService;
use crate::services::reminder_service::ReminderService;
use crate::services::spreadsheet_service::XlsxStore;
use crate::services::whatsapp_service::{wait_for_login, WhatsAppWebDriver};

mod app;
mod config;
mod handlers;
mod logger;
mod models;
mod services;
#[cfg(test)]
mod tests;

/// Error de arranque irrecuperable: se informa y se termina el proceso.
fn fatal(msg: String) -> ! {
    log::error!("{}", msg);
    eprintln!("{}", msg.red());
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok(); // Cargar .env al inicio
    init_logger();

    let config = AppConfig::from_env()
        .unwrap_or_else(|e| fatal(format!("Configuración inválida: {:#}", e)));

    // 1) Chrome disponible (se instala si falta)
    let work_dir = std::env::current_dir()?;
    let setup = BrowserSetupService::new(&work_dir);
    let chrome_path = setup
        .ensure_chrome(config.chrome_path.as_deref(), config.auto_install_chrome)
        .await
        .unwrap_or_else(|e| fatal(format!("Error setting up Chrome: {:#}", e)));
    println!("{}", "Google Chrome is installed and usable.".green());

    // 2) Planilla (se genera una plantilla si no existe)
    let today = local_today();
    let store = XlsxStore::new(&config.data_file, &config.sheet_name);
    let sheet = match store.load_or_init(today) {
        Ok((sheet, created)) => {
            if created {
                println!(
                    "{}",
                    format!(
                        "File '{}' created successfully as a testing template.",
                        store.path().display()
                    )
                    .green()
                );
            }
            println!("{}", "Excel data loaded successfully.".green());
            sheet
        }
        Err(e) => {
            eprintln!(
                "{}",
                format!("Error reading or creating Excel file: {:#}", e).red()
            );
            // Se muestra lo que se pueda del archivo antes de salir
            let mut stdout = std::io::stdout();
            if let Err(dump_err) = handlers::list_handler::show_all_sheets(&store, &mut stdout) {
                eprintln!(
                    "{}",
                    format!("Error displaying Excel content: {:#}", dump_err).red()
                );
            }
            return Ok(());
        }
    };

    // 3) Historial de envíos (opcional)
    let delivery_log = match &config.delivery_log_db {
        Some(path) => match DeliveryLogService::open(path).await {
            Ok(service) => Some(service),
            Err(e) => {
                log::warn!("Historial de envíos deshabilitado: {:#}", e);
                None
            }
        },
        None => None,
    };

    // 4) Navegador con WhatsApp Web
    let driver = WhatsAppWebDriver::launch(&config, &chrome_path)
        .await
        .unwrap_or_else(|e| fatal(format!("Error starting Chrome: {:#}", e)));

    if !wait_for_login(&driver, &config.login).await {
        println!(
            "{}",
            "Please scan the QR code to log in to WhatsApp Web.".cyan()
        );
    }

    let mut service = ReminderService::new(
        store,
        sheet,
        driver,
        config.template.clone(),
        config.login,
    );
    if let Some(history) = delivery_log {
        service = service.with_delivery_log(history);
    }

    let mut input = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    let menu_result = run_menu(&mut service, &mut input, &mut stdout, local_today).await;

    // El navegador se cierra siempre, termine como termine el menú
    service.into_messenger().shutdown().await?;
    if let Err(e) = menu_result {
        log::error!("El menú terminó con error: {:?}", e);
    }
    Ok(())
}
