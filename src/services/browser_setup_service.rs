//! services/browser_setup_service.rs
//! Localiza Google Chrome y, si falta, descarga e instala el instalador oficial.

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tokio::process::Command;

const CHROME_BINARIES: [&str; 5] = [
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
    "chrome",
];

const WINDOWS_INSTALLER_URL: &str = "https://dl.google.com/chrome/install/latest/chrome_installer.exe";
const FEDORA_RPM_URL: &str =
    "https://dl.google.com/linux/direct/google-chrome-stable_current_x86_64.rpm";

/// Qué descargar y cómo instalarlo en la plataforma actual
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallerPlan {
    pub url: &'static str,
    pub file_name: &'static str,
    /// Programa y argumentos; la ruta del instalador se agrega al final
    pub command: Vec<&'static str>,
}

/// Decide el instalador según el sistema operativo y /etc/os-release.
pub fn installer_plan(os: &str, os_release: Option<&str>) -> Result<InstallerPlan> {
    match os {
        "windows" => Ok(InstallerPlan {
            url: WINDOWS_INSTALLER_URL,
            file_name: "chrome_installer.exe",
            command: vec![],
        }),
        "linux" => {
            let release = os_release.unwrap_or_default();
            if release.contains("Fedora") || release.contains("Nobara") {
                Ok(InstallerPlan {
                    url: FEDORA_RPM_URL,
                    file_name: "google-chrome-stable_current_x86_64.rpm",
                    command: vec!["sudo", "dnf", "install", "-y"],
                })
            } else {
                Err(anyhow!(
                    "Por ahora sólo se soporta la instalación en Fedora y Nobara Linux"
                ))
            }
        }
        other => Err(anyhow!(
            "Sistema operativo no soportado para instalar Chrome: {}",
            other
        )),
    }
}

#[derive(Clone)]
pub struct BrowserSetupService {
    http_client: Client,
    work_dir: PathBuf,
}

impl BrowserSetupService {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            http_client: Client::new(),
            work_dir: work_dir.into(),
        }
    }

    /// Devuelve la ruta del ejecutable de Chrome, instalándolo si hace falta.
    pub async fn ensure_chrome(
        &self,
        override_path: Option<&Path>,
        auto_install: bool,
    ) -> Result<PathBuf> {
        if let Some(path) = override_path {
            if path.exists() {
                log::info!("(ensure_chrome) Usando Chrome indicado en CHROME_PATH: {:?}", path);
                return Ok(path.to_path_buf());
            }
            return Err(anyhow!("CHROME_PATH apunta a un archivo inexistente: {:?}", path));
        }

        if let Some(found) = find_chrome() {
            log::info!("(ensure_chrome) Google Chrome ya está instalado en {:?}", found);
            return Ok(found);
        }

        if !auto_install {
            return Err(anyhow!(
                "No se encontró Chrome y AUTO_INSTALL_CHROME está deshabilitado"
            ));
        }

        let os_release = fs::read_to_string("/etc/os-release").ok();
        let plan = installer_plan(std::env::consts::OS, os_release.as_deref())?;
        self.install(&plan).await?;

        find_chrome().ok_or_else(|| anyhow!("Chrome sigue sin encontrarse tras la instalación"))
    }

    async fn install(&self, plan: &InstallerPlan) -> Result<()> {
        let installer_path = self.work_dir.join(plan.file_name);
        log::info!("(install) Descargando instalador desde {}", plan.url);
        self.download_with_progress(plan.url, &installer_path).await?;

        let mut cmd = match plan.command.split_first() {
            Some((program, args)) => {
                let mut c = Command::new(program);
                c.args(args).arg(&installer_path);
                c
            }
            None => Command::new(&installer_path),
        };

        log::info!("(install) Ejecutando instalador {:?}", installer_path);
        let status = cmd
            .status()
            .await
            .context("No se pudo ejecutar el instalador de Chrome");
        let _ = fs::remove_file(&installer_path);

        let status = status?;
        if !status.success() {
            return Err(anyhow!("El instalador de Chrome terminó con {}", status));
        }
        log::info!("(install) Chrome instalado correctamente");
        Ok(())
    }

    /// Descarga a disco informando el avance cada 10%.
    pub async fn download_with_progress(&self, url: &str, dest: &Path) -> Result<u64> {
        let mut response = self
            .http_client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Fallo al descargar {}", url))?
            .error_for_status()?;

        let total = response.content_length().unwrap_or(0);
        let mut file = fs::File::create(dest)
            .with_context(|| format!("No se pudo crear {:?}", dest))?;

        let mut downloaded: u64 = 0;
        let mut last_decile = 0;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk)?;
            downloaded += chunk.len() as u64;
            if total > 0 {
                let decile = downloaded * 10 / total;
                if decile > last_decile {
                    last_decile = decile;
                    log::info!("(download_with_progress) {}% descargado", decile * 10);
                }
            }
        }
        file.flush()?;

        if total != 0 && downloaded != total {
            let _ = fs::remove_file(dest);
            return Err(anyhow!(
                "Descarga incompleta: {} de {} bytes",
                downloaded,
                total
            ));
        }
        Ok(downloaded)
    }
}

fn find_chrome() -> Option<PathBuf> {
    for bin in CHROME_BINARIES {
        if let Ok(path) = which::which(bin) {
            return Some(path);
        }
    }
    if cfg!(windows) {
        let program_files =
            std::env::var("PROGRAMFILES").unwrap_or_else(|_| "C:\\Program Files".to_string());
        let path = Path::new(&program_files)
            .join("Google")
            .join("Chrome")
            .join("Application")
            .join("chrome.exe");
        if path.exists() {
            return Some(path);
        }
    }
    None
}
