use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Sqlite,
};
use std::path::Path;
use uuid::Uuid;

#[cfg(test)]
use crate::models::delivery_model::DeliveryRecord;
use crate::models::recipient_model::RecipientRecord;

/// Historial de intentos de envío en SQLite. La planilla sigue siendo la fuente de verdad.
#[derive(Clone, Debug)]
pub struct DeliveryLogService {
    db_pool: Pool<Sqlite>,
}

impl DeliveryLogService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        DeliveryLogService { db_pool }
    }

    /// Abre (o crea) la base en disco y corre migraciones.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("No se pudo crear directorio {:?}", parent))?;
        }
        log::info!("Conectando a SQLite en {:?}", path);

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let db_pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .context("No se pudo conectar a la base de historial")?;

        let service = Self::new(db_pool);
        service.run_migrations().await?;
        Ok(service)
    }

    /// Corre migraciones con sqlx
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.db_pool)
            .await
            .context("Fallo en migraciones de 'deliveries'")?;
        Ok(())
    }

    /// Registra un intento. `status` es "delivered", "not_found", "failed" o "aborted".
    pub async fn record_attempt(
        &self,
        record: &RecipientRecord,
        status: &str,
        error_message: Option<&str>,
    ) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        let metadata = serde_json::json!({
            "chat_type": record.chat_type.as_str(),
            "expire_date": record.expire_date.format("%Y-%m-%d").to_string(),
            "vehicle_license": record.vehicle_license,
        })
        .to_string();

        sqlx::query(
            r#"
            INSERT INTO deliveries (
                id, whatsapp_number, status, error_message, metadata, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&id)
        .bind(&record.whatsapp_number)
        .bind(status)
        .bind(error_message)
        .bind(&metadata)
        .bind(&now)
        .execute(&self.db_pool)
        .await
        .context("Fallo al insertar en deliveries")?;

        Ok(id)
    }
}

#[cfg(test)]
impl DeliveryLogService {
    /// Intentos de un destinatario, del más nuevo al más viejo
    pub async fn list_for_recipient(
        &self,
        whatsapp_number: &str,
    ) -> Result<Vec<DeliveryRecord>> {
        use sqlx::Row;

        let rows = sqlx::query(
            r#"
            SELECT id, whatsapp_number, status, error_message, metadata, created_at
            FROM deliveries
            WHERE whatsapp_number = ?1
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(whatsapp_number)
        .fetch_all(&self.db_pool)
        .await?;

        let mut result = Vec::with_capacity(rows.len());
        for r in rows {
            let created_at: String = r.try_get("created_at")?;
            result.push(DeliveryRecord {
                id: r.try_get("id")?,
                whatsapp_number: r.try_get("whatsapp_number")?,
                status: r.try_get("status")?,
                error_message: r.try_get("error_message")?,
                metadata: r.try_get("metadata")?,
                created_at: created_at.parse()?,
            });
        }
        Ok(result)
    }
}
