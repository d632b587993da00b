//! tests/mod.rs
//! Pruebas unitarias y utilidades compartidas (messenger falso, fechas fijas).

mod spreadsheet_tests;
mod status_engine_tests;
mod template_tests;

use async_trait::async_trait;
use chrono::NaiveDate;
use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

use crate::{
    config::app_config::LoginPolicy,
    models::{
        delivery_model::DeliveryOutcome,
        recipient_model::{ChatKind, RecipientRecord, SendStatus},
    },
    services::whatsapp_service::Messenger,
};

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
}

/// Login sin esperas, para que los tests no duerman
pub fn quick_login() -> LoginPolicy {
    LoginPolicy {
        max_attempts: 2,
        retry_interval: Duration::ZERO,
        probe_timeout: Duration::ZERO,
    }
}

pub fn record(number: &str, expire_date: NaiveDate, status: &str) -> RecipientRecord {
    RecipientRecord {
        surname: "Pérez".to_string(),
        name: "Lucía".to_string(),
        whatsapp_number: number.to_string(),
        expire_date,
        vehicle_license: "ab123cd".to_string(),
        model_vehicle: "Cronos".to_string(),
        status: SendStatus::parse(status),
        timestep: None,
        chat_type: ChatKind::Contact,
        extra: Vec::new(),
    }
}

/// Messenger que devuelve siempre el mismo resultado y anota las llamadas
pub struct FakeMessenger {
    ready: bool,
    outcome: DeliveryOutcome,
    pub probes: AtomicUsize,
    pub sent: Mutex<Vec<(String, ChatKind, String)>>,
}

impl FakeMessenger {
    pub fn new(ready: bool, outcome: DeliveryOutcome) -> Self {
        Self {
            ready,
            outcome,
            probes: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn delivering() -> Self {
        Self::new(true, DeliveryOutcome::Delivered)
    }

    pub fn sent_to(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(r, _, _)| r.clone())
            .collect()
    }
}

#[async_trait]
impl Messenger for FakeMessenger {
    async fn probe_session(&self) -> bool {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.ready
    }

    async fn deliver(&self, recipient: &str, chat: ChatKind, text: &str) -> DeliveryOutcome {
        self.sent
            .lock()
            .unwrap()
            .push((recipient.to_string(), chat, text.to_string()));
        self.outcome.clone()
    }
}
