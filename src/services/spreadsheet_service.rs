//! services/spreadsheet_service.rs
//! Lectura y escritura de la planilla de destinatarios (.xlsx).

use anyhow::{anyhow, Context, Result};
use calamine::{open_workbook_auto, Data, Reader};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook, Worksheet};
use std::{
    collections::HashMap,
    io::Write,
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;

use crate::models::recipient_model::{
    ChatKind, RecipientRecord, RecipientSheet, SendStatus, UnparsedRow,
};

const COL_SURNAME: &str = "surname";
const COL_NAME: &str = "name";
const COL_NUMBER: &str = "whatsapp_number";
const COL_EXPIRE: &str = "expire_date";
const COL_LICENSE: &str = "vehicle_license";
const COL_MODEL: &str = "model_vehicle";
const COL_STATUS: &str = "status";
const COL_TIMESTEP: &str = "timestep";
const COL_CHAT_TYPE: &str = "chat_type";

/// Orden en que se escriben las columnas conocidas
const KNOWN_COLUMNS: [&str; 9] = [
    COL_SURNAME,
    COL_NAME,
    COL_NUMBER,
    COL_EXPIRE,
    COL_LICENSE,
    COL_MODEL,
    COL_STATUS,
    COL_TIMESTEP,
    COL_CHAT_TYPE,
];

/// Hoja volcada como texto, para la vista de tabla
#[derive(Debug, Clone)]
pub struct SheetDump {
    pub name: String,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct XlsxStore {
    path: PathBuf,
    sheet_name: String,
}

impl XlsxStore {
    pub fn new(path: impl Into<PathBuf>, sheet_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            sheet_name: sheet_name.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Carga la hoja. Si el archivo no existe, genera y guarda una fila de prueba.
    /// El booleano indica si se creó el archivo.
    pub fn load_or_init(&self, today: NaiveDate) -> Result<(RecipientSheet, bool)> {
        if !self.path.exists() {
            let sheet = RecipientSheet {
                records: vec![RecipientRecord::template_row(today)],
                ..RecipientSheet::default()
            };
            self.save(&sheet)?;
            log::info!(
                "(load_or_init) Planilla {:?} creada como plantilla de prueba",
                self.path
            );
            return Ok((sheet, true));
        }
        Ok((self.load()?, false))
    }

    pub fn load(&self) -> Result<RecipientSheet> {
        let mut workbook = open_workbook_auto(&self.path)
            .with_context(|| format!("No se pudo abrir la planilla {:?}", self.path))?;
        let range = workbook
            .worksheet_range(&self.sheet_name)
            .with_context(|| format!("No se pudo leer la hoja '{}'", self.sheet_name))?;

        let mut rows = range.rows();
        let header: Vec<String> = match rows.next() {
            Some(h) => h.iter().map(|c| cell_text(c).trim().to_string()).collect(),
            None => return Ok(RecipientSheet::default()),
        };

        // Columnas conocidas sin distinguir mayúsculas; las extra conservan su nombre
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut extra: Vec<(usize, String)> = Vec::new();
        for (i, raw) in header.iter().enumerate() {
            let lower = raw.to_lowercase();
            let key = if lower == "timestamp" { COL_TIMESTEP } else { lower.as_str() };
            match KNOWN_COLUMNS.iter().find(|k| **k == key) {
                Some(k) => {
                    index.entry(*k).or_insert(i);
                }
                None if raw.is_empty() => {}
                None => extra.push((i, raw.clone())),
            }
        }
        for required in [COL_NUMBER, COL_EXPIRE] {
            if !index.contains_key(required) {
                return Err(anyhow!("Falta la columna '{}' en la planilla", required));
            }
        }

        let mut records = Vec::new();
        let mut unparsed = Vec::new();
        for (row_no, row) in rows.enumerate() {
            if row.iter().all(|c| matches!(c, Data::Empty)) {
                continue;
            }
            let text = |col: &str| -> String {
                index
                    .get(col)
                    .and_then(|i| row.get(*i))
                    .map(cell_text)
                    .unwrap_or_default()
            };
            let date = |col: &str| index.get(col).and_then(|i| row.get(*i));
            let extra_cells = || -> Vec<String> {
                extra
                    .iter()
                    .map(|(i, _)| row.get(*i).map(cell_text).unwrap_or_default())
                    .collect()
            };

            let whatsapp_number = text(COL_NUMBER).trim().to_string();
            let parsed = if whatsapp_number.is_empty() {
                Err("whatsapp_number vacío")
            } else {
                date(COL_EXPIRE)
                    .and_then(cell_date)
                    .ok_or("expire_date inválido o vacío")
            };
            let expire_date = match parsed {
                Ok(d) => d,
                Err(reason) => {
                    // +2: la fila 1 es el encabezado y las filas de Excel empiezan en 1
                    log::warn!(
                        "(load) Fila {} ignorada: {}. Se conserva sin cambios",
                        row_no + 2,
                        reason
                    );
                    unparsed.push(UnparsedRow {
                        position: records.len(),
                        cells: KNOWN_COLUMNS
                            .iter()
                            .map(|col| text(*col))
                            .chain(extra_cells())
                            .collect(),
                        reason: reason.to_string(),
                    });
                    continue;
                }
            };

            records.push(RecipientRecord {
                surname: text(COL_SURNAME),
                name: text(COL_NAME),
                whatsapp_number,
                expire_date,
                vehicle_license: text(COL_LICENSE),
                model_vehicle: text(COL_MODEL),
                status: SendStatus::parse(&text(COL_STATUS)),
                timestep: date(COL_TIMESTEP).and_then(cell_date),
                chat_type: ChatKind::parse(&text(COL_CHAT_TYPE)),
                extra: extra_cells(),
            });
        }

        log::info!(
            "(load) {} registros leídos de {:?} ({} filas sin interpretar)",
            records.len(),
            self.path,
            unparsed.len()
        );
        Ok(RecipientSheet {
            extra_columns: extra.into_iter().map(|(_, name)| name).collect(),
            records,
            unparsed,
        })
    }

    /// Reescribe la planilla completa. Se escribe a un temporal y se renombra.
    pub fn save(&self, sheet: &RecipientSheet) -> Result<()> {
        let mut workbook = Workbook::new();
        let date_format = Format::new().set_num_format("dd/mm/yyyy");
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&self.sheet_name)?;

        let headers = KNOWN_COLUMNS
            .iter()
            .map(|s| s.to_string())
            .chain(sheet.extra_columns.iter().cloned());
        for (col, h) in headers.enumerate() {
            worksheet.write_string(0, col as u16, h)?;
        }

        // Las filas sin interpretar vuelven a su lugar entre los registros
        let mut row: u32 = 1;
        let mut raw_rows = sheet.unparsed.iter().peekable();
        for (i, rec) in sheet.records.iter().enumerate() {
            while let Some(raw) = raw_rows.next_if(|u| u.position <= i) {
                write_raw_row(worksheet, row, raw)?;
                row += 1;
            }
            write_record(worksheet, row, rec, &date_format)?;
            row += 1;
        }
        for raw in raw_rows {
            write_raw_row(worksheet, row, raw)?;
            row += 1;
        }
        worksheet.autofit();

        let buffer = workbook
            .save_to_buffer()
            .context("Error generando el contenido xlsx")?;

        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut tmp = NamedTempFile::new_in(&dir)
            .with_context(|| format!("No se pudo crear temporal en {:?}", dir))?;
        tmp.write_all(&buffer)?;
        tmp.flush()?;
        tmp.persist(&self.path)
            .with_context(|| format!("No se pudo reemplazar {:?}", self.path))?;

        log::debug!(
            "(save) {} registros escritos en {:?}",
            sheet.records.len(),
            self.path
        );
        Ok(())
    }

    /// Vuelca todas las hojas del libro como texto.
    pub fn dump_sheets(&self) -> Result<Vec<SheetDump>> {
        let mut workbook = open_workbook_auto(&self.path)
            .with_context(|| format!("No se pudo abrir la planilla {:?}", self.path))?;
        let mut dumps = Vec::new();
        for name in workbook.sheet_names() {
            let range = workbook
                .worksheet_range(&name)
                .with_context(|| format!("No se pudo leer la hoja '{}'", name))?;
            let rows = range
                .rows()
                .map(|r| r.iter().map(cell_display).collect())
                .collect();
            dumps.push(SheetDump { name, rows });
        }
        Ok(dumps)
    }
}

fn write_record(
    worksheet: &mut Worksheet,
    row: u32,
    rec: &RecipientRecord,
    date_format: &Format,
) -> Result<()> {
    worksheet.write_string(row, 0, &rec.surname)?;
    worksheet.write_string(row, 1, &rec.name)?;
    worksheet.write_string(row, 2, &rec.whatsapp_number)?;
    worksheet.write_datetime_with_format(row, 3, &excel_date(rec.expire_date)?, date_format)?;
    worksheet.write_string(row, 4, &rec.vehicle_license)?;
    worksheet.write_string(row, 5, &rec.model_vehicle)?;
    worksheet.write_string(row, 6, rec.status.as_cell())?;
    if let Some(ts) = rec.timestep {
        worksheet.write_datetime_with_format(row, 7, &excel_date(ts)?, date_format)?;
    }
    worksheet.write_string(row, 8, rec.chat_type.as_str())?;
    for (j, value) in rec.extra.iter().enumerate() {
        if !value.is_empty() {
            worksheet.write_string(row, (KNOWN_COLUMNS.len() + j) as u16, value)?;
        }
    }
    Ok(())
}

fn write_raw_row(worksheet: &mut Worksheet, row: u32, raw: &UnparsedRow) -> Result<()> {
    for (col, value) in raw.cells.iter().enumerate() {
        if !value.is_empty() {
            worksheet.write_string(row, col as u16, value)?;
        }
    }
    Ok(())
}

fn excel_date(date: NaiveDate) -> Result<ExcelDateTime> {
    use chrono::Datelike;
    ExcelDateTime::from_ymd(date.year() as u16, date.month() as u8, date.day() as u8)
        .with_context(|| format!("Fecha fuera de rango para Excel: {}", date))
}

/// Texto crudo de una celda. Los números enteros no llevan ".0".
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => excel_serial_to_date(dt.as_f64())
            .map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_default(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("{:?}", e),
    }
}

fn cell_display(cell: &Data) -> String {
    match cell {
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            match excel_serial_to_datetime(serial) {
                Some(ts) if serial.fract() == 0.0 => ts.format("%d/%m/%Y").to_string(),
                Some(ts) => ts.format("%d/%m/%Y %H:%M:%S").to_string(),
                None => serial.to_string(),
            }
        }
        other => cell_text(other),
    }
}

/// Interpreta una celda como fecha: fecha nativa, serial de Excel o texto.
pub fn cell_date(cell: &Data) -> Option<NaiveDate> {
    match cell {
        Data::DateTime(dt) => excel_serial_to_date(dt.as_f64()),
        Data::Float(f) => excel_serial_to_date(*f),
        Data::Int(i) => excel_serial_to_date(*i as f64),
        Data::String(s) | Data::DateTimeIso(s) => parse_date_text(s),
        _ => None,
    }
}

pub fn parse_date_text(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    NaiveDate::parse_from_str(s, "%d/%m/%Y")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
                .ok()
                .map(|dt| dt.date())
        })
}

fn excel_epoch() -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(1899, 12, 30).and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let millis = (serial * 86_400_000.0).round() as i64;
    excel_epoch()?.checked_add_signed(Duration::milliseconds(millis))
}

pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    excel_epoch()?
        .date()
        .checked_add_signed(Duration::days(serial.floor() as i64))
}
