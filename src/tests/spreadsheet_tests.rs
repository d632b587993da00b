//! tests/spreadsheet_tests.rs
//! Lectura/escritura real de .xlsx en directorios temporales.

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use rust_xlsxwriter::Workbook;
    use tempfile::tempdir;

    use crate::models::recipient_model::{ChatKind, RecipientSheet, SendStatus};
    use crate::services::spreadsheet_service::{
        excel_serial_to_date, parse_date_text, XlsxStore,
    };
    use crate::tests::{record, today};

    #[test]
    fn missing_file_creates_single_template_row() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.xlsx");
        let store = XlsxStore::new(&path, "Sheet1");

        let (sheet, created) = store.load_or_init(today()).unwrap();
        assert!(created);
        assert!(path.exists());
        assert_eq!(sheet.records.len(), 1);

        let row = &sheet.records[0];
        assert_eq!(row.expire_date, today() + Duration::days(2));
        assert_eq!(row.status, SendStatus::Unset);
        assert_eq!(row.timestep, Some(today()));

        // Persistido: una segunda carga lee lo mismo sin recrear
        let (again, created) = store.load_or_init(today()).unwrap();
        assert!(!created);
        assert_eq!(again, sheet);
    }

    #[test]
    fn save_then_load_keeps_records_and_extra_columns() {
        let dir = tempdir().unwrap();
        let store = XlsxStore::new(dir.path().join("data.xlsx"), "Sheet1");

        let mut sent = record("+5493510000001", today(), "Correct");
        sent.timestep = Some(today());
        let mut group = record("Flota Norte", today() + Duration::days(2), "");
        group.chat_type = ChatKind::Group;
        group.extra = vec!["nota".to_string(), String::new()];
        sent.extra = vec![String::new(), "x".to_string()];

        let sheet = RecipientSheet {
            extra_columns: vec!["comentario".to_string(), "agente".to_string()],
            records: vec![sent, group],
            unparsed: Vec::new(),
        };
        store.save(&sheet).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, sheet);
        assert_eq!(loaded.find("+5493510000001").unwrap().status.as_cell(), "Correct");
        assert_eq!(loaded.find("Flota Norte").unwrap().chat_type, ChatKind::Group);
    }

    #[test]
    fn reads_text_dates_numbers_and_timestamp_alias() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("manual.xlsx");

        let mut workbook = Workbook::new();
        let ws = workbook.add_worksheet();
        ws.set_name("Sheet1").unwrap();
        for (col, h) in ["Name", "whatsapp_number", "expire_date", "Status", "timestamp"]
            .iter()
            .enumerate()
        {
            ws.write_string(0, col as u16, *h).unwrap();
        }
        ws.write_string(1, 0, "Juan").unwrap();
        ws.write_number(1, 1, 3517885067.0).unwrap();
        ws.write_string(1, 2, "18/10/2026").unwrap();
        ws.write_string(1, 3, "SEND").unwrap();
        ws.write_string(1, 4, "2026-10-01 10:30:00").unwrap();

        ws.write_string(2, 0, "Ana").unwrap();
        ws.write_string(2, 1, "3510000002").unwrap();
        ws.write_string(2, 2, "2026-10-20").unwrap();
        workbook.save(&path).unwrap();

        let sheet = XlsxStore::new(&path, "Sheet1").load().unwrap();
        assert_eq!(sheet.records.len(), 2);

        let juan = &sheet.records[0];
        assert_eq!(juan.whatsapp_number, "3517885067");
        assert_eq!(juan.expire_date, today() + Duration::days(2));
        assert_eq!(juan.status, SendStatus::Send);
        assert_eq!(
            juan.timestep,
            chrono::NaiveDate::from_ymd_opt(2026, 10, 1)
        );
        assert_eq!(juan.vehicle_license, "");

        let ana = &sheet.records[1];
        assert_eq!(ana.status, SendStatus::Unset);
        assert_eq!(ana.chat_type, ChatKind::Contact);
        assert_eq!(ana.timestep, None);
    }

    #[test]
    fn missing_required_column_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.xlsx");

        let mut workbook = Workbook::new();
        let ws = workbook.add_worksheet();
        ws.write_string(0, 0, "name").unwrap();
        ws.write_string(0, 1, "whatsapp_number").unwrap();
        ws.write_string(1, 0, "Juan").unwrap();
        ws.write_string(1, 1, "351").unwrap();
        workbook.save(&path).unwrap();

        let err = XlsxStore::new(&path, "Sheet1").load().unwrap_err();
        assert!(err.to_string().contains("expire_date"));
    }

    #[test]
    fn rows_that_cannot_be_read_are_kept_in_place() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mixta.xlsx");

        let mut workbook = Workbook::new();
        let ws = workbook.add_worksheet();
        ws.set_name("Sheet1").unwrap();
        for (col, h) in ["name", "whatsapp_number", "expire_date", "status", "comentario"]
            .iter()
            .enumerate()
        {
            ws.write_string(0, col as u16, *h).unwrap();
        }
        ws.write_string(1, 0, "Juan").unwrap();
        ws.write_string(1, 1, "3510000001").unwrap();
        ws.write_string(1, 2, "18/10/2026").unwrap();
        // Sin vencimiento
        ws.write_string(2, 0, "Sin Fecha").unwrap();
        ws.write_string(2, 1, "3510000002").unwrap();
        ws.write_string(2, 4, "llamar").unwrap();
        // Sin número
        ws.write_string(3, 0, "Sin Numero").unwrap();
        ws.write_string(3, 2, "18/10/2026").unwrap();
        ws.write_string(4, 0, "Ana").unwrap();
        ws.write_string(4, 1, "3510000004").unwrap();
        ws.write_string(4, 2, "fecha rara").unwrap();
        ws.write_string(5, 0, "Eva").unwrap();
        ws.write_string(5, 1, "3510000005").unwrap();
        ws.write_string(5, 2, "2026-10-20").unwrap();
        workbook.save(&path).unwrap();

        let store = XlsxStore::new(&path, "Sheet1");
        let sheet = store.load().unwrap();
        let numbers: Vec<&str> = sheet
            .records
            .iter()
            .map(|r| r.whatsapp_number.as_str())
            .collect();
        assert_eq!(numbers, vec!["3510000001", "3510000005"]);
        assert_eq!(sheet.unparsed.len(), 3);
        assert!(sheet.unparsed.iter().all(|u| u.position == 1));
        assert!(sheet.unparsed[0].reason.contains("expire_date"));
        assert!(sheet.unparsed[1].reason.contains("whatsapp_number"));
        assert!(sheet.unparsed[0].cells.contains(&"llamar".to_string()));

        // Guardar no pierde ni reordena las filas ilegibles
        store.save(&sheet).unwrap();
        let again = store.load().unwrap();
        assert_eq!(again, sheet);

        let dump = store.dump_sheets().unwrap();
        let first_cells: Vec<String> = dump[0]
            .rows
            .iter()
            .skip(1)
            .map(|r| r.iter().find(|c| !c.is_empty()).cloned().unwrap_or_default())
            .collect();
        assert_eq!(
            first_cells,
            vec!["Juan", "Sin Fecha", "Sin Numero", "Ana", "Eva"]
        );
    }

    #[test]
    fn dump_lists_every_sheet() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("multi.xlsx");

        let mut workbook = Workbook::new();
        let first = workbook.add_worksheet();
        first.set_name("Sheet1").unwrap();
        first.write_string(0, 0, "whatsapp_number").unwrap();
        first.write_string(1, 0, "351").unwrap();
        let second = workbook.add_worksheet();
        second.set_name("Notas").unwrap();
        second.write_string(0, 0, "hola").unwrap();
        workbook.save(&path).unwrap();

        let dumps = XlsxStore::new(&path, "Sheet1").dump_sheets().unwrap();
        let names: Vec<&str> = dumps.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Sheet1", "Notas"]);
        assert_eq!(dumps[0].rows[1], vec!["351".to_string()]);
    }

    #[test]
    fn date_helpers() {
        assert_eq!(
            excel_serial_to_date(46311.0),
            chrono::NaiveDate::from_ymd_opt(2026, 10, 16)
        );
        assert_eq!(excel_serial_to_date(-1.0), None);
        assert_eq!(parse_date_text("16/10/2026"), Some(today()));
        assert_eq!(parse_date_text(" 2026-10-16 "), Some(today()));
        assert_eq!(parse_date_text("16-10-2026"), None);
    }
}
