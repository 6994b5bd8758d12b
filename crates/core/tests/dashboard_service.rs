use std::sync::{Arc, Mutex};

use stats_core::application::{AnalysisSettings, DashboardService, ValueFilter};
use stats_core::domain::{CategoryBreakdown, CategoryLabel, CellValue, CrossTabResult, Table};
use stats_core::error::{DashboardError, FetchError, RenderError};
use stats_core::ports::{ReportWriter, SheetRows, WorksheetSource};

struct FakeSource {
    rows: SheetRows,
}

impl WorksheetSource for FakeSource {
    fn fetch_rows(&self, worksheet: &str) -> Result<SheetRows, FetchError> {
        match worksheet {
            "devis" => Ok(self.rows.clone()),
            "vide" => Ok(Vec::new()),
            other => Err(FetchError::InvalidWorksheet(other.to_string())),
        }
    }
}

#[derive(Debug, PartialEq)]
enum Written {
    Table(String, usize),
    Filtered(String, CellValue, usize),
    Values(String, Vec<CellValue>),
    Breakdowns(Vec<(CategoryLabel, CategoryBreakdown)>),
    Comparison(CrossTabResult),
}

#[derive(Clone, Default)]
struct RecordingWriter {
    written: Arc<Mutex<Vec<Written>>>,
}

impl ReportWriter for RecordingWriter {
    fn write_table(&self, title: &str, table: &Table) -> Result<(), RenderError> {
        self.written
            .lock()
            .unwrap()
            .push(Written::Table(title.to_string(), table.len()));
        Ok(())
    }

    fn write_filtered_table(
        &self,
        column: &str,
        value: &CellValue,
        table: &Table,
    ) -> Result<(), RenderError> {
        self.written.lock().unwrap().push(Written::Filtered(
            column.to_string(),
            value.clone(),
            table.len(),
        ));
        Ok(())
    }

    fn write_values(&self, column: &str, values: &[CellValue]) -> Result<(), RenderError> {
        self.written
            .lock()
            .unwrap()
            .push(Written::Values(column.to_string(), values.to_vec()));
        Ok(())
    }

    fn write_breakdowns(
        &self,
        breakdowns: &[(CategoryLabel, CategoryBreakdown)],
    ) -> Result<(), RenderError> {
        self.written
            .lock()
            .unwrap()
            .push(Written::Breakdowns(breakdowns.to_vec()));
        Ok(())
    }

    fn write_comparison(&self, comparison: &CrossTabResult) -> Result<(), RenderError> {
        self.written
            .lock()
            .unwrap()
            .push(Written::Comparison(comparison.clone()));
        Ok(())
    }
}

fn rows(data: &[&[&str]]) -> SheetRows {
    data.iter()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect()
}

fn service(data: &[&[&str]]) -> (DashboardService, RecordingWriter) {
    let writer = RecordingWriter::default();
    let service = DashboardService::new(
        Box::new(FakeSource { rows: rows(data) }),
        Box::new(writer.clone()),
        AnalysisSettings::default(),
    );
    (service, writer)
}

const SHEET: &[&[&str]] = &[
    &["date", "courtier", "type_mail", "statut"],
    &["2024-01-02", "A", "Envoi de devis", "ok"],
    &["2024-01-03", "A", "Envoi de devis"],
    &["2024-01-04", "B", "Envoi de devis", ""],
    &["2024-01-05", "B", "Message de suivi de devis", "ok"],
];

#[test]
fn test_load_worksheet_replaces_current_table() {
    let (service, _) = service(SHEET);
    assert!(service.current_table().is_none());

    let table = service.load_worksheet("devis").unwrap();
    assert_eq!(table.len(), 4);
    assert_eq!(service.current_table().unwrap().len(), 4);
}

#[test]
fn test_load_worksheet_blank_name_is_fetch_error() {
    let (service, _) = service(SHEET);
    let err = service.load_worksheet("  ").unwrap_err();
    assert!(matches!(err, DashboardError::Fetch(FetchError::InvalidWorksheet(_))));
}

#[test]
fn test_load_worksheet_empty_sheet_is_fetch_error() {
    let (service, _) = service(SHEET);
    let err = service.load_worksheet("vide").unwrap_err();
    assert!(matches!(err, DashboardError::Fetch(FetchError::EmptyWorksheet(_))));
    assert_eq!(err.stage(), "fetch");
}

#[test]
fn test_failed_load_keeps_previous_table() {
    let (service, _) = service(SHEET);
    service.load_worksheet("devis").unwrap();
    assert!(service.load_worksheet("inconnu").is_err());
    assert_eq!(service.current_table().unwrap().len(), 4);
}

#[test]
fn test_show_worksheet_with_missing_filter() {
    let (service, writer) = service(SHEET);
    let filter = ValueFilter {
        column: "statut".to_string(),
        value: CellValue::Missing,
    };
    service.show_worksheet("devis", Some(&filter)).unwrap();

    let written = writer.written.lock().unwrap();
    assert_eq!(written.len(), 2);
    assert_eq!(written[1], Written::Filtered("statut".to_string(), CellValue::Missing, 1));
}

#[test]
fn test_show_worksheet_with_empty_string_filter() {
    let (service, writer) = service(SHEET);
    let filter = ValueFilter {
        column: "statut".to_string(),
        value: CellValue::present(""),
    };
    service.show_worksheet("devis", Some(&filter)).unwrap();

    let written = writer.written.lock().unwrap();
    assert_eq!(written[1], Written::Filtered("statut".to_string(), CellValue::present(""), 1));
}

#[test]
fn test_show_worksheet_with_unknown_filter_column() {
    let (service, _) = service(SHEET);
    let filter = ValueFilter {
        column: "agence".to_string(),
        value: CellValue::present("x"),
    };
    let err = service.show_worksheet("devis", Some(&filter)).unwrap_err();
    assert_eq!(err.stage(), "filter");
}

#[test]
fn test_list_values() {
    let (service, writer) = service(SHEET);
    let values = service.list_values("devis", "statut").unwrap();
    assert_eq!(
        values,
        vec![CellValue::present("ok"), CellValue::Missing, CellValue::present("")]
    );
    assert!(matches!(writer.written.lock().unwrap()[0], Written::Values(_, _)));
}

#[test]
fn test_analyse_mail_types() {
    let (service, writer) = service(SHEET);
    service.analyse_mail_types("devis").unwrap();

    let written = writer.written.lock().unwrap();
    let Written::Breakdowns(breakdowns) = &written[0] else {
        panic!("expected breakdowns, got {:?}", written[0]);
    };
    assert_eq!(breakdowns.len(), 5);
    assert_eq!(breakdowns[0].1, CategoryBreakdown::NoData);
    let CategoryBreakdown::Counts(counts) = &breakdowns[1].1 else {
        panic!("expected counts for Envoi de devis");
    };
    assert_eq!(counts[0].key, CellValue::present("A"));
    assert_eq!(counts[0].count, 2);
}

#[test]
fn test_analyse_header_only_sheet_reports_no_data() {
    let (service, writer) = service(&[&["courtier", "type_mail"]]);
    service.analyse_mail_types("devis").unwrap();

    let written = writer.written.lock().unwrap();
    let Written::Breakdowns(breakdowns) = &written[0] else {
        panic!("expected breakdowns");
    };
    assert!(breakdowns.iter().all(|(_, b)| *b == CategoryBreakdown::NoData));
}

#[test]
fn test_analyse_without_broker_column_is_aggregate_error() {
    let (service, writer) = service(&[&["type_mail"], &["Envoi de devis"]]);
    let err = service.analyse_mail_types("devis").unwrap_err();
    assert_eq!(err.stage(), "aggregate");
    assert!(err.to_string().contains("courtier"));
    assert!(writer.written.lock().unwrap().is_empty());
}

#[test]
fn test_compare_brokers_counts_every_record() {
    let (service, writer) = service(SHEET);
    service.compare_brokers("devis").unwrap();

    let written = writer.written.lock().unwrap();
    let Written::Comparison(comparison) = &written[0] else {
        panic!("expected comparison");
    };
    assert_eq!(comparison.len(), 3);
    assert_eq!(comparison.iter().map(|e| e.count).sum::<usize>(), 4);
}

#[test]
fn test_custom_settings() {
    let writer = RecordingWriter::default();
    let service = DashboardService::new(
        Box::new(FakeSource { rows: rows(SHEET) }),
        Box::new(writer.clone()),
        AnalysisSettings {
            categories: vec!["ok".to_string()],
            category_column: "statut".to_string(),
            group_column: "courtier".to_string(),
        },
    );
    service.analyse_mail_types("devis").unwrap();

    let written = writer.written.lock().unwrap();
    let Written::Breakdowns(breakdowns) = &written[0] else {
        panic!("expected breakdowns");
    };
    let CategoryBreakdown::Counts(counts) = &breakdowns[0].1 else {
        panic!("expected counts");
    };
    assert_eq!(counts.len(), 2);
}
