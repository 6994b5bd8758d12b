use std::sync::{Arc, RwLock};

use crate::aggregate::{count_by_category, cross_tabulate};
use crate::domain::{
    mail_type_categories, CategoryLabel, CellValue, Table, DEFAULT_CATEGORY_COLUMN,
    DEFAULT_GROUP_COLUMN,
};
use crate::error::{DashboardError, FetchError};
use crate::filter::{filter_by_value, unique_values};
use crate::ports::{ReportWriter, WorksheetSource};

/// Which columns and categories the breakdowns work on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisSettings {
    pub categories: Vec<CategoryLabel>,
    pub category_column: String,
    pub group_column: String,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            categories: mail_type_categories(),
            category_column: DEFAULT_CATEGORY_COLUMN.to_string(),
            group_column: DEFAULT_GROUP_COLUMN.to_string(),
        }
    }
}

/// Drill-down selection: keep rows where `column` equals `value`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueFilter {
    pub column: String,
    pub value: CellValue,
}

/// Application service behind every dashboard action
pub struct DashboardService {
    source: Box<dyn WorksheetSource>,
    writer: Box<dyn ReportWriter>,
    settings: AnalysisSettings,
    current: RwLock<Option<Arc<Table>>>,
}

impl DashboardService {
    /// Creates a new DashboardService with the given ports
    pub fn new(
        source: Box<dyn WorksheetSource>,
        writer: Box<dyn ReportWriter>,
        settings: AnalysisSettings,
    ) -> Self {
        Self {
            source,
            writer,
            settings,
            current: RwLock::new(None),
        }
    }

    /// Fetches `worksheet` and makes it the current table.
    ///
    /// A blank name or a worksheet without a header row is a `FetchError`.
    pub fn load_worksheet(&self, worksheet: &str) -> Result<Arc<Table>, DashboardError> {
        if worksheet.trim().is_empty() {
            return Err(FetchError::InvalidWorksheet(worksheet.to_string()).into());
        }

        let rows = self.source.fetch_rows(worksheet)?;
        let table = Table::from_sheet_rows(rows)
            .ok_or_else(|| FetchError::EmptyWorksheet(worksheet.to_string()))?;
        tracing::info!(
            worksheet,
            columns = table.columns().len(),
            records = table.len(),
            "worksheet loaded"
        );

        let table = Arc::new(table);
        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
        *current = Some(Arc::clone(&table));
        Ok(table)
    }

    /// Table from the last successful load, if any
    pub fn current_table(&self) -> Option<Arc<Table>> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Displays a worksheet and, when `filter` is set, the matching subset
    pub fn show_worksheet(
        &self,
        worksheet: &str,
        filter: Option<&ValueFilter>,
    ) -> Result<Arc<Table>, DashboardError> {
        let table = self.load_worksheet(worksheet)?;
        self.writer
            .write_table(&format!("Données de l'onglet '{}'", worksheet), &table)?;

        if let Some(filter) = filter {
            let filtered = filter_by_value(&table, &filter.column, &filter.value)
                .map_err(DashboardError::Filter)?;
            tracing::debug!(
                column = %filter.column,
                value = %filter.value,
                matched = filtered.len(),
                "filter applied"
            );
            self.writer
                .write_filtered_table(&filter.column, &filter.value, &filtered)?;
        }

        Ok(table)
    }

    /// Lists the values a drill-down on `column` can select
    pub fn list_values(
        &self,
        worksheet: &str,
        column: &str,
    ) -> Result<Vec<CellValue>, DashboardError> {
        let table = self.load_worksheet(worksheet)?;
        let values = unique_values(&table, column).map_err(DashboardError::Filter)?;
        self.writer.write_values(column, &values)?;
        Ok(values)
    }

    /// Per-category broker counts
    pub fn analyse_mail_types(&self, worksheet: &str) -> Result<(), DashboardError> {
        let table = self.load_worksheet(worksheet)?;
        if table.is_empty() {
            tracing::warn!(worksheet, "no records available for the analysis");
        }

        let breakdowns = count_by_category(
            &table,
            &self.settings.categories,
            &self.settings.category_column,
            &self.settings.group_column,
        )
        .map_err(DashboardError::Aggregate)?;

        self.writer.write_breakdowns(&breakdowns)?;
        Ok(())
    }

    /// Brokers compared across categories
    pub fn compare_brokers(&self, worksheet: &str) -> Result<(), DashboardError> {
        let table = self.load_worksheet(worksheet)?;
        if table.is_empty() {
            tracing::warn!(worksheet, "no records available for the comparison");
        }

        let comparison = cross_tabulate(
            &table,
            &self.settings.group_column,
            &self.settings.category_column,
        )
        .map_err(DashboardError::Aggregate)?;

        self.writer.write_comparison(&comparison)?;
        Ok(())
    }
}
