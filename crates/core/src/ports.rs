use crate::domain::{CategoryBreakdown, CategoryLabel, CellValue, CrossTabResult, Table};
use crate::error::{FetchError, RenderError};

/// Raw worksheet rows as returned by the spreadsheet service
pub type SheetRows = Vec<Vec<String>>;

/// Port to the spreadsheet service.
/// Implementations carry their own authenticated session.
pub trait WorksheetSource: Send + Sync {
    /// Returns every row of `worksheet`, header first
    fn fetch_rows(&self, worksheet: &str) -> Result<SheetRows, FetchError>;
}

/// Port to whatever displays results to the user
pub trait ReportWriter: Send + Sync {
    fn write_table(&self, title: &str, table: &Table) -> Result<(), RenderError>;

    /// Subset of a table kept by a drill-down on `column` = `value`
    fn write_filtered_table(
        &self,
        column: &str,
        value: &CellValue,
        table: &Table,
    ) -> Result<(), RenderError>;

    fn write_values(&self, column: &str, values: &[CellValue]) -> Result<(), RenderError>;

    /// One section per category, in the given order
    fn write_breakdowns(
        &self,
        breakdowns: &[(CategoryLabel, CategoryBreakdown)],
    ) -> Result<(), RenderError>;

    /// Comparison table and grouped bar chart
    fn write_comparison(&self, comparison: &CrossTabResult) -> Result<(), RenderError>;
}
