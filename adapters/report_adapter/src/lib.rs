pub mod chart;
pub mod markdown;

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use stats_core::domain::{
    CategoryBreakdown, CategoryLabel, CellValue, CrossTabResult, Table, DEFAULT_CATEGORY_COLUMN,
    DEFAULT_GROUP_COLUMN,
};
use stats_core::error::RenderError;
use stats_core::ports::ReportWriter;

use chart::{render_grouped_bar_chart, ChartOptions};

pub const REPORT_TITLE: &str = "Application de Visualisation des Données Clients";

/// Markdown report writer adapter implementation.
/// Writes to a file when one is given, stdout otherwise.
pub struct MarkdownReportWriter {
    output_file: Option<PathBuf>,
    chart_file: Option<PathBuf>,
    chart_options: ChartOptions,
    group_column: String,
    category_column: String,
}

impl MarkdownReportWriter {
    /// Creates the writer and starts the report with its title block.
    /// An existing output file is truncated.
    pub fn new(output_file: Option<PathBuf>) -> Result<Self, RenderError> {
        if let Some(path) = &output_file {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            File::create(path)?;
        }

        let writer = Self {
            output_file,
            chart_file: None,
            chart_options: ChartOptions::default(),
            group_column: DEFAULT_GROUP_COLUMN.to_string(),
            category_column: DEFAULT_CATEGORY_COLUMN.to_string(),
        };
        writer.emit(&format!(
            "# {}\n\n*Généré le {}*\n\n",
            REPORT_TITLE,
            Local::now().format("%Y-%m-%d %H:%M:%S %Z")
        ))?;
        Ok(writer)
    }

    /// Where the comparison chart is drawn; without it only the table is written
    pub fn with_chart(mut self, chart_file: PathBuf) -> Self {
        self.chart_file = Some(chart_file);
        self
    }

    /// Column names shown in the breakdown and comparison tables
    pub fn with_columns(mut self, group_column: &str, category_column: &str) -> Self {
        self.group_column = group_column.to_string();
        self.category_column = category_column.to_string();
        self
    }

    pub fn output_file(&self) -> Option<&Path> {
        self.output_file.as_deref()
    }

    fn emit(&self, text: &str) -> Result<(), RenderError> {
        match &self.output_file {
            Some(path) => {
                let mut file = OpenOptions::new().append(true).open(path)?;
                file.write_all(text.as_bytes())?;
            }
            None => {
                let stdout = io::stdout();
                let mut handle = stdout.lock();
                handle.write_all(text.as_bytes())?;
                handle.flush()?;
            }
        }
        Ok(())
    }

    /// "courtier" -> "Courtier"
    fn group_header(&self) -> String {
        let mut chars = self.group_column.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl ReportWriter for MarkdownReportWriter {
    fn write_table(&self, title: &str, table: &Table) -> Result<(), RenderError> {
        self.emit(&markdown::format_table(title, table))
    }

    fn write_filtered_table(
        &self,
        column: &str,
        value: &CellValue,
        table: &Table,
    ) -> Result<(), RenderError> {
        self.emit(&markdown::format_filtered_table(column, value, table))
    }

    fn write_values(&self, column: &str, values: &[CellValue]) -> Result<(), RenderError> {
        self.emit(&markdown::format_values(column, values))
    }

    fn write_breakdowns(
        &self,
        breakdowns: &[(CategoryLabel, CategoryBreakdown)],
    ) -> Result<(), RenderError> {
        self.emit(&markdown::format_breakdowns(&self.group_header(), breakdowns))
    }

    fn write_comparison(&self, comparison: &CrossTabResult) -> Result<(), RenderError> {
        self.emit(&markdown::format_comparison(
            &self.group_column,
            &self.category_column,
            comparison,
        ))?;

        if let Some(chart_file) = self.chart_file.as_deref().filter(|_| !comparison.is_empty()) {
            render_grouped_bar_chart(comparison, &self.chart_options, chart_file)?;
            self.emit(&format!(
                "![{}]({})\n\n",
                self.chart_options.title,
                chart_file.display()
            ))?;
        }
        Ok(())
    }
}
