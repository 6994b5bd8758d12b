use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use report_adapter::MarkdownReportWriter;
use sheets_adapter::config::{CREDENTIALS_ENV, DEFAULT_API_BASE, SPREADSHEET_ID_ENV};
use sheets_adapter::{GoogleSheetsSource, SheetsConfig};
use stats_core::application::{AnalysisSettings, DashboardService, ValueFilter};
use stats_core::domain::{
    mail_type_categories, CellValue, DEFAULT_CATEGORY_COLUMN, DEFAULT_GROUP_COLUMN,
    DEFAULT_WORKSHEET,
};
use stats_core::error::DashboardError;
use stats_core::utils::sanitize_filename;
use tracing_subscriber::{fmt, EnvFilter};

/// Broker activity dashboard over a Google Sheets worksheet
#[derive(Parser, Debug)]
#[command(name = "mailstats")]
#[command(about = "Loads a worksheet of sent mails and breaks it down by broker and mail type")]
struct Cli {
    /// Base64-encoded service-account key document
    #[arg(long, env = CREDENTIALS_ENV, hide_env_values = true)]
    credentials: Option<String>,

    /// Identifier of the spreadsheet to read
    #[arg(long, env = SPREADSHEET_ID_ENV)]
    spreadsheet_id: Option<String>,

    /// Upper bound for each request to the spreadsheet service
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    #[arg(long, default_value = DEFAULT_API_BASE, hide = true)]
    api_base: String,

    /// Markdown report destination (stdout when omitted)
    #[arg(short = 'o', long = "output-file")]
    output_file: Option<PathBuf>,

    /// Column the breakdowns group by
    #[arg(long, default_value = DEFAULT_GROUP_COLUMN)]
    group_column: String,

    /// Column holding the category of each row
    #[arg(long, default_value = DEFAULT_CATEGORY_COLUMN)]
    category_column: String,

    /// Category to break down; repeat for several (defaults to the five mail types)
    #[arg(long = "category")]
    categories: Vec<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Display a worksheet, optionally filtered on one column value
    Show {
        #[arg(short, long, default_value = DEFAULT_WORKSHEET)]
        sheet: String,

        /// Column to filter on
        #[arg(short, long, requires = "selection")]
        column: Option<String>,

        /// Keep rows whose column equals this value
        #[arg(long, group = "selection", requires = "column")]
        value: Option<String>,

        /// Keep rows whose column is empty
        #[arg(long, group = "selection", requires = "column")]
        missing: bool,
    },
    /// List the distinct values of a column
    Values {
        #[arg(short, long, default_value = DEFAULT_WORKSHEET)]
        sheet: String,

        #[arg(short, long)]
        column: String,
    },
    /// Count each mail type per broker
    Analyse {
        #[arg(short, long, default_value = DEFAULT_WORKSHEET)]
        sheet: String,
    },
    /// Compare brokers across mail types, with a grouped bar chart
    Compare {
        #[arg(short, long, default_value = DEFAULT_WORKSHEET)]
        sheet: String,

        /// SVG chart destination (defaults to comparaison_<sheet>.svg)
        #[arg(long)]
        chart: Option<PathBuf>,
    },
}

fn main() {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        tracing::error!(stage = e.stage(), "{}", e);
        eprintln!("Error during {}: {}", e.stage(), e);
        std::process::exit(exit_code(&e));
    }
}

fn run(cli: Cli) -> Result<(), DashboardError> {
    let timeout = Duration::from_secs(cli.timeout_secs);
    let config = SheetsConfig::new(
        cli.credentials.as_deref(),
        cli.spreadsheet_id.as_deref(),
        timeout,
    )?
    .with_api_base(cli.api_base);

    // Instantiate concrete implementations of secondary adapters
    let source = GoogleSheetsSource::connect(&config)?;

    let settings = AnalysisSettings {
        categories: if cli.categories.is_empty() {
            mail_type_categories()
        } else {
            cli.categories
        },
        category_column: cli.category_column,
        group_column: cli.group_column,
    };

    let mut writer = MarkdownReportWriter::new(cli.output_file.clone())?
        .with_columns(&settings.group_column, &settings.category_column);
    if let Command::Compare { sheet, chart } = &cli.command {
        writer = writer.with_chart(chart_path(chart.clone(), cli.output_file.as_deref(), sheet));
    }

    let service = DashboardService::new(Box::new(source), Box::new(writer), settings);

    match cli.command {
        Command::Show {
            sheet,
            column,
            value,
            missing,
        } => {
            let filter = column.map(|column| ValueFilter {
                column,
                value: if missing {
                    CellValue::Missing
                } else {
                    CellValue::from(value)
                },
            });
            service.show_worksheet(&sheet, filter.as_ref())?;
        }
        Command::Values { sheet, column } => {
            service.list_values(&sheet, &column)?;
        }
        Command::Analyse { sheet } => service.analyse_mail_types(&sheet)?,
        Command::Compare { sheet, .. } => service.compare_brokers(&sheet)?,
    }

    if let Some(output_file) = &cli.output_file {
        tracing::info!(path = %output_file.display(), "report written");
    }
    Ok(())
}

/// Explicit path, else next to the report, else the working directory
fn chart_path(explicit: Option<PathBuf>, report: Option<&std::path::Path>, sheet: &str) -> PathBuf {
    explicit.unwrap_or_else(|| {
        let file_name = format!("comparaison_{}.svg", sanitize_filename(sheet));
        match report.and_then(|r| r.parent()) {
            Some(dir) => dir.join(file_name),
            None => PathBuf::from(file_name),
        }
    })
}

fn exit_code(error: &DashboardError) -> i32 {
    match error {
        DashboardError::Auth(_) => 2,
        DashboardError::Fetch(_) => 3,
        DashboardError::Aggregate(_) | DashboardError::Filter(_) => 4,
        DashboardError::Render(_) => 5,
    }
}
