use std::time::Duration;
use thiserror::Error;

/// A requested column is not part of the table
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("column '{0}' not found in table")]
    MissingColumn(String),
}

/// Credential configuration is missing or unusable
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("missing configuration: {0}")]
    MissingConfig(String),

    #[error("credential is not valid base64: {0}")]
    Encoding(String),

    #[error("credential document is malformed: {0}")]
    Document(String),

    #[error("private key rejected: {0}")]
    Key(String),

    #[error("token exchange failed: {0}")]
    TokenExchange(String),
}

/// Worksheet rows could not be retrieved
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("invalid worksheet name '{0}'")]
    InvalidWorksheet(String),

    #[error("worksheet '{0}' contains no data")]
    EmptyWorksheet(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("network error: {0}")]
    Network(String),

    #[error("spreadsheet service answered {status}: {message}")]
    Http { status: u16, message: String },

    #[error("unexpected response body: {0}")]
    Decode(String),
}

/// Report output could not be produced
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("chart error: {0}")]
    Chart(String),
}

/// Failure of a dashboard action, tagged with the stage that failed
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("aggregation failed: {0}")]
    Aggregate(#[source] SchemaError),

    #[error("filter failed: {0}")]
    Filter(#[source] SchemaError),

    #[error("rendering failed: {0}")]
    Render(#[from] RenderError),
}

impl DashboardError {
    pub fn stage(&self) -> &'static str {
        match self {
            DashboardError::Auth(_) => "auth",
            DashboardError::Fetch(_) => "fetch",
            DashboardError::Aggregate(_) => "aggregate",
            DashboardError::Filter(_) => "filter",
            DashboardError::Render(_) => "render",
        }
    }
}
