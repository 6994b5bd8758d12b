pub mod auth;
pub mod config;

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use stats_core::error::{AuthError, FetchError};
use stats_core::ports::{SheetRows, WorksheetSource};

pub use auth::{authenticate, SheetSession};
pub use config::SheetsConfig;

/// Google Sheets implementation of the WorksheetSource trait
pub struct GoogleSheetsSource {
    client: Client,
    session: SheetSession,
    api_base: String,
    timeout: Duration,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Option<Vec<Vec<serde_json::Value>>>,
}

impl GoogleSheetsSource {
    /// Creates a source over an already authenticated session.
    /// Every request is bounded by `timeout`.
    pub fn new(
        session: SheetSession,
        api_base: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = build_client(timeout).map_err(|e| FetchError::Network(e.to_string()))?;
        Ok(Self {
            client,
            session,
            api_base: api_base.into(),
            timeout,
        })
    }

    /// Authenticates with the configured service account and returns a ready source
    pub fn connect(config: &SheetsConfig) -> Result<Self, AuthError> {
        let client =
            build_client(config.timeout).map_err(|e| AuthError::TokenExchange(e.to_string()))?;
        let session = authenticate(&client, config)?;
        Ok(Self {
            client,
            session,
            api_base: config.api_base.clone(),
            timeout: config.timeout,
        })
    }

    /// `{api_base}/v4/spreadsheets/{id}/values/{worksheet}`, each segment escaped
    pub fn values_url(&self, worksheet: &str) -> Result<Url, FetchError> {
        let mut url = Url::parse(&self.api_base)
            .map_err(|e| FetchError::Network(format!("invalid API base '{}': {}", self.api_base, e)))?;
        url.path_segments_mut()
            .map_err(|_| FetchError::Network(format!("invalid API base '{}'", self.api_base)))?
            .pop_if_empty()
            .extend(&[
                "v4",
                "spreadsheets",
                self.session.spreadsheet_id(),
                "values",
                worksheet,
            ]);
        Ok(url)
    }

    fn classify(&self, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else {
            FetchError::Network(error.to_string())
        }
    }
}

fn build_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder().timeout(timeout).build()
}

impl WorksheetSource for GoogleSheetsSource {
    fn fetch_rows(&self, worksheet: &str) -> Result<SheetRows, FetchError> {
        if worksheet.trim().is_empty() {
            return Err(FetchError::InvalidWorksheet(worksheet.to_string()));
        }

        let url = self.values_url(worksheet)?;
        tracing::debug!(%url, "fetching worksheet");

        let response = self
            .client
            .get(url)
            .bearer_auth(self.session.access_token())
            .send()
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        // the API answers 400 when the range names no existing tab
        if status == StatusCode::BAD_REQUEST {
            return Err(FetchError::InvalidWorksheet(worksheet.to_string()));
        }
        if !status.is_success() {
            let message = response.text().unwrap_or_default();
            return Err(FetchError::Http {
                status: status.as_u16(),
                message: message.trim().to_string(),
            });
        }

        let body = response.text().map_err(|e| self.classify(e))?;
        parse_value_range(&body, worksheet)
    }
}

/// Extracts the rows of a `ValueRange` response body
pub fn parse_value_range(body: &str, worksheet: &str) -> Result<SheetRows, FetchError> {
    let range: ValueRange =
        serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))?;

    match range.values {
        Some(values) if !values.is_empty() => Ok(values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect()),
        _ => Err(FetchError::EmptyWorksheet(worksheet.to_string())),
    }
}

fn cell_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(text) => text,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}
