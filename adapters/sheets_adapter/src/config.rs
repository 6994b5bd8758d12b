use std::fmt;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;
use stats_core::error::AuthError;

pub const CREDENTIALS_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS_JSON";
pub const SPREADSHEET_ID_ENV: &str = "SPREADSHEET_ID";
pub const DEFAULT_API_BASE: &str = "https://sheets.googleapis.com";
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// The fields of a service-account key document this crate needs
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type", default)]
    pub key_type: Option<String>,
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("key_type", &self.key_type)
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

/// Everything needed to open a session against one spreadsheet
#[derive(Debug, Clone)]
pub struct SheetsConfig {
    pub credentials: ServiceAccountKey,
    pub spreadsheet_id: String,
    pub api_base: String,
    pub timeout: Duration,
}

impl SheetsConfig {
    /// Builds the configuration from an encoded credential and a spreadsheet id.
    /// Absent or blank values are reported under their environment variable name.
    pub fn new(
        encoded_credentials: Option<&str>,
        spreadsheet_id: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, AuthError> {
        let encoded = non_blank(encoded_credentials)
            .ok_or_else(|| AuthError::MissingConfig(CREDENTIALS_ENV.to_string()))?;
        let spreadsheet_id = non_blank(spreadsheet_id)
            .ok_or_else(|| AuthError::MissingConfig(SPREADSHEET_ID_ENV.to_string()))?;

        Ok(Self {
            credentials: decode_credentials(encoded)?,
            spreadsheet_id: spreadsheet_id.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout,
        })
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Decodes a base64 service-account document, tolerating stripped padding
pub fn decode_credentials(encoded: &str) -> Result<ServiceAccountKey, AuthError> {
    let bytes = STANDARD
        .decode(repair_padding(encoded))
        .map_err(|e| AuthError::Encoding(e.to_string()))?;
    let document =
        String::from_utf8(bytes).map_err(|e| AuthError::Document(e.to_string()))?;
    let key: ServiceAccountKey =
        serde_json::from_str(&document).map_err(|e| AuthError::Document(e.to_string()))?;

    if key.key_type.as_deref().is_some_and(|t| t != "service_account") {
        return Err(AuthError::Document(format!(
            "expected a service_account key, found '{}'",
            key.key_type.as_deref().unwrap_or_default()
        )));
    }
    Ok(key)
}

fn repair_padding(encoded: &str) -> String {
    let mut compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let remainder = compact.len() % 4;
    if remainder != 0 {
        compact.push_str(&"=".repeat(4 - remainder));
    }
    compact
}
