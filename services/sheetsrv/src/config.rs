//! sheetsrv configuration
//!
//! Layered with figment: compiled defaults, then the YAML file, then
//! `SHEETSRV_` environment variables (`__` separates nested keys, e.g.
//! `SHEETSRV_GRID__SPREADSHEET_ID`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use errors::{SummitError, SummitResult};
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Deserializer, Serialize};

/// Default config file, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config/sheetsrv.yaml";

/// Environment prefix; `__` separates nested keys
const ENV_PREFIX: &str = "SHEETSRV_";

/// Keys whose environment values are always taken verbatim as text
///
/// figment parses env values, so `007` would become the number 7.
const TEXT_ENV_KEYS: [&str; 7] = [
    "grid.spreadsheet_id",
    "grid.sheet_name",
    "grid.service_account_email",
    "grid.private_key",
    "grid.access_token",
    "auth.sync_secret",
    "auth.session_secret",
];

/// Accept a YAML scalar where text is expected (`sync_secret: 123456`)
fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Unsigned(u64),
        Signed(i64),
        Float(f64),
        Bool(bool),
    }

    Ok(match Scalar::deserialize(deserializer)? {
        Scalar::Text(s) => s,
        Scalar::Unsigned(n) => n.to_string(),
        Scalar::Signed(n) => n.to_string(),
        Scalar::Float(n) => n.to_string(),
        Scalar::Bool(b) => b.to_string(),
    })
}

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 6010;

/// HTTP service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub host: String,
    pub port: u16,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "sheetsrv".to_string(),
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// SQLite store location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/sheetsrv.db"),
        }
    }
}

/// Google Sheets access
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    #[serde(deserialize_with = "text_or_number")]
    pub spreadsheet_id: String,
    #[serde(deserialize_with = "text_or_number")]
    pub sheet_name: String,
    pub api_base: String,
    pub token_uri: String,
    /// Service account client email
    pub service_account_email: Option<String>,
    /// PEM private key; literal `\n` sequences are accepted
    pub private_key: Option<String>,
    /// Pre-issued OAuth access token, used instead of the service account
    pub access_token: Option<String>,
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            sheet_name: "Sheet1".to_string(),
            api_base: "https://sheets.googleapis.com".to_string(),
            token_uri: "https://oauth2.googleapis.com/token".to_string(),
            service_account_email: None,
            private_key: None,
            access_token: None,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl GridConfig {
    /// Private key with escaped newlines restored
    pub fn normalized_private_key(&self) -> Option<String> {
        self.private_key
            .as_deref()
            .map(|key| key.replace("\\n", "\n"))
    }

    fn has_service_account(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        present(&self.service_account_email) && present(&self.private_key)
    }

    fn has_access_token(&self) -> bool {
        self.access_token
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty())
    }
}

/// Shared secrets
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret the sheet script sends with single-row syncs
    #[serde(deserialize_with = "text_or_number")]
    pub sync_secret: String,
    /// HS256 key used by the identity provider to sign session tokens
    #[serde(deserialize_with = "text_or_number")]
    pub session_secret: String,
}

/// Logging settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub dir: Option<PathBuf>,
    pub level: Option<String>,
    pub json: bool,
}

/// Complete configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SheetsrvConfig {
    pub service: ServiceConfig,
    pub database: DatabaseConfig,
    pub grid: GridConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

impl SheetsrvConfig {
    /// Build the figment for a config file path
    pub fn figment(path: impl AsRef<Path>) -> Figment {
        let env = Env::prefixed(ENV_PREFIX).split("__");

        let mut figment = Figment::from(Serialized::defaults(SheetsrvConfig::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(env.clone().ignore(&TEXT_ENV_KEYS));

        for (key, value) in env.only(&TEXT_ENV_KEYS).iter() {
            figment = figment.merge(Serialized::default(key.as_str(), value));
        }
        figment
    }

    /// Load from the given file (or the default path) plus environment
    pub fn load(path: Option<&Path>) -> SummitResult<Self> {
        let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));
        if !path.exists() {
            tracing::debug!("Config file {} not found, using defaults and env", path.display());
        }
        let config: Self = Self::figment(path).extract()?;
        Ok(config)
    }

    /// Reject configurations the service cannot run with
    pub fn validate(&self) -> SummitResult<()> {
        if self.service.port == 0 {
            return Err(invalid("service.port", "must be non-zero"));
        }
        if self.database.path.as_os_str().is_empty() {
            return Err(invalid("database.path", "must not be empty"));
        }
        if self.grid.spreadsheet_id.trim().is_empty() {
            return Err(SummitError::MissingConfig("grid.spreadsheet_id".to_string()));
        }
        if self.grid.sheet_name.trim().is_empty() {
            return Err(invalid("grid.sheet_name", "must not be empty"));
        }
        if reqwest::Url::parse(&self.grid.api_base).is_err() {
            return Err(invalid("grid.api_base", "not a valid URL"));
        }
        if !self.grid.has_access_token() && !self.grid.has_service_account() {
            return Err(SummitError::MissingConfig(
                "grid.access_token or grid.service_account_email + grid.private_key".to_string(),
            ));
        }
        if self.grid.request_timeout.is_zero() {
            return Err(invalid("grid.request_timeout", "must be greater than zero"));
        }
        if self.auth.sync_secret.is_empty() {
            return Err(SummitError::MissingConfig("auth.sync_secret".to_string()));
        }
        if self.auth.session_secret.is_empty() {
            return Err(SummitError::MissingConfig("auth.session_secret".to_string()));
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> SummitError {
    SummitError::InvalidConfig {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
