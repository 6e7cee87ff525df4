//! Unified error handling for Summit Ops services
//!
//! One error type shared by the storage layer, the sheet adapter and the HTTP
//! surface, so a failure keeps its category from the place it happened to the
//! response the caller sees.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// ErrorBody - API error response type
// ============================================================================

/// JSON body returned for every failed request: `{ "error": "..." }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human readable message
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

// ============================================================================
// SummitError - Main error type
// ============================================================================

/// Main error type for all Summit Ops services
#[derive(Debug, Error)]
pub enum SummitError {
    // ======================================
    // Configuration Errors
    // ======================================
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid configuration: {field}: {reason}")]
    InvalidConfig { field: String, reason: String },

    #[error("Missing required configuration: {0}")]
    MissingConfig(String),

    // ======================================
    // Store Errors
    // ======================================
    #[error("Database error: {0}")]
    Database(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] sqlx::Error),

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    // ======================================
    // Grid (spreadsheet) Errors
    // ======================================
    #[error("Sheet API error ({status}): {message}")]
    GridApi { status: u16, message: String },

    #[error("Sheet authorization failed: {0}")]
    GridAuth(String),

    #[error("Invalid grid position: {0}")]
    InvalidPosition(u32),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Timeout waiting for response from {0}")]
    Timeout(String),

    // ======================================
    // API & Validation Errors
    // ======================================
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    // ======================================
    // Runtime Errors
    // ======================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using SummitError
pub type SummitResult<T> = Result<T, SummitError>;

impl SummitError {
    /// Get the appropriate HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request
            Self::BadRequest(_) | Self::Validation(_) | Self::InvalidPosition(_) => 400,

            // 401 Unauthorized
            Self::Unauthorized(_) => 401,

            // 404 Not Found
            Self::RecordNotFound(_) => 404,

            // 502 Bad Gateway
            Self::GridApi { .. } | Self::GridAuth(_) | Self::HttpClient(_) => 502,

            // 504 Gateway Timeout
            Self::Timeout(_) => 504,

            // 500 Internal Server Error
            Self::Configuration(_)
            | Self::InvalidConfig { .. }
            | Self::MissingConfig(_)
            | Self::Database(_)
            | Self::Sqlite(_)
            | Self::Io(_)
            | Self::Serialization(_)
            | Self::Internal(_)
            | Self::Other(_) => 500,
        }
    }

    /// Whether the failure came from the relational store
    pub fn is_store_error(&self) -> bool {
        matches!(
            self,
            Self::Database(_) | Self::Sqlite(_) | Self::RecordNotFound(_)
        )
    }

    /// Whether the failure came from the external grid
    pub fn is_grid_error(&self) -> bool {
        matches!(
            self,
            Self::GridApi { .. }
                | Self::GridAuth(_)
                | Self::InvalidPosition(_)
                | Self::HttpClient(_)
                | Self::Timeout(_)
        )
    }

    /// Message exposed to API callers
    ///
    /// Authorization failures never echo the reason back.
    pub fn public_message(&self) -> String {
        match self {
            Self::Unauthorized(_) => "Unauthorized".to_string(),
            Self::Sqlite(err) => match err.as_database_error() {
                Some(db_err) => db_err.message().to_string(),
                None => err.to_string(),
            },
            _ => self.to_string(),
        }
    }

    /// Convert to the JSON error body
    pub fn to_error_body(&self) -> ErrorBody {
        ErrorBody::new(self.public_message())
    }
}

// Conversion traits for common error types
impl From<serde_json::Error> for SummitError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for SummitError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            let target = err
                .url()
                .and_then(|u| u.host_str().map(str::to_string))
                .unwrap_or_else(|| "remote service".to_string());
            Self::Timeout(target)
        } else {
            Self::HttpClient(err.to_string())
        }
    }
}

impl From<figment::Error> for SummitError {
    fn from(err: figment::Error) -> Self {
        Self::Configuration(err.to_string())
    }
}

// Helper macros for creating errors
#[macro_export]
macro_rules! config_error {
    ($msg:expr) => {
        $crate::SummitError::Configuration($msg.to_string())
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::SummitError::Configuration(format!($fmt, $($arg)*))
    };
}

#[macro_export]
macro_rules! validation_error {
    ($msg:expr) => {
        $crate::SummitError::Validation($msg.to_string())
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::SummitError::Validation(format!($fmt, $($arg)*))
    };
}

// ============================================================================
// Axum integration
// ============================================================================

#[cfg(feature = "axum-support")]
mod http {
    use super::SummitError;
    use axum::{
        http::StatusCode,
        response::{IntoResponse, Json, Response},
    };

    impl IntoResponse for SummitError {
        fn into_response(self) -> Response {
            let status =
                StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

            if status.is_server_error() {
                tracing::error!("Request failed: {}", self);
            } else {
                tracing::debug!("Request rejected: {}", self);
            }

            (status, Json(self.to_error_body())).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(SummitError::Unauthorized("bad secret".into()).status_code(), 401);
        assert_eq!(SummitError::RecordNotFound("id-1".into()).status_code(), 404);
        assert_eq!(
            SummitError::GridApi {
                status: 403,
                message: "forbidden".into()
            }
            .status_code(),
            502
        );
        assert_eq!(SummitError::Timeout("sheets".into()).status_code(), 504);
        assert_eq!(SummitError::Database("locked".into()).status_code(), 500);
    }

    #[test]
    fn test_unauthorized_hides_reason() {
        let err = SummitError::Unauthorized("secret mismatch".into());
        assert_eq!(err.to_error_body(), ErrorBody::new("Unauthorized"));
    }

    #[test]
    fn test_error_categories() {
        assert!(SummitError::RecordNotFound("x".into()).is_store_error());
        assert!(!SummitError::RecordNotFound("x".into()).is_grid_error());
        assert!(SummitError::InvalidPosition(1).is_grid_error());
        assert!(SummitError::Timeout("sheets".into()).is_grid_error());
    }

    #[test]
    fn test_error_macros() {
        let err = config_error!("missing {}", "grid.spreadsheet_id");
        assert_eq!(
            err.to_string(),
            "Configuration error: missing grid.spreadsheet_id"
        );

        let err = validation_error!("bad value");
        assert!(matches!(err, SummitError::Validation(_)));
    }

    #[test]
    fn test_error_body_serialization() {
        let body = SummitError::Validation("name required".into()).to_error_body();
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["error"], "Validation failed: name required");
    }
}
