// src/utils/error.rs

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub type DashboardResult<T> = Result<T, DashboardError>;

/// Custom error details for additional context
pub type ErrorDetails = HashMap<String, serde_json::Value>;

/// Main error type for the analytics engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardError {
    pub message: String,
    pub details: Option<Box<ErrorDetails>>,
    pub status: Option<u16>,
    pub error_code: Option<String>,
    pub kind: ErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    #[default]
    UnknownError,
    ValidationError,
    AuthenticationError,
    NotFoundError,
    DatabaseError,
    StorageError,
    ExternalServiceError,
    TimeoutError,
    ConfigurationError,
    SerializationError,
    DeserializationError,
    InternalServerError,
}

impl fmt::Display for DashboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for DashboardError {}

impl DashboardError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: None,
            status: None,
            error_code: None,
            kind,
        }
    }

    pub fn with_details(mut self, details: ErrorDetails) -> Self {
        self.details = Some(Box::new(details));
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_code(mut self, error_code: impl Into<String>) -> Self {
        self.error_code = Some(error_code.into());
        self
    }

    /// Status for the HTTP surface; unset kinds fall back to 500.
    pub fn status_code(&self) -> u16 {
        self.status.unwrap_or(500)
    }

    // Convenience constructors for common error types
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ValidationError, message)
            .with_status(400)
            .with_code("VALIDATION_ERROR")
    }

    pub fn authentication_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AuthenticationError, message)
            .with_status(401)
            .with_code("AUTH_ERROR")
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFoundError, message)
            .with_status(404)
            .with_code("NOT_FOUND")
    }

    pub fn database_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DatabaseError, message)
            .with_status(500)
            .with_code("DATABASE_ERROR")
    }

    pub fn storage_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::StorageError, message)
            .with_status(500)
            .with_code("STORAGE_ERROR")
    }

    /// One platform's remote call failed. Recovered inside the aggregator;
    /// only surfaced when no usable snapshot exists at all.
    pub fn adapter_error(platform: &str, message: impl Into<String>) -> Self {
        let mut details = ErrorDetails::new();
        details.insert(
            "platform".to_string(),
            serde_json::Value::String(platform.to_string()),
        );

        Self::new(ErrorKind::ExternalServiceError, message)
            .with_details(details)
            .with_status(502)
            .with_code("ADAPTER_ERROR")
    }

    pub fn timeout_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TimeoutError, message)
            .with_status(408)
            .with_code("TIMEOUT_ERROR")
    }

    pub fn config_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConfigurationError, message)
            .with_status(500)
            .with_code("CONFIG_ERROR")
    }

    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DeserializationError, message)
            .with_status(400)
            .with_code("PARSE_ERROR")
    }

    pub fn serialization_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SerializationError, message)
            .with_status(400)
            .with_code("SERIALIZATION_ERROR")
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InternalServerError, message)
            .with_status(500)
            .with_code("INTERNAL_ERROR")
    }
}

// Implement From conversions for common error types
impl From<serde_json::Error> for DashboardError {
    fn from(err: serde_json::Error) -> Self {
        DashboardError::parse_error(format!("JSON parsing error: {}", err))
    }
}

impl From<worker::Error> for DashboardError {
    fn from(err: worker::Error) -> Self {
        DashboardError::internal_error(format!("Worker error: {:?}", err))
    }
}

impl From<url::ParseError> for DashboardError {
    fn from(err: url::ParseError) -> Self {
        DashboardError::validation_error(format!("URL parse error: {}", err))
    }
}

impl From<String> for DashboardError {
    fn from(err: String) -> Self {
        Self::validation_error(err)
    }
}

impl From<&str> for DashboardError {
    fn from(err: &str) -> Self {
        Self::validation_error(err.to_string())
    }
}

// Conversion into worker::Error for handlers that bubble into the runtime
impl From<DashboardError> for worker::Error {
    fn from(err: DashboardError) -> Self {
        let message = if let Some(status_code) = err.status {
            format!(
                "[Status: {}] DashboardError (Kind: {:?}): {}",
                status_code, err.kind, err.message
            )
        } else {
            format!("DashboardError (Kind: {:?}): {}", err.kind, err.message)
        };

        worker::Error::RustError(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructor_status_codes() {
        assert_eq!(DashboardError::validation_error("x").status_code(), 400);
        assert_eq!(DashboardError::authentication_error("x").status_code(), 401);
        assert_eq!(DashboardError::not_found("x").status_code(), 404);
        assert_eq!(DashboardError::adapter_error("shopify", "x").status_code(), 502);
        assert_eq!(DashboardError::new(ErrorKind::UnknownError, "x").status_code(), 500);
    }

    #[test]
    fn test_adapter_error_carries_platform() {
        let err = DashboardError::adapter_error("meta-ads", "timeout");
        let details = err.details.expect("details");
        assert_eq!(
            details.get("platform"),
            Some(&serde_json::Value::String("meta-ads".to_string()))
        );
    }
}
