use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JSON body returned for every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ErrorShape {
    pub status: u16,
    pub error: String,
    pub message: String,
}

#[derive(Error, Debug)]
pub enum AccountError {
    #[error("Account with id [{id}] could not be found.")]
    AccountNotFound { id: i64 },

    #[error("The requested URL {path} was not found on the server.")]
    ResourceNotFound { path: String },

    #[error("{reason}")]
    DataValidation { reason: String },

    #[error("Content-Type must be application/json, got {}", .content_type.as_deref().unwrap_or("none"))]
    UnsupportedMediaType { content_type: Option<String> },

    #[error("The method is not allowed for the requested URL.")]
    MethodNotAllowed,

    #[error("The request body is larger than the server accepts.")]
    PayloadTooLarge,

    #[error("Store unavailable: {reason}")]
    StoreUnavailable { reason: String },

    #[error("Database error: {reason}")]
    DatabaseError { reason: String },

    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Configuration error: {reason}")]
    ConfigError { reason: String },

    #[error("Internal server error: {reason}")]
    InternalError { reason: String },
}

impl AccountError {
    pub fn to_error_shape(&self) -> ErrorShape {
        let status = self.http_status();
        // 5xx details stay in the logs
        let message = if status >= 500 {
            self.error_type().to_string()
        } else {
            self.to_string()
        };
        ErrorShape {
            status,
            error: self.error_type().to_string(),
            message,
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            AccountError::AccountNotFound { .. } => "Not Found",
            AccountError::ResourceNotFound { .. } => "Not Found",
            AccountError::DataValidation { .. } => "Bad Request",
            AccountError::UnsupportedMediaType { .. } => "Unsupported media type",
            AccountError::MethodNotAllowed => "Method not Allowed",
            AccountError::PayloadTooLarge => "Request Entity Too Large",
            AccountError::StoreUnavailable { .. } => "Service Unavailable",
            AccountError::DatabaseError { .. } => "Internal Server Error",
            AccountError::SqlxError(_) => "Internal Server Error",
            AccountError::ConfigError { .. } => "Internal Server Error",
            AccountError::InternalError { .. } => "Internal Server Error",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            AccountError::AccountNotFound { .. } => 404,
            AccountError::ResourceNotFound { .. } => 404,
            AccountError::DataValidation { .. } => 400,
            AccountError::UnsupportedMediaType { .. } => 415,
            AccountError::MethodNotAllowed => 405,
            AccountError::PayloadTooLarge => 413,
            AccountError::StoreUnavailable { .. } => 503,
            AccountError::DatabaseError { .. } => 500,
            AccountError::SqlxError(_) => 500,
            AccountError::ConfigError { .. } => 500,
            AccountError::InternalError { .. } => 500,
        }
    }
}
