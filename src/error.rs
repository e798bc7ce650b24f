use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::json_response;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    AuthError(#[from] AuthError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] DatabaseError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl AppError {
    /// Text placed in the `error` field of the response body. Storage and
    /// internal failures are reported generically; details go to the log.
    pub fn message(&self) -> String {
        match self {
            AppError::AuthError(e) => e.to_string(),
            AppError::DatabaseError(DatabaseError::ConnectionError(_))
            | AppError::DatabaseError(DatabaseError::QueryError(_)) => "db response error".into(),
            AppError::DatabaseError(e) => e.to_string(),
            AppError::ValidationError(msg) => msg.clone(),
            AppError::ConfigError(_) | AppError::InternalError(_) => "internal server error".into(),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        AppError::AuthError(AuthError::Unauthorized(err))
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::DatabaseError(DatabaseError::from(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(err.to_string())
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        json_response(self.status_code(), &json!({ "error": self.message() }))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::AuthError(AuthError::InvalidCredentials) => StatusCode::BAD_REQUEST,
            AppError::AuthError(_) => StatusCode::UNAUTHORIZED,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::DatabaseError(DatabaseError::ConnectionError(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            // Storage failures stay 400 for compatibility with existing clients.
            AppError::DatabaseError(_) => StatusCode::BAD_REQUEST,
            AppError::ConfigError(_) | AppError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("empty auth header")]
    EmptyAuthHeader,

    #[error("invalid auth header")]
    InvalidAuthHeader,

    #[error("empty token")]
    EmptyToken,

    /// Token rejected by the codec. The kind is kept for logs, the client
    /// only ever sees "unauthorized".
    #[error("unauthorized")]
    Unauthorized(#[source] TokenError),

    #[error("unauthorized")]
    MissingCaller,

    #[error("no such user")]
    InvalidCredentials,
}

/// Why a token failed verification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("bad token signature")]
    BadSignature,

    #[error("token expired")]
    Expired,
}

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("no {entity} with id '{key}'")]
    NotFound { entity: &'static str, key: String },

    #[error("{entity} '{value}' already exists")]
    Duplicate { entity: &'static str, value: String },
}

impl DatabaseError {
    /// Classifies a driver error in the context of one entity lookup or write.
    pub fn classify(err: sqlx::Error, entity: &'static str, key: impl ToString) -> Self {
        match err {
            sqlx::Error::RowNotFound => DatabaseError::NotFound {
                entity,
                key: key.to_string(),
            },
            sqlx::Error::Database(ref db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                DatabaseError::Duplicate {
                    entity,
                    value: key.to_string(),
                }
            }
            other => DatabaseError::from(other),
        }
    }
}

const UNIQUE_VIOLATION: &str = "23505";

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                DatabaseError::ConnectionError(err.to_string())
            }
            _ => DatabaseError::QueryError(err.to_string()),
        }
    }
}
