//! Error types shared across the crate.
//!
//! Store and credential failures stay typed all the way up to the HTTP
//! layer, where [`AccountError`] picks the status code.

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Failure of the connection manager. `Init` is terminal for the process.
#[derive(Debug, Clone, Error)]
pub enum ConnectionError {
    #[error("database pool initialization failed: {0}")]
    Init(Arc<sqlx::Error>),

    #[error("database pool is closed")]
    Closed,
}

/// The password hasher could not produce a digest.
#[derive(Debug, Error)]
#[error("password hashing failed: {0}")]
pub struct HashingError(pub String);

#[derive(Debug, Error)]
pub enum StoreError {
    /// Unique constraint on `users.email` rejected the write.
    #[error("user {0} already exists")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Maps a driver error, recognising unique violations as conflicts on `email`.
    pub(crate) fn from_write(err: sqlx::Error, email: &str) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Conflict(email.to_string())
            }
            _ => StoreError::Database(err),
        }
    }
}

/// Outcome of an account operation as seen by the request layer.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("{0}")]
    Validation(String),

    #[error("User already exists")]
    Conflict(String),

    #[error("User not found")]
    NotFound,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error(transparent)]
    Hashing(#[from] HashingError),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for AccountError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(email) => AccountError::Conflict(email),
            other => AccountError::Store(other),
        }
    }
}

pub type AccountResult<T> = Result<T, AccountError>;

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl AccountError {
    pub fn status(&self) -> StatusCode {
        match self {
            AccountError::Validation(_) => StatusCode::BAD_REQUEST,
            AccountError::Conflict(_) => StatusCode::CONFLICT,
            AccountError::NotFound => StatusCode::NOT_FOUND,
            AccountError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AccountError::Hashing(_) | AccountError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn user_message(&self) -> String {
        match self {
            AccountError::Hashing(e) => {
                error!(error = %e, "hashing failed");
                "Error hashing password".to_string()
            }
            AccountError::Store(e) => {
                error!(error = %e, "store failure");
                "Internal storage error".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AccountError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.user_message(),
        };
        (status, Json(body)).into_response()
    }
}
