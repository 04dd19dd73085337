use bcrypt::BcryptError;
use diesel::result::Error as DieselError;
use thiserror::Error;

use crate::features::generation::GenerationError;
use crate::features::storage::StorageError;

/// Every failure a handler can surface to the client.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("Could not validate credentials")]
    Unauthorized,
    #[error("Incorrect username or password")]
    InvalidCredentials,
    #[error("{0}")]
    PayloadTooLarge(String),
    #[error("{0}")]
    ServiceUnavailable(String),
    #[error("Database error")]
    DatabaseError(DieselError),
    #[error("Database pool error")]
    PoolError(r2d2::Error),
    #[error("Hashing error")]
    HashingError(BcryptError),
    #[error("Storage error")]
    StorageError(StorageError),
    #[error("Generation error")]
    GenerationError(GenerationError),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn not_found(what: &str) -> Self {
        ApiError::NotFound(what.to_string())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }
}
