//! Pluggable file storage for uploaded books.
//!
//! Every backend implements [`StorageAdapter`]; [`StorageRegistry`] picks the
//! one that applies to a user or to an already stored book.

pub mod google_drive;
pub mod local;
pub mod registry;
pub mod telegram;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::data::models::StorageKind;

pub use google_drive::{GoogleDriveStorage, GoogleOAuthConfig};
pub use local::LocalStorage;
pub use registry::StorageRegistry;
pub use telegram::TelegramStorage;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("{0}")]
    NotConfigured(String),
    #[error("invalid file id {0}")]
    InvalidFileId(String),
    #[error("stored credentials are unreadable: {0}")]
    Credentials(String),
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),
    #[error("{0}")]
    Remote(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// Telegram puts the bot token in the request path, keep URLs out of messages and logs.
impl From<reqwest::Error> for StorageError {
    fn from(err: reqwest::Error) -> Self {
        StorageError::Http(err.without_url())
    }
}

/// Metadata reported by a backend for one stored file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileInfo {
    pub file_id: String,
    pub file_name: Option<String>,
    pub file_size: i64,
    pub mime_type: Option<String>,
    pub created_time: Option<String>,
}

#[async_trait]
pub trait StorageAdapter: Send + Sync {
    fn kind(&self) -> StorageKind;

    /// Stores `data` and returns the backend's identifier for it.
    /// `owner_hint` groups files per user where the backend supports it.
    async fn upload(
        &self,
        data: Vec<u8>,
        filename: &str,
        owner_hint: &str,
    ) -> Result<String, StorageError>;

    async fn download(&self, file_id: &str) -> Result<Vec<u8>, StorageError>;

    /// Returns `false` when the file was already gone.
    async fn delete(&self, file_id: &str) -> Result<bool, StorageError>;

    async fn metadata(&self, file_id: &str) -> Result<FileInfo, StorageError>;
}

/// Serves `router` on an ephemeral local port and returns its base URL.
#[cfg(test)]
pub(crate) async fn serve(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
    format!("http://{}", addr)
}
