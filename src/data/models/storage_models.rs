use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::data::models::User;

/// Where a book's file lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageKind {
    Telegram,
    GoogleDrive,
    /// Application-managed storage used when the user configured nothing.
    App,
}

impl StorageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKind::Telegram => "telegram",
            StorageKind::GoogleDrive => "google_drive",
            StorageKind::App => "app",
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "telegram" => Ok(StorageKind::Telegram),
            "google_drive" => Ok(StorageKind::GoogleDrive),
            "app" => Ok(StorageKind::App),
            other => Err(format!("Unsupported storage type: {other}")),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct TelegramStorageConfig {
    #[validate(length(min = 10, message = "bot_token looks malformed"))]
    pub bot_token: String,
    #[validate(length(min = 1, message = "user_id must not be empty"))]
    pub user_id: String,
}

/// OAuth credentials persisted for the Google Drive backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoogleCredentials {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_uri: String,
    pub scopes: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StorageQuota {
    pub used_bytes: i64,
    pub max_bytes: i64,
    pub file_count: i32,
    pub max_files: i32,
    pub subscription_tier: String,
}

impl From<&User> for StorageQuota {
    fn from(user: &User) -> Self {
        Self {
            used_bytes: user.storage_used_bytes,
            max_bytes: user.max_storage_bytes,
            file_count: user.file_count,
            max_files: user.max_files,
            subscription_tier: user.subscription_tier.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StorageConfigResponse {
    pub storage_type: Option<String>,
    pub is_configured: bool,
    pub quota: StorageQuota,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GoogleDriveAuthResponse {
    pub authorization_url: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct OAuthCallbackParams {
    pub code: String,
    pub state: String,
}
