use std::sync::Arc;

use super::telegram::TELEGRAM_API;
use super::{GoogleDriveStorage, GoogleOAuthConfig, StorageAdapter, StorageError, TelegramStorage};
use crate::data::models::{BookRow, GoogleCredentials, StorageKind, User, decode_column};

/// Resolves which storage backend serves a user or a stored book.
#[derive(Clone)]
pub struct StorageRegistry {
    client: reqwest::Client,
    app: Option<Arc<dyn StorageAdapter>>,
    google: Option<GoogleOAuthConfig>,
    telegram_api: String,
}

impl StorageRegistry {
    pub fn new(
        client: reqwest::Client,
        app: Option<Arc<dyn StorageAdapter>>,
        google: Option<GoogleOAuthConfig>,
    ) -> Self {
        Self {
            client,
            app,
            google,
            telegram_api: TELEGRAM_API.to_string(),
        }
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub fn google_oauth(&self) -> Option<&GoogleOAuthConfig> {
        self.google.as_ref()
    }

    pub fn telegram_api(&self) -> &str {
        &self.telegram_api
    }

    pub fn has_app_storage(&self) -> bool {
        self.app.is_some()
    }

    /// Backend for a new upload: the user's own storage when configured,
    /// otherwise app-managed storage.
    pub async fn for_user(&self, user: &User) -> Result<Arc<dyn StorageAdapter>, StorageError> {
        if user.has_own_storage() {
            if let Some(kind) = user.storage_type.as_deref().and_then(|s| s.parse().ok()) {
                return self.for_kind(kind, user).await;
            }
        }

        self.app.clone().ok_or_else(|| {
            StorageError::NotConfigured(
                "No storage available. Please configure Telegram or Google Drive in Settings."
                    .into(),
            )
        })
    }

    /// Backend recorded on an existing book, which may differ from the
    /// user's current preference.
    pub async fn for_book(
        &self,
        book: &BookRow,
        user: &User,
    ) -> Result<Arc<dyn StorageAdapter>, StorageError> {
        let kind = book
            .storage_type
            .parse()
            .map_err(StorageError::NotConfigured)?;
        self.for_kind(kind, user).await
    }

    pub async fn for_kind(
        &self,
        kind: StorageKind,
        user: &User,
    ) -> Result<Arc<dyn StorageAdapter>, StorageError> {
        match kind {
            StorageKind::Telegram => {
                let (Some(token), Some(chat_id)) = (
                    user.telegram_bot_token.as_deref(),
                    user.telegram_user_id.as_deref(),
                ) else {
                    return Err(StorageError::NotConfigured(
                        "Telegram storage is no longer configured".into(),
                    ));
                };
                Ok(Arc::new(TelegramStorage::with_api_base(
                    self.client.clone(),
                    &self.telegram_api,
                    token,
                    chat_id,
                )))
            }
            StorageKind::GoogleDrive => {
                let raw = user.google_credentials.as_deref().ok_or_else(|| {
                    StorageError::NotConfigured("Google Drive storage is no longer configured".into())
                })?;
                let mut credentials: GoogleCredentials =
                    decode_column(raw).map_err(|e| StorageError::Credentials(e.to_string()))?;
                if credentials.refresh_token.is_none() {
                    credentials.refresh_token = user.google_refresh_token.clone();
                }
                let drive =
                    GoogleDriveStorage::connect(self.client.clone(), &credentials, self.google.as_ref())
                        .await?;
                Ok(Arc::new(drive))
            }
            StorageKind::App => self.app.clone().ok_or_else(|| {
                StorageError::NotConfigured("App storage is not available".into())
            }),
        }
    }
}
