use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde_json::json;

use super::{FileInfo, StorageAdapter, StorageError};
use crate::data::models::{GoogleCredentials, StorageKind};

const AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const DRIVE_API: &str = "https://www.googleapis.com/drive/v3";
const DRIVE_UPLOAD_API: &str = "https://www.googleapis.com/upload/drive/v3";
pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive.file";

/// OAuth client registered for the Drive integration.
#[derive(Debug, Clone)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    scope: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    id: String,
    name: Option<String>,
    size: Option<String>,
    created_time: Option<String>,
    mime_type: Option<String>,
}

impl GoogleOAuthConfig {
    /// Consent page URL; `state` comes back untouched on the callback.
    pub fn authorization_url(&self, state: &str) -> Result<String, StorageError> {
        let url = Url::parse_with_params(
            AUTH_URI,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", DRIVE_SCOPE),
                ("access_type", "offline"),
                ("include_granted_scopes", "true"),
                ("prompt", "consent"),
                ("state", state),
            ],
        )
        .map_err(|e| StorageError::Remote(format!("Bad OAuth URL: {}", e)))?;
        Ok(url.into())
    }

    pub async fn exchange_code(
        &self,
        client: &reqwest::Client,
        code: &str,
    ) -> Result<GoogleCredentials, StorageError> {
        let token: TokenResponse = client
            .post(TOKEN_URI)
            .form(&[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(GoogleCredentials {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            token_uri: TOKEN_URI.to_string(),
            scopes: token
                .scope
                .map(|s| s.split_whitespace().map(str::to_string).collect())
                .unwrap_or_else(|| vec![DRIVE_SCOPE.to_string()]),
        })
    }

    async fn refresh(
        &self,
        client: &reqwest::Client,
        credentials: &GoogleCredentials,
        refresh_token: &str,
    ) -> Result<String, StorageError> {
        let token: TokenResponse = client
            .post(&credentials.token_uri)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(token.access_token)
    }
}

/// Stores files in the user's own Google Drive.
pub struct GoogleDriveStorage {
    client: reqwest::Client,
    access_token: String,
    drive_api: String,
    upload_api: String,
}

impl GoogleDriveStorage {
    /// Builds an adapter, refreshing the access token when a refresh token
    /// and an OAuth client are both available.
    pub async fn connect(
        client: reqwest::Client,
        credentials: &GoogleCredentials,
        oauth: Option<&GoogleOAuthConfig>,
    ) -> Result<Self, StorageError> {
        let access_token = match (oauth, credentials.refresh_token.as_deref()) {
            (Some(oauth), Some(refresh_token)) => {
                oauth.refresh(&client, credentials, refresh_token).await?
            }
            _ => credentials.access_token.clone(),
        };
        Ok(Self::with_endpoints(client, &access_token, DRIVE_API, DRIVE_UPLOAD_API))
    }

    pub fn with_endpoints(
        client: reqwest::Client,
        access_token: &str,
        drive_api: &str,
        upload_api: &str,
    ) -> Self {
        Self {
            client,
            access_token: access_token.to_string(),
            drive_api: drive_api.trim_end_matches('/').to_string(),
            upload_api: upload_api.trim_end_matches('/').to_string(),
        }
    }

    fn file_url(&self, file_id: &str) -> Result<Url, StorageError> {
        if file_id.is_empty() || !file_id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(StorageError::InvalidFileId(file_id.to_string()));
        }
        Url::parse(&format!("{}/files/{}", self.drive_api, file_id))
            .map_err(|_| StorageError::InvalidFileId(file_id.to_string()))
    }

    async fn describe(&self, file_id: &str, filename: &str, owner_hint: &str) -> Result<(), StorageError> {
        self.client
            .patch(self.file_url(file_id)?)
            .bearer_auth(&self.access_token)
            .json(&json!({
                "name": filename,
                "description": format!("Flashcard book uploaded by user {}", owner_hint),
            }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for GoogleDriveStorage {
    fn kind(&self) -> StorageKind {
        StorageKind::GoogleDrive
    }

    async fn upload(
        &self,
        data: Vec<u8>,
        filename: &str,
        owner_hint: &str,
    ) -> Result<String, StorageError> {
        let created: DriveFile = self
            .client
            .post(format!("{}/files?uploadType=media&fields=id", self.upload_api))
            .bearer_auth(&self.access_token)
            .header(reqwest::header::CONTENT_TYPE, "application/pdf")
            .body(data)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        // Nothing references the file yet, remove it if naming fails.
        if let Err(e) = self.describe(&created.id, filename, owner_hint).await {
            if let Err(cleanup) = self.delete(&created.id).await {
                log::error!("Could not remove unnamed Drive file {}: {}", created.id, cleanup);
            }
            return Err(e);
        }

        Ok(created.id)
    }

    async fn download(&self, file_id: &str) -> Result<Vec<u8>, StorageError> {
        let mut url = self.file_url(file_id)?;
        url.query_pairs_mut().append_pair("alt", "media");

        let bytes = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(bytes.to_vec())
    }

    async fn delete(&self, file_id: &str) -> Result<bool, StorageError> {
        let response = self
            .client
            .delete(self.file_url(file_id)?)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        response.error_for_status()?;
        Ok(true)
    }

    async fn metadata(&self, file_id: &str) -> Result<FileInfo, StorageError> {
        let mut url = self.file_url(file_id)?;
        url.query_pairs_mut()
            .append_pair("fields", "id,name,size,createdTime,mimeType");

        let file: DriveFile = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(FileInfo {
            file_id: file.id,
            file_name: file.name,
            file_size: file.size.and_then(|s| s.parse().ok()).unwrap_or(0),
            mime_type: file.mime_type,
            created_time: file.created_time,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::storage::serve;
    use axum::extract::Path;
    use axum::http::StatusCode as AxumStatus;
    use axum::routing::{patch, post};
    use axum::{Json, Router};
    use std::sync::{Arc, Mutex};

    fn oauth() -> GoogleOAuthConfig {
        GoogleOAuthConfig {
            client_id: "client-123".into(),
            client_secret: "secret".into(),
            redirect_uri: "http://localhost:8000/storage/oauth2callback".into(),
        }
    }

    #[test]
    fn authorization_url_carries_state_and_offline_access() {
        let url = Url::parse(&oauth().authorization_url("signed-state").unwrap()).unwrap();
        let params: Vec<(String, String)> = url.query_pairs().into_owned().collect();

        assert!(params.contains(&("state".into(), "signed-state".into())));
        assert!(params.contains(&("access_type".into(), "offline".into())));
        assert!(params.contains(&("client_id".into(), "client-123".into())));
        assert!(params.contains(&("scope".into(), DRIVE_SCOPE.into())));
    }

    #[test]
    fn file_ids_with_path_characters_are_rejected() {
        let storage = GoogleDriveStorage::with_endpoints(reqwest::Client::new(), "t", DRIVE_API, DRIVE_UPLOAD_API);
        assert!(storage.file_url("1AbC-d_9").is_ok());
        assert!(storage.file_url("../etc").is_err());
        assert!(storage.file_url("").is_err());
    }

    #[tokio::test]
    async fn failed_rename_deletes_the_uploaded_file() {
        let deleted = Arc::new(Mutex::new(Vec::<String>::new()));
        let seen = deleted.clone();
        let router = Router::new()
            .route(
                "/upload/files",
                post(|| async { Json(json!({ "id": "drive123" })) }),
            )
            .route(
                "/drive/files/{id}",
                patch(|| async { AxumStatus::INTERNAL_SERVER_ERROR }).delete(
                    move |Path(id): Path<String>| async move {
                        seen.lock().unwrap().push(id);
                        AxumStatus::NO_CONTENT
                    },
                ),
            );
        let base = serve(router).await;
        let storage = GoogleDriveStorage::with_endpoints(
            reqwest::Client::new(),
            "access",
            &format!("{base}/drive"),
            &format!("{base}/upload"),
        );

        let err = storage
            .upload(b"%PDF-1.5".to_vec(), "book.pdf", "7")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Http(_)));
        assert_eq!(*deleted.lock().unwrap(), vec!["drive123".to_string()]);
    }

    #[tokio::test]
    async fn successful_upload_keeps_the_file() {
        let deleted = Arc::new(Mutex::new(0usize));
        let seen = deleted.clone();
        let router = Router::new()
            .route(
                "/upload/files",
                post(|| async { Json(json!({ "id": "drive123" })) }),
            )
            .route(
                "/drive/files/{id}",
                patch(|| async { Json(json!({ "id": "drive123" })) }).delete(move || async move {
                    *seen.lock().unwrap() += 1;
                    AxumStatus::NO_CONTENT
                }),
            );
        let base = serve(router).await;
        let storage = GoogleDriveStorage::with_endpoints(
            reqwest::Client::new(),
            "access",
            &format!("{base}/drive"),
            &format!("{base}/upload"),
        );

        let id = storage.upload(b"%PDF-1.5".to_vec(), "book.pdf", "7").await.unwrap();
        assert_eq!(id, "drive123");
        assert_eq!(*deleted.lock().unwrap(), 0);
    }
}
