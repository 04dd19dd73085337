use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::{FileInfo, StorageAdapter, StorageError};
use crate::data::models::StorageKind;

pub const TELEGRAM_API: &str = "https://api.telegram.org";

/// Stores files as documents sent by the user's own bot to their chat.
pub struct TelegramStorage {
    client: reqwest::Client,
    api_base: String,
    bot_token: String,
    chat_id: String,
}

#[derive(Deserialize)]
struct TelegramResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

impl<T> TelegramResponse<T> {
    fn into_result(self, action: &str) -> Result<T, StorageError> {
        match (self.ok, self.result) {
            (true, Some(result)) => Ok(result),
            _ => Err(StorageError::Remote(format!(
                "Telegram {} failed: {}",
                action,
                self.description.unwrap_or_else(|| "no description".into())
            ))),
        }
    }
}

/// Decodes a Bot API reply. Error replies still carry a JSON `description`,
/// which is preferred over the bare HTTP status.
async fn read_reply<T: DeserializeOwned>(
    response: reqwest::Response,
    action: &str,
) -> Result<T, StorageError> {
    let status = response.status();
    match response.json::<TelegramResponse<T>>().await {
        Ok(reply) => reply.into_result(action),
        Err(_) if !status.is_success() => Err(StorageError::Remote(format!(
            "Telegram {} failed: HTTP {}",
            action, status
        ))),
        Err(e) => Err(e.into()),
    }
}

#[derive(Deserialize)]
struct SentMessage {
    document: Option<TelegramDocument>,
}

#[derive(Deserialize)]
struct TelegramDocument {
    file_id: String,
}

#[derive(Deserialize)]
struct TelegramFile {
    file_id: String,
    file_size: Option<i64>,
    file_path: Option<String>,
}

impl TelegramStorage {
    pub fn new(client: reqwest::Client, bot_token: &str, chat_id: &str) -> Self {
        Self::with_api_base(client, TELEGRAM_API, bot_token, chat_id)
    }

    pub fn with_api_base(
        client: reqwest::Client,
        api_base: &str,
        bot_token: &str,
        chat_id: &str,
    ) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            bot_token: bot_token.to_string(),
            chat_id: chat_id.to_string(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.bot_token, method)
    }

    async fn get_file(&self, file_id: &str) -> Result<TelegramFile, StorageError> {
        let response = self
            .client
            .post(self.method_url("getFile"))
            .form(&[("file_id", file_id)])
            .send()
            .await?;
        read_reply(response, "getFile").await
    }
}

/// Checks a bot token against `getMe`.
pub async fn verify_bot_token(
    client: &reqwest::Client,
    api_base: &str,
    bot_token: &str,
) -> Result<bool, StorageError> {
    let response = client
        .get(format!("{}/bot{}/getMe", api_base.trim_end_matches('/'), bot_token))
        .send()
        .await?;

    if !response.status().is_success() {
        return Ok(false);
    }

    let body: TelegramResponse<serde_json::Value> = response.json().await?;
    Ok(body.ok)
}

#[async_trait]
impl StorageAdapter for TelegramStorage {
    fn kind(&self) -> StorageKind {
        StorageKind::Telegram
    }

    async fn upload(
        &self,
        data: Vec<u8>,
        filename: &str,
        _owner_hint: &str,
    ) -> Result<String, StorageError> {
        let document = Part::bytes(data)
            .file_name(filename.to_string())
            .mime_str("application/pdf")?;
        let form = Form::new()
            .text("chat_id", self.chat_id.clone())
            .text("caption", format!("Flashcard Book: {}", filename))
            .part("document", document);

        let response = self
            .client
            .post(self.method_url("sendDocument"))
            .multipart(form)
            .send()
            .await?;
        let message: SentMessage = read_reply(response, "sendDocument").await?;

        message
            .document
            .map(|doc| doc.file_id)
            .ok_or_else(|| StorageError::Remote("Telegram reply carried no document".into()))
    }

    async fn download(&self, file_id: &str) -> Result<Vec<u8>, StorageError> {
        let file = self.get_file(file_id).await?;
        let path = file
            .file_path
            .ok_or_else(|| StorageError::Remote("Telegram file has no download path".into()))?;

        let response = self
            .client
            .get(format!("{}/file/bot{}/{}", self.api_base, self.bot_token, path))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(StorageError::Remote(format!(
                "Telegram download failed: HTTP {}",
                response.status()
            )));
        }
        Ok(response.bytes().await?.to_vec())
    }

    async fn delete(&self, file_id: &str) -> Result<bool, StorageError> {
        // The Bot API cannot remove a sent document, the record is dropped on our side only.
        log::info!("Telegram file {} left in chat, only the book record is removed", file_id);
        Ok(true)
    }

    async fn metadata(&self, file_id: &str) -> Result<FileInfo, StorageError> {
        let file = self.get_file(file_id).await?;
        Ok(FileInfo {
            file_id: file.file_id,
            file_name: file.file_path,
            file_size: file.file_size.unwrap_or(0),
            mime_type: None,
            created_time: None,
        })
    }
}
