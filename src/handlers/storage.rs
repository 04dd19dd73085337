use axum::extract::State;
use axum::response::Redirect;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use validator::Validate;

use crate::AppState;
use crate::data::models::{
    ApiError, ApiResponse, GoogleDriveAuthResponse, OAuthCallbackParams, StorageConfigResponse,
    StorageKind, StorageQuota, TelegramStorageConfig, encode_column,
};
use crate::data::repositories::UserRepository;
use crate::features::auth::AuthUser;
use crate::features::auth::token::{create_oauth_state, verify_oauth_state};
use crate::features::storage::telegram::verify_bot_token;
use crate::utils::{AppJson, AppQuery};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/configure/telegram", post(configure_telegram))
        .route("/configure/google-drive/auth", get(google_drive_auth))
        .route("/oauth2callback", get(oauth_callback))
        .route("/config", get(storage_config))
        .route("/quota", get(storage_quota))
        .route("/disconnect", post(disconnect))
}

async fn configure_telegram(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<TelegramStorageConfig>,
) -> Result<Json<Value>, ApiError> {
    payload.validate()?;

    let valid = verify_bot_token(
        state.storage.client(),
        state.storage.telegram_api(),
        &payload.bot_token,
    )
    .await?;
    if !valid {
        return Err(ApiError::validation("Invalid Telegram bot token"));
    }

    let mut conn = state.pool.get()?;
    UserRepository::set_telegram_storage(&mut conn, user.user_id, &payload.bot_token, &payload.user_id)?;

    log::info!("User {} configured Telegram storage", user.user_id);
    Ok(Json(json!({
        "message": "Telegram storage configured successfully",
        "storage_type": StorageKind::Telegram.as_str(),
        "user_id": payload.user_id,
    })))
}

async fn google_drive_auth(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> Result<Json<GoogleDriveAuthResponse>, ApiError> {
    let oauth = state.storage.google_oauth().ok_or_else(|| {
        ApiError::ServiceUnavailable("Google Drive integration not configured on server".into())
    })?;

    let oauth_state = create_oauth_state(user.user_id, &state.config.jwt_secret)
        .map_err(|e| ApiError::Internal(format!("Could not sign OAuth state: {}", e)))?;
    let authorization_url = oauth.authorization_url(&oauth_state)?;

    Ok(Json(GoogleDriveAuthResponse {
        authorization_url,
        message: "Visit this URL to authorize Google Drive access".into(),
    }))
}

/// Google redirects here without a bearer token; the signed state names the user.
async fn oauth_callback(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<OAuthCallbackParams>,
) -> Result<Redirect, ApiError> {
    let oauth = state.storage.google_oauth().ok_or_else(|| {
        ApiError::ServiceUnavailable("Google Drive integration not configured on server".into())
    })?;
    let user_id = verify_oauth_state(&params.state, &state.config.jwt_secret)?;

    let user = {
        let mut conn = state.pool.get()?;
        UserRepository::find_by_id(&mut conn, user_id)?.ok_or_else(|| ApiError::not_found("User"))?
    };

    let credentials = oauth.exchange_code(state.storage.client(), &params.code).await?;
    let encoded = encode_column(&credentials)?;

    let mut conn = state.pool.get()?;
    UserRepository::set_google_storage(
        &mut conn,
        user.user_id,
        &encoded,
        credentials.refresh_token.as_deref(),
    )?;

    log::info!("User {} connected Google Drive storage", user.user_id);
    Ok(Redirect::to(&format!(
        "{}/settings/storage?success=true",
        state.config.frontend_url.trim_end_matches('/')
    )))
}

async fn storage_config(AuthUser(user): AuthUser) -> Json<StorageConfigResponse> {
    Json(StorageConfigResponse {
        storage_type: user.storage_type.clone(),
        is_configured: user.has_own_storage(),
        quota: StorageQuota::from(&user),
    })
}

async fn storage_quota(AuthUser(user): AuthUser) -> Json<StorageQuota> {
    Json(StorageQuota::from(&user))
}

async fn disconnect(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse>, ApiError> {
    if user.file_count > 0 {
        return Err(ApiError::validation(
            "Cannot disconnect storage while you have uploaded files. Delete all files first.",
        ));
    }

    let mut conn = state.pool.get()?;
    UserRepository::clear_storage(&mut conn, user.user_id)?;

    log::info!("User {} disconnected storage", user.user_id);
    Ok(Json(ApiResponse::ok("Storage disconnected successfully")))
}
