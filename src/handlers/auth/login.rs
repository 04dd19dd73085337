use axum::Json;
use axum::extract::State;

use crate::AppState;
use crate::data::models::{ApiError, LoginForm, Token, UserOut};
use crate::data::repositories::UserRepository;
use crate::features::auth::AuthUser;
use crate::features::auth::token::create_access_token;
use crate::utils::AppForm;

pub async fn handle_login(
    State(state): State<AppState>,
    AppForm(form): AppForm<LoginForm>,
) -> Result<Json<Token>, ApiError> {
    let mut conn = state.pool.get()?;

    let Some(user) = UserRepository::find_by_username(&mut conn, &form.username)? else {
        log::warn!("User not found: {}", form.username);
        return Err(ApiError::InvalidCredentials);
    };

    let is_valid = UserRepository::verify_password(&user.password, &form.password).map_err(|e| {
        log::error!("Password verification failed: {}", e);
        ApiError::HashingError(e)
    })?;
    if !is_valid {
        log::warn!("Invalid password for user: {}", form.username);
        return Err(ApiError::InvalidCredentials);
    }

    let token = create_access_token(
        &user.username,
        &state.config.jwt_secret,
        state.config.access_token_expire_minutes,
    )
    .map_err(|e| ApiError::Internal(format!("Could not sign token: {}", e)))?;

    Ok(Json(Token::bearer(token)))
}

pub async fn current_user(AuthUser(user): AuthUser) -> Json<UserOut> {
    Json(UserOut::from(&user))
}
