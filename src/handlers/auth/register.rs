use axum::Json;
use axum::extract::State;
use validator::Validate;

use crate::AppState;
use crate::data::models::{ApiError, UserCreate, UserOut};
use crate::data::repositories::UserRepository;
use crate::utils::AppJson;

pub async fn handle_register(
    State(state): State<AppState>,
    AppJson(form): AppJson<UserCreate>,
) -> Result<Json<UserOut>, ApiError> {
    form.validate()?;

    let mut conn = state.pool.get()?;

    if UserRepository::username_exists(&mut conn, &form.username)? {
        log::warn!("Registration attempt with existing username: {}", form.username);
        return Err(ApiError::validation("Username already registered"));
    }
    if UserRepository::email_exists(&mut conn, &form.email)? {
        log::warn!("Registration attempt with existing email: {}", form.email);
        return Err(ApiError::validation("Email already registered"));
    }

    let password_hash = UserRepository::hash_password(&form.password)?;
    let user = UserRepository::create_user(&mut conn, &form.username, &form.email, &password_hash)
        .map_err(|e| {
            log::error!("User creation failed: {}", e);
            ApiError::from(e)
        })?;

    log::info!("New user registered: {}", user.username);
    Ok(Json(UserOut::from(&user)))
}
