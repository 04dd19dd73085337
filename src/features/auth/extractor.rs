use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;

use crate::AppState;
use crate::data::models::{ApiError, User};
use crate::data::repositories::UserRepository;
use crate::features::auth::token::verify_access_token;

/// The user a request's bearer token belongs to.
pub struct AuthUser(pub User);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::Unauthorized)?;

        let username = verify_access_token(bearer.token(), &state.config.jwt_secret)?;

        let mut conn = state.pool.get()?;
        match UserRepository::find_by_username(&mut conn, &username)? {
            Some(user) => Ok(AuthUser(user)),
            None => {
                log::warn!("Token for unknown user: {}", username);
                Err(ApiError::Unauthorized)
            }
        }
    }
}
