use chrono::{Duration, Utc};
use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Lifetime of the `state` handed to the Google consent screen.
const OAUTH_STATE_MINUTES: i64 = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    #[default]
    Access,
    OauthState,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    #[serde(default)]
    pub purpose: TokenPurpose,
}

fn sign(sub: String, purpose: TokenPurpose, ttl: Duration, secret: &str) -> Result<String, JwtError> {
    let claims = Claims {
        sub,
        exp: (Utc::now() + ttl).timestamp(),
        purpose,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

fn verify(token: &str, purpose: TokenPurpose, secret: &str) -> Result<Claims, JwtError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )?;
    if data.claims.purpose != purpose {
        return Err(ErrorKind::InvalidToken.into());
    }
    Ok(data.claims)
}

/// Signs a bearer token whose subject is the username.
pub fn create_access_token(username: &str, secret: &str, minutes: i64) -> Result<String, JwtError> {
    sign(
        username.to_string(),
        TokenPurpose::Access,
        Duration::minutes(minutes),
        secret,
    )
}

/// Returns the username carried by a valid access token.
pub fn verify_access_token(token: &str, secret: &str) -> Result<String, JwtError> {
    verify(token, TokenPurpose::Access, secret).map(|claims| claims.sub)
}

pub fn create_oauth_state(user_id: i32, secret: &str) -> Result<String, JwtError> {
    sign(
        user_id.to_string(),
        TokenPurpose::OauthState,
        Duration::minutes(OAUTH_STATE_MINUTES),
        secret,
    )
}

/// Returns the user id an OAuth `state` was issued for.
pub fn verify_oauth_state(state: &str, secret: &str) -> Result<i32, JwtError> {
    let claims = verify(state, TokenPurpose::OauthState, secret)?;
    claims
        .sub
        .parse()
        .map_err(|_| ErrorKind::InvalidSubject.into())
}
