use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::features::storage::GoogleOAuthConfig;

const DEV_JWT_SECRET: &str = "flashdeck-development-secret";
const DEFAULT_REDIRECT_URI: &str = "http://localhost:8000/storage/oauth2callback";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid {key} value: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub jwt_secret: String,
    pub access_token_expire_minutes: i64,
    pub app_storage_dir: Option<PathBuf>,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub google_oauth: Option<GoogleOAuthConfig>,
    pub frontend_url: String,
    pub cors_allowed_origin: Option<String>,
}

impl Config {
    /// Reads the process environment, `.env` included when the caller loaded it.
    pub fn load() -> Result<Self, ConfigError> {
        let google_oauth = match (optional("GOOGLE_CLIENT_ID"), optional("GOOGLE_CLIENT_SECRET")) {
            (Some(client_id), Some(client_secret)) => Some(GoogleOAuthConfig {
                client_id,
                client_secret,
                redirect_uri: try_load("GOOGLE_REDIRECT_URI", DEFAULT_REDIRECT_URI)?,
            }),
            _ => {
                log::info!("Google OAuth client not configured, Drive storage disabled");
                None
            }
        };

        Ok(Self {
            database_url: try_load("DATABASE_URL", "flashdeck.db")?,
            bind_addr: try_load("BIND_ADDR", "127.0.0.1:8000")?,
            jwt_secret: optional("JWT_SECRET").unwrap_or_else(|| {
                log::warn!("JWT_SECRET not set, using an insecure development secret");
                DEV_JWT_SECRET.to_string()
            }),
            access_token_expire_minutes: try_load("ACCESS_TOKEN_EXPIRE_MINUTES", "30")?,
            app_storage_dir: optional("APP_STORAGE_DIR").map(PathBuf::from),
            gemini_api_key: optional("GEMINI_API_KEY"),
            gemini_model: try_load("GEMINI_MODEL", "gemini-2.5-flash")?,
            google_oauth,
            frontend_url: try_load("FRONTEND_URL", "http://localhost:5173")?,
            cors_allowed_origin: optional("CORS_ALLOWED_ORIGIN"),
        })
    }

    /// Configuration with every optional integration switched off.
    pub fn with_secret(jwt_secret: &str) -> Self {
        Self {
            database_url: ":memory:".to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
            jwt_secret: jwt_secret.to_string(),
            access_token_expire_minutes: 30,
            app_storage_dir: None,
            gemini_api_key: None,
            gemini_model: "gemini-2.5-flash".to_string(),
            google_oauth: None,
            frontend_url: "http://localhost:5173".to_string(),
            cors_allowed_origin: None,
        }
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    optional(key)
        .unwrap_or_else(|| {
            log::info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e: T::Err| ConfigError::Invalid {
            key,
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_unset_keys() {
        let minutes: i64 = try_load("FLASHDECK_TEST_UNSET_MINUTES", "30").unwrap();
        assert_eq!(minutes, 30);
    }

    #[test]
    fn unparsable_default_is_reported_with_its_key() {
        let err = try_load::<i64>("FLASHDECK_TEST_UNSET_NUMBER", "thirty").unwrap_err();
        assert!(err.to_string().contains("FLASHDECK_TEST_UNSET_NUMBER"));
    }
}
