use chrono::NaiveDateTime;
use diesel::{Insertable, Queryable, Selectable};
use serde::Serialize;

use crate::schema::users;

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct User {
    pub user_id: i32,
    pub username: String,
    pub email: String,
    pub password: String,
    pub storage_type: Option<String>,
    pub telegram_bot_token: Option<String>,
    pub telegram_user_id: Option<String>,
    pub google_credentials: Option<String>,
    pub google_refresh_token: Option<String>,
    pub storage_used_bytes: i64,
    pub file_count: i32,
    pub max_files: i32,
    pub max_storage_bytes: i64,
    pub subscription_tier: String,
    pub date_created: NaiveDateTime,
}

impl User {
    /// Whether the user has connected a storage backend of their own.
    pub fn has_own_storage(&self) -> bool {
        self.storage_type.is_some()
            && (self.telegram_bot_token.is_some() || self.google_credentials.is_some())
    }
}

#[derive(Insertable)]
#[diesel(table_name = users)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub date_created: NaiveDateTime,
}

/// Public view of a user, never carries credentials.
#[derive(Debug, Serialize)]
pub struct UserOut {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub date_created: NaiveDateTime,
}

impl From<&User> for UserOut {
    fn from(user: &User) -> Self {
        Self {
            id: user.user_id,
            username: user.username.clone(),
            email: user.email.clone(),
            date_created: user.date_created,
        }
    }
}
