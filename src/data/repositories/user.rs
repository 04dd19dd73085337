use bcrypt::{DEFAULT_COST, hash, verify};
use chrono::Utc;
use diesel::prelude::*;

use crate::data::models::{NewUser, StorageKind, User};
use crate::schema::users;

pub struct UserRepository;

impl UserRepository {
    pub fn find_by_id(conn: &mut SqliteConnection, user_id: i32) -> QueryResult<Option<User>> {
        users::table
            .find(user_id)
            .select(User::as_select())
            .first(conn)
            .optional()
    }

    pub fn find_by_username(
        conn: &mut SqliteConnection,
        username: &str,
    ) -> QueryResult<Option<User>> {
        users::table
            .filter(users::username.eq(username))
            .select(User::as_select())
            .first(conn)
            .optional()
    }

    pub fn username_exists(conn: &mut SqliteConnection, username: &str) -> QueryResult<bool> {
        use diesel::dsl::exists;

        diesel::select(exists(users::table.filter(users::username.eq(username)))).get_result(conn)
    }

    pub fn email_exists(conn: &mut SqliteConnection, email: &str) -> QueryResult<bool> {
        use diesel::dsl::exists;

        diesel::select(exists(users::table.filter(users::email.eq(email)))).get_result(conn)
    }

    pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
        hash(password, DEFAULT_COST)
    }

    pub fn verify_password(
        stored_hash: &str,
        input_password: &str,
    ) -> Result<bool, bcrypt::BcryptError> {
        verify(input_password, stored_hash)
    }

    /// Inserts a user whose password is already hashed.
    pub fn create_user(
        conn: &mut SqliteConnection,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> QueryResult<User> {
        diesel::insert_into(users::table)
            .values(&NewUser {
                username,
                email,
                password: password_hash,
                date_created: Utc::now().naive_utc(),
            })
            .execute(conn)?;

        users::table
            .filter(users::username.eq(username))
            .select(User::as_select())
            .first(conn)
    }

    pub fn set_telegram_storage(
        conn: &mut SqliteConnection,
        user_id: i32,
        bot_token: &str,
        chat_id: &str,
    ) -> QueryResult<usize> {
        diesel::update(users::table.find(user_id))
            .set((
                users::storage_type.eq(Some(StorageKind::Telegram.as_str())),
                users::telegram_bot_token.eq(Some(bot_token)),
                users::telegram_user_id.eq(Some(chat_id)),
            ))
            .execute(conn)
    }

    pub fn set_google_storage(
        conn: &mut SqliteConnection,
        user_id: i32,
        credentials_json: &str,
        refresh_token: Option<&str>,
    ) -> QueryResult<usize> {
        diesel::update(users::table.find(user_id))
            .set((
                users::storage_type.eq(Some(StorageKind::GoogleDrive.as_str())),
                users::google_credentials.eq(Some(credentials_json)),
                users::google_refresh_token.eq(refresh_token),
            ))
            .execute(conn)
    }

    /// Forgets every storage credential of the user.
    pub fn clear_storage(conn: &mut SqliteConnection, user_id: i32) -> QueryResult<usize> {
        diesel::update(users::table.find(user_id))
            .set((
                users::storage_type.eq(None::<String>),
                users::telegram_bot_token.eq(None::<String>),
                users::telegram_user_id.eq(None::<String>),
                users::google_credentials.eq(None::<String>),
                users::google_refresh_token.eq(None::<String>),
            ))
            .execute(conn)
    }

    /// Applies a signed change to the usage counters, never dropping below zero.
    pub fn adjust_usage(
        conn: &mut SqliteConnection,
        user_id: i32,
        bytes_delta: i64,
        files_delta: i32,
    ) -> QueryResult<usize> {
        let user = users::table
            .find(user_id)
            .select(User::as_select())
            .first(conn)?;

        diesel::update(users::table.find(user_id))
            .set((
                users::storage_used_bytes.eq((user.storage_used_bytes + bytes_delta).max(0)),
                users::file_count.eq((user.file_count + files_delta).max(0)),
            ))
            .execute(conn)
    }
}
