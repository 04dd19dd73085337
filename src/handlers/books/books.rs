use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::header;
use axum::response::IntoResponse;
use chrono::Utc;
use diesel::{Connection, SqliteConnection};
use validator::Validate;

use crate::AppState;
use crate::data::models::book_models::{BookChangeset, validate_chapters};
use crate::data::models::{
    ApiError, BookListParams, BookResponse, BookRow, BookUpdate, Chapter, Detail, NewBook, User,
    encode_column,
};
use crate::data::repositories::{BookRepository, ProgressRepository, UserRepository};
use crate::features::auth::AuthUser;
use crate::features::generation::pdf;
use crate::features::storage::StorageError;
use crate::utils::{AppJson, AppPath, AppQuery};

const MB: f64 = 1024.0 * 1024.0;

struct UploadForm {
    filename: String,
    data: Vec<u8>,
    title: String,
    target_language: Option<String>,
    native_language: Option<String>,
}

async fn read_upload(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let mut file = None;
    let mut title = None;
    let mut target_language = None;
    let mut native_language = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await?;
                file = Some((filename, data.to_vec()));
            }
            "title" => title = Some(field.text().await?),
            "target_language" => target_language = Some(field.text().await?),
            "native_language" => native_language = Some(field.text().await?),
            other => log::warn!("Ignoring unexpected upload field: {}", other),
        }
    }

    let (filename, data) = file.ok_or_else(|| ApiError::validation("file is required"))?;
    let title = title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::validation("title is required"))?;

    Ok(UploadForm {
        filename,
        data,
        title,
        target_language: target_language.filter(|s| !s.trim().is_empty()),
        native_language: native_language.filter(|s| !s.trim().is_empty()),
    })
}

/// Rejects uploads that break the user's plan limits.
fn check_quota(user: &User, size: i64) -> Result<(), ApiError> {
    if size > user.max_storage_bytes {
        return Err(ApiError::PayloadTooLarge(format!(
            "File too large. Maximum size for your tier is {:.0} MB",
            user.max_storage_bytes as f64 / MB
        )));
    }
    if user.file_count >= user.max_files {
        return Err(ApiError::validation(format!(
            "File limit reached ({} files). Delete some files or upgrade your plan.",
            user.max_files
        )));
    }
    if user.storage_used_bytes + size > user.max_storage_bytes {
        return Err(ApiError::validation(format!(
            "Insufficient storage space. You have {:.2} MB remaining.",
            (user.max_storage_bytes - user.storage_used_bytes) as f64 / MB
        )));
    }
    Ok(())
}

/// Records an uploaded book against fresh usage counters. The write lock is
/// taken up front so concurrent uploads see each other's counts.
fn store_book(conn: &mut SqliteConnection, new_book: &NewBook) -> Result<BookRow, ApiError> {
    conn.immediate_transaction(|conn| {
        let owner = UserRepository::find_by_id(conn, new_book.owner_id)?
            .ok_or_else(|| ApiError::not_found("User"))?;
        check_quota(&owner, new_book.file_size_bytes)?;

        let book = BookRepository::insert(conn, new_book)?;
        UserRepository::adjust_usage(conn, owner.user_id, new_book.file_size_bytes, 1)?;
        ProgressRepository::get_or_create(conn, owner.user_id, book.book_id)?;
        Ok(book)
    })
}

fn find_book(state: &AppState, user: &User, book_id: i32) -> Result<BookRow, ApiError> {
    let mut conn = state.pool.get()?;
    BookRepository::find(&mut conn, user.user_id, book_id)?.ok_or_else(|| ApiError::not_found("Book"))
}

pub async fn upload_book(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<BookResponse>, ApiError> {
    let upload = read_upload(multipart).await?;

    if !upload.filename.to_lowercase().ends_with(".pdf") {
        return Err(ApiError::validation("Only PDF files are accepted"));
    }
    let size = upload.data.len() as i64;
    check_quota(&user, size)?;

    let total_pages = pdf::page_count(&upload.data)
        .map_err(|e| ApiError::validation(format!("Could not read PDF: {}", e)))?;

    let adapter = state.storage.for_user(&user).await?;
    let file_id = adapter
        .upload(upload.data, &upload.filename, &user.user_id.to_string())
        .await?;

    let now = Utc::now().naive_utc();
    let new_book = NewBook {
        owner_id: user.user_id,
        title: upload.title,
        filename: upload.filename,
        file_size_bytes: size,
        total_pages,
        chapters: "[]".to_string(),
        storage_file_id: file_id.clone(),
        storage_type: adapter.kind().as_str().to_string(),
        target_language: upload.target_language,
        native_language: upload.native_language,
        date_created: now,
        last_edited: now,
    };

    let stored = state
        .pool
        .get()
        .map_err(ApiError::from)
        .and_then(|mut conn| store_book(&mut conn, &new_book));

    let book = match stored {
        Ok(book) => book,
        Err(e) => {
            if let Err(cleanup) = adapter.delete(&file_id).await {
                log::error!("Could not remove orphaned upload {}: {}", file_id, cleanup);
            }
            return Err(e);
        }
    };

    log::info!(
        "User {} uploaded book {} ({} pages) to {}",
        user.user_id,
        book.book_id,
        book.total_pages,
        book.storage_type
    );
    Ok(Json(BookResponse::try_from(book)?))
}

pub async fn list_books(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    AppQuery(params): AppQuery<BookListParams>,
) -> Result<Json<Vec<BookResponse>>, ApiError> {
    params.validate()?;

    let mut conn = state.pool.get()?;
    let books = BookRepository::list(&mut conn, user.user_id, params.skip, params.limit)?
        .into_iter()
        .map(BookResponse::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(books))
}

pub async fn get_book(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    AppPath(book_id): AppPath<i32>,
) -> Result<Json<BookResponse>, ApiError> {
    let book = find_book(&state, &user, book_id)?;
    Ok(Json(BookResponse::try_from(book)?))
}

pub async fn download_book(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    AppPath(book_id): AppPath<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let book = find_book(&state, &user, book_id)?;

    let adapter = state.storage.for_book(&book, &user).await?;
    let data = adapter.download(&book.storage_file_id).await?;

    let disposition = format!("attachment; filename=\"{}\"", book.filename.replace('"', "_"));
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        data,
    ))
}

fn apply_update(
    state: &AppState,
    user: &User,
    book_id: i32,
    changes: BookChangeset,
) -> Result<Json<BookResponse>, ApiError> {
    let mut conn = state.pool.get()?;
    let book = BookRepository::update(&mut conn, user.user_id, book_id, &changes)?
        .ok_or_else(|| ApiError::not_found("Book"))?;
    Ok(Json(BookResponse::try_from(book)?))
}

pub async fn update_book(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    AppPath(book_id): AppPath<i32>,
    AppJson(payload): AppJson<BookUpdate>,
) -> Result<Json<BookResponse>, ApiError> {
    payload.validate()?;
    if let Some(chapters) = payload.chapters.as_deref() {
        validate_chapters(chapters)?;
    }

    let changes = BookChangeset {
        chapters: payload.chapters.as_ref().map(encode_column).transpose()?,
        title: payload.title,
        target_language: payload.target_language,
        native_language: payload.native_language,
        last_edited: Utc::now().naive_utc(),
    };
    apply_update(&state, &user, book_id, changes)
}

pub async fn update_chapters(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    AppPath(book_id): AppPath<i32>,
    AppJson(chapters): AppJson<Vec<Chapter>>,
) -> Result<Json<BookResponse>, ApiError> {
    validate_chapters(&chapters)?;

    let changes = BookChangeset {
        chapters: Some(encode_column(&chapters)?),
        title: None,
        target_language: None,
        native_language: None,
        last_edited: Utc::now().naive_utc(),
    };
    apply_update(&state, &user, book_id, changes)
}

pub async fn delete_book(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    AppPath(book_id): AppPath<i32>,
) -> Result<Json<Detail>, ApiError> {
    let book = find_book(&state, &user, book_id)?;

    match state.storage.for_book(&book, &user).await {
        Ok(adapter) => {
            if !adapter.delete(&book.storage_file_id).await? {
                log::warn!("Stored file {} was already gone", book.storage_file_id);
            }
        }
        Err(StorageError::NotConfigured(reason)) => {
            log::warn!("Skipping file removal for book {}: {}", book.book_id, reason);
        }
        Err(e) => return Err(e.into()),
    }

    let mut conn = state.pool.get()?;
    conn.transaction(|conn| {
        BookRepository::delete(conn, user.user_id, book.book_id)?;
        if book.file_size_bytes > 0 {
            UserRepository::adjust_usage(conn, user.user_id, -book.file_size_bytes, -1)?;
        }
        Ok::<_, diesel::result::Error>(())
    })?;

    log::info!("User {} deleted book {}", user.user_id, book.book_id);
    Ok(Json(Detail::new("Book and associated data deleted successfully")))
}
