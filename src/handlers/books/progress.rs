use axum::Json;
use axum::extract::State;
use validator::Validate;

use crate::AppState;
use crate::data::models::{ApiError, BookProgressResponse, BookProgressUpdate};
use crate::data::repositories::{BookRepository, ProgressRepository};
use crate::features::auth::AuthUser;
use crate::utils::{AppJson, AppPath};

pub async fn get_progress(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    AppPath(book_id): AppPath<i32>,
) -> Result<Json<BookProgressResponse>, ApiError> {
    let mut conn = state.pool.get()?;
    if BookRepository::find(&mut conn, user.user_id, book_id)?.is_none() {
        return Err(ApiError::not_found("Book"));
    }

    let progress = ProgressRepository::get_or_create(&mut conn, user.user_id, book_id)?;
    Ok(Json(progress.into_response()?))
}

/// Moves the reading position. Processed ranges only change through generation.
pub async fn update_progress(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    AppPath(book_id): AppPath<i32>,
    AppJson(payload): AppJson<BookProgressUpdate>,
) -> Result<Json<BookProgressResponse>, ApiError> {
    payload.validate()?;

    let mut conn = state.pool.get()?;
    if BookRepository::find(&mut conn, user.user_id, book_id)?.is_none() {
        return Err(ApiError::not_found("Book"));
    }
    let progress = ProgressRepository::find(&mut conn, user.user_id, book_id)?
        .ok_or_else(|| ApiError::not_found("Progress"))?;

    let mut tracker = progress.state()?;
    if let Some(page) = payload.current_page {
        tracker.current_page = page;
    }
    if let Some(chapter) = payload.current_chapter {
        tracker.current_chapter = Some(chapter);
    }

    let saved = ProgressRepository::save(&mut conn, progress.progress_id, &tracker)?;
    log::debug!("Book {} progress moved to page {}", book_id, saved.current_page);
    Ok(Json(saved.into_response()?))
}
