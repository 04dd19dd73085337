use axum::Json;
use axum::extract::State;
use chrono::Utc;
use diesel::Connection;
use uuid::Uuid;
use validator::Validate;

use crate::AppState;
use crate::data::models::draft_models::NewDraft;
use crate::data::models::{
    ApiError, BookRow, DraftCardResponse, GenerateFromRangeRequest, GenerateNextBatchRequest,
    GenerationResponse, PageRange, User,
};
use crate::data::repositories::{BookRepository, DraftRepository, ProgressRepository};
use crate::features::auth::AuthUser;
use crate::features::generation::{GenerationRequest, pdf};
use crate::utils::AppJson;

fn owned_book(state: &AppState, user: &User, book_id: i32) -> Result<BookRow, ApiError> {
    let mut conn = state.pool.get()?;
    BookRepository::find(&mut conn, user.user_id, book_id)?.ok_or_else(|| ApiError::not_found("Book"))
}

/// Pages of the next batch, or `None` once the whole book is processed.
fn next_range(next_page: i32, num_pages: i32, total_pages: i32) -> Option<PageRange> {
    if next_page > total_pages {
        return None;
    }
    Some(PageRange::new(
        next_page,
        (next_page + num_pages - 1).min(total_pages),
    ))
}

fn check_range(start: i32, end: i32, total_pages: i32) -> Result<PageRange, ApiError> {
    if start > end {
        return Err(ApiError::validation("start_page must not exceed end_page"));
    }
    if end > total_pages {
        return Err(ApiError::validation(format!(
            "end_page exceeds book length ({} pages)",
            total_pages
        )));
    }
    Ok(PageRange::new(start, end))
}

/// Runs the generator over `range` and stores the result as one pending batch.
async fn generate_for_range(
    state: &AppState,
    user: &User,
    book: &BookRow,
    range: PageRange,
    num_cards: i32,
) -> Result<GenerationResponse, ApiError> {
    let adapter = state.storage.for_book(book, user).await?;
    let data = adapter.download(&book.storage_file_id).await?;
    let excerpt = pdf::extract_pages(&data, range.start, range.end)
        .map_err(|e| ApiError::validation(format!("Could not read PDF: {}", e)))?;

    let request = GenerationRequest::new(
        num_cards,
        book.target_language.as_deref(),
        book.native_language.as_deref(),
    );
    let generated = state.generator.generate(excerpt, &request).await?;

    let batch_id = Uuid::new_v4().to_string();
    let now = Utc::now().naive_utc();
    let chapters = book.chapter_list()?;
    let drafts = generated
        .iter()
        .map(|card| NewDraft::from_generated(user.user_id, book.book_id, card, range, &batch_id, now))
        .collect::<Result<Vec<_>, _>>()?;

    let mut conn = state.pool.get()?;
    let stored = conn.transaction(|conn| {
        let rows = DraftRepository::insert_batch(conn, &drafts, &batch_id)?;
        let progress = ProgressRepository::get_or_create(conn, user.user_id, book.book_id)?;
        let mut tracker = progress.state()?;
        tracker.record_range(range, &chapters);
        ProgressRepository::save(conn, progress.progress_id, &tracker)?;
        Ok::<_, diesel::result::Error>(rows)
    })?;

    log::info!(
        "Generated {} drafts for book {} pages {}-{} (batch {})",
        stored.len(),
        book.book_id,
        range.start,
        range.end,
        batch_id
    );

    let drafts = stored
        .into_iter()
        .map(DraftCardResponse::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(GenerationResponse {
        message: format!(
            "Generated {} draft cards from pages {}-{}",
            drafts.len(),
            range.start,
            range.end
        ),
        batch_id,
        drafts,
        pages_processed: range,
    })
}

pub async fn next_batch(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<GenerateNextBatchRequest>,
) -> Result<Json<GenerationResponse>, ApiError> {
    payload.validate()?;

    let book = owned_book(&state, &user, payload.book_id)?;
    let next_page = {
        let mut conn = state.pool.get()?;
        let progress = ProgressRepository::get_or_create(&mut conn, user.user_id, book.book_id)?;
        progress.state()?.next_unprocessed_page()
    };

    let range = next_range(next_page, payload.num_pages, book.total_pages)
        .ok_or_else(|| ApiError::validation("All pages of this book have been processed"))?;

    let response = generate_for_range(&state, &user, &book, range, payload.num_cards).await?;
    Ok(Json(response))
}

pub async fn from_range(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<GenerateFromRangeRequest>,
) -> Result<Json<GenerationResponse>, ApiError> {
    payload.validate()?;

    let book = owned_book(&state, &user, payload.book_id)?;
    let range = check_range(payload.start_page, payload.end_page, book.total_pages)?;

    let response = generate_for_range(&state, &user, &book, range, payload.num_cards).await?;
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_range_is_clamped_to_the_book() {
        assert_eq!(next_range(1, 5, 12), Some(PageRange::new(1, 5)));
        assert_eq!(next_range(11, 5, 12), Some(PageRange::new(11, 12)));
        assert_eq!(next_range(12, 5, 12), Some(PageRange::new(12, 12)));
        assert_eq!(next_range(13, 5, 12), None);
    }

    #[test]
    fn explicit_range_must_fit_the_book() {
        assert_eq!(check_range(2, 4, 10).unwrap(), PageRange::new(2, 4));
        assert_eq!(check_range(10, 10, 10).unwrap(), PageRange::new(10, 10));
        assert!(check_range(5, 4, 10).is_err());
        assert!(check_range(8, 11, 10).is_err());
    }
}
