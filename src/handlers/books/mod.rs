use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};

use crate::AppState;

mod books;
mod progress;

/// Request bodies above this never reach the quota checks.
const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(books::list_books).post(books::upload_book))
        .route("/upload", post(books::upload_book))
        .route(
            "/{book_id}",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        .route("/{book_id}/download", get(books::download_book))
        .route("/{book_id}/chapters", put(books::update_chapters))
        .route(
            "/{book_id}/progress",
            get(progress::get_progress).put(progress::update_progress),
        )
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}
