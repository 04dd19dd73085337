use axum::Router;
use axum::routing::{delete, get, post, put};

use crate::AppState;

mod drafts;
mod generate;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/next-batch", post(generate::next_batch))
        .route("/from-range", post(generate::from_range))
        .route("/drafts", get(drafts::list_drafts))
        .route("/drafts/rejected", delete(drafts::delete_rejected))
        .route("/drafts/bulk-approve", post(drafts::bulk_approve))
        .route("/drafts/{draft_id}", put(drafts::update_draft))
        .route("/drafts/{draft_id}/approve", post(drafts::approve_draft))
        .route("/drafts/{draft_id}/reject", post(drafts::reject_draft))
}
