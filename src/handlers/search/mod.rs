use axum::Router;
use axum::routing::get;

use crate::AppState;

mod cards;

pub fn router() -> Router<AppState> {
    Router::new().route("/cards", get(cards::search_cards))
}
