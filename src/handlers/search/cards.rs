use axum::Json;
use axum::extract::State;
use validator::Validate;

use crate::AppState;
use crate::data::models::{ApiError, Card, CardRow, SearchParams, SearchResponse};
use crate::data::repositories::CardRepository;
use crate::features::auth::AuthUser;
use crate::features::search::{Cursor, paginate};
use crate::utils::AppQuery;

pub async fn search_cards(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    AppQuery(params): AppQuery<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    params.validate()?;
    let query = params.query.trim();
    if query.is_empty() {
        return Err(ApiError::validation("query must not be empty"));
    }
    let cursor = params
        .cursor
        .as_deref()
        .filter(|raw| !raw.is_empty())
        .map(str::parse::<Cursor>)
        .transpose()?;

    let mut conn = state.pool.get()?;
    let rows = CardRepository::search(
        &mut conn,
        user.user_id,
        query,
        cursor.map(|c| c.0),
        params.limit + 1,
    )?;

    let page = paginate(rows, params.limit as usize, |row: &CardRow| row.card_id);
    let results = page
        .items
        .into_iter()
        .map(Card::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(SearchResponse {
        results,
        next_cursor: page.next_cursor.map(|cursor| cursor.to_string()),
    }))
}
