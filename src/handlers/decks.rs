use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use diesel::SqliteConnection;
use validator::Validate;

use crate::AppState;
use crate::data::models::deck_models::DeckChangeset;
use crate::data::models::{
    ApiError, Card, Deck, DeckCreate, DeckRow, DeckUpdate, Detail, ListParams,
};
use crate::data::repositories::DeckRepository;
use crate::features::auth::AuthUser;
use crate::utils::{AppJson, AppPath, AppQuery};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_decks).post(create_deck))
        .route("/{deck_id}", get(get_deck).put(update_deck).delete(delete_deck))
}

/// Attaches the deck's cards in stored order.
fn with_cards(conn: &mut SqliteConnection, row: DeckRow) -> Result<Deck, ApiError> {
    let cards = DeckRepository::cards(conn, row.deck_id)?
        .into_iter()
        .map(Card::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Deck::from_row(row, cards))
}

async fn create_deck(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<DeckCreate>,
) -> Result<Json<Deck>, ApiError> {
    payload.validate()?;

    let mut conn = state.pool.get()?;
    let row = DeckRepository::create(
        &mut conn,
        user.user_id,
        &payload.name,
        payload.description.as_deref(),
        &payload.card_ids,
    )?;

    log::info!("User {} created deck {}", user.user_id, row.deck_id);
    Ok(Json(with_cards(&mut conn, row)?))
}

async fn get_deck(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    AppPath(deck_id): AppPath<i32>,
) -> Result<Json<Deck>, ApiError> {
    let mut conn = state.pool.get()?;
    let row = DeckRepository::find(&mut conn, user.user_id, deck_id)?
        .ok_or_else(|| ApiError::not_found("Deck"))?;
    Ok(Json(with_cards(&mut conn, row)?))
}

async fn update_deck(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    AppPath(deck_id): AppPath<i32>,
    AppJson(payload): AppJson<DeckUpdate>,
) -> Result<Json<Deck>, ApiError> {
    payload.validate()?;

    let mut conn = state.pool.get()?;
    let changes = DeckChangeset {
        deck_name: payload.name.as_deref(),
        description: payload.description.as_deref(),
        last_edited: Utc::now().naive_utc(),
    };
    let row = DeckRepository::update(
        &mut conn,
        user.user_id,
        deck_id,
        &changes,
        payload.card_ids.as_deref(),
    )?
    .ok_or_else(|| ApiError::not_found("Deck"))?;
    Ok(Json(with_cards(&mut conn, row)?))
}

async fn delete_deck(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    AppPath(deck_id): AppPath<i32>,
) -> Result<Json<Detail>, ApiError> {
    let mut conn = state.pool.get()?;
    if !DeckRepository::delete(&mut conn, user.user_id, deck_id)? {
        return Err(ApiError::not_found("Deck"));
    }
    Ok(Json(Detail::new("Deck deleted successfully")))
}

async fn list_decks(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    AppQuery(params): AppQuery<ListParams>,
) -> Result<Json<Vec<Deck>>, ApiError> {
    params.validate()?;

    let mut conn = state.pool.get()?;
    let rows = DeckRepository::list(&mut conn, user.user_id, params.skip, params.limit)?;
    let decks = rows
        .into_iter()
        .map(|row| with_cards(&mut conn, row))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(decks))
}
