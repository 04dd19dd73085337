use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use validator::Validate;

use crate::AppState;
use crate::data::models::card_models::{CardChangeset, NewCard};
use crate::data::models::{ApiError, Card, CardCreate, CardUpdate, Detail, ListParams};
use crate::data::repositories::CardRepository;
use crate::features::auth::AuthUser;
use crate::utils::{AppJson, AppPath, AppQuery};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_cards).post(create_card))
        .route("/{card_id}", get(get_card).put(update_card).delete(delete_card))
}

async fn create_card(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CardCreate>,
) -> Result<Json<Card>, ApiError> {
    payload.validate()?;

    let mut conn = state.pool.get()?;
    let new_card = NewCard::from_create(user.user_id, &payload, Utc::now().naive_utc())?;
    let row = CardRepository::insert(&mut conn, &new_card)?;

    log::info!("User {} created card {}", user.user_id, row.card_id);
    Ok(Json(Card::try_from(row)?))
}

async fn get_card(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    AppPath(card_id): AppPath<i32>,
) -> Result<Json<Card>, ApiError> {
    let mut conn = state.pool.get()?;
    let row = CardRepository::visit(&mut conn, user.user_id, card_id)?
        .ok_or_else(|| ApiError::not_found("Card"))?;
    Ok(Json(Card::try_from(row)?))
}

async fn update_card(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    AppPath(card_id): AppPath<i32>,
    AppJson(payload): AppJson<CardUpdate>,
) -> Result<Json<Card>, ApiError> {
    payload.validate()?;

    let mut conn = state.pool.get()?;
    let changes = CardChangeset::from_update(payload, Utc::now().naive_utc())?;
    let row = CardRepository::update(&mut conn, user.user_id, card_id, &changes)?
        .ok_or_else(|| ApiError::not_found("Card"))?;
    Ok(Json(Card::try_from(row)?))
}

async fn delete_card(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    AppPath(card_id): AppPath<i32>,
) -> Result<Json<Detail>, ApiError> {
    let mut conn = state.pool.get()?;
    if !CardRepository::delete(&mut conn, user.user_id, card_id)? {
        return Err(ApiError::not_found("Card"));
    }
    Ok(Json(Detail::new("Card deleted successfully")))
}

async fn list_cards(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    AppQuery(params): AppQuery<ListParams>,
) -> Result<Json<Vec<Card>>, ApiError> {
    params.validate()?;

    let mut conn = state.pool.get()?;
    let cards = CardRepository::list(&mut conn, user.user_id, &params)?
        .into_iter()
        .map(Card::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(cards))
}
