use axum::Json;
use axum::extract::State;
use chrono::Utc;
use diesel::prelude::*;
use validator::Validate;

use crate::AppState;
use crate::data::models::card_models::NewCard;
use crate::data::models::draft_models::DraftChangeset;
use crate::data::models::{
    ApiError, ApproveParams, BulkApproveRequest, Card, Detail, DraftCardResponse, DraftCardUpdate,
    DraftFilter, DraftRow, DraftStatus, RejectedCleanupParams,
};
use crate::data::repositories::{CardRepository, DeckRepository, DraftRepository};
use crate::features::auth::AuthUser;
use crate::utils::{AppJson, AppPath, AppQuery};

pub async fn list_drafts(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    AppQuery(filter): AppQuery<DraftFilter>,
) -> Result<Json<Vec<DraftCardResponse>>, ApiError> {
    filter.validate()?;

    let mut conn = state.pool.get()?;
    let drafts = DraftRepository::list(&mut conn, user.user_id, &filter)?
        .into_iter()
        .map(DraftCardResponse::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(drafts))
}

pub async fn update_draft(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    AppPath(draft_id): AppPath<i32>,
    AppJson(payload): AppJson<DraftCardUpdate>,
) -> Result<Json<DraftCardResponse>, ApiError> {
    payload.validate()?;

    let mut conn = state.pool.get()?;
    let changes = DraftChangeset::from_update(payload)?;
    let row = DraftRepository::update(&mut conn, user.user_id, draft_id, &changes)?
        .ok_or_else(|| ApiError::not_found("Draft"))?;
    Ok(Json(DraftCardResponse::try_from(row)?))
}

fn ensure_deck(conn: &mut SqliteConnection, owner_id: i32, deck_id: Option<i32>) -> Result<(), ApiError> {
    if let Some(deck_id) = deck_id {
        DeckRepository::find(conn, owner_id, deck_id)?.ok_or_else(|| ApiError::not_found("Deck"))?;
    }
    Ok(())
}

/// Turns a pending draft into a card, optionally filing it into a deck.
/// Returns `None` when another request already moved the draft on.
fn promote(
    conn: &mut SqliteConnection,
    draft: &DraftRow,
    deck_id: Option<i32>,
) -> QueryResult<Option<Card>> {
    conn.immediate_transaction(|conn| {
        if !DraftRepository::transition(conn, draft.draft_id, DraftStatus::Pending, DraftStatus::Approved)? {
            return Ok(None);
        }
        let row = CardRepository::insert(conn, &NewCard::from_draft(draft, Utc::now().naive_utc()))?;
        if let Some(deck_id) = deck_id {
            DeckRepository::append_card(conn, deck_id, row.card_id)?;
        }
        Card::try_from(row).map(Some)
    })
}

fn already_processed(conn: &mut SqliteConnection, owner_id: i32, draft_id: i32) -> Result<ApiError, ApiError> {
    let draft = DraftRepository::find(conn, owner_id, draft_id)?
        .ok_or_else(|| ApiError::not_found("Draft"))?;
    Ok(ApiError::validation(format!("Draft is already {}", draft.draft_status()?)))
}

pub async fn approve_draft(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    AppPath(draft_id): AppPath<i32>,
    AppQuery(params): AppQuery<ApproveParams>,
) -> Result<Json<Card>, ApiError> {
    let mut conn = state.pool.get()?;
    let draft = DraftRepository::find(&mut conn, user.user_id, draft_id)?
        .ok_or_else(|| ApiError::not_found("Draft"))?;

    if draft.draft_status()? != DraftStatus::Pending {
        return Err(already_processed(&mut conn, user.user_id, draft_id)?);
    }
    ensure_deck(&mut conn, user.user_id, params.deck_id)?;

    let Some(card) = promote(&mut conn, &draft, params.deck_id)? else {
        return Err(already_processed(&mut conn, user.user_id, draft_id)?);
    };
    log::info!("User {} approved draft {} as card {}", user.user_id, draft_id, card.id);
    Ok(Json(card))
}

pub async fn bulk_approve(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<BulkApproveRequest>,
) -> Result<Json<Vec<Card>>, ApiError> {
    payload.validate()?;

    let mut conn = state.pool.get()?;
    ensure_deck(&mut conn, user.user_id, payload.deck_id)?;

    let mut cards = Vec::with_capacity(payload.draft_ids.len());
    for draft_id in payload.draft_ids {
        let Some(draft) = DraftRepository::find(&mut conn, user.user_id, draft_id)? else {
            log::debug!("Skipping unknown draft {}", draft_id);
            continue;
        };
        if draft.draft_status()? != DraftStatus::Pending {
            continue;
        }
        if let Some(card) = promote(&mut conn, &draft, payload.deck_id)? {
            cards.push(card);
        }
    }

    log::info!("User {} bulk-approved {} drafts", user.user_id, cards.len());
    Ok(Json(cards))
}

pub async fn reject_draft(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    AppPath(draft_id): AppPath<i32>,
) -> Result<Json<DraftCardResponse>, ApiError> {
    let mut conn = state.pool.get()?;
    let changes = DraftChangeset {
        status: Some(DraftStatus::Rejected.as_str().to_string()),
        ..DraftChangeset::default()
    };
    let row = DraftRepository::update(&mut conn, user.user_id, draft_id, &changes)?
        .ok_or_else(|| ApiError::not_found("Draft"))?;
    Ok(Json(DraftCardResponse::try_from(row)?))
}

pub async fn delete_rejected(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    AppQuery(params): AppQuery<RejectedCleanupParams>,
) -> Result<Json<Detail>, ApiError> {
    let mut conn = state.pool.get()?;
    let deleted = DraftRepository::delete_rejected(&mut conn, user.user_id, params.book_id)?;
    Ok(Json(Detail::new(format!("Deleted {} rejected drafts", deleted))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::models::{GeneratedCard, PageRange};
    use crate::data::models::draft_models::NewDraft;
    use crate::data::repositories::UserRepository;
    use crate::db;

    fn pending_draft(conn: &mut SqliteConnection) -> DraftRow {
        let user = UserRepository::create_user(conn, "reader", "reader@example.com", "hash").unwrap();
        let book = db::test_support::insert_book(conn, user.user_id);
        let card = GeneratedCard {
            front: "der Apfel".into(),
            back: "the apple".into(),
            examples: vec![],
            synonyms: vec![],
            antonyms: vec![],
            part_of_speech: None,
            gender: None,
            plural_form: None,
            pronunciation: None,
            notes: None,
        };
        let now = Utc::now().naive_utc();
        let draft = NewDraft::from_generated(user.user_id, book, &card, PageRange::new(1, 2), "batch", now).unwrap();
        DraftRepository::insert_batch(conn, &[draft], "batch").unwrap().remove(0)
    }

    #[test]
    fn stale_copy_of_a_draft_is_promoted_only_once() {
        let mut conn = db::test_support::connection();
        let draft = pending_draft(&mut conn);
        let stale = draft.clone();

        let first = promote(&mut conn, &draft, None).unwrap();
        let second = promote(&mut conn, &stale, None).unwrap();

        assert!(first.is_some());
        assert!(second.is_none());
        let cards = crate::schema::cards::table.count().get_result::<i64>(&mut conn).unwrap();
        assert_eq!(cards, 1);
    }

    #[test]
    fn rejected_draft_cannot_be_claimed() {
        let mut conn = db::test_support::connection();
        let draft = pending_draft(&mut conn);

        assert!(DraftRepository::transition(&mut conn, draft.draft_id, DraftStatus::Pending, DraftStatus::Rejected).unwrap());
        assert!(promote(&mut conn, &draft, None).unwrap().is_none());
        assert_eq!(
            already_processed(&mut conn, draft.owner_id, draft.draft_id).unwrap().to_string(),
            "Draft is already rejected"
        );
    }
}
