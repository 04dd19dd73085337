use std::collections::HashSet;

use chrono::Utc;
use diesel::prelude::*;

use crate::data::models::deck_models::{DeckChangeset, NewDeck};
use crate::data::models::{CardRow, DeckRow};
use crate::data::repositories::{CardRepository, last_insert_id};
use crate::schema::{cards, deck_cards, decks};

pub struct DeckRepository;

impl DeckRepository {
    pub fn create(
        conn: &mut SqliteConnection,
        owner_id: i32,
        name: &str,
        description: Option<&str>,
        card_ids: &[i32],
    ) -> QueryResult<DeckRow> {
        conn.transaction(|conn| {
            let now = Utc::now().naive_utc();
            diesel::insert_into(decks::table)
                .values(&NewDeck {
                    owner_id,
                    deck_name: name,
                    description,
                    date_created: now,
                    last_edited: now,
                })
                .execute(conn)?;
            let deck_id = last_insert_id(conn)?;

            Self::replace_cards(conn, owner_id, deck_id, card_ids)?;

            decks::table
                .find(deck_id)
                .select(DeckRow::as_select())
                .first(conn)
        })
    }

    pub fn find(
        conn: &mut SqliteConnection,
        owner_id: i32,
        deck_id: i32,
    ) -> QueryResult<Option<DeckRow>> {
        decks::table
            .filter(decks::deck_id.eq(deck_id))
            .filter(decks::owner_id.eq(owner_id))
            .select(DeckRow::as_select())
            .first(conn)
            .optional()
    }

    pub fn list(
        conn: &mut SqliteConnection,
        owner_id: i32,
        skip: i64,
        limit: i64,
    ) -> QueryResult<Vec<DeckRow>> {
        decks::table
            .filter(decks::owner_id.eq(owner_id))
            .order(decks::deck_id.asc())
            .offset(skip)
            .limit(limit)
            .select(DeckRow::as_select())
            .load(conn)
    }

    /// Cards of a deck in stored order.
    pub fn cards(conn: &mut SqliteConnection, deck_id: i32) -> QueryResult<Vec<CardRow>> {
        deck_cards::table
            .inner_join(cards::table)
            .filter(deck_cards::deck_id.eq(deck_id))
            .order(deck_cards::position.asc())
            .select(CardRow::as_select())
            .load(conn)
    }

    pub fn update(
        conn: &mut SqliteConnection,
        owner_id: i32,
        deck_id: i32,
        changes: &DeckChangeset,
        card_ids: Option<&[i32]>,
    ) -> QueryResult<Option<DeckRow>> {
        conn.transaction(|conn| {
            let updated = diesel::update(
                decks::table
                    .filter(decks::deck_id.eq(deck_id))
                    .filter(decks::owner_id.eq(owner_id)),
            )
            .set(changes)
            .execute(conn)?;

            if updated == 0 {
                return Ok(None);
            }
            if let Some(card_ids) = card_ids {
                Self::replace_cards(conn, owner_id, deck_id, card_ids)?;
            }
            Self::find(conn, owner_id, deck_id)
        })
    }

    /// Replaces the card list. Ids the owner does not own are dropped and
    /// duplicates keep their first position.
    pub fn replace_cards(
        conn: &mut SqliteConnection,
        owner_id: i32,
        deck_id: i32,
        card_ids: &[i32],
    ) -> QueryResult<usize> {
        let owned: HashSet<i32> = CardRepository::owned_ids(conn, owner_id, card_ids)?
            .into_iter()
            .collect();
        let mut seen = HashSet::new();
        let rows: Vec<_> = card_ids
            .iter()
            .copied()
            .filter(|id| owned.contains(id) && seen.insert(*id))
            .enumerate()
            .map(|(position, card_id)| {
                (
                    deck_cards::deck_id.eq(deck_id),
                    deck_cards::card_id.eq(card_id),
                    deck_cards::position.eq(position as i32),
                )
            })
            .collect();

        diesel::delete(deck_cards::table.filter(deck_cards::deck_id.eq(deck_id))).execute(conn)?;
        if rows.is_empty() {
            return Ok(0);
        }
        diesel::insert_into(deck_cards::table)
            .values(&rows)
            .execute(conn)
    }

    /// Appends a card at the end of the deck unless it is already there.
    pub fn append_card(conn: &mut SqliteConnection, deck_id: i32, card_id: i32) -> QueryResult<()> {
        use diesel::dsl::{exists, max};

        let present: bool = diesel::select(exists(
            deck_cards::table
                .filter(deck_cards::deck_id.eq(deck_id))
                .filter(deck_cards::card_id.eq(card_id)),
        ))
        .get_result(conn)?;
        if present {
            return Ok(());
        }

        let last: Option<i32> = deck_cards::table
            .filter(deck_cards::deck_id.eq(deck_id))
            .select(max(deck_cards::position))
            .first(conn)?;

        diesel::insert_into(deck_cards::table)
            .values((
                deck_cards::deck_id.eq(deck_id),
                deck_cards::card_id.eq(card_id),
                deck_cards::position.eq(last.map_or(0, |p| p + 1)),
            ))
            .execute(conn)?;

        diesel::update(decks::table.find(deck_id))
            .set(decks::last_edited.eq(Utc::now().naive_utc()))
            .execute(conn)?;
        Ok(())
    }

    /// Cards survive the deck; only memberships go.
    pub fn delete(conn: &mut SqliteConnection, owner_id: i32, deck_id: i32) -> QueryResult<bool> {
        let deleted = diesel::delete(
            decks::table
                .filter(decks::deck_id.eq(deck_id))
                .filter(decks::owner_id.eq(owner_id)),
        )
        .execute(conn)?;
        Ok(deleted > 0)
    }
}
