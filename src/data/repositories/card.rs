use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{Integer, Text};

use crate::data::models::card_models::{CardChangeset, NewCard};
use crate::data::models::{CardCreate, CardRow, CardUpdate, ListParams, encode_column};
use crate::data::repositories::{contains_pattern, last_insert_id};
use crate::schema::cards;

pub struct CardRepository;

// Case-sensitive substring position, unlike LIKE which folds ASCII case.
diesel::define_sql_function!(fn instr(haystack: Text, needle: Text) -> Integer);

impl NewCard {
    pub fn from_create(
        owner_id: i32,
        payload: &CardCreate,
        now: NaiveDateTime,
    ) -> QueryResult<Self> {
        Ok(NewCard {
            owner_id,
            front: payload.front.clone(),
            back: payload.back.clone(),
            example_original: payload.example_original.clone(),
            example_translation: payload.example_translation.clone(),
            examples: encode_column(&payload.examples)?,
            synonyms: encode_column(&payload.synonyms)?,
            antonyms: encode_column(&payload.antonyms)?,
            part_of_speech: payload.part_of_speech.clone(),
            gender: payload.gender.clone(),
            plural_form: payload.plural_form.clone(),
            pronunciation: payload.pronunciation.clone(),
            notes: payload.notes.clone(),
            tags: encode_column(&payload.tags)?,
            hardness_level: payload.hardness_level.as_str().to_string(),
            date_created: now,
            last_edited: now,
            source_book_id: None,
            source_page: None,
        })
    }
}

impl CardChangeset {
    pub fn from_update(payload: CardUpdate, now: NaiveDateTime) -> QueryResult<Self> {
        Ok(CardChangeset {
            examples: payload.examples.as_ref().map(encode_column).transpose()?,
            synonyms: payload.synonyms.as_ref().map(encode_column).transpose()?,
            antonyms: payload.antonyms.as_ref().map(encode_column).transpose()?,
            tags: payload.tags.as_ref().map(encode_column).transpose()?,
            hardness_level: payload.hardness_level.map(|level| level.as_str().to_string()),
            front: payload.front,
            back: payload.back,
            example_original: payload.example_original,
            example_translation: payload.example_translation,
            part_of_speech: payload.part_of_speech,
            gender: payload.gender,
            plural_form: payload.plural_form,
            pronunciation: payload.pronunciation,
            notes: payload.notes,
            last_edited: Some(now),
        })
    }
}

impl CardRepository {
    pub fn insert(conn: &mut SqliteConnection, card: &NewCard) -> QueryResult<CardRow> {
        diesel::insert_into(cards::table).values(card).execute(conn)?;
        let card_id = last_insert_id(conn)?;

        cards::table
            .find(card_id)
            .select(CardRow::as_select())
            .first(conn)
    }

    pub fn find(
        conn: &mut SqliteConnection,
        owner_id: i32,
        card_id: i32,
    ) -> QueryResult<Option<CardRow>> {
        cards::table
            .filter(cards::card_id.eq(card_id))
            .filter(cards::owner_id.eq(owner_id))
            .select(CardRow::as_select())
            .first(conn)
            .optional()
    }

    /// Fetches a card and stamps `last_visited`.
    pub fn visit(
        conn: &mut SqliteConnection,
        owner_id: i32,
        card_id: i32,
    ) -> QueryResult<Option<CardRow>> {
        let updated = diesel::update(
            cards::table
                .filter(cards::card_id.eq(card_id))
                .filter(cards::owner_id.eq(owner_id)),
        )
        .set(cards::last_visited.eq(Some(Utc::now().naive_utc())))
        .execute(conn)?;

        if updated == 0 {
            return Ok(None);
        }
        Self::find(conn, owner_id, card_id)
    }

    pub fn list(
        conn: &mut SqliteConnection,
        owner_id: i32,
        params: &ListParams,
    ) -> QueryResult<Vec<CardRow>> {
        let mut query = cards::table
            .filter(cards::owner_id.eq(owner_id))
            .select(CardRow::as_select())
            .into_boxed();

        if let Some(tag) = params.tag.as_deref() {
            // Tags are a JSON array of strings; match the quoted element exactly.
            query = query.filter(instr(cards::tags, encode_column(tag)?).gt(0));
        }

        query
            .order(cards::card_id.asc())
            .offset(params.skip)
            .limit(params.limit)
            .load(conn)
    }

    pub fn update(
        conn: &mut SqliteConnection,
        owner_id: i32,
        card_id: i32,
        changes: &CardChangeset,
    ) -> QueryResult<Option<CardRow>> {
        let updated = diesel::update(
            cards::table
                .filter(cards::card_id.eq(card_id))
                .filter(cards::owner_id.eq(owner_id)),
        )
        .set(changes)
        .execute(conn)?;

        if updated == 0 {
            return Ok(None);
        }
        Self::find(conn, owner_id, card_id)
    }

    /// Deleting a card drops it from every deck through the foreign key.
    pub fn delete(conn: &mut SqliteConnection, owner_id: i32, card_id: i32) -> QueryResult<bool> {
        let deleted = diesel::delete(
            cards::table
                .filter(cards::card_id.eq(card_id))
                .filter(cards::owner_id.eq(owner_id)),
        )
        .execute(conn)?;
        Ok(deleted > 0)
    }

    /// The subset of `card_ids` owned by `owner_id`.
    pub fn owned_ids(
        conn: &mut SqliteConnection,
        owner_id: i32,
        card_ids: &[i32],
    ) -> QueryResult<Vec<i32>> {
        cards::table
            .filter(cards::owner_id.eq(owner_id))
            .filter(cards::card_id.eq_any(card_ids))
            .select(cards::card_id)
            .load(conn)
    }

    /// Case-insensitive substring search ordered by id, starting at
    /// `from_id` when given. Returns at most `limit` rows.
    pub fn search(
        conn: &mut SqliteConnection,
        owner_id: i32,
        term: &str,
        from_id: Option<i32>,
        limit: i64,
    ) -> QueryResult<Vec<CardRow>> {
        let pattern = contains_pattern(term);

        let mut query = cards::table
            .filter(cards::owner_id.eq(owner_id))
            .filter(
                cards::front
                    .like(pattern.clone())
                    .escape('\\')
                    .or(cards::back.like(pattern.clone()).escape('\\'))
                    .or(cards::example_original.like(pattern.clone()).escape('\\'))
                    .or(cards::example_translation.like(pattern.clone()).escape('\\'))
                    .or(cards::notes.like(pattern).escape('\\')),
            )
            .select(CardRow::as_select())
            .into_boxed();

        if let Some(from_id) = from_id {
            query = query.filter(cards::card_id.ge(from_id));
        }

        query.order(cards::card_id.asc()).limit(limit).load(conn)
    }
}
