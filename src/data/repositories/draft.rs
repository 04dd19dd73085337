use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::data::models::card_models::NewCard;
use crate::data::models::draft_models::{DraftChangeset, NewDraft};
use crate::data::models::{
    DraftCardUpdate, DraftFilter, DraftRow, DraftStatus, GeneratedCard, HardnessLevel,
    PageRange, encode_column,
};
use crate::schema::draft_cards;

pub struct DraftRepository;

impl NewDraft {
    pub fn from_generated(
        owner_id: i32,
        book_id: i32,
        card: &GeneratedCard,
        range: PageRange,
        batch_id: &str,
        now: NaiveDateTime,
    ) -> QueryResult<Self> {
        Ok(NewDraft {
            owner_id,
            book_id,
            front: card.front.clone(),
            back: card.back.clone(),
            examples: encode_column(&card.examples)?,
            synonyms: encode_column(&card.synonyms)?,
            antonyms: encode_column(&card.antonyms)?,
            part_of_speech: card.part_of_speech.clone(),
            gender: card.gender.clone(),
            plural_form: card.plural_form.clone(),
            pronunciation: card.pronunciation.clone(),
            notes: card.notes.clone(),
            tags: "[]".to_string(),
            status: DraftStatus::Pending.as_str().to_string(),
            source_page_start: Some(range.start),
            source_page_end: Some(range.end),
            generation_batch_id: Some(batch_id.to_string()),
            date_created: now,
        })
    }
}

impl DraftChangeset {
    pub fn from_update(payload: DraftCardUpdate) -> QueryResult<Self> {
        Ok(DraftChangeset {
            examples: payload.examples.as_ref().map(encode_column).transpose()?,
            synonyms: payload.synonyms.as_ref().map(encode_column).transpose()?,
            antonyms: payload.antonyms.as_ref().map(encode_column).transpose()?,
            tags: payload.tags.as_ref().map(encode_column).transpose()?,
            front: payload.front,
            back: payload.back,
            part_of_speech: payload.part_of_speech,
            gender: payload.gender,
            plural_form: payload.plural_form,
            pronunciation: payload.pronunciation,
            notes: payload.notes,
            status: None,
        })
    }

    fn is_empty(&self) -> bool {
        [
            &self.front,
            &self.back,
            &self.examples,
            &self.synonyms,
            &self.antonyms,
            &self.part_of_speech,
            &self.gender,
            &self.plural_form,
            &self.pronunciation,
            &self.notes,
            &self.tags,
            &self.status,
        ]
        .iter()
        .all(|field| field.is_none())
    }
}

impl NewCard {
    /// Card promoted from a draft, linked back to its book and first page.
    pub fn from_draft(draft: &DraftRow, now: NaiveDateTime) -> Self {
        NewCard {
            owner_id: draft.owner_id,
            front: draft.front.clone(),
            back: draft.back.clone(),
            example_original: None,
            example_translation: None,
            examples: draft.examples.clone(),
            synonyms: draft.synonyms.clone(),
            antonyms: draft.antonyms.clone(),
            part_of_speech: draft.part_of_speech.clone(),
            gender: draft.gender.clone(),
            plural_form: draft.plural_form.clone(),
            pronunciation: draft.pronunciation.clone(),
            notes: draft.notes.clone(),
            tags: draft.tags.clone(),
            hardness_level: HardnessLevel::default().as_str().to_string(),
            date_created: now,
            last_edited: now,
            source_book_id: Some(draft.book_id),
            source_page: draft.source_page_start,
        }
    }
}

impl DraftRepository {
    /// Stores a generated batch and returns it in insertion order.
    pub fn insert_batch(
        conn: &mut SqliteConnection,
        drafts: &[NewDraft],
        batch_id: &str,
    ) -> QueryResult<Vec<DraftRow>> {
        conn.transaction(|conn| {
            for draft in drafts {
                diesel::insert_into(draft_cards::table)
                    .values(draft)
                    .execute(conn)?;
            }
            draft_cards::table
                .filter(draft_cards::generation_batch_id.eq(batch_id))
                .order(draft_cards::draft_id.asc())
                .select(DraftRow::as_select())
                .load(conn)
        })
    }

    pub fn find(
        conn: &mut SqliteConnection,
        owner_id: i32,
        draft_id: i32,
    ) -> QueryResult<Option<DraftRow>> {
        draft_cards::table
            .filter(draft_cards::draft_id.eq(draft_id))
            .filter(draft_cards::owner_id.eq(owner_id))
            .select(DraftRow::as_select())
            .first(conn)
            .optional()
    }

    pub fn list(
        conn: &mut SqliteConnection,
        owner_id: i32,
        filter: &DraftFilter,
    ) -> QueryResult<Vec<DraftRow>> {
        let mut query = draft_cards::table
            .filter(draft_cards::owner_id.eq(owner_id))
            .filter(draft_cards::status.eq(filter.status.as_str()))
            .select(DraftRow::as_select())
            .into_boxed();

        if let Some(book_id) = filter.book_id {
            query = query.filter(draft_cards::book_id.eq(book_id));
        }
        if let Some(batch_id) = filter.batch_id.as_deref() {
            query = query.filter(draft_cards::generation_batch_id.eq(batch_id));
        }

        query
            .order(draft_cards::draft_id.asc())
            .offset(filter.skip)
            .limit(filter.limit)
            .load(conn)
    }

    pub fn update(
        conn: &mut SqliteConnection,
        owner_id: i32,
        draft_id: i32,
        changes: &DraftChangeset,
    ) -> QueryResult<Option<DraftRow>> {
        if changes.is_empty() {
            return Self::find(conn, owner_id, draft_id);
        }

        let updated = diesel::update(
            draft_cards::table
                .filter(draft_cards::draft_id.eq(draft_id))
                .filter(draft_cards::owner_id.eq(owner_id)),
        )
        .set(changes)
        .execute(conn)?;

        if updated == 0 {
            return Ok(None);
        }
        Self::find(conn, owner_id, draft_id)
    }

    /// Moves a draft from `from` to `to` in one statement. Returns `false`
    /// when the draft was no longer in `from`.
    pub fn transition(
        conn: &mut SqliteConnection,
        draft_id: i32,
        from: DraftStatus,
        to: DraftStatus,
    ) -> QueryResult<bool> {
        let updated = diesel::update(
            draft_cards::table
                .filter(draft_cards::draft_id.eq(draft_id))
                .filter(draft_cards::status.eq(from.as_str())),
        )
        .set(draft_cards::status.eq(to.as_str()))
        .execute(conn)?;
        Ok(updated == 1)
    }

    pub fn delete_rejected(
        conn: &mut SqliteConnection,
        owner_id: i32,
        book_id: Option<i32>,
    ) -> QueryResult<usize> {
        let mut query = diesel::delete(draft_cards::table)
            .filter(draft_cards::owner_id.eq(owner_id))
            .filter(draft_cards::status.eq(DraftStatus::Rejected.as_str()))
            .into_boxed();

        if let Some(book_id) = book_id {
            query = query.filter(draft_cards::book_id.eq(book_id));
        }
        query.execute(conn)
    }
}
